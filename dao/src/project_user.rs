use chrono::{DateTime, Utc};
use ph_db_postgresql::model::project_user::ProjectUserModel as ProjectUserPostgresModel;
use ph_db_sqlite::model::project_user::ProjectUserModel as ProjectUserSqliteModel;
use ph_error::{Error, Result};
use ph_permission::PermissionLevel;
use uuid::Uuid;

use crate::{util::error, Db};

const ENTITY: &str = "Project member";

/// A membership row. `user_id` is `None` while the row is an email-only
/// invitation waiting for that user to sign in.
pub struct ProjectUserDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    user_id: Option<String>,
    email: Option<String>,
    permission: PermissionLevel,
}

impl ProjectUserDao {
    pub fn new(
        project_id: &Uuid,
        user_id: &Option<String>,
        email: &Option<String>,
        permission: &PermissionLevel,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            project_id: *project_id,
            user_id: user_id.clone(),
            email: email.as_ref().map(|email| email.to_lowercase()),
            permission: *permission,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn user_id(&self) -> &Option<String> {
        &self.user_id
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn permission(&self) -> &PermissionLevel {
        &self.permission
    }

    pub fn is_pending(&self) -> bool {
        self.user_id.is_none()
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.insert_project_user(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.insert_project_user(&self.to_sqlitedb_model()).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    /// Level held by `user_id` in the project, `None` without a membership.
    pub async fn db_select_permission(
        db: &Db,
        project_id: &Uuid,
        user_id: &str,
    ) -> Result<Option<PermissionLevel>> {
        let permission = match db {
            Db::PostgresqlDb(db) => db.select_project_user_permission(project_id, user_id).await,
            Db::SqliteDb(db) => db.select_project_user_permission(project_id, user_id).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        permission.map(level_from_db).transpose()
    }

    pub async fn db_select_by_user_id(
        db: &Db,
        project_id: &Uuid,
        user_id: &str,
    ) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => match db
                .select_project_user_by_user_id(project_id, user_id)
                .await
            {
                Ok(model) => model.as_ref().map(Self::from_postgresdb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
            Db::SqliteDb(db) => match db.select_project_user_by_user_id(project_id, user_id).await
            {
                Ok(model) => model.as_ref().map(Self::from_sqlitedb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
        }
    }

    pub async fn db_select_by_email(
        db: &Db,
        project_id: &Uuid,
        email: &str,
    ) -> Result<Option<Self>> {
        let email = email.to_lowercase();
        match db {
            Db::PostgresqlDb(db) => match db.select_project_user_by_email(project_id, &email).await
            {
                Ok(model) => model.as_ref().map(Self::from_postgresdb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
            Db::SqliteDb(db) => match db.select_project_user_by_email(project_id, &email).await {
                Ok(model) => model.as_ref().map(Self::from_sqlitedb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
        }
    }

    /// Writes `permission` only if the member still holds `observed`; a
    /// concurrent change in between yields `Conflict`.
    pub async fn db_update_permission(
        db: &Db,
        project_id: &Uuid,
        user_id: &str,
        observed: &PermissionLevel,
        permission: &PermissionLevel,
    ) -> Result<()> {
        let now = Utc::now();
        let observed = observed.value();
        let permission = permission.value();
        let updated = match db {
            Db::PostgresqlDb(db) => {
                db.update_project_user_permission(project_id, user_id, &observed, &permission, &now)
                    .await
            }
            Db::SqliteDb(db) => {
                db.update_project_user_permission(project_id, user_id, &observed, &permission, &now)
                    .await
            }
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !updated {
            return Err(Error::Conflict(
                "Member permission was changed concurrently, reload and retry".to_owned(),
            ));
        }
        Ok(())
    }

    /// Same as [`Self::db_update_permission`] for a pending invitation
    /// addressed by email.
    pub async fn db_update_pending_permission(
        db: &Db,
        project_id: &Uuid,
        email: &str,
        observed: &PermissionLevel,
        permission: &PermissionLevel,
    ) -> Result<()> {
        let now = Utc::now();
        let email = email.to_lowercase();
        let observed = observed.value();
        let permission = permission.value();
        let updated = match db {
            Db::PostgresqlDb(db) => {
                db.update_pending_project_user_permission(
                    project_id,
                    &email,
                    &observed,
                    &permission,
                    &now,
                )
                .await
            }
            Db::SqliteDb(db) => {
                db.update_pending_project_user_permission(
                    project_id,
                    &email,
                    &observed,
                    &permission,
                    &now,
                )
                .await
            }
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !updated {
            return Err(Error::Conflict(
                "Invitation was changed concurrently, reload and retry".to_owned(),
            ));
        }
        Ok(())
    }

    /// Makes `to_user_id` the owner and `from_user_id` an editor atomically.
    pub async fn db_transfer_ownership(
        db: &Db,
        project_id: &Uuid,
        from_user_id: &str,
        to_user_id: &str,
        to_observed: &PermissionLevel,
    ) -> Result<()> {
        let now = Utc::now();
        let to_observed = to_observed.value();
        let transferred = match db {
            Db::PostgresqlDb(db) => {
                db.transfer_project_ownership(project_id, from_user_id, to_user_id, &to_observed, &now)
                    .await
            }
            Db::SqliteDb(db) => {
                db.transfer_project_ownership(project_id, from_user_id, to_user_id, &to_observed, &now)
                    .await
            }
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !transferred {
            return Err(Error::Conflict(
                "Project membership was changed concurrently, reload and retry".to_owned(),
            ));
        }
        Ok(())
    }

    pub async fn db_delete(db: &Db, project_id: &Uuid, user_id: &str) -> Result<()> {
        let deleted = match db {
            Db::PostgresqlDb(db) => db.delete_project_user(project_id, user_id).await,
            Db::SqliteDb(db) => db.delete_project_user(project_id, user_id).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !deleted {
            return Err(Error::NotFound("Member not found in this project".to_owned()));
        }
        Ok(())
    }

    /// Withdraws a pending invitation. Memberships already bound to a user are
    /// not matched.
    pub async fn db_delete_pending(db: &Db, project_id: &Uuid, email: &str) -> Result<()> {
        let email = email.to_lowercase();
        let deleted = match db {
            Db::PostgresqlDb(db) => db.delete_pending_project_user(project_id, &email).await,
            Db::SqliteDb(db) => db.delete_pending_project_user(project_id, &email).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !deleted {
            return Err(Error::NotFound("Member not found in this project".to_owned()));
        }
        Ok(())
    }

    /// Binds every pending invitation for `email` to `user_id`. Returns how many
    /// invitations were claimed.
    pub async fn db_reconcile_by_email(db: &Db, user_id: &str, email: &str) -> Result<u64> {
        let now = Utc::now();
        let email = email.to_lowercase();
        match db {
            Db::PostgresqlDb(db) => {
                db.reconcile_project_users_by_email(user_id, &email, &now)
                    .await
            }
            Db::SqliteDb(db) => db.reconcile_project_users_by_email(user_id, &email, &now).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    fn from_postgresdb_model(model: &ProjectUserPostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            user_id: model.user_id().clone(),
            email: model.email().clone(),
            permission: level_from_db(*model.permission())?,
        })
    }

    pub(crate) fn to_postgresdb_model(&self) -> ProjectUserPostgresModel {
        ProjectUserPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.user_id,
            &self.email,
            &self.permission.value(),
        )
    }

    fn from_sqlitedb_model(model: &ProjectUserSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            user_id: model.user_id().clone(),
            email: model.email().clone(),
            permission: level_from_db(*model.permission())?,
        })
    }

    pub(crate) fn to_sqlitedb_model(&self) -> ProjectUserSqliteModel {
        ProjectUserSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.user_id,
            &self.email,
            &self.permission.value(),
        )
    }
}

pub(crate) fn level_from_db(value: i32) -> Result<PermissionLevel> {
    PermissionLevel::try_from(value)
        .map_err(|err| Error::BackendFailure(format!("Stored permission is invalid: {err}")))
}
