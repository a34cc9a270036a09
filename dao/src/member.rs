use chrono::{DateTime, Utc};
use ph_db_postgresql::model::member::MemberModel as MemberPostgresModel;
use ph_db_sqlite::model::member::MemberModel as MemberSqliteModel;
use ph_error::Result;
use ph_permission::PermissionLevel;
use uuid::Uuid;

use crate::{project_user::level_from_db, util::error, Db};

/// A project member as listed to other members, joined with the profile of
/// the user when the membership is not a pending invitation.
pub struct MemberDao {
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    permission: PermissionLevel,
    created_at: DateTime<Utc>,
}

impl MemberDao {
    pub fn user_id(&self) -> &Option<String> {
        &self.user_id
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn permission(&self) -> &PermissionLevel {
        &self.permission
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Members ordered by level, then by join time.
    pub async fn db_select_many_by_project_id(db: &Db, project_id: &Uuid) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => match db.select_many_project_members(project_id).await {
                Ok(models) => models.iter().map(Self::from_postgresdb_model).collect(),
                Err(err) => Err(error::from_db(err, "Project member")),
            },
            Db::SqliteDb(db) => match db.select_many_project_members(project_id).await {
                Ok(models) => models.iter().map(Self::from_sqlitedb_model).collect(),
                Err(err) => Err(error::from_db(err, "Project member")),
            },
        }
    }

    fn from_postgresdb_model(model: &MemberPostgresModel) -> Result<Self> {
        Ok(Self {
            user_id: model.user_id().clone(),
            email: model.email().clone(),
            name: model.name().clone(),
            permission: level_from_db(*model.permission())?,
            created_at: *model.created_at(),
        })
    }

    fn from_sqlitedb_model(model: &MemberSqliteModel) -> Result<Self> {
        Ok(Self {
            user_id: model.user_id().clone(),
            email: model.email().clone(),
            name: model.name().clone(),
            permission: level_from_db(*model.permission())?,
            created_at: *model.created_at(),
        })
    }
}
