use chrono::{DateTime, Utc};
use ph_db_postgresql::model::project::ProjectModel as ProjectPostgresModel;
use ph_db_sqlite::model::project::ProjectModel as ProjectSqliteModel;
use ph_error::{Error, Result};
use ph_permission::PermissionLevel;
use uuid::Uuid;

use crate::{project_user::ProjectUserDao, util::error, Db};

const ENTITY: &str = "Project";

pub struct ProjectDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: String,
    name: String,
    description: Option<String>,
    industry: Option<String>,
    use_case: Option<String>,
    model_type: Option<String>,
    function: Option<String>,
}

impl ProjectDao {
    pub fn new(user_id: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            user_id: user_id.to_owned(),
            name: name.to_owned(),
            description: None,
            industry: None,
            use_case: None,
            model_type: None,
            function: None,
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

    /// Id of the current owner.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &Option<String> {
        &self.description
    }

    pub fn industry(&self) -> &Option<String> {
        &self.industry
    }

    pub fn use_case(&self) -> &Option<String> {
        &self.use_case
    }

    pub fn model_type(&self) -> &Option<String> {
        &self.model_type
    }

    pub fn function(&self) -> &Option<String> {
        &self.function
    }

    pub fn set_description(&mut self, description: &Option<String>) {
        self.description = description.clone();
    }

    pub fn set_industry(&mut self, industry: &Option<String>) {
        self.industry = industry.clone();
    }

    pub fn set_use_case(&mut self, use_case: &Option<String>) {
        self.use_case = use_case.clone();
    }

    pub fn set_model_type(&mut self, model_type: &Option<String>) {
        self.model_type = model_type.clone();
    }

    pub fn set_function(&mut self, function: &Option<String>) {
        self.function = function.clone();
    }

    /// Inserts the project and makes its creator the owner in one transaction.
    pub async fn db_insert(&self, db: &Db, owner_email: &Option<String>) -> Result<()> {
        let owner = ProjectUserDao::new(
            &self.id,
            &Some(self.user_id.clone()),
            owner_email,
            &PermissionLevel::Owner,
        );
        match db {
            Db::PostgresqlDb(db) => {
                db.insert_project(&self.to_postgresdb_model(), &owner.to_postgresdb_model())
                    .await
            }
            Db::SqliteDb(db) => {
                db.insert_project(&self.to_sqlitedb_model(), &owner.to_sqlitedb_model())
                    .await
            }
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Self> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_project(id)
                .await
                .map(|model| Self::from_postgresdb_model(&model)),
            Db::SqliteDb(db) => db
                .select_project(id)
                .await
                .map(|model| Self::from_sqlitedb_model(&model)),
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    /// Projects where `user_id` holds any membership, newest first.
    pub async fn db_select_many_by_member(db: &Db, user_id: &str) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_many_projects_by_member(user_id)
                .await
                .map(|models| models.iter().map(Self::from_postgresdb_model).collect()),
            Db::SqliteDb(db) => db
                .select_many_projects_by_member(user_id)
                .await
                .map(|models| models.iter().map(Self::from_sqlitedb_model).collect()),
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    pub async fn db_update(&mut self, db: &Db) -> Result<()> {
        self.updated_at = Utc::now();
        match db {
            Db::PostgresqlDb(db) => db.update_project(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.update_project(&self.to_sqlitedb_model()).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    /// Deletes the project with its memberships and file rows. Stored objects
    /// are left in place.
    pub async fn db_delete(db: &Db, id: &Uuid) -> Result<()> {
        let deleted = match db {
            Db::PostgresqlDb(db) => db.delete_project(id).await,
            Db::SqliteDb(db) => db.delete_project(id).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))?;

        if !deleted {
            return Err(Error::NotFound(format!("{ENTITY} not found")));
        }
        Ok(())
    }

    fn from_postgresdb_model(model: &ProjectPostgresModel) -> Self {
        Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: model.user_id().to_owned(),
            name: model.name().to_owned(),
            description: model.description().clone(),
            industry: model.industry().clone(),
            use_case: model.use_case().clone(),
            model_type: model.model_type().clone(),
            function: model.function().clone(),
        }
    }

    fn to_postgresdb_model(&self) -> ProjectPostgresModel {
        ProjectPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.name,
            &self.description,
            &self.industry,
            &self.use_case,
            &self.model_type,
            &self.function,
        )
    }

    fn from_sqlitedb_model(model: &ProjectSqliteModel) -> Self {
        Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: model.user_id().to_owned(),
            name: model.name().to_owned(),
            description: model.description().clone(),
            industry: model.industry().clone(),
            use_case: model.use_case().clone(),
            model_type: model.model_type().clone(),
            function: model.function().clone(),
        }
    }

    fn to_sqlitedb_model(&self) -> ProjectSqliteModel {
        ProjectSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.name,
            &self.description,
            &self.industry,
            &self.use_case,
            &self.model_type,
            &self.function,
        )
    }
}
