use chrono::{DateTime, Utc};
use ph_db_postgresql::model::user::UserModel as UserPostgresModel;
use ph_db_sqlite::model::user::UserModel as UserSqliteModel;
use ph_error::Result;

use crate::{util::error, Db};

const ENTITY: &str = "User";

pub struct UserDao {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: Option<String>,
    name: String,
}

impl UserDao {
    /// `email` is `None` when the identity provider has no address on file.
    pub fn new(id: &str, email: Option<&str>, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_owned(),
            created_at: now,
            updated_at: now,
            email: email.map(str::to_lowercase),
            name: name.to_owned(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.insert_user(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.insert_user(&self.to_sqlitedb_model()).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    /// Inserts the user, or refreshes email and name of the existing row.
    pub async fn db_upsert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.upsert_user(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.upsert_user(&self.to_sqlitedb_model()).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    pub async fn db_select(db: &Db, id: &str) -> Result<Self> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_user(id)
                .await
                .map(|model| Self::from_postgresdb_model(&model)),
            Db::SqliteDb(db) => db
                .select_user(id)
                .await
                .map(|model| Self::from_sqlitedb_model(&model)),
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    pub async fn db_select_by_email(db: &Db, email: &str) -> Result<Option<Self>> {
        let email = email.to_lowercase();
        match db {
            Db::PostgresqlDb(db) => db
                .select_user_by_email(&email)
                .await
                .map(|model| model.as_ref().map(Self::from_postgresdb_model)),
            Db::SqliteDb(db) => db
                .select_user_by_email(&email)
                .await
                .map(|model| model.as_ref().map(Self::from_sqlitedb_model)),
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    pub async fn db_exists(db: &Db, id: &str) -> Result<bool> {
        match db {
            Db::PostgresqlDb(db) => db.user_exists(id).await,
            Db::SqliteDb(db) => db.user_exists(id).await,
        }
        .map_err(|err| error::from_db(err, ENTITY))
    }

    fn from_postgresdb_model(model: &UserPostgresModel) -> Self {
        Self {
            id: model.id().to_owned(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            email: model.email().clone(),
            name: model.name().to_owned(),
        }
    }

    fn to_postgresdb_model(&self) -> UserPostgresModel {
        UserPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.email,
            &self.name,
        )
    }

    fn from_sqlitedb_model(model: &UserSqliteModel) -> Self {
        Self {
            id: model.id().to_owned(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            email: model.email().clone(),
            name: model.name().to_owned(),
        }
    }

    fn to_sqlitedb_model(&self) -> UserSqliteModel {
        UserSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.email,
            &self.name,
        )
    }
}
