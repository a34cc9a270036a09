use anyhow::Result;
use sqlx::{Executor, Pool, Sqlite};

use crate::{db::SqliteDb, model::user::UserModel};

const INSERT: &str = "INSERT INTO \"users\" (\"id\", \"created_at\", \"updated_at\", \"email\", \"name\") VALUES (?, ?, ?, ?, ?)";
const UPSERT: &str = "INSERT INTO \"users\" (\"id\", \"created_at\", \"updated_at\", \"email\", \"name\") VALUES (?, ?, ?, ?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"updated_at\" = excluded.\"updated_at\", \"email\" = excluded.\"email\", \"name\" = excluded.\"name\"";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"email\", \"name\" FROM \"users\" WHERE \"id\" = ?";
const SELECT_BY_EMAIL: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"email\", \"name\" FROM \"users\" WHERE \"email\" = ?";
const EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM \"users\" WHERE \"id\" = ?)";

pub async fn init(pool: &Pool<Sqlite>) -> Result<()> {
    ph_log::info(Some("🔧"), "[SQLite] Setting up users table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"users\" (\"id\" text, \"created_at\" datetime, \"updated_at\" datetime, \"email\" text UNIQUE, \"name\" text NOT NULL, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(UPSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_BY_EMAIL),
        pool.prepare(EXISTS),
    )?;

    Ok(())
}

impl SqliteDb {
    pub async fn insert_user(&self, value: &UserModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.email())
                .bind(value.name()),
        )
        .await?;
        Ok(())
    }

    pub async fn upsert_user(&self, value: &UserModel) -> Result<()> {
        self.execute(
            sqlx::query(UPSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.email())
                .bind(value.name()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_user(&self, id: &str) -> Result<UserModel> {
        Ok(self.fetch_one(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_user_by_email(&self, email: &str) -> Result<Option<UserModel>> {
        Ok(self
            .fetch_optional(sqlx::query_as(SELECT_BY_EMAIL).bind(email))
            .await?)
    }

    pub async fn user_exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .fetch_one::<(bool,)>(sqlx::query_as(EXISTS).bind(id))
            .await?
            .0)
    }
}
