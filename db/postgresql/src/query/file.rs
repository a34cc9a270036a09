use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{db::PostgresDb, model::file::FileModel};

const UPSERT: &str = "INSERT INTO \"files\" (\"id\", \"created_at\", \"updated_at\", \"project_id\", \"file_name\", \"status\") VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (\"project_id\", \"file_name\") DO UPDATE SET \"updated_at\" = $3, \"status\" = $6 RETURNING \"id\", \"created_at\", \"updated_at\", \"project_id\", \"file_name\", \"status\"";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"file_name\", \"status\" FROM \"files\" WHERE \"project_id\" = $1 AND \"file_name\" = $2";
const SELECT_MANY_BY_PROJECT_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"file_name\", \"status\" FROM \"files\" WHERE \"project_id\" = $1 ORDER BY \"created_at\" DESC";
const UPDATE_STATUS: &str = "UPDATE \"files\" SET \"updated_at\" = $1, \"status\" = $2 WHERE \"project_id\" = $3 AND \"file_name\" = $4 RETURNING \"id\", \"created_at\", \"updated_at\", \"project_id\", \"file_name\", \"status\"";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    ph_log::info(Some("🔧"), "[PostgreSQL] Setting up files table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"files\" (\"id\" uuid, \"created_at\" timestamptz(6), \"updated_at\" timestamptz(6), \"project_id\" uuid NOT NULL, \"file_name\" text NOT NULL, \"status\" text NOT NULL, PRIMARY KEY (\"id\"), UNIQUE (\"project_id\", \"file_name\"))").await?;

    tokio::try_join!(
        pool.prepare(UPSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_MANY_BY_PROJECT_ID),
        pool.prepare(UPDATE_STATUS),
    )?;

    Ok(())
}

impl PostgresDb {
    /// Inserts the file row, or resets the status of the existing row with the same
    /// name. Returns the stored row.
    pub async fn upsert_file(&self, value: &FileModel) -> Result<FileModel> {
        Ok(self
            .fetch_one(
                sqlx::query_as(UPSERT)
                    .bind(value.id())
                    .bind(value.created_at())
                    .bind(value.updated_at())
                    .bind(value.project_id())
                    .bind(value.file_name())
                    .bind(value.status()),
            )
            .await?)
    }

    pub async fn select_file(&self, project_id: &Uuid, file_name: &str) -> Result<Option<FileModel>> {
        Ok(self
            .fetch_optional(sqlx::query_as(SELECT).bind(project_id).bind(file_name))
            .await?)
    }

    pub async fn select_many_files_by_project_id(&self, project_id: &Uuid) -> Result<Vec<FileModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_PROJECT_ID).bind(project_id))
            .await?)
    }

    pub async fn update_file_status(
        &self,
        project_id: &Uuid,
        file_name: &str,
        status: &str,
        updated_at: &DateTime<Utc>,
    ) -> Result<Option<FileModel>> {
        Ok(self
            .fetch_optional(
                sqlx::query_as(UPDATE_STATUS)
                    .bind(updated_at)
                    .bind(status)
                    .bind(project_id)
                    .bind(file_name),
            )
            .await?)
    }
}
