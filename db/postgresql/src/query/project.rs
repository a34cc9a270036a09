use anyhow::Result;
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{
    db::PostgresDb,
    model::{project::ProjectModel, project_user::ProjectUserModel},
};

use super::project_user;

const INSERT: &str = "INSERT INTO \"projects\" (\"id\", \"created_at\", \"updated_at\", \"user_id\", \"name\", \"description\", \"industry\", \"use_case\", \"model_type\", \"function\") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"name\", \"description\", \"industry\", \"use_case\", \"model_type\", \"function\" FROM \"projects\" WHERE \"id\" = $1";
const SELECT_MANY_BY_MEMBER: &str = "SELECT \"p\".\"id\", \"p\".\"created_at\", \"p\".\"updated_at\", \"p\".\"user_id\", \"p\".\"name\", \"p\".\"description\", \"p\".\"industry\", \"p\".\"use_case\", \"p\".\"model_type\", \"p\".\"function\" FROM \"projects\" AS \"p\" INNER JOIN \"project_users\" AS \"pu\" ON \"pu\".\"project_id\" = \"p\".\"id\" WHERE \"pu\".\"user_id\" = $1 ORDER BY \"p\".\"created_at\" DESC";
const UPDATE: &str = "UPDATE \"projects\" SET \"updated_at\" = $1, \"name\" = $2, \"description\" = $3, \"industry\" = $4, \"use_case\" = $5, \"model_type\" = $6, \"function\" = $7 WHERE \"id\" = $8";
pub(crate) const UPDATE_OWNER: &str =
    "UPDATE \"projects\" SET \"updated_at\" = $1, \"user_id\" = $2 WHERE \"id\" = $3";
const DELETE: &str = "DELETE FROM \"projects\" WHERE \"id\" = $1";
const DELETE_FILES: &str = "DELETE FROM \"files\" WHERE \"project_id\" = $1";
const DELETE_PROJECT_USERS: &str = "DELETE FROM \"project_users\" WHERE \"project_id\" = $1";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    ph_log::info(Some("🔧"), "[PostgreSQL] Setting up projects table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"projects\" (\"id\" uuid, \"created_at\" timestamptz(6), \"updated_at\" timestamptz(6), \"user_id\" text NOT NULL, \"name\" text NOT NULL, \"description\" text, \"industry\" text, \"use_case\" text, \"model_type\" text, \"function\" text, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_MANY_BY_MEMBER),
        pool.prepare(UPDATE),
        pool.prepare(UPDATE_OWNER),
        pool.prepare(DELETE),
    )?;

    Ok(())
}

impl PostgresDb {
    /// Inserts the project and its owner membership in one transaction.
    pub async fn insert_project(&self, value: &ProjectModel, owner: &ProjectUserModel) -> Result<()> {
        let mut tx = self.begin().await?;

        sqlx::query(INSERT)
            .bind(value.id())
            .bind(value.created_at())
            .bind(value.updated_at())
            .bind(value.user_id())
            .bind(value.name())
            .bind(value.description())
            .bind(value.industry())
            .bind(value.use_case())
            .bind(value.model_type())
            .bind(value.function())
            .execute(&mut *tx)
            .await?;
        project_user::insert_query(owner).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn select_project(&self, id: &Uuid) -> Result<ProjectModel> {
        Ok(self.fetch_one(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_many_projects_by_member(&self, user_id: &str) -> Result<Vec<ProjectModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_MEMBER).bind(user_id))
            .await?)
    }

    pub async fn update_project(&self, value: &ProjectModel) -> Result<()> {
        self.execute(
            sqlx::query(UPDATE)
                .bind(value.updated_at())
                .bind(value.name())
                .bind(value.description())
                .bind(value.industry())
                .bind(value.use_case())
                .bind(value.model_type())
                .bind(value.function())
                .bind(value.id()),
        )
        .await?;
        Ok(())
    }

    /// Deletes the project together with its memberships and file rows.
    /// Returns false when no project had that id.
    pub async fn delete_project(&self, id: &Uuid) -> Result<bool> {
        let mut tx = self.begin().await?;

        sqlx::query(DELETE_FILES).bind(id).execute(&mut *tx).await?;
        sqlx::query(DELETE_PROJECT_USERS)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query(DELETE).bind(id).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }
}
