use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgArguments, query::Query, Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{
    db::PostgresDb,
    model::{member::MemberModel, project_user::ProjectUserModel},
};

use super::project;

const INSERT: &str = "INSERT INTO \"project_users\" (\"id\", \"created_at\", \"updated_at\", \"project_id\", \"user_id\", \"email\", \"permission\") VALUES ($1, $2, $3, $4, $5, $6, $7)";
const SELECT_PERMISSION: &str = "SELECT \"permission\" FROM \"project_users\" WHERE \"project_id\" = $1 AND \"user_id\" = $2";
const SELECT_BY_USER_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"user_id\", \"email\", \"permission\" FROM \"project_users\" WHERE \"project_id\" = $1 AND \"user_id\" = $2";
const SELECT_BY_EMAIL: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"user_id\", \"email\", \"permission\" FROM \"project_users\" WHERE \"project_id\" = $1 AND \"email\" = $2";
const SELECT_MANY_MEMBERS: &str = "SELECT \"pu\".\"user_id\", \"pu\".\"email\", \"u\".\"name\", \"pu\".\"permission\", \"pu\".\"created_at\" FROM \"project_users\" AS \"pu\" LEFT JOIN \"users\" AS \"u\" ON \"u\".\"id\" = \"pu\".\"user_id\" WHERE \"pu\".\"project_id\" = $1 ORDER BY \"pu\".\"permission\", \"pu\".\"created_at\"";
const UPDATE_PERMISSION: &str = "UPDATE \"project_users\" SET \"updated_at\" = $1, \"permission\" = $2 WHERE \"project_id\" = $3 AND \"user_id\" = $4 AND \"permission\" = $5";
const DELETE_BY_USER_ID: &str =
    "DELETE FROM \"project_users\" WHERE \"project_id\" = $1 AND \"user_id\" = $2";
const UPDATE_PENDING_PERMISSION: &str = "UPDATE \"project_users\" SET \"updated_at\" = $1, \"permission\" = $2 WHERE \"project_id\" = $3 AND \"email\" = $4 AND \"user_id\" IS NULL AND \"permission\" = $5";
const DELETE_PENDING_BY_EMAIL: &str = "DELETE FROM \"project_users\" WHERE \"project_id\" = $1 AND \"email\" = $2 AND \"user_id\" IS NULL";
const RECONCILE_BY_EMAIL: &str = "UPDATE \"project_users\" SET \"user_id\" = $1, \"updated_at\" = $2 WHERE \"email\" = $3 AND \"user_id\" IS NULL AND \"project_id\" NOT IN (SELECT \"project_id\" FROM \"project_users\" WHERE \"user_id\" = $1)";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    ph_log::info(Some("🔧"), "[PostgreSQL] Setting up project_users table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"project_users\" (\"id\" uuid, \"created_at\" timestamptz(6), \"updated_at\" timestamptz(6), \"project_id\" uuid NOT NULL, \"user_id\" text, \"email\" text, \"permission\" integer NOT NULL, PRIMARY KEY (\"id\"), UNIQUE (\"project_id\", \"user_id\"), UNIQUE (\"project_id\", \"email\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT_PERMISSION),
        pool.prepare(SELECT_BY_USER_ID),
        pool.prepare(SELECT_BY_EMAIL),
        pool.prepare(SELECT_MANY_MEMBERS),
        pool.prepare(UPDATE_PERMISSION),
        pool.prepare(UPDATE_PENDING_PERMISSION),
        pool.prepare(DELETE_BY_USER_ID),
        pool.prepare(DELETE_PENDING_BY_EMAIL),
        pool.prepare(RECONCILE_BY_EMAIL),
    )?;

    Ok(())
}

pub(crate) fn insert_query(value: &ProjectUserModel) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(INSERT)
        .bind(value.id())
        .bind(value.created_at())
        .bind(value.updated_at())
        .bind(value.project_id())
        .bind(value.user_id())
        .bind(value.email())
        .bind(value.permission())
}

impl PostgresDb {
    pub async fn insert_project_user(&self, value: &ProjectUserModel) -> Result<()> {
        self.execute(insert_query(value)).await?;
        Ok(())
    }

    pub async fn select_project_user_permission(
        &self,
        project_id: &Uuid,
        user_id: &str,
    ) -> Result<Option<i32>> {
        Ok(self
            .fetch_optional::<(i32,)>(
                sqlx::query_as(SELECT_PERMISSION)
                    .bind(project_id)
                    .bind(user_id),
            )
            .await?
            .map(|(permission,)| permission))
    }

    pub async fn select_project_user_by_user_id(
        &self,
        project_id: &Uuid,
        user_id: &str,
    ) -> Result<Option<ProjectUserModel>> {
        Ok(self
            .fetch_optional(
                sqlx::query_as(SELECT_BY_USER_ID)
                    .bind(project_id)
                    .bind(user_id),
            )
            .await?)
    }

    pub async fn select_project_user_by_email(
        &self,
        project_id: &Uuid,
        email: &str,
    ) -> Result<Option<ProjectUserModel>> {
        Ok(self
            .fetch_optional(sqlx::query_as(SELECT_BY_EMAIL).bind(project_id).bind(email))
            .await?)
    }

    pub async fn select_many_project_members(&self, project_id: &Uuid) -> Result<Vec<MemberModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_MEMBERS).bind(project_id))
            .await?)
    }

    /// Sets the member's level only if it still equals `observed`.
    pub async fn update_project_user_permission(
        &self,
        project_id: &Uuid,
        user_id: &str,
        observed: &i32,
        permission: &i32,
        updated_at: &DateTime<Utc>,
    ) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(UPDATE_PERMISSION)
                    .bind(updated_at)
                    .bind(permission)
                    .bind(project_id)
                    .bind(user_id)
                    .bind(observed),
            )
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Sets the level of a pending email-only membership only if it still equals
    /// `observed`.
    pub async fn update_pending_project_user_permission(
        &self,
        project_id: &Uuid,
        email: &str,
        observed: &i32,
        permission: &i32,
        updated_at: &DateTime<Utc>,
    ) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(UPDATE_PENDING_PERMISSION)
                    .bind(updated_at)
                    .bind(permission)
                    .bind(project_id)
                    .bind(email)
                    .bind(observed),
            )
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Promotes `to_user_id` to owner and demotes `from_user_id` to editor in one
    /// transaction. Returns false, leaving everything untouched, when either row has
    /// moved away from its observed level.
    pub async fn transfer_project_ownership(
        &self,
        project_id: &Uuid,
        from_user_id: &str,
        to_user_id: &str,
        to_observed: &i32,
        updated_at: &DateTime<Utc>,
    ) -> Result<bool> {
        let mut tx = self.begin().await?;

        let promoted = sqlx::query(UPDATE_PERMISSION)
            .bind(updated_at)
            .bind(0_i32)
            .bind(project_id)
            .bind(to_user_id)
            .bind(to_observed)
            .execute(&mut *tx)
            .await?;
        if promoted.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        let demoted = sqlx::query(UPDATE_PERMISSION)
            .bind(updated_at)
            .bind(1_i32)
            .bind(project_id)
            .bind(from_user_id)
            .bind(0_i32)
            .execute(&mut *tx)
            .await?;
        if demoted.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(project::UPDATE_OWNER)
            .bind(updated_at)
            .bind(to_user_id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete_project_user(&self, project_id: &Uuid, user_id: &str) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(DELETE_BY_USER_ID)
                    .bind(project_id)
                    .bind(user_id),
            )
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_pending_project_user(&self, project_id: &Uuid, email: &str) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(DELETE_PENDING_BY_EMAIL)
                    .bind(project_id)
                    .bind(email),
            )
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Binds pending email-only memberships to `user_id`, skipping projects the user
    /// already belongs to.
    pub async fn reconcile_project_users_by_email(
        &self,
        user_id: &str,
        email: &str,
        updated_at: &DateTime<Utc>,
    ) -> Result<u64> {
        let res = self
            .execute(
                sqlx::query(RECONCILE_BY_EMAIL)
                    .bind(user_id)
                    .bind(updated_at)
                    .bind(email),
            )
            .await?;
        Ok(res.rows_affected())
    }
}
