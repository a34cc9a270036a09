use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub struct ProjectUserModel {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    user_id: Option<String>,
    email: Option<String>,
    permission: i32,
}

impl ProjectUserModel {
    pub fn new(
        id: &Uuid,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        project_id: &Uuid,
        user_id: &Option<String>,
        email: &Option<String>,
        permission: &i32,
    ) -> Self {
        Self {
            id: *id,
            created_at: *created_at,
            updated_at: *updated_at,
            project_id: *project_id,
            user_id: user_id.clone(),
            email: email.clone(),
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

    pub fn permission(&self) -> &i32 {
        &self.permission
    }
}
