use sqlx::{
    prelude::FromRow,
    types::chrono::{DateTime, Utc},
};

/// A membership row joined with the member's user profile, if one exists.
#[derive(FromRow)]
pub struct MemberModel {
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    permission: i32,
    created_at: DateTime<Utc>,
}

impl MemberModel {
    pub fn user_id(&self) -> &Option<String> {
        &self.user_id
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn permission(&self) -> &i32 {
        &self.permission
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}
