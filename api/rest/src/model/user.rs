use chrono::{DateTime, Utc};
use ph_dao::user::UserDao;
use serde::Serialize;

use crate::extractor::AuthIdentity;

#[derive(Serialize)]
pub struct MeResJson {
    user_id: String,
    email: Option<String>,
    name: String,
}

impl MeResJson {
    pub fn from_identity(identity: &AuthIdentity) -> Self {
        Self {
            user_id: identity.user_id().to_owned(),
            email: identity.email().clone(),
            name: identity.name().to_owned(),
        }
    }
}

#[derive(Serialize)]
pub struct UserResJson {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: Option<String>,
    name: String,
}

impl UserResJson {
    pub fn from_dao(user: &UserDao) -> Self {
        Self {
            id: user.id().to_owned(),
            created_at: *user.created_at(),
            updated_at: *user.updated_at(),
            email: user.email().clone(),
            name: user.name().to_owned(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResJson {
    status: &'static str,
}

impl HealthResJson {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
