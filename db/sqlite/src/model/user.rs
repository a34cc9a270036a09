use sqlx::{
    prelude::FromRow,
    types::chrono::{DateTime, Utc},
};

#[derive(FromRow)]
pub struct UserModel {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: Option<String>,
    name: String,
}

impl UserModel {
    pub fn new(
        id: &str,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        email: &Option<String>,
        name: &str,
    ) -> Self {
        Self {
            id: id.to_owned(),
            created_at: *created_at,
            updated_at: *updated_at,
            email: email.clone(),
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
}
