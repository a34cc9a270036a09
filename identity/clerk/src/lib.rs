use async_trait::async_trait;
use ph_error::Result;

pub mod clerk;
mod user;

pub use clerk::ClerkIdentity;

/// Who is making a request, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: String,
    email: Option<String>,
    name: String,
}

impl Identity {
    pub fn new(user_id: &str, email: Option<&str>, name: &str) -> Self {
        Self {
            user_id: user_id.to_owned(),
            email: email.map(str::to_lowercase),
            name: name.to_owned(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and resolves the profile behind it.
    async fn verify(&self, token: &str) -> Result<Identity>;
}
