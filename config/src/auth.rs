use serde::Deserialize;

#[derive(Deserialize)]
pub struct AuthConfig {
    /// Literal bearer token that maps to a fixed local identity. Only honored
    /// when `app.mode` is `development`.
    dev_token: Option<String>,
    clerk: ClerkAuthConfig,
}

impl AuthConfig {
    pub fn dev_token(&self) -> &Option<String> {
        &self.dev_token
    }

    pub fn clerk(&self) -> &ClerkAuthConfig {
        &self.clerk
    }
}

#[derive(Deserialize)]
pub struct ClerkAuthConfig {
    api_url: String,
    secret_key: String,
    jwt_public_key: String,
}

impl ClerkAuthConfig {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn jwt_public_key(&self) -> &str {
        &self.jwt_public_key
    }
}
