use anyhow::Result as AnyResult;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use ph_error::{Error, Result};
use serde::Deserialize;

use crate::{user::ClerkUser, Identity, IdentityProvider};

#[derive(Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Verifies Clerk session tokens locally with the instance's PEM public key,
/// then loads the user profile from the Clerk backend API.
pub struct ClerkIdentity {
    api_url: String,
    secret_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
    client: reqwest::Client,
}

impl ClerkIdentity {
    pub fn new(api_url: &str, secret_key: &str, jwt_public_key: &str) -> AnyResult<Self> {
        ph_log::info(Some("⚡"), "[Clerk] Initializing component");

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            secret_key: secret_key.to_owned(),
            decoding_key: DecodingKey::from_rsa_pem(jwt_public_key.as_bytes())?,
            validation,
            client: reqwest::Client::new(),
        })
    }

    /// User id carried by a valid session token.
    pub fn decode_subject(&self, token: &str) -> Result<String> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|err| Error::Unauthorized(format!("Invalid session token: {err}")))
    }

    async fn fetch_user(&self, user_id: &str) -> Result<ClerkUser> {
        let res = self
            .client
            .get(format!("{}/users/{user_id}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|err| from_reqwest(err, "Failed to reach identity provider"))?;

        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::Unauthorized(format!("User {user_id} no longer exists")));
        }
        if !status.is_success() {
            return Err(Error::BackendFailure(format!(
                "Identity provider answered {status} for user {user_id}"
            )));
        }

        res.json::<ClerkUser>()
            .await
            .map_err(|err| from_reqwest(err, "Failed to read user profile"))
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn verify(&self, token: &str) -> Result<Identity> {
        let user_id = self.decode_subject(token)?;
        Ok(self.fetch_user(&user_id).await?.into_identity())
    }
}

fn from_reqwest(err: reqwest::Error, context: &str) -> Error {
    if err.is_timeout() || err.is_connect() {
        Error::BackendUnavailable(format!("{context}: {err}"))
    } else {
        Error::BackendFailure(format!("{context}: {err}"))
    }
}
