use std::{
    future::{ready, Future, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures::future::LocalBoxFuture;
use ph_config::app::AppConfigMode;
use ph_dao::{membership, user::UserDao};
use ph_error::{Error, Result};
use tokio::time::Instant;

use crate::{context::ApiRestCtx, model::ApiError};

const DEV_USER_ID: &str = "user_2jRfvOhhMBfHM5C85C1q3Ze1Ron";
const DEV_USER_EMAIL: &str = "test@example.com";
const DEV_USER_NAME: &str = "Test User";

fn missing_context() -> ApiError {
    ApiError(Error::BackendFailure(
        "Request context is not configured".to_owned(),
    ))
}

/// Point in time by which every downstream call of the current request must
/// finish. Created once per request and shared by all extractors.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn new(timeout: &Duration) -> Self {
        Self {
            at: Instant::now() + *timeout,
        }
    }

    /// Runs `fut` within the remaining budget. Expiry is reported as an
    /// unavailable backend, naming `stage`.
    pub async fn run<T, F>(&self, stage: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::BackendUnavailable(format!(
                "{stage} did not finish before the request deadline"
            ))),
        }
    }
}

impl FromRequest for Deadline {
    type Error = ApiError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let existing = req.extensions().get::<Deadline>().copied();
        if let Some(deadline) = existing {
            return ready(Ok(deadline));
        }

        let deadline = match req.app_data::<web::Data<ApiRestCtx>>() {
            Some(ctx) => Deadline::new(ctx.request_timeout()),
            None => return ready(Err(missing_context())),
        };
        req.extensions_mut().insert(deadline);
        ready(Ok(deadline))
    }
}

/// The authenticated caller. Provider-verified callers are synced into the
/// users table and claim their pending invitations on every request.
#[derive(Clone, Debug)]
pub struct AuthIdentity {
    user_id: String,
    email: Option<String>,
    name: String,
}

impl AuthIdentity {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &Option<String> {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn development() -> Self {
        Self {
            user_id: DEV_USER_ID.to_owned(),
            email: Some(DEV_USER_EMAIL.to_owned()),
            name: DEV_USER_NAME.to_owned(),
        }
    }

    async fn resolve(ctx: &ApiRestCtx, token: &str, deadline: &Deadline) -> Result<Self> {
        if *ctx.mode() == AppConfigMode::Development {
            if let Some(dev_token) = ctx.identity().dev_token() {
                if token == dev_token.as_str() {
                    ph_log::debug(None, "[ApiRestServer] Authenticated development identity");
                    return Ok(Self::development());
                }
            }
        }

        let identity = deadline
            .run(
                "Identity verification",
                ctx.identity().provider().verify(token),
            )
            .await?;

        let user = UserDao::new(
            identity.user_id(),
            identity.email().as_deref(),
            identity.name(),
        );
        deadline
            .run("User sync", user.db_upsert(ctx.dao().db()))
            .await?;
        if let Some(email) = user.email() {
            deadline
                .run(
                    "Invitation claim",
                    membership::claim_invitations(ctx.dao().db(), user.id(), email),
                )
                .await?;
        }

        Ok(Self {
            user_id: user.id().to_owned(),
            email: user.email().clone(),
            name: user.name().to_owned(),
        })
    }
}

impl FromRequest for AuthIdentity {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let ctx = req
                .app_data::<web::Data<ApiRestCtx>>()
                .cloned()
                .ok_or_else(missing_context)?;
            let auth = BearerAuth::extract(&req).await.map_err(|_| {
                ApiError(Error::Unauthorized(
                    "Missing or malformed bearer token".to_owned(),
                ))
            })?;
            let deadline = Deadline::extract(&req).await?;

            Self::resolve(&ctx, auth.token(), &deadline)
                .await
                .map_err(ApiError)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ph_error::{Error, ErrorKind};

    use super::Deadline;

    #[tokio::test]
    async fn passes_through_results_within_budget() {
        let deadline = Deadline::new(&Duration::from_secs(1));

        assert_eq!(deadline.run("Lookup", async { Ok(7) }).await, Ok(7));
        assert_eq!(
            deadline
                .run("Lookup", async {
                    Err::<(), _>(Error::NotFound("Project not found".to_owned()))
                })
                .await,
            Err(Error::NotFound("Project not found".to_owned()))
        );
    }

    #[tokio::test]
    async fn expiry_is_backend_unavailable() {
        let deadline = Deadline::new(&Duration::from_millis(10));

        let err = deadline
            .run("Invitation email", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(err.message().starts_with("Invitation email"));
    }
}
