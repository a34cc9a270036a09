use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web,
};
use async_trait::async_trait;
use ph_config::app::AppConfigMode;
use ph_dao::Db;
use ph_db_sqlite::db::SqliteDb;
use ph_error::{Error, Result};
use ph_identity_clerk::{Identity, IdentityProvider};
use ph_mailer::{MailPayload, MailSender};
use ph_queue_sqs::{FileMessage, FileQueue};
use ph_storage_s3::ObjectStorage;
use serde_json::Value;
use uuid::Uuid;

use crate::context::{
    ApiRestCtx, ApiRestDaoCtx, ApiRestIdentityCtx, ApiRestMailerCtx, ApiRestQueueCtx,
    ApiRestStorageCtx,
};

pub const ALICE: &str = "token-alice";
pub const BOB: &str = "token-bob";
pub const CAROL: &str = "token-carol";
pub const DAVE: &str = "token-dave";
pub const ERIN: &str = "token-erin";
pub const DEV_TOKEN: &str = "dev-token";

struct FakeIdentity {
    identities: HashMap<&'static str, Identity>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<Identity> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Invalid session token".to_owned()))
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_file(&self, key: &str, _: &Path, _: &Option<String>) -> Result<()> {
        self.keys.lock().unwrap().push(key.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    pub messages: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl FileQueue for FakeQueue {
    async fn enqueue(&self, message: &FileMessage) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((*message.project_id(), message.file_name().to_owned()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fails: bool,
    pub sent: Mutex<Vec<MailPayload>>,
}

#[async_trait]
impl MailSender for FakeMailer {
    async fn send_mail(&self, payload: MailPayload) -> Result<()> {
        if self.fails {
            return Err(Error::BackendFailure("SMTP relay refused the message".to_owned()));
        }
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }
}

pub struct TestCtx {
    pub ctx: web::Data<ApiRestCtx>,
    pub storage: Arc<FakeStorage>,
    pub queue: Arc<FakeQueue>,
    pub mailer: Arc<FakeMailer>,
}

pub async fn test_ctx(mode: &AppConfigMode, mail_fails: bool) -> TestCtx {
    let db = Db::SqliteDb(SqliteDb::new(":memory:", &1).await.unwrap());
    let identity = FakeIdentity {
        identities: HashMap::from([
            (
                ALICE,
                Identity::new("user_alice", Some("alice@example.com"), "Alice Doe"),
            ),
            (
                BOB,
                Identity::new("user_bob", Some("bob@example.com"), "Bob Roe"),
            ),
            (
                CAROL,
                Identity::new("user_carol", Some("Carol@Example.com"), "Carol Poe"),
            ),
            (DAVE, Identity::new("user_dave", None, "Unknown ")),
            (ERIN, Identity::new("user_erin", None, "Unknown ")),
        ]),
    };
    let storage = Arc::new(FakeStorage::default());
    let queue = Arc::new(FakeQueue::default());
    let mailer = Arc::new(FakeMailer {
        fails: mail_fails,
        ..Default::default()
    });

    let ctx = ApiRestCtx::new(
        mode,
        ApiRestDaoCtx::new(Arc::new(db)),
        ApiRestIdentityCtx::new(Arc::new(identity), &Some(DEV_TOKEN.to_owned())),
        ApiRestStorageCtx::new(storage.clone()),
        ApiRestQueueCtx::new(queue.clone()),
        ApiRestMailerCtx::new(mailer.clone(), "ProjectHub", "https://app.example.com"),
        &Duration::from_secs(5),
    );

    TestCtx {
        ctx: web::Data::new(ctx),
        storage,
        queue,
        mailer,
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(
                    actix_web::middleware::ErrorHandlers::new()
                        .default_handler(crate::error_handler::default_error_handler),
                )
                .app_data($ctx.clone())
                .configure(crate::configure::configure),
        )
        .await
    };
}
pub(crate) use init_app;

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Sends `req` and returns the status with the decoded JSON body, or `Null`
/// when the body is not JSON.
pub async fn send<S, R, B, E>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = E>,
    B: MessageBody,
    E: std::fmt::Debug,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Creates a project owned by the holder of `$token` and evaluates to its id.
macro_rules! create_project {
    ($app:expr, $token:expr, $name:expr) => {{
        let (status, body) = crate::service::testing::send(
            &$app,
            actix_web::test::TestRequest::post()
                .uri("/projects")
                .insert_header(crate::service::testing::bearer($token))
                .set_json(serde_json::json!({ "name": $name }))
                .to_request(),
        )
        .await;
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_owned()
    }};
}
pub(crate) use create_project;
