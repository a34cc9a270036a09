use std::sync::Arc;

use ph_api_rest::{
    context::{
        ApiRestCtx, ApiRestDaoCtx, ApiRestIdentityCtx, ApiRestMailerCtx, ApiRestQueueCtx,
        ApiRestStorageCtx,
    },
    ApiRestServer,
};
use ph_dao::Db;
use ph_db_postgresql::db::PostgresDb;
use ph_db_sqlite::db::SqliteDb;
use ph_identity_clerk::ClerkIdentity;
use ph_mailer::Mailer;
use ph_queue_sqs::SqsQueue;
use ph_storage_s3::S3Storage;
use tokio_util::sync::CancellationToken;

mod config_path;

#[tokio::main]
async fn main() {
    let config_path = config_path::get();
    let config = match ph_config::from_path(&config_path) {
        Ok(config) => config,
        Err(err) => panic!("{err:#}"),
    };

    if let Err(err) = ph_log::init(config.log().display_level(), config.log().level_filter()) {
        panic!("Failed to initialize logger: {err}");
    }

    ph_log::info(Some("🚀"), "[ProjectHub] Starting");

    let db = if let Some(postgres) = config.db().postgres() {
        match PostgresDb::new(&postgres.url(), postgres.max_connections()).await {
            Ok(db) => Arc::new(Db::PostgresqlDb(db)),
            Err(err) => ph_log::panic(
                None,
                format!("[ProjectHub] Connecting to PostgreSQL failed: {err}"),
            ),
        }
    } else if let Some(sqlite) = config.db().sqlite() {
        match SqliteDb::new(sqlite.path(), sqlite.max_connections()).await {
            Ok(db) => Arc::new(Db::SqliteDb(db)),
            Err(err) => ph_log::panic(
                None,
                format!("[ProjectHub] Opening SQLite database failed: {err}"),
            ),
        }
    } else {
        ph_log::panic(None, "[ProjectHub] No database configuration is specified");
    };

    let config_s3 = config.storage().s3();
    let storage = S3Storage::new(
        config_s3.bucket(),
        config_s3.region(),
        config_s3.endpoint_url(),
    )
    .await;

    let config_sqs = config.queue().sqs();
    let queue = SqsQueue::new(
        config_sqs.queue_url(),
        config_sqs.region(),
        config_sqs.endpoint_url(),
    )
    .await;

    let config_mailer = config.mailer();
    let mailer = match Mailer::new(
        config_mailer.smtp_host(),
        config_mailer.smtp_port(),
        config_mailer.smtp_username(),
        config_mailer.smtp_password(),
        config_mailer.sender_name(),
        config_mailer.sender_email(),
    ) {
        Ok(mailer) => mailer,
        Err(err) => ph_log::panic(
            None,
            format!("[ProjectHub] Initializing mailer failed: {err}"),
        ),
    };

    let config_clerk = config.auth().clerk();
    let identity = match ClerkIdentity::new(
        config_clerk.api_url(),
        config_clerk.secret_key(),
        config_clerk.jwt_public_key(),
    ) {
        Ok(identity) => identity,
        Err(err) => ph_log::panic(
            None,
            format!("[ProjectHub] Initializing identity provider failed: {err}"),
        ),
    };

    let api_rest_server = ApiRestServer::new(
        config.api().rest().host(),
        config.api().rest().port(),
        config.api().rest().allowed_origin(),
        ApiRestCtx::new(
            config.app().mode(),
            ApiRestDaoCtx::new(db.clone()),
            ApiRestIdentityCtx::new(Arc::new(identity), config.auth().dev_token()),
            ApiRestStorageCtx::new(Arc::new(storage)),
            ApiRestQueueCtx::new(Arc::new(queue)),
            ApiRestMailerCtx::new(
                Arc::new(mailer),
                config.invite().product_name(),
                config.invite().dashboard_url(),
            ),
            config.api().rest().request_timeout(),
        ),
    );

    let cancel_token = CancellationToken::new();

    match tokio::try_join!(api_rest_server.run(cancel_token.clone())) {
        Ok((Ok(()),)) => ph_log::info(Some("👋"), "[ProjectHub] Turned off"),
        Ok((Err(err),)) => {
            cancel_token.cancel();
            ph_log::warn(
                Some("👋"),
                format!("[ProjectHub] Turned off with error: {err}"),
            );
        }
        Err(err) => {
            ph_log::warn(None, "[ProjectHub] Shutting down all running components");
            cancel_token.cancel();
            ph_log::warn(
                Some("👋"),
                format!("[ProjectHub] Turned off with error: {err}"),
            );
        }
    }

    db.close().await;
}
