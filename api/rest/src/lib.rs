use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{ErrorHandlers, Logger},
    web, App, HttpServer,
};
use anyhow::Result;
use configure::configure;
use context::ApiRestCtx;
use error_handler::default_error_handler;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod configure;
pub mod context;
mod error_handler;
mod extractor;
mod model;
mod service;

const LOGGER_FORMAT: &str = "%a \"%r\" %s %b %Dms";

pub struct ApiRestServer {
    address: String,
    allowed_origin: Option<String>,
    context: web::Data<ApiRestCtx>,
}

impl ApiRestServer {
    pub fn new(host: &str, port: &u16, allowed_origin: &Option<String>, ctx: ApiRestCtx) -> Self {
        ph_log::info(Some("⚡"), "[ApiRestServer] Initializing component");

        Self {
            address: format!("{host}:{port}"),
            allowed_origin: allowed_origin.clone(),
            context: web::Data::new(ctx),
        }
    }

    pub fn run(self, cancel_token: CancellationToken) -> JoinHandle<Result<()>> {
        ph_log::info(Some("💫"), "[ApiRestServer] Running component");

        tokio::spawn(async move {
            let context = self.context;
            let allowed_origin = self.allowed_origin;

            let server = HttpServer::new(move || {
                App::new()
                    .wrap(ErrorHandlers::new().default_handler(default_error_handler))
                    .wrap(cors(&allowed_origin))
                    .wrap(Logger::new(LOGGER_FORMAT))
                    .app_data(context.clone())
                    .configure(configure)
            })
            .disable_signals()
            .bind(&self.address)?
            .run();
            let handle = server.handle();

            ph_log::info(
                Some("🌐"),
                format!("[ApiRestServer] Listening on {}", self.address),
            );

            tokio::select! {
                res = server => res?,
                _ = cancel_token.cancelled() => handle.stop(true).await,
                _ = tokio::signal::ctrl_c() => {
                    ph_log::info(Some("⛔"), "[ApiRestServer] Received shutdown signal");
                    handle.stop(true).await;
                    cancel_token.cancel();
                }
            }

            ph_log::info(None, "[ApiRestServer] Stopped");
            Ok(())
        })
    }
}

fn cors(allowed_origin: &Option<String>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600);

    match allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors,
    }
}
