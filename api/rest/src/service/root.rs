use actix_web::{http::StatusCode, web, HttpResponse};

use crate::{
    extractor::AuthIdentity,
    model::{
        user::{HealthResJson, MeResJson},
        Response,
    },
};

pub fn root_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health))
        .route("/me", web::get().to(find_me));
}

async fn health() -> HttpResponse {
    Response::data(&StatusCode::OK, &HealthResJson::ok())
}

async fn find_me(auth: AuthIdentity) -> HttpResponse {
    Response::data(&StatusCode::OK, &MeResJson::from_identity(&auth))
}
