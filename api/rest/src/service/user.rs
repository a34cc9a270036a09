use actix_web::{http::StatusCode, web, HttpResponse};
use ph_dao::{membership, user::UserDao};

use crate::{
    context::ApiRestCtx,
    extractor::{AuthIdentity, Deadline},
    model::{user::UserResJson, Response},
};

pub fn user_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(insert_one));
}

async fn insert_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
) -> HttpResponse {
    let db = ctx.dao().db();

    match deadline
        .run("User lookup", UserDao::db_exists(db, auth.user_id()))
        .await
    {
        Ok(true) => return Response::error_raw(&StatusCode::CONFLICT, "User already exists"),
        Ok(false) => (),
        Err(err) => return Response::error(&err),
    }

    let user = UserDao::new(auth.user_id(), auth.email().as_deref(), auth.name());
    if let Err(err) = deadline.run("User registration", user.db_insert(db)).await {
        return Response::error(&err);
    }

    if let Some(email) = user.email() {
        if let Err(err) = deadline
            .run(
                "Invitation claim",
                membership::claim_invitations(db, user.id(), email),
            )
            .await
        {
            return Response::error(&err);
        }
    }

    ph_log::info(
        Some("👤"),
        format!("[ApiRestServer] Registered user {}", user.id()),
    );

    Response::data(&StatusCode::CREATED, &UserResJson::from_dao(&user))
}
