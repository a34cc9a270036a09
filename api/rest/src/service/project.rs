use actix_web::{http::StatusCode, web, HttpResponse};
use ph_dao::{membership, project::ProjectDao};
use ph_permission::ProjectOperation;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    extractor::{AuthIdentity, Deadline},
    model::{
        project::{
            InsertOneProjectReqJson, PermissionResJson, ProjectReqPath, ProjectResJson,
            TransferOneProjectReqJson, UpdateOneProjectReqJson,
        },
        MessageResJson, Response,
    },
};

pub fn project_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/projects", web::get().to(find_many))
        .route("/projects", web::post().to(insert_one))
        .route("/projects/{project_id}", web::get().to(find_one))
        .route("/projects/{project_id}", web::patch().to(update_one))
        .route("/projects/{project_id}", web::delete().to(delete_one))
        .route(
            "/projects/{project_id}/permissions",
            web::get().to(find_permission),
        )
        .route(
            "/projects/{project_id}/transfer",
            web::post().to(transfer_one),
        );
}

async fn find_many(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
) -> HttpResponse {
    let projects = match deadline
        .run(
            "Project listing",
            ProjectDao::db_select_many_by_member(ctx.dao().db(), auth.user_id()),
        )
        .await
    {
        Ok(data) => data,
        Err(err) => return Response::error(&err),
    };

    Response::data(
        &StatusCode::OK,
        &projects
            .iter()
            .map(ProjectResJson::from_dao)
            .collect::<Vec<_>>(),
    )
}

async fn insert_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    data: web::Json<InsertOneProjectReqJson>,
) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error_raw(&StatusCode::BAD_REQUEST, &err.to_string());
    }

    let mut project = ProjectDao::new(auth.user_id(), data.name());
    project.set_description(data.description());
    project.set_industry(data.industry());
    project.set_use_case(data.use_case());
    project.set_model_type(data.model_type());
    project.set_function(data.function());

    if let Err(err) = deadline
        .run(
            "Project creation",
            project.db_insert(ctx.dao().db(), auth.email()),
        )
        .await
    {
        return Response::error(&err);
    }

    ph_log::info(
        Some("📁"),
        format!(
            "[ApiRestServer] User {} created project {}",
            auth.user_id(),
            project.id()
        ),
    );

    Response::data(&StatusCode::CREATED, &ProjectResJson::from_dao(&project))
}

async fn find_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    let db = ctx.dao().db();

    if let Err(err) = deadline
        .run(
            "Permission check",
            membership::authorize_project_mutation(
                db,
                auth.user_id(),
                path.project_id(),
                &ProjectOperation::View,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    match deadline
        .run("Project lookup", ProjectDao::db_select(db, path.project_id()))
        .await
    {
        Ok(project) => Response::data(&StatusCode::OK, &ProjectResJson::from_dao(&project)),
        Err(err) => Response::error(&err),
    }
}

async fn update_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
    data: web::Json<UpdateOneProjectReqJson>,
) -> HttpResponse {
    if data.is_all_none() {
        return Response::error_raw(&StatusCode::BAD_REQUEST, "No fields to update");
    }

    let db = ctx.dao().db();

    if let Err(err) = deadline
        .run(
            "Permission check",
            membership::authorize_project_mutation(
                db,
                auth.user_id(),
                path.project_id(),
                &ProjectOperation::UpdateDetails,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    let mut project = match deadline
        .run("Project lookup", ProjectDao::db_select(db, path.project_id()))
        .await
    {
        Ok(project) => project,
        Err(err) => return Response::error(&err),
    };

    if data.description().is_some() {
        project.set_description(data.description());
    }
    if data.industry().is_some() {
        project.set_industry(data.industry());
    }
    if data.use_case().is_some() {
        project.set_use_case(data.use_case());
    }
    if data.model_type().is_some() {
        project.set_model_type(data.model_type());
    }
    if data.function().is_some() {
        project.set_function(data.function());
    }

    if let Err(err) = deadline
        .run("Project update", project.db_update(db))
        .await
    {
        return Response::error(&err);
    }

    Response::data(&StatusCode::OK, &ProjectResJson::from_dao(&project))
}

async fn delete_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    let db = ctx.dao().db();

    if let Err(err) = deadline
        .run(
            "Permission check",
            membership::authorize_project_mutation(
                db,
                auth.user_id(),
                path.project_id(),
                &ProjectOperation::Delete,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    if let Err(err) = deadline
        .run("Project deletion", ProjectDao::db_delete(db, path.project_id()))
        .await
    {
        return Response::error(&err);
    }

    ph_log::info(
        Some("🗑️"),
        format!(
            "[ApiRestServer] User {} deleted project {}",
            auth.user_id(),
            path.project_id()
        ),
    );

    Response::data(
        &StatusCode::OK,
        &MessageResJson::new("Project deleted successfully"),
    )
}

async fn find_permission(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
) -> HttpResponse {
    match deadline
        .run(
            "Permission lookup",
            membership::get_permission(ctx.dao().db(), path.project_id(), auth.user_id()),
        )
        .await
    {
        Ok(level) => Response::data(&StatusCode::OK, &PermissionResJson::new(&level)),
        Err(err) => Response::error(&err),
    }
}

async fn transfer_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
    data: web::Json<TransferOneProjectReqJson>,
) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error_raw(&StatusCode::BAD_REQUEST, &err.to_string());
    }

    if let Err(err) = deadline
        .run(
            "Ownership transfer",
            membership::transfer_ownership(
                ctx.dao().db(),
                auth.user_id(),
                path.project_id(),
                data.member_id(),
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    Response::data(
        &StatusCode::OK,
        &MessageResJson::new("Project ownership transferred successfully"),
    )
}
