use actix_multipart::form::MultipartForm;
use actix_web::{http::StatusCode, web, HttpResponse};
use ph_dao::{
    file::{FileDao, FileStatus},
    membership,
};
use ph_permission::ProjectOperation;
use ph_queue_sqs::FileMessage;

use crate::{
    context::ApiRestCtx,
    extractor::{AuthIdentity, Deadline},
    model::{
        file::{FileReqPath, FileResJson, UploadFilesReqForm},
        project::ProjectReqPath,
        Response,
    },
};

pub fn file_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/projects/{project_id}/files", web::get().to(find_many))
        .route("/projects/{project_id}/files", web::post().to(upload_many))
        .route(
            "/projects/{project_id}/files/{file_name}/process",
            web::post().to(process_one),
        );
}

fn is_valid_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\'])
}

async fn find_many(
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
                &ProjectOperation::ViewFiles,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    match deadline
        .run(
            "File listing",
            FileDao::db_select_many_by_project_id(db, path.project_id()),
        )
        .await
    {
        Ok(files) => Response::data(
            &StatusCode::OK,
            &files.iter().map(FileResJson::from_dao).collect::<Vec<_>>(),
        ),
        Err(err) => Response::error(&err),
    }
}

async fn upload_many(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
    MultipartForm(form): MultipartForm<UploadFilesReqForm>,
) -> HttpResponse {
    if form.files.is_empty() {
        return Response::error_raw(&StatusCode::BAD_REQUEST, "No files were uploaded");
    }

    let mut uploads = Vec::with_capacity(form.files.len());
    for file in &form.files {
        match &file.file_name {
            Some(file_name) if is_valid_file_name(file_name) => uploads.push((file_name, file)),
            Some(file_name) => {
                return Response::error_raw(
                    &StatusCode::BAD_REQUEST,
                    &format!("File name {file_name} is not allowed"),
                )
            }
            None => {
                return Response::error_raw(
                    &StatusCode::BAD_REQUEST,
                    "Every uploaded file must have a file name",
                )
            }
        }
    }

    let db = ctx.dao().db();

    if let Err(err) = deadline
        .run(
            "Permission check",
            membership::authorize_project_mutation(
                db,
                auth.user_id(),
                path.project_id(),
                &ProjectOperation::UploadFiles,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    let mut uploaded = Vec::with_capacity(uploads.len());
    for (file_name, file) in uploads {
        let file_data = FileDao::new(path.project_id(), file_name);
        let content_type = file.content_type.as_ref().map(|mime| mime.to_string());

        if let Err(err) = deadline
            .run(
                "File storage",
                ctx.storage().storage().put_file(
                    &file_data.storage_key(),
                    file.file.path(),
                    &content_type,
                ),
            )
            .await
        {
            return Response::error(&err);
        }

        match deadline.run("File record", file_data.db_upsert(db)).await {
            Ok(file_data) => uploaded.push(FileResJson::from_dao(&file_data)),
            Err(err) => {
                ph_log::error(
                    Some("📦"),
                    format!(
                        "[ApiRestServer] Object {} was stored but its file record was not written",
                        file_data.storage_key()
                    ),
                );
                return Response::error(&err);
            }
        }
    }

    ph_log::info(
        Some("📦"),
        format!(
            "[ApiRestServer] User {} uploaded {} file(s) to project {}",
            auth.user_id(),
            uploaded.len(),
            path.project_id()
        ),
    );

    Response::data(&StatusCode::CREATED, &uploaded)
}

async fn process_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<FileReqPath>,
) -> HttpResponse {
    let db = ctx.dao().db();

    if let Err(err) = deadline
        .run(
            "Permission check",
            membership::authorize_project_mutation(
                db,
                auth.user_id(),
                path.project_id(),
                &ProjectOperation::ProcessFile,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    if let Err(err) = deadline
        .run(
            "File lookup",
            FileDao::db_select(db, path.project_id(), path.file_name()),
        )
        .await
    {
        return Response::error(&err);
    }

    if let Err(err) = deadline
        .run(
            "File queueing",
            ctx.queue()
                .queue()
                .enqueue(&FileMessage::new(path.project_id(), path.file_name())),
        )
        .await
    {
        return Response::error(&err);
    }

    match deadline
        .run(
            "File status update",
            FileDao::db_update_status(db, path.project_id(), path.file_name(), &FileStatus::Queued),
        )
        .await
    {
        Ok(file_data) => Response::data(&StatusCode::OK, &FileResJson::from_dao(&file_data)),
        Err(err) => Response::error(&err),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest};
    use ph_config::app::AppConfigMode;
    use rstest::rstest;
    use serde_json::json;

    use super::is_valid_file_name;
    use crate::service::testing::{bearer, create_project, init_app, send, test_ctx, ALICE, BOB};

    const BOUNDARY: &str = "projecthub-boundary";

    fn multipart(token: &str, project_id: &str, files: &[(&str, &str)]) -> TestRequest {
        let mut body = String::new();
        for (file_name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        TestRequest::post()
            .uri(&format!("/projects/{project_id}/files"))
            .insert_header(bearer(token))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[rstest]
    #[case("report.csv", true)]
    #[case("quarterly report (v2).xlsx", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("nested/report.csv", false)]
    #[case("..\\report.csv", false)]
    fn validates_file_names(#[case] file_name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_file_name(file_name), valid);
    }

    #[actix_web::test]
    async fn uploads_then_queues_file() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, body) = send(
            &app,
            multipart(
                ALICE,
                &project_id,
                &[("customers.csv", "id,churned\n1,0"), ("usage.csv", "id,minutes\n1,30")],
            )
            .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["file_name"], "customers.csv");
        assert_eq!(body[0]["status"], "uploaded");
        assert_eq!(
            *env.storage.keys.lock().unwrap(),
            vec![
                format!("{project_id}/customers.csv"),
                format!("{project_id}/usage.csv")
            ]
        );

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/files/customers.csv/process"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "queued");
        let messages = env.queue.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0.to_string(), project_id);
        assert_eq!(messages[0].1, "customers.csv");

        let (status, _) = send(
            &app,
            multipart(ALICE, &project_id, &[("customers.csv", "id\n2")]).to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/files"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let files = body.as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files
            .iter()
            .all(|file| file["status"] == json!("uploaded")));
    }

    #[actix_web::test]
    async fn processing_missing_file_is_not_found() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/files/missing.csv/process"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
        assert!(env.queue.messages.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn viewer_can_list_but_not_upload() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "bob@example.com", "permission": 2 }))
                .to_request(),
        )
        .await;

        let (status, _) = send(
            &app,
            multipart(BOB, &project_id, &[("customers.csv", "id\n1")]).to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(env.storage.keys.lock().unwrap().is_empty());

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/files"))
                .insert_header(bearer(BOB))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn upload_without_files_is_bad_input() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, body) = send(&app, multipart(ALICE, &project_id, &[]).to_request()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
