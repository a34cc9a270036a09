use actix_web::{http::StatusCode, web, HttpResponse};
use ph_dao::{member::MemberDao, membership};
use ph_error::Error;
use ph_mailer::template;
use ph_permission::ProjectOperation;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    extractor::{AuthIdentity, Deadline},
    model::{
        member::{InviteMemberReqJson, MemberReqPath, MemberResJson, UpdateMemberPermissionReqJson},
        project::ProjectReqPath,
        MessageResJson, Response,
    },
};

pub fn member_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/projects/{project_id}/invite", web::post().to(invite_one))
        .route("/projects/{project_id}/members", web::get().to(find_many))
        .route(
            "/projects/{project_id}/members/{member_id}",
            web::delete().to(delete_one),
        )
        .route(
            "/projects/{project_id}/members/{member_id}/permission",
            web::patch().to(update_permission),
        );
}

async fn invite_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<ProjectReqPath>,
    data: web::Json<InviteMemberReqJson>,
) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error_raw(&StatusCode::BAD_REQUEST, &err.to_string());
    }

    let (project, member) = match deadline
        .run(
            "Invitation",
            membership::invite_member(
                ctx.dao().db(),
                auth.user_id(),
                path.project_id(),
                data.email(),
                data.permission(),
            ),
        )
        .await
    {
        Ok(data) => data,
        Err(err) => return Response::error(&err),
    };

    let recipient = member
        .email()
        .clone()
        .unwrap_or_else(|| data.email().to_lowercase());
    let mailer = ctx.mailer();
    let payload = template::project_invite(
        &recipient,
        mailer.product_name(),
        project.name(),
        mailer.dashboard_url(),
    );

    if let Err(err) = deadline
        .run("Invitation email", mailer.sender().send_mail(payload))
        .await
    {
        ph_log::warn(
            Some("📨"),
            format!(
                "[ApiRestServer] Membership of {recipient} in project {} is kept although the invitation email failed",
                project.id()
            ),
        );
        return Response::error(&Error::BackendFailure(format!(
            "User invited but failed to send email: {}",
            err.message()
        )));
    }

    ph_log::info(
        Some("📨"),
        format!(
            "[ApiRestServer] {recipient} invited to project {} as {}",
            project.id(),
            member.permission()
        ),
    );

    Response::data(
        &StatusCode::OK,
        &MessageResJson::new("User invited and email sent successfully!"),
    )
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
                &ProjectOperation::ViewMembers,
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    match deadline
        .run(
            "Member listing",
            MemberDao::db_select_many_by_project_id(db, path.project_id()),
        )
        .await
    {
        Ok(members) => Response::data(
            &StatusCode::OK,
            &members
                .iter()
                .map(MemberResJson::from_dao)
                .collect::<Vec<_>>(),
        ),
        Err(err) => Response::error(&err),
    }
}

async fn delete_one(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<MemberReqPath>,
) -> HttpResponse {
    if let Err(err) = deadline
        .run(
            "Member removal",
            membership::remove_member(
                ctx.dao().db(),
                auth.user_id(),
                path.project_id(),
                path.member_id(),
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    Response::data(
        &StatusCode::OK,
        &MessageResJson::new("Member removed successfully"),
    )
}

async fn update_permission(
    ctx: web::Data<ApiRestCtx>,
    auth: AuthIdentity,
    deadline: Deadline,
    path: web::Path<MemberReqPath>,
    data: web::Json<UpdateMemberPermissionReqJson>,
) -> HttpResponse {
    if let Err(err) = deadline
        .run(
            "Permission change",
            membership::change_member_permission(
                ctx.dao().db(),
                auth.user_id(),
                path.project_id(),
                path.member_id(),
                data.permission(),
            ),
        )
        .await
    {
        return Response::error(&err);
    }

    Response::data(
        &StatusCode::OK,
        &MessageResJson::new("Permission updated successfully"),
    )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest};
    use ph_config::app::AppConfigMode;
    use serde_json::json;

    use crate::service::testing::{
        bearer, create_project, init_app, send, test_ctx, ALICE, BOB, CAROL, DEV_TOKEN,
    };

    #[actix_web::test]
    async fn viewer_cannot_list_members_but_owner_can() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "bob@example.com", "permission": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User invited and email sent successfully!");

        let sent = env.mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to(), "bob@example.com");
        assert!(sent[0].subject().contains("Churn model"));
        assert!(sent[0].body().contains("https://app.example.com"));

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(BOB))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let members = body.as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0]["user_id"], "user_alice");
        assert_eq!(members[0]["permission"], 0);
        assert_eq!(members[1]["user_id"], "user_bob");
        assert_eq!(members[1]["permission"], 2);
    }

    #[actix_web::test]
    async fn viewer_cannot_change_owner_permission() {
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
            TestRequest::patch()
                .uri(&format!("/projects/{project_id}/members/user_alice/permission"))
                .insert_header(bearer(BOB))
                .set_json(json!({ "permission": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/permissions"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(body["permission"], 0);
    }

    #[actix_web::test]
    async fn permission_changes_follow_escalation_rules() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        for (email, permission) in [("bob@example.com", 1), ("carol@example.com", 2)] {
            let (status, _) = send(
                &app,
                TestRequest::post()
                    .uri(&format!("/projects/{project_id}/invite"))
                    .insert_header(bearer(ALICE))
                    .set_json(json!({ "email": email, "permission": permission }))
                    .to_request(),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        send(
            &app,
            TestRequest::get()
                .uri("/me")
                .insert_header(bearer(CAROL))
                .to_request(),
        )
        .await;

        let patch = |token: &str, member: &str, permission: i32| {
            TestRequest::patch()
                .uri(&format!("/projects/{project_id}/members/{member}/permission"))
                .insert_header(bearer(token))
                .set_json(json!({ "permission": permission }))
                .to_request()
        };

        let (status, _) = send(&app, patch(BOB, "user_bob", 0)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(&app, patch(BOB, "user_alice", 2)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Editors cannot change the project owner");
        let (status, _) = send(&app, patch(BOB, "user_carol", 0)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, patch(BOB, "user_carol", 1)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, patch(BOB, "user_carol", 2)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(&app, patch(ALICE, "user_nobody", 2)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Member not found in this project");
        let (status, _) = send(&app, patch(ALICE, "user_carol", 5)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, patch(ALICE, "user_bob", 0)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(BOB))
                .to_request(),
        )
        .await;
        let owners = body
            .as_array()
            .unwrap()
            .iter()
            .filter(|member| member["permission"] == 0)
            .count();
        assert_eq!(owners, 1);
        assert_eq!(body[0]["user_id"], "user_bob");
    }

    #[actix_web::test]
    async fn rejects_invalid_and_duplicate_invitations() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let invite = |email: &str, permission: i32| {
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": email, "permission": permission }))
                .to_request()
        };

        let (status, _) = send(&app, invite("not-an-email", 1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, invite("bob@example.com", 0)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, invite("alice@example.com", 1)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(&app, invite("bob@example.com", 1)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, invite("Bob@Example.com", 2)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn failed_invitation_email_keeps_membership() {
        let env = test_ctx(&AppConfigMode::Production, true).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "carol@example.com", "permission": 1 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("failed to send email"));

        let (_, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        let members = body.as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members[1]["user_id"].is_null());
        assert_eq!(members[1]["email"], "carol@example.com");

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/permissions"))
                .insert_header(bearer(CAROL))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["permission"], 1);
    }

    #[actix_web::test]
    async fn invited_email_resolves_after_registration() {
        let env = test_ctx(&AppConfigMode::Development, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "test@example.com", "permission": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri("/users")
                .insert_header(bearer(DEV_TOKEN))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(ALICE))
                .to_request(),
        )
        .await;
        assert_eq!(body[1]["user_id"], "user_2jRfvOhhMBfHM5C85C1q3Ze1Ron");
        assert_eq!(body[1]["name"], "Test User");

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/permissions"))
                .insert_header(bearer(DEV_TOKEN))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["permission"], 2);
    }

    #[actix_web::test]
    async fn only_owner_removes_members() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "bob@example.com", "permission": 1 }))
                .to_request(),
        )
        .await;

        let remove = |token: &str, member: &str| {
            TestRequest::delete()
                .uri(&format!("/projects/{project_id}/members/{member}"))
                .insert_header(bearer(token))
                .to_request()
        };

        let (status, _) = send(&app, remove(BOB, "user_alice")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, remove(ALICE, "user_alice")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, remove(ALICE, "user_bob")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, remove(ALICE, "user_bob")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            TestRequest::get()
                .uri(&format!("/projects/{project_id}"))
                .insert_header(bearer(BOB))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn pending_invitation_is_managed_by_email() {
        let env = test_ctx(&AppConfigMode::Production, false).await;
        let app = init_app!(env.ctx);
        let project_id = create_project!(app, ALICE, "Churn model");

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/projects/{project_id}/invite"))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "email": "later@example.com", "permission": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            TestRequest::patch()
                .uri(&format!(
                    "/projects/{project_id}/members/later@example.com/permission"
                ))
                .insert_header(bearer(ALICE))
                .set_json(json!({ "permission": 1 }))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let list = || {
            TestRequest::get()
                .uri(&format!("/projects/{project_id}/members"))
                .insert_header(bearer(ALICE))
                .to_request()
        };
        let (_, body) = send(&app, list()).await;
        let pending = body
            .as_array()
            .unwrap()
            .iter()
            .find(|member| member["email"] == "later@example.com")
            .unwrap();
        assert!(pending["user_id"].is_null());
        assert_eq!(pending["permission"], 1);

        let remove = || {
            TestRequest::delete()
                .uri(&format!("/projects/{project_id}/members/later@example.com"))
                .insert_header(bearer(ALICE))
                .to_request()
        };
        let (status, _) = send(&app, remove()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, remove()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, list()).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
