//! Project membership authority.
//!
//! Resolves levels from the store, asks [`ph_permission::authorize`] for a
//! decision and applies the membership writes that follow from it. Every
//! handler that touches a project goes through here first.

use ph_error::{Error, Result};
use ph_permission::{authorize, Denial, PermissionLevel, ProjectOperation};
use uuid::Uuid;

use crate::{project::ProjectDao, project_user::ProjectUserDao, user::UserDao, Db};

fn denied(denial: Denial) -> Error {
    if denial.is_missing_target() {
        Error::NotFound(denial.to_string())
    } else {
        Error::Forbidden(denial.to_string())
    }
}

/// Level `user_id` holds in the project. A missing membership is an
/// authorization failure, never a default level.
pub async fn get_permission(db: &Db, project_id: &Uuid, user_id: &str) -> Result<PermissionLevel> {
    ProjectUserDao::db_select_permission(db, project_id, user_id)
        .await?
        .ok_or_else(|| denied(Denial::NotMember))
}

/// Checks that `actor` may perform `operation` on the project and returns the
/// actor's level.
pub async fn authorize_project_mutation(
    db: &Db,
    actor: &str,
    project_id: &Uuid,
    operation: &ProjectOperation<'_>,
) -> Result<PermissionLevel> {
    let actor_level = ProjectUserDao::db_select_permission(db, project_id, actor).await?;
    authorize(actor, actor_level, operation)
        .into_result()
        .map_err(denied)?;
    actor_level.ok_or_else(|| denied(Denial::NotMember))
}

async fn resolve_levels(
    db: &Db,
    project_id: &Uuid,
    actor: &str,
    target: &str,
) -> Result<(Option<PermissionLevel>, Option<PermissionLevel>)> {
    tokio::try_join!(
        ProjectUserDao::db_select_permission(db, project_id, actor),
        ProjectUserDao::db_select_permission(db, project_id, target),
    )
}

/// Member ids are user ids, except for pending invitations which are addressed
/// by the invited email.
fn is_invitation(target: &str) -> bool {
    target.contains('@')
}

/// Sets `target` to `new_level`. Making someone owner hands the project over:
/// the acting owner becomes an editor in the same transaction.
pub async fn change_member_permission(
    db: &Db,
    actor: &str,
    project_id: &Uuid,
    target: &str,
    new_level: &PermissionLevel,
) -> Result<()> {
    if is_invitation(target) {
        return change_invitation_permission(db, actor, project_id, target, new_level).await;
    }

    let (actor_level, target_level) = resolve_levels(db, project_id, actor, target).await?;
    authorize(
        actor,
        actor_level,
        &ProjectOperation::ChangeMemberPermission {
            target,
            target_level,
            new_level: *new_level,
        },
    )
    .into_result()
    .map_err(denied)?;

    let target_level = target_level.ok_or_else(|| denied(Denial::TargetNotMember))?;
    if *new_level == PermissionLevel::Owner {
        ph_log::info(
            Some("👑"),
            format!("[Membership] Ownership of project {project_id} moves from {actor} to {target}"),
        );
        return ProjectUserDao::db_transfer_ownership(db, project_id, actor, target, &target_level)
            .await;
    }

    ProjectUserDao::db_update_permission(db, project_id, target, &target_level, new_level).await
}

async fn change_invitation_permission(
    db: &Db,
    actor: &str,
    project_id: &Uuid,
    email: &str,
    new_level: &PermissionLevel,
) -> Result<()> {
    let (actor_level, invitation) = tokio::try_join!(
        ProjectUserDao::db_select_permission(db, project_id, actor),
        ProjectUserDao::db_select_by_email(db, project_id, email),
    )?;
    let target_level = invitation
        .filter(ProjectUserDao::is_pending)
        .map(|invitation| *invitation.permission());
    authorize(
        actor,
        actor_level,
        &ProjectOperation::ChangeMemberPermission {
            target: email,
            target_level,
            new_level: *new_level,
        },
    )
    .into_result()
    .map_err(denied)?;

    let target_level = target_level.ok_or_else(|| denied(Denial::TargetNotMember))?;
    if *new_level == PermissionLevel::Owner {
        return Err(denied(Denial::InviteAsOwner));
    }

    ProjectUserDao::db_update_pending_permission(db, project_id, email, &target_level, new_level)
        .await
}

pub async fn transfer_ownership(
    db: &Db,
    actor: &str,
    project_id: &Uuid,
    target: &str,
) -> Result<()> {
    let (actor_level, target_level) = resolve_levels(db, project_id, actor, target).await?;
    authorize(
        actor,
        actor_level,
        &ProjectOperation::TransferOwnership {
            target,
            target_level,
        },
    )
    .into_result()
    .map_err(denied)?;

    let target_level = target_level.ok_or_else(|| denied(Denial::TargetNotMember))?;
    ph_log::info(
        Some("👑"),
        format!("[Membership] Ownership of project {project_id} moves from {actor} to {target}"),
    );
    ProjectUserDao::db_transfer_ownership(db, project_id, actor, target, &target_level).await
}

pub async fn remove_member(db: &Db, actor: &str, project_id: &Uuid, target: &str) -> Result<()> {
    authorize_project_mutation(db, actor, project_id, &ProjectOperation::RemoveMember { target })
        .await?;
    if is_invitation(target) {
        ProjectUserDao::db_delete_pending(db, project_id, target).await
    } else {
        ProjectUserDao::db_delete(db, project_id, target).await
    }
}

/// Adds `email` to the project at `level`, bound to the matching user when one
/// exists and as a pending invitation otherwise. Returns the project and the
/// new membership so the caller can notify the invitee.
pub async fn invite_member(
    db: &Db,
    actor: &str,
    project_id: &Uuid,
    email: &str,
    level: &PermissionLevel,
) -> Result<(ProjectDao, ProjectUserDao)> {
    authorize_project_mutation(
        db,
        actor,
        project_id,
        &ProjectOperation::InviteMember { level: *level },
    )
    .await?;

    let email = email.to_lowercase();
    let (by_email, user) = tokio::try_join!(
        ProjectUserDao::db_select_by_email(db, project_id, &email),
        UserDao::db_select_by_email(db, &email),
    )?;
    if by_email.is_some() {
        return Err(Error::Conflict(format!(
            "{email} is already a member of this project"
        )));
    }
    if let Some(user) = &user {
        if ProjectUserDao::db_select_by_user_id(db, project_id, user.id())
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "{email} is already a member of this project"
            )));
        }
    }

    let membership = ProjectUserDao::new(
        project_id,
        &user.map(|user| user.id().to_owned()),
        &Some(email),
        level,
    );
    membership.db_insert(db).await?;

    let project = ProjectDao::db_select(db, project_id).await?;
    Ok((project, membership))
}

/// Binds pending invitations addressed to `email` to the user. Called whenever
/// an identity is seen with a verified email.
pub async fn claim_invitations(db: &Db, user_id: &str, email: &str) -> Result<u64> {
    let claimed = ProjectUserDao::db_reconcile_by_email(db, user_id, email).await?;
    if claimed > 0 {
        ph_log::info(
            Some("📨"),
            format!("[Membership] User {user_id} claimed {claimed} pending invitation(s)"),
        );
    }
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use ph_error::ErrorKind;

    use super::*;
    use crate::{member::MemberDao, testing};

    async fn add_member(db: &Db, project_id: &Uuid, user: &UserDao, level: PermissionLevel) {
        ProjectUserDao::new(
            project_id,
            &Some(user.id().to_owned()),
            user.email(),
            &level,
        )
        .db_insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn viewer_cannot_list_members() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let viewer = testing::user(&db, "user_2", "viewer@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &viewer, PermissionLevel::Viewer).await;

        let err = authorize_project_mutation(
            &db,
            viewer.id(),
            project.id(),
            &ProjectOperation::ViewMembers,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let level =
            authorize_project_mutation(&db, owner.id(), project.id(), &ProjectOperation::ViewMembers)
                .await
                .unwrap();
        assert_eq!(level, PermissionLevel::Owner);
    }

    #[tokio::test]
    async fn non_member_has_no_permission() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let project = testing::project(&db, &owner).await;

        let err = get_permission(&db, project.id(), "user_9").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn editor_promotes_viewer_but_not_editor() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let editor = testing::user(&db, "user_2", "editor@example.com").await;
        let other_editor = testing::user(&db, "user_3", "editor2@example.com").await;
        let viewer = testing::user(&db, "user_4", "viewer@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &editor, PermissionLevel::Editor).await;
        add_member(&db, project.id(), &other_editor, PermissionLevel::Editor).await;
        add_member(&db, project.id(), &viewer, PermissionLevel::Viewer).await;

        change_member_permission(
            &db,
            editor.id(),
            project.id(),
            viewer.id(),
            &PermissionLevel::Editor,
        )
        .await
        .unwrap();
        assert_eq!(
            get_permission(&db, project.id(), viewer.id()).await.unwrap(),
            PermissionLevel::Editor
        );

        let err = change_member_permission(
            &db,
            editor.id(),
            project.id(),
            other_editor.id(),
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = change_member_permission(
            &db,
            editor.id(),
            project.id(),
            owner.id(),
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            get_permission(&db, project.id(), owner.id()).await.unwrap(),
            PermissionLevel::Owner
        );
    }

    #[tokio::test]
    async fn viewer_cannot_change_owner() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let viewer = testing::user(&db, "user_2", "viewer@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &viewer, PermissionLevel::Viewer).await;

        let err = change_member_permission(
            &db,
            viewer.id(),
            project.id(),
            owner.id(),
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn self_change_is_denied() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let project = testing::project(&db, &owner).await;

        let err = change_member_permission(
            &db,
            owner.id(),
            project.id(),
            owner.id(),
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn changing_unknown_member_is_not_found() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let project = testing::project(&db, &owner).await;

        let err = change_member_permission(
            &db,
            owner.id(),
            project.id(),
            "user_9",
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn promotion_to_owner_keeps_a_single_owner() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let editor = testing::user(&db, "user_2", "editor@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &editor, PermissionLevel::Editor).await;

        change_member_permission(
            &db,
            owner.id(),
            project.id(),
            editor.id(),
            &PermissionLevel::Owner,
        )
        .await
        .unwrap();

        let members = MemberDao::db_select_many_by_project_id(&db, project.id())
            .await
            .unwrap();
        let owners: Vec<_> = members
            .iter()
            .filter(|member| member.permission() == &PermissionLevel::Owner)
            .collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].user_id().as_deref(), Some(editor.id()));
        assert_eq!(
            get_permission(&db, project.id(), owner.id()).await.unwrap(),
            PermissionLevel::Editor
        );
        assert_eq!(
            ProjectDao::db_select(&db, project.id())
                .await
                .unwrap()
                .user_id(),
            editor.id()
        );
    }

    #[tokio::test]
    async fn transfer_requires_a_registered_member() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let project = testing::project(&db, &owner).await;
        invite_member(
            &db,
            owner.id(),
            project.id(),
            "pending@example.com",
            &PermissionLevel::Editor,
        )
        .await
        .unwrap();

        let err = transfer_ownership(&db, owner.id(), project.id(), "user_9")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn invite_unknown_email_is_claimed_on_registration() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let project = testing::project(&db, &owner).await;

        let (invited_to, membership) = invite_member(
            &db,
            owner.id(),
            project.id(),
            "Newcomer@Example.com",
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap();
        assert_eq!(invited_to.name(), "Churn model");
        assert!(membership.is_pending());
        assert_eq!(membership.email().as_deref(), Some("newcomer@example.com"));

        let newcomer = testing::user(&db, "user_2", "newcomer@example.com").await;
        assert_eq!(
            claim_invitations(&db, newcomer.id(), "newcomer@example.com")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            get_permission(&db, project.id(), newcomer.id())
                .await
                .unwrap(),
            PermissionLevel::Viewer
        );
    }

    #[tokio::test]
    async fn invite_known_user_binds_immediately() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let known = testing::user(&db, "user_2", "known@example.com").await;
        let project = testing::project(&db, &owner).await;

        let (_, membership) = invite_member(
            &db,
            owner.id(),
            project.id(),
            "known@example.com",
            &PermissionLevel::Editor,
        )
        .await
        .unwrap();
        assert_eq!(membership.user_id().as_deref(), Some(known.id()));

        let err = invite_member(
            &db,
            owner.id(),
            project.id(),
            "known@example.com",
            &PermissionLevel::Viewer,
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn viewer_cannot_invite_and_nobody_invites_owners() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let viewer = testing::user(&db, "user_2", "viewer@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &viewer, PermissionLevel::Viewer).await;

        let err = invite_member(
            &db,
            viewer.id(),
            project.id(),
            "x@example.com",
            &PermissionLevel::Viewer,
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = invite_member(
            &db,
            owner.id(),
            project.id(),
            "x@example.com",
            &PermissionLevel::Owner,
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn owner_removes_others_but_not_self() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let editor = testing::user(&db, "user_2", "editor@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &editor, PermissionLevel::Editor).await;

        let err = remove_member(&db, editor.id(), project.id(), owner.id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = remove_member(&db, owner.id(), project.id(), owner.id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        remove_member(&db, owner.id(), project.id(), editor.id())
            .await
            .unwrap();
        assert_eq!(
            get_permission(&db, project.id(), editor.id())
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Forbidden
        );
    }

    #[tokio::test]
    async fn pending_invitation_is_addressed_by_email() {
        let db = testing::sqlite_db().await;
        let owner = testing::user(&db, "user_1", "owner@example.com").await;
        let editor = testing::user(&db, "user_2", "editor@example.com").await;
        let project = testing::project(&db, &owner).await;
        add_member(&db, project.id(), &editor, PermissionLevel::Editor).await;
        invite_member(
            &db,
            owner.id(),
            project.id(),
            "pending@example.com",
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap();

        change_member_permission(
            &db,
            editor.id(),
            project.id(),
            "Pending@Example.com",
            &PermissionLevel::Editor,
        )
        .await
        .unwrap();
        let invitation = ProjectUserDao::db_select_by_email(&db, project.id(), "pending@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*invitation.permission(), PermissionLevel::Editor);

        let err = change_member_permission(
            &db,
            editor.id(),
            project.id(),
            "pending@example.com",
            &PermissionLevel::Viewer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = change_member_permission(
            &db,
            owner.id(),
            project.id(),
            "pending@example.com",
            &PermissionLevel::Owner,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = remove_member(&db, owner.id(), project.id(), "editor@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        remove_member(&db, owner.id(), project.id(), "pending@example.com")
            .await
            .unwrap();
        assert!(
            ProjectUserDao::db_select_by_email(&db, project.id(), "pending@example.com")
                .await
                .unwrap()
                .is_none()
        );
        let err = remove_member(&db, owner.id(), project.id(), "pending@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
