use std::fmt;

use crate::level::{Capability, PermissionLevel};

/// An operation on a project, carrying whatever the decision depends on besides
/// the actor's own level. Target levels are `None` when the target has no
/// membership in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOperation<'a> {
    View,
    UpdateDetails,
    Delete,
    InviteMember {
        level: PermissionLevel,
    },
    ViewMembers,
    ChangeMemberPermission {
        target: &'a str,
        target_level: Option<PermissionLevel>,
        new_level: PermissionLevel,
    },
    RemoveMember {
        target: &'a str,
    },
    TransferOwnership {
        target: &'a str,
        target_level: Option<PermissionLevel>,
    },
    ViewFiles,
    UploadFiles,
    ProcessFile,
}

impl ProjectOperation<'_> {
    pub fn capability(&self) -> Capability {
        match self {
            Self::View => Capability::ViewProject,
            Self::UpdateDetails => Capability::UpdateProject,
            Self::Delete => Capability::DeleteProject,
            Self::InviteMember { .. } => Capability::InviteMember,
            Self::ViewMembers => Capability::ViewMembers,
            Self::ChangeMemberPermission { .. } => Capability::ChangeMemberPermission,
            Self::RemoveMember { .. } => Capability::RemoveMember,
            Self::TransferOwnership { .. } => Capability::TransferOwnership,
            Self::ViewFiles => Capability::ViewFiles,
            Self::UploadFiles => Capability::UploadFiles,
            Self::ProcessFile => Capability::ProcessFiles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The actor has no membership in the project.
    NotMember,
    /// The actor's level lacks the capability the operation needs.
    MissingCapability(Capability),
    SelfModification,
    /// The targeted user has no membership in the project.
    TargetNotMember,
    EditorTargetsEditor,
    EditorTargetsOwner,
    EditorGrantsOwner,
    /// New owners are only made through an ownership transfer.
    InviteAsOwner,
    SelfRemoval,
}

impl Denial {
    /// True when the denial is caused by a missing target rather than by the
    /// actor's authority.
    pub fn is_missing_target(&self) -> bool {
        matches!(self, Self::TargetNotMember)
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMember => write!(f, "You do not have access to this project"),
            Self::MissingCapability(Capability::DeleteProject) => {
                write!(f, "Only the project owner can delete this project")
            }
            Self::MissingCapability(Capability::RemoveMember) => {
                write!(f, "Only project owners can delete members")
            }
            Self::MissingCapability(Capability::TransferOwnership) => {
                write!(f, "Only the project owner can transfer ownership")
            }
            Self::MissingCapability(capability) => {
                write!(f, "Your permission level does not allow {capability}")
            }
            Self::SelfModification => write!(f, "You cannot change your own permission"),
            Self::TargetNotMember => write!(f, "Member not found in this project"),
            Self::EditorTargetsEditor => write!(f, "Editors cannot change other editors"),
            Self::EditorTargetsOwner => write!(f, "Editors cannot change the project owner"),
            Self::EditorGrantsOwner => write!(f, "Editors cannot make someone an owner"),
            Self::InviteAsOwner => write!(
                f,
                "Members cannot be invited as owner, transfer ownership instead"
            ),
            Self::SelfRemoval => write!(f, "Owners cannot remove themselves from the project"),
        }
    }
}

/// Decides whether `actor`, holding `actor_level` in a project, may perform
/// `operation` there.
pub fn authorize(
    actor: &str,
    actor_level: Option<PermissionLevel>,
    operation: &ProjectOperation<'_>,
) -> Decision {
    match *operation {
        ProjectOperation::ChangeMemberPermission {
            target,
            target_level,
            new_level,
        } => change_member_permission(actor, actor_level, target, target_level, new_level),
        ProjectOperation::RemoveMember { target } => {
            if let Err(denial) = require(actor_level, Capability::RemoveMember) {
                return Decision::Deny(denial);
            }
            if actor == target {
                return Decision::Deny(Denial::SelfRemoval);
            }
            Decision::Allow
        }
        ProjectOperation::TransferOwnership {
            target,
            target_level,
        } => {
            if actor == target {
                return Decision::Deny(Denial::SelfModification);
            }
            if let Err(denial) = require(actor_level, Capability::TransferOwnership) {
                return Decision::Deny(denial);
            }
            if target_level.is_none() {
                return Decision::Deny(Denial::TargetNotMember);
            }
            Decision::Allow
        }
        ProjectOperation::InviteMember { level } => {
            if let Err(denial) = require(actor_level, Capability::InviteMember) {
                return Decision::Deny(denial);
            }
            if level == PermissionLevel::Owner {
                return Decision::Deny(Denial::InviteAsOwner);
            }
            Decision::Allow
        }
        _ => match require(actor_level, operation.capability()) {
            Ok(()) => Decision::Allow,
            Err(denial) => Decision::Deny(denial),
        },
    }
}

fn change_member_permission(
    actor: &str,
    actor_level: Option<PermissionLevel>,
    target: &str,
    target_level: Option<PermissionLevel>,
    new_level: PermissionLevel,
) -> Decision {
    if actor == target {
        return Decision::Deny(Denial::SelfModification);
    }
    let Some(actor_level) = actor_level else {
        return Decision::Deny(Denial::NotMember);
    };
    let Some(target_level) = target_level else {
        return Decision::Deny(Denial::TargetNotMember);
    };

    match actor_level {
        PermissionLevel::Owner => Decision::Allow,
        PermissionLevel::Editor => match (target_level, new_level) {
            (PermissionLevel::Editor, _) => Decision::Deny(Denial::EditorTargetsEditor),
            (PermissionLevel::Owner, _) => Decision::Deny(Denial::EditorTargetsOwner),
            (_, PermissionLevel::Owner) => Decision::Deny(Denial::EditorGrantsOwner),
            (PermissionLevel::Viewer, _) => Decision::Allow,
        },
        PermissionLevel::Viewer => Decision::Deny(Denial::MissingCapability(
            Capability::ChangeMemberPermission,
        )),
    }
}

fn require(level: Option<PermissionLevel>, capability: Capability) -> Result<(), Denial> {
    match level {
        None => Err(Denial::NotMember),
        Some(level) if level.can(capability) => Ok(()),
        Some(_) => Err(Denial::MissingCapability(capability)),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const ACTOR: &str = "user_actor";
    const TARGET: &str = "user_target";

    const OWNER: Option<PermissionLevel> = Some(PermissionLevel::Owner);
    const EDITOR: Option<PermissionLevel> = Some(PermissionLevel::Editor);
    const VIEWER: Option<PermissionLevel> = Some(PermissionLevel::Viewer);

    fn change(
        actor_level: Option<PermissionLevel>,
        target: &str,
        target_level: Option<PermissionLevel>,
        new_level: PermissionLevel,
    ) -> Decision {
        authorize(
            ACTOR,
            actor_level,
            &ProjectOperation::ChangeMemberPermission {
                target,
                target_level,
                new_level,
            },
        )
    }

    #[rstest]
    #[case(OWNER, Decision::Allow)]
    #[case(EDITOR, Decision::Deny(Denial::MissingCapability(Capability::DeleteProject)))]
    #[case(VIEWER, Decision::Deny(Denial::MissingCapability(Capability::DeleteProject)))]
    #[case(None, Decision::Deny(Denial::NotMember))]
    fn only_owner_deletes_project(
        #[case] level: Option<PermissionLevel>,
        #[case] expected: Decision,
    ) {
        assert_eq!(authorize(ACTOR, level, &ProjectOperation::Delete), expected);
    }

    #[rstest]
    #[case(OWNER, true)]
    #[case(EDITOR, true)]
    #[case(VIEWER, false)]
    #[case(None, false)]
    fn member_list_and_invites_need_editor(
        #[case] level: Option<PermissionLevel>,
        #[case] allowed: bool,
    ) {
        assert_eq!(
            authorize(ACTOR, level, &ProjectOperation::ViewMembers).is_allowed(),
            allowed
        );
        assert_eq!(
            authorize(
                ACTOR,
                level,
                &ProjectOperation::InviteMember {
                    level: PermissionLevel::Viewer
                }
            )
            .is_allowed(),
            allowed
        );
    }

    #[rstest]
    #[case(OWNER)]
    #[case(EDITOR)]
    fn nobody_invites_an_owner(#[case] level: Option<PermissionLevel>) {
        assert_eq!(
            authorize(
                ACTOR,
                level,
                &ProjectOperation::InviteMember {
                    level: PermissionLevel::Owner
                }
            ),
            Decision::Deny(Denial::InviteAsOwner)
        );
    }

    #[rstest]
    fn self_modification_is_always_denied(
        #[values(OWNER, EDITOR, VIEWER, None)] level: Option<PermissionLevel>,
        #[values(PermissionLevel::Owner, PermissionLevel::Editor, PermissionLevel::Viewer)]
        new_level: PermissionLevel,
    ) {
        assert_eq!(
            change(level, ACTOR, level, new_level),
            Decision::Deny(Denial::SelfModification)
        );
    }

    #[rstest]
    fn editor_cannot_touch_editor(
        #[values(PermissionLevel::Owner, PermissionLevel::Editor, PermissionLevel::Viewer)]
        new_level: PermissionLevel,
    ) {
        assert_eq!(
            change(EDITOR, TARGET, EDITOR, new_level),
            Decision::Deny(Denial::EditorTargetsEditor)
        );
    }

    #[test]
    fn editor_cannot_grant_owner() {
        assert_eq!(
            change(EDITOR, TARGET, VIEWER, PermissionLevel::Owner),
            Decision::Deny(Denial::EditorGrantsOwner)
        );
        assert!(!change(EDITOR, TARGET, OWNER, PermissionLevel::Owner).is_allowed());
        assert!(!change(EDITOR, TARGET, EDITOR, PermissionLevel::Owner).is_allowed());
    }

    #[test]
    fn editor_cannot_demote_owner() {
        assert_eq!(
            change(EDITOR, TARGET, OWNER, PermissionLevel::Viewer),
            Decision::Deny(Denial::EditorTargetsOwner)
        );
    }

    #[rstest]
    #[case(PermissionLevel::Editor)]
    #[case(PermissionLevel::Viewer)]
    fn editor_toggles_viewer(#[case] new_level: PermissionLevel) {
        assert_eq!(change(EDITOR, TARGET, VIEWER, new_level), Decision::Allow);
    }

    #[rstest]
    fn owner_changes_any_other_member(
        #[values(EDITOR, VIEWER)] target_level: Option<PermissionLevel>,
        #[values(PermissionLevel::Owner, PermissionLevel::Editor, PermissionLevel::Viewer)]
        new_level: PermissionLevel,
    ) {
        assert_eq!(change(OWNER, TARGET, target_level, new_level), Decision::Allow);
    }

    #[rstest]
    #[case(VIEWER, VIEWER, Decision::Deny(Denial::MissingCapability(Capability::ChangeMemberPermission)))]
    #[case(None, VIEWER, Decision::Deny(Denial::NotMember))]
    #[case(OWNER, None, Decision::Deny(Denial::TargetNotMember))]
    fn change_needs_resolved_levels(
        #[case] actor_level: Option<PermissionLevel>,
        #[case] target_level: Option<PermissionLevel>,
        #[case] expected: Decision,
    ) {
        assert_eq!(
            change(actor_level, TARGET, target_level, PermissionLevel::Editor),
            expected
        );
    }

    #[rstest]
    #[case(OWNER, TARGET, Decision::Allow)]
    #[case(OWNER, ACTOR, Decision::Deny(Denial::SelfRemoval))]
    #[case(EDITOR, TARGET, Decision::Deny(Denial::MissingCapability(Capability::RemoveMember)))]
    #[case(VIEWER, TARGET, Decision::Deny(Denial::MissingCapability(Capability::RemoveMember)))]
    #[case(None, TARGET, Decision::Deny(Denial::NotMember))]
    fn only_owner_removes_others(
        #[case] level: Option<PermissionLevel>,
        #[case] target: &str,
        #[case] expected: Decision,
    ) {
        assert_eq!(
            authorize(ACTOR, level, &ProjectOperation::RemoveMember { target }),
            expected
        );
    }

    #[rstest]
    #[case(OWNER, EDITOR, Decision::Allow)]
    #[case(OWNER, None, Decision::Deny(Denial::TargetNotMember))]
    #[case(EDITOR, VIEWER, Decision::Deny(Denial::MissingCapability(Capability::TransferOwnership)))]
    fn transfer_needs_owner_and_member_target(
        #[case] level: Option<PermissionLevel>,
        #[case] target_level: Option<PermissionLevel>,
        #[case] expected: Decision,
    ) {
        assert_eq!(
            authorize(
                ACTOR,
                level,
                &ProjectOperation::TransferOwnership {
                    target: TARGET,
                    target_level
                }
            ),
            expected
        );
    }

    #[rstest]
    #[case(ProjectOperation::View, true)]
    #[case(ProjectOperation::ViewFiles, true)]
    #[case(ProjectOperation::UpdateDetails, false)]
    #[case(ProjectOperation::UploadFiles, false)]
    #[case(ProjectOperation::ProcessFile, false)]
    fn viewer_reads_but_does_not_write(
        #[case] operation: ProjectOperation<'static>,
        #[case] allowed: bool,
    ) {
        assert_eq!(authorize(ACTOR, VIEWER, &operation).is_allowed(), allowed);
        assert!(authorize(ACTOR, EDITOR, &operation).is_allowed());
        assert_eq!(
            authorize(ACTOR, None, &operation),
            Decision::Deny(Denial::NotMember)
        );
    }

    #[test]
    fn denial_messages_are_readable() {
        assert_eq!(
            Denial::MissingCapability(Capability::ViewMembers).to_string(),
            "Your permission level does not allow view_members"
        );
        assert!(Denial::TargetNotMember.is_missing_target());
        assert!(!Denial::NotMember.is_missing_target());
    }
}
