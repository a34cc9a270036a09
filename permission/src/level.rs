use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Rank of a member within a project. Lower value means more authority; the
/// numeric value is the one stored in the database and sent over the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(try_from = "i32", into = "i32")]
#[strum(serialize_all = "lowercase")]
pub enum PermissionLevel {
    Owner = 0,
    Editor = 1,
    Viewer = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    ViewProject,
    UpdateProject,
    DeleteProject,
    TransferOwnership,
    InviteMember,
    ViewMembers,
    ChangeMemberPermission,
    RemoveMember,
    ViewFiles,
    UploadFiles,
    ProcessFiles,
}

const OWNER_CAPABILITIES: &[Capability] = &[
    Capability::ViewProject,
    Capability::UpdateProject,
    Capability::DeleteProject,
    Capability::TransferOwnership,
    Capability::InviteMember,
    Capability::ViewMembers,
    Capability::ChangeMemberPermission,
    Capability::RemoveMember,
    Capability::ViewFiles,
    Capability::UploadFiles,
    Capability::ProcessFiles,
];

const EDITOR_CAPABILITIES: &[Capability] = &[
    Capability::ViewProject,
    Capability::UpdateProject,
    Capability::InviteMember,
    Capability::ViewMembers,
    Capability::ChangeMemberPermission,
    Capability::ViewFiles,
    Capability::UploadFiles,
    Capability::ProcessFiles,
];

const VIEWER_CAPABILITIES: &[Capability] = &[Capability::ViewProject, Capability::ViewFiles];

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 3] = [Self::Owner, Self::Editor, Self::Viewer];

    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Owner => OWNER_CAPABILITIES,
            Self::Editor => EDITOR_CAPABILITIES,
            Self::Viewer => VIEWER_CAPABILITIES,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub const fn value(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PermissionLevel {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Owner),
            1 => Ok(Self::Editor),
            2 => Ok(Self::Viewer),
            _ => Err(format!(
                "Permission must be 0 (owner), 1 (editor) or 2 (viewer), got {value}"
            )),
        }
    }
}

impl From<PermissionLevel> for i32 {
    fn from(level: PermissionLevel) -> Self {
        level.value()
    }
}
