use chrono::{DateTime, Utc};
use ph_dao::member::MemberDao;
use ph_permission::PermissionLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct MemberReqPath {
    project_id: Uuid,
    member_id: String,
}

impl MemberReqPath {
    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }
}

#[derive(Deserialize, Validate)]
pub struct InviteMemberReqJson {
    #[validate(email)]
    email: String,
    permission: PermissionLevel,
}

impl InviteMemberReqJson {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn permission(&self) -> &PermissionLevel {
        &self.permission
    }
}

#[derive(Deserialize)]
pub struct UpdateMemberPermissionReqJson {
    permission: PermissionLevel,
}

impl UpdateMemberPermissionReqJson {
    pub fn permission(&self) -> &PermissionLevel {
        &self.permission
    }
}

/// `user_id` and `name` are null for invitees who have not signed up yet.
#[derive(Serialize)]
pub struct MemberResJson {
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    permission: PermissionLevel,
    created_at: DateTime<Utc>,
}

impl MemberResJson {
    pub fn from_dao(member: &MemberDao) -> Self {
        Self {
            user_id: member.user_id().clone(),
            email: member.email().clone(),
            name: member.name().clone(),
            permission: *member.permission(),
            created_at: *member.created_at(),
        }
    }
}
