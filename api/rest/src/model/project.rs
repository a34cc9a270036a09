use chrono::{DateTime, Utc};
use ph_dao::project::ProjectDao;
use ph_permission::PermissionLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct ProjectReqPath {
    project_id: Uuid,
}

impl ProjectReqPath {
    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }
}

#[derive(Deserialize, Validate)]
pub struct InsertOneProjectReqJson {
    #[validate(length(min = 1, max = 255))]
    name: String,
    description: Option<String>,
    industry: Option<String>,
    use_case: Option<String>,
    model_type: Option<String>,
    function: Option<String>,
}

impl InsertOneProjectReqJson {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &Option<String> {
        &self.description
    }

    pub fn industry(&self) -> &Option<String> {
        &self.industry
    }

    pub fn use_case(&self) -> &Option<String> {
        &self.use_case
    }

    pub fn model_type(&self) -> &Option<String> {
        &self.model_type
    }

    pub fn function(&self) -> &Option<String> {
        &self.function
    }
}

#[derive(Deserialize)]
pub struct UpdateOneProjectReqJson {
    description: Option<String>,
    industry: Option<String>,
    use_case: Option<String>,
    model_type: Option<String>,
    function: Option<String>,
}

impl UpdateOneProjectReqJson {
    pub fn description(&self) -> &Option<String> {
        &self.description
    }

    pub fn industry(&self) -> &Option<String> {
        &self.industry
    }

    pub fn use_case(&self) -> &Option<String> {
        &self.use_case
    }

    pub fn model_type(&self) -> &Option<String> {
        &self.model_type
    }

    pub fn function(&self) -> &Option<String> {
        &self.function
    }

    pub fn is_all_none(&self) -> bool {
        self.description.is_none()
            && self.industry.is_none()
            && self.use_case.is_none()
            && self.model_type.is_none()
            && self.function.is_none()
    }
}

#[derive(Deserialize, Validate)]
pub struct TransferOneProjectReqJson {
    #[validate(length(min = 1))]
    member_id: String,
}

impl TransferOneProjectReqJson {
    pub fn member_id(&self) -> &str {
        &self.member_id
    }
}

#[derive(Serialize)]
pub struct ProjectResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: String,
    name: String,
    description: Option<String>,
    industry: Option<String>,
    use_case: Option<String>,
    model_type: Option<String>,
    function: Option<String>,
}

impl ProjectResJson {
    pub fn from_dao(project: &ProjectDao) -> Self {
        Self {
            id: *project.id(),
            created_at: *project.created_at(),
            updated_at: *project.updated_at(),
            user_id: project.user_id().to_owned(),
            name: project.name().to_owned(),
            description: project.description().clone(),
            industry: project.industry().clone(),
            use_case: project.use_case().clone(),
            model_type: project.model_type().clone(),
            function: project.function().clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PermissionResJson {
    permission: PermissionLevel,
}

impl PermissionResJson {
    pub fn new(permission: &PermissionLevel) -> Self {
        Self {
            permission: *permission,
        }
    }
}
