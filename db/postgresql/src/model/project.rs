use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub struct ProjectModel {
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

impl ProjectModel {
    pub fn new(
        id: &Uuid,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        user_id: &str,
        name: &str,
        description: &Option<String>,
        industry: &Option<String>,
        use_case: &Option<String>,
        model_type: &Option<String>,
        function: &Option<String>,
    ) -> Self {
        Self {
            id: *id,
            created_at: *created_at,
            updated_at: *updated_at,
            user_id: user_id.to_owned(),
            name: name.to_owned(),
            description: description.clone(),
            industry: industry.clone(),
            use_case: use_case.clone(),
            model_type: model_type.clone(),
            function: function.clone(),
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

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
