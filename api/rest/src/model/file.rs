use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use ph_dao::file::FileDao;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct FileReqPath {
    project_id: Uuid,
    file_name: String,
}

impl FileReqPath {
    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(MultipartForm)]
pub struct UploadFilesReqForm {
    pub files: Vec<TempFile>,
}

#[derive(Serialize)]
pub struct FileResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    file_name: String,
    status: String,
}

impl FileResJson {
    pub fn from_dao(file: &FileDao) -> Self {
        Self {
            id: *file.id(),
            created_at: *file.created_at(),
            updated_at: *file.updated_at(),
            project_id: *file.project_id(),
            file_name: file.file_name().to_owned(),
            status: file.status().as_str().to_owned(),
        }
    }
}
