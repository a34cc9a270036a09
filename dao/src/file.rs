use chrono::{DateTime, Utc};
use ph_db_postgresql::model::file::FileModel as FilePostgresModel;
use ph_db_sqlite::model::file::FileModel as FileSqliteModel;
use ph_error::{Error, Result};
use uuid::Uuid;

use crate::{util::error, Db};

const ENTITY: &str = "File";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Uploaded,
    Queued,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Queued => "queued",
        }
    }

    fn from_db(value: &str) -> Result<Self> {
        match value {
            "uploaded" => Ok(Self::Uploaded),
            "queued" => Ok(Self::Queued),
            _ => Err(Error::BackendFailure(format!(
                "Stored file status is invalid: {value}"
            ))),
        }
    }
}

pub struct FileDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    file_name: String,
    status: FileStatus,
}

impl FileDao {
    pub fn new(project_id: &Uuid, file_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            project_id: *project_id,
            file_name: file_name.to_owned(),
            status: FileStatus::Uploaded,
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

    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn status(&self) -> &FileStatus {
        &self.status
    }

    /// Object key of the stored content.
    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.project_id, self.file_name)
    }

    /// Records an upload. Re-uploading a name resets the existing row to
    /// `uploaded`; the stored row is returned either way.
    pub async fn db_upsert(&self, db: &Db) -> Result<Self> {
        match db {
            Db::PostgresqlDb(db) => match db.upsert_file(&self.to_postgresdb_model()).await {
                Ok(model) => Self::from_postgresdb_model(&model),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
            Db::SqliteDb(db) => match db.upsert_file(&self.to_sqlitedb_model()).await {
                Ok(model) => Self::from_sqlitedb_model(&model),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
        }
    }

    pub async fn db_select(db: &Db, project_id: &Uuid, file_name: &str) -> Result<Self> {
        let model = match db {
            Db::PostgresqlDb(db) => match db.select_file(project_id, file_name).await {
                Ok(model) => model.as_ref().map(Self::from_postgresdb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
            Db::SqliteDb(db) => match db.select_file(project_id, file_name).await {
                Ok(model) => model.as_ref().map(Self::from_sqlitedb_model).transpose(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
        }?;

        model.ok_or_else(|| Error::NotFound(format!("File {file_name} not found in this project")))
    }

    pub async fn db_select_many_by_project_id(db: &Db, project_id: &Uuid) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => match db.select_many_files_by_project_id(project_id).await {
                Ok(models) => models.iter().map(Self::from_postgresdb_model).collect(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
            Db::SqliteDb(db) => match db.select_many_files_by_project_id(project_id).await {
                Ok(models) => models.iter().map(Self::from_sqlitedb_model).collect(),
                Err(err) => Err(error::from_db(err, ENTITY)),
            },
        }
    }

    pub async fn db_update_status(
        db: &Db,
        project_id: &Uuid,
        file_name: &str,
        status: &FileStatus,
    ) -> Result<Self> {
        let now = Utc::now();
        let model = match db {
            Db::PostgresqlDb(db) => {
                match db
                    .update_file_status(project_id, file_name, status.as_str(), &now)
                    .await
                {
                    Ok(model) => model.as_ref().map(Self::from_postgresdb_model).transpose(),
                    Err(err) => Err(error::from_db(err, ENTITY)),
                }
            }
            Db::SqliteDb(db) => {
                match db
                    .update_file_status(project_id, file_name, status.as_str(), &now)
                    .await
                {
                    Ok(model) => model.as_ref().map(Self::from_sqlitedb_model).transpose(),
                    Err(err) => Err(error::from_db(err, ENTITY)),
                }
            }
        }?;

        model.ok_or_else(|| Error::NotFound(format!("File {file_name} not found in this project")))
    }

    fn from_postgresdb_model(model: &FilePostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            file_name: model.file_name().to_owned(),
            status: FileStatus::from_db(model.status())?,
        })
    }

    fn to_postgresdb_model(&self) -> FilePostgresModel {
        FilePostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.file_name,
            self.status.as_str(),
        )
    }

    fn from_sqlitedb_model(model: &FileSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            file_name: model.file_name().to_owned(),
            status: FileStatus::from_db(model.status())?,
        })
    }

    fn to_sqlitedb_model(&self) -> FileSqliteModel {
        FileSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.file_name,
            self.status.as_str(),
        )
    }
}
