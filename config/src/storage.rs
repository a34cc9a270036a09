use serde::Deserialize;

#[derive(Deserialize)]
pub struct StorageConfig {
    s3: S3StorageConfig,
}

impl StorageConfig {
    pub fn s3(&self) -> &S3StorageConfig {
        &self.s3
    }
}

#[derive(Deserialize)]
pub struct S3StorageConfig {
    bucket: String,
    region: Option<String>,
    endpoint_url: Option<String>,
}

impl S3StorageConfig {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &Option<String> {
        &self.region
    }

    /// Overrides the AWS endpoint, e.g. for a local S3-compatible server.
    pub fn endpoint_url(&self) -> &Option<String> {
        &self.endpoint_url
    }
}
