use std::{fmt::Debug, path::Path};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
    Client,
};
use ph_error::{Error, Result};

/// Destination for uploaded file content.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the file at `path` under `key`, replacing any previous object.
    async fn put_file(&self, key: &str, path: &Path, content_type: &Option<String>) -> Result<()>;
}

pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn new(bucket: &str, region: &Option<String>, endpoint_url: &Option<String>) -> Self {
        ph_log::info(Some("⚡"), "[S3] Initializing component");

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint_url) = endpoint_url {
            builder = builder.endpoint_url(endpoint_url).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket.to_owned(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_file(&self, key: &str, path: &Path, content_type: &Option<String>) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| Error::BackendFailure(format!("Failed to read upload {key}: {err}")))?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|err| from_sdk(err, &format!("Failed to store {key}")))?;

        ph_log::debug(None, format!("[S3] Stored s3://{}/{key}", self.bucket));
        Ok(())
    }
}

fn from_sdk<E, R>(err: SdkError<E, R>, context: &str) -> Error
where
    E: std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            Error::BackendUnavailable(format!("{context}: {}", DisplayErrorContext(&err)))
        }
        err => Error::BackendFailure(format!("{context}: {}", DisplayErrorContext(&err))),
    }
}
