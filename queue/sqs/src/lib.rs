use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::{
    error::{DisplayErrorContext, SdkError},
    Client,
};
use ph_error::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

/// Work item telling the processing worker which stored file to pick up.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileMessage {
    project_id: Uuid,
    file_name: String,
}

impl FileMessage {
    pub fn new(project_id: &Uuid, file_name: &str) -> Self {
        Self {
            project_id: *project_id,
            file_name: file_name.to_owned(),
        }
    }

    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[async_trait]
pub trait FileQueue: Send + Sync {
    async fn enqueue(&self, message: &FileMessage) -> Result<()>;
}

pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub async fn new(queue_url: &str, region: &Option<String>, endpoint_url: &Option<String>) -> Self {
        ph_log::info(Some("⚡"), "[SQS] Initializing component");

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
            queue_url: queue_url.to_owned(),
        }
    }
}

#[async_trait]
impl FileQueue for SqsQueue {
    async fn enqueue(&self, message: &FileMessage) -> Result<()> {
        let body = serde_json::to_string(message)
            .map_err(|err| Error::BackendFailure(format!("Failed to encode message: {err}")))?;

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|err| from_sdk(err, &format!("Failed to queue {}", message.file_name)))?;

        ph_log::debug(
            None,
            format!(
                "[SQS] Queued {}/{} as message {}",
                message.project_id,
                message.file_name,
                output.message_id().unwrap_or("-")
            ),
        );
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
