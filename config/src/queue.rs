use serde::Deserialize;

#[derive(Deserialize)]
pub struct QueueConfig {
    sqs: SqsQueueConfig,
}

impl QueueConfig {
    pub fn sqs(&self) -> &SqsQueueConfig {
        &self.sqs
    }
}

#[derive(Deserialize)]
pub struct SqsQueueConfig {
    queue_url: String,
    region: Option<String>,
    endpoint_url: Option<String>,
}

impl SqsQueueConfig {
    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub fn region(&self) -> &Option<String> {
        &self.region
    }

    pub fn endpoint_url(&self) -> &Option<String> {
        &self.endpoint_url
    }
}
