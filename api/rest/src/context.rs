use std::{sync::Arc, time::Duration};

use ph_config::app::AppConfigMode;
use ph_dao::Db;
use ph_identity_clerk::IdentityProvider;
use ph_mailer::MailSender;
use ph_queue_sqs::FileQueue;
use ph_storage_s3::ObjectStorage;

pub struct ApiRestCtx {
    mode: AppConfigMode,
    dao: ApiRestDaoCtx,
    identity: ApiRestIdentityCtx,
    storage: ApiRestStorageCtx,
    queue: ApiRestQueueCtx,
    mailer: ApiRestMailerCtx,
    request_timeout: Duration,
}

impl ApiRestCtx {
    pub fn new(
        mode: &AppConfigMode,
        dao: ApiRestDaoCtx,
        identity: ApiRestIdentityCtx,
        storage: ApiRestStorageCtx,
        queue: ApiRestQueueCtx,
        mailer: ApiRestMailerCtx,
        request_timeout: &Duration,
    ) -> Self {
        Self {
            mode: *mode,
            dao,
            identity,
            storage,
            queue,
            mailer,
            request_timeout: *request_timeout,
        }
    }

    pub fn mode(&self) -> &AppConfigMode {
        &self.mode
    }

    pub fn dao(&self) -> &ApiRestDaoCtx {
        &self.dao
    }

    pub fn identity(&self) -> &ApiRestIdentityCtx {
        &self.identity
    }

    pub fn storage(&self) -> &ApiRestStorageCtx {
        &self.storage
    }

    pub fn queue(&self) -> &ApiRestQueueCtx {
        &self.queue
    }

    pub fn mailer(&self) -> &ApiRestMailerCtx {
        &self.mailer
    }

    pub fn request_timeout(&self) -> &Duration {
        &self.request_timeout
    }
}

pub struct ApiRestDaoCtx {
    db: Arc<Db>,
}

impl ApiRestDaoCtx {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

pub struct ApiRestIdentityCtx {
    provider: Arc<dyn IdentityProvider>,
    dev_token: Option<String>,
}

impl ApiRestIdentityCtx {
    pub fn new(provider: Arc<dyn IdentityProvider>, dev_token: &Option<String>) -> Self {
        Self {
            provider,
            dev_token: dev_token.clone(),
        }
    }

    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    pub fn dev_token(&self) -> &Option<String> {
        &self.dev_token
    }
}

pub struct ApiRestStorageCtx {
    storage: Arc<dyn ObjectStorage>,
}

impl ApiRestStorageCtx {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn ObjectStorage {
        self.storage.as_ref()
    }
}

pub struct ApiRestQueueCtx {
    queue: Arc<dyn FileQueue>,
}

impl ApiRestQueueCtx {
    pub fn new(queue: Arc<dyn FileQueue>) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &dyn FileQueue {
        self.queue.as_ref()
    }
}

pub struct ApiRestMailerCtx {
    sender: Arc<dyn MailSender>,
    product_name: String,
    dashboard_url: String,
}

impl ApiRestMailerCtx {
    pub fn new(sender: Arc<dyn MailSender>, product_name: &str, dashboard_url: &str) -> Self {
        Self {
            sender,
            product_name: product_name.to_owned(),
            dashboard_url: dashboard_url.to_owned(),
        }
    }

    pub fn sender(&self) -> &dyn MailSender {
        self.sender.as_ref()
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }
}
