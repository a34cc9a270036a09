use std::fs::File;

use anyhow::{Context, Result};
use api::ApiConfig;
use app::AppConfig;
use auth::AuthConfig;
use db::DbConfig;
use invite::InviteConfig;
use log::LogConfig;
use mailer::MailerConfig;
use queue::QueueConfig;
use serde::Deserialize;
use storage::StorageConfig;

pub mod api;
pub mod app;
pub mod auth;
pub mod db;
pub mod invite;
pub mod log;
pub mod mailer;
pub mod queue;
pub mod storage;

#[derive(Deserialize)]
pub struct Config {
    app: AppConfig,
    log: LogConfig,
    auth: AuthConfig,
    db: DbConfig,
    storage: StorageConfig,
    queue: QueueConfig,
    mailer: MailerConfig,
    invite: InviteConfig,
    api: ApiConfig,
}

impl Config {
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn db(&self) -> &DbConfig {
        &self.db
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn queue(&self) -> &QueueConfig {
        &self.queue
    }

    pub fn mailer(&self) -> &MailerConfig {
        &self.mailer
    }

    pub fn invite(&self) -> &InviteConfig {
        &self.invite
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }
}

pub fn from_path(path: &str) -> Result<Config> {
    let file = File::open(path).with_context(|| format!("Failed to open config file {path}"))?;
    serde_yaml::from_reader(file).with_context(|| format!("Failed to parse config file {path}"))
}

pub fn from_str(yaml: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(yaml)?)
}
