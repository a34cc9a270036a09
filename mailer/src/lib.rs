use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MessageBuilder},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use ph_error::{Error, Result};

pub mod template;

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_mail(&self, payload: MailPayload) -> Result<()>;
}

pub struct Mailer {
    message_builder: MessageBuilder,
    smtp_transport: Arc<SmtpTransport>,
}

impl Mailer {
    pub fn new(
        smtp_host: &str,
        smtp_port: &Option<u16>,
        smtp_username: &str,
        smtp_password: &str,
        sender_name: &str,
        sender_email: &str,
    ) -> AnyResult<Self> {
        ph_log::info(Some("⚡"), "[Mailer] Initializing component");

        let mut smtp_transport = SmtpTransport::relay(smtp_host)?.credentials(Credentials::new(
            smtp_username.to_owned(),
            smtp_password.to_owned(),
        ));
        if let Some(port) = smtp_port {
            smtp_transport = smtp_transport.port(*port);
        }

        Ok(Self {
            message_builder: Message::builder()
                .from(format!("{sender_name} <{sender_email}>").parse()?),
            smtp_transport: Arc::new(smtp_transport.build()),
        })
    }
}

#[async_trait]
impl MailSender for Mailer {
    async fn send_mail(&self, payload: MailPayload) -> Result<()> {
        let mailbox = payload
            .to
            .parse()
            .map_err(|err| Error::BadInput(format!("Invalid recipient {}: {err}", payload.to)))?;
        let message = self
            .message_builder
            .to_owned()
            .to(mailbox)
            .subject(payload.subject)
            .header(ContentType::TEXT_HTML)
            .body(payload.body)
            .map_err(|err| Error::BackendFailure(format!("Failed to build mail: {err}")))?;

        let smtp_transport = self.smtp_transport.clone();
        let sent = tokio::task::spawn_blocking(move || smtp_transport.send(&message))
            .await
            .map_err(|err| Error::BackendFailure(format!("Mail task failed: {err}")))?;

        match sent {
            Ok(_) => {
                ph_log::debug(None, format!("[Mailer] Sent mail to {}", payload.to));
                Ok(())
            }
            Err(err) if err.is_transient() => Err(Error::BackendUnavailable(format!(
                "Failed to send mail to {}: {err}",
                payload.to
            ))),
            Err(err) => Err(Error::BackendFailure(format!(
                "Failed to send mail to {}: {err}",
                payload.to
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailPayload {
    to: String,
    subject: String,
    body: String,
}

impl MailPayload {
    pub fn new(to: &str, subject: &str, body: &str) -> Self {
        Self {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        }
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
