//! Outbound mail over SMTP with STARTTLS.

use agent_common::AgentError;
use agent_common::config::{env_or, env_parse};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

pub const STAGE: &str = "smtp";

const SMTP_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `email`, authenticating with `password`.
    async fn send(&self, password: &str, email: OutboundEmail) -> Result<(), AgentError>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("SMTP_HOST", "smtp.example.com"),
            port: env_parse("SMTP_PORT", 587),
            username: env_or("SMTP_USERNAME", "apikey"),
        }
    }
}

pub fn build_message(email: &OutboundEmail) -> Result<Message, AgentError> {
    Message::builder()
        .from(email.from.clone())
        .to(email.to.clone())
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| AgentError::upstream(STAGE, format!("could not build message: {}", e)))
}

pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        log::info!(
            "[NETWORKING] SMTP relay {}:{} as {}",
            config.host,
            config.port,
            config.username
        );
        Self { config }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, password: &str, email: OutboundEmail) -> Result<(), AgentError> {
        let message = build_message(&email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .map_err(|e| AgentError::upstream(STAGE, format!("relay setup failed: {}", e)))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                password.to_string(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| AgentError::upstream(STAGE, e.to_string()))?;

        log::info!("[NETWORKING] Delivered message to {}", email.to);
        Ok(())
    }
}
