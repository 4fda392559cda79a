use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers lead notifications (SMTP, a mail API, ...).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        mail: &OutgoingMail,
    ) -> Result<(), MailerError>;
}

/// Writes every notification to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        mail: &OutgoingMail,
    ) -> Result<(), MailerError> {
        info!(
            to = %mail.to,
            from = %mail.from,
            reply_to = %mail.reply_to,
            subject = %mail.subject,
            "lead notification:\n{}",
            mail.body
        );
        Ok(())
    }
}
