use async_trait::async_trait;
use tracing::info;

/// An outgoing HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery transport for account notices.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Transport that writes every message to the log instead of delivering it.
#[derive(Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            html = %email.html,
            "email sent"
        );
        Ok(())
    }
}
