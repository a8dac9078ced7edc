//! Outgoing mail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivers HTML mail. Transport is up to the implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

#[async_trait]
impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        (**self).send(mail).await
    }
}

/// Mailer that keeps what it was asked to send. Can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose deliveries always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.failing {
            tracing::warn!(to = %mail.to, subject = %mail.subject, "mail delivery failed");
            return Err(MailError::Delivery(format!("cannot deliver to {}", mail.to)));
        }
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail queued");
        match self.sent.lock() {
            Ok(mut sent) => sent.push(mail),
            Err(poisoned) => poisoned.into_inner().push(mail),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "ana@example.com".into(),
            from: "tec@example.com".into(),
            subject: "Oi".into(),
            html_body: "<p>oi</p>".into(),
        }
    }

    #[tokio::test]
    async fn records_sent_mail() {
        let mailer = RecordingMailer::new();
        mailer.send(mail()).await.unwrap();
        assert_eq!(mailer.sent(), vec![mail()]);
    }

    #[tokio::test]
    async fn failing_mailer_records_nothing() {
        let mailer = RecordingMailer::failing();
        assert!(mailer.send(mail()).await.is_err());
        assert!(mailer.sent().is_empty());
    }
}
