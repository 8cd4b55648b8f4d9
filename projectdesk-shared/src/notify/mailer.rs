/// Email dispatch
///
/// Services send mail through the [`Mailer`] trait. [`LogMailer`] is the
/// built-in adapter: it records the delivery in the log without contacting
/// an SMTP server, and never logs the body.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Mail {
    /// Sign-in details for a newly created account.
    pub fn login_details(
        from: &str,
        to: &str,
        name: Option<&str>,
        password: &str,
        platform_url: &str,
    ) -> Mail {
        let greeting = match name {
            Some(name) if !name.trim().is_empty() => format!("Hello, {}!", name.trim()),
            _ => "Hello!".to_string(),
        };

        Mail {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Your sign-in details".to_string(),
            body: format!(
                "{}\n\nAn account has been created for you.\n\nLogin: {}\nPassword: {}\n\nSign in at {}\n",
                greeting, to, password, platform_url
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> Result<(), MailError>;
}

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        if !mail.to.contains('@') {
            return Err(MailError::InvalidRecipient(mail.to));
        }

        tracing::info!(from = %mail.from, to = %mail.to, subject = %mail.subject, "Mail dispatched");
        Ok(())
    }
}
