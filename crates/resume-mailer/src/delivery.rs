//! SMTP delivery over a STARTTLS submission channel
//!
//! Each delivery opens its own connection, authenticates as the sender and
//! closes the session when the send completes or fails. Connections are never
//! pooled or shared between records.

use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport,
    Tokio1Executor,
};
use tracing::{error, info, instrument};

use crate::compose::ComposedMessage;
use crate::config::RelayConfig;
use crate::error::MailerError;
use crate::types::SenderProfile;

/// Sends a composed message on behalf of the sender
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(
        &self,
        sender: &SenderProfile,
        message: ComposedMessage,
    ) -> Result<(), MailerError>;
}

/// lettre-backed SMTP relay client
pub struct SmtpMailer {
    relay: RelayConfig,
}

impl SmtpMailer {
    pub fn new(relay: RelayConfig) -> Self {
        Self { relay }
    }

    /// Credential check done before any network activity
    fn credentials(&self, sender: &SenderProfile) -> Result<Credentials, MailerError> {
        let password = self
            .relay
            .app_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MailerError::Configuration("APP_PASSWORD is not set".to_string()))?;

        Ok(Credentials::new(sender.email.clone(), password.to_string()))
    }

    fn transport(
        &self,
        credentials: Credentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.relay.host)
            .map_err(|e| MailerError::Delivery(e.to_string()))?
            .port(self.relay.port)
            .credentials(credentials)
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, sender, message), fields(host = %self.relay.host, port = self.relay.port, to = %message.to))]
    async fn deliver(
        &self,
        sender: &SenderProfile,
        message: ComposedMessage,
    ) -> Result<(), MailerError> {
        let credentials = self.credentials(sender)?;
        let transport = self.transport(credentials)?;

        let response = transport.send(message.into_message()).await.map_err(|e| {
            error!(error = %e, "SMTP send failed");
            MailerError::Delivery(e.to_string())
        })?;

        info!(code = %response.code(), "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose, ComposeOptions};
    use crate::types::RequesterProfile;

    fn sender() -> SenderProfile {
        SenderProfile {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "555-0100".to_string(),
            github_url: "https://github.com/janedoe".to_string(),
            linked_in_url: "https://linkedin.com/in/janedoe".to_string(),
        }
    }

    fn message() -> ComposedMessage {
        let requester = RequesterProfile {
            name: "Sam".to_string(),
            email: "sam@hiring.example".to_string(),
        };
        compose(&sender(), &requester, None, &ComposeOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_password_fails_before_connecting() {
        // An unroutable host: any connection attempt would surface as a Delivery error
        let mailer = SmtpMailer::new(RelayConfig {
            host: "relay.invalid".to_string(),
            port: 587,
            app_password: None,
        });

        let result = mailer.deliver(&sender(), message()).await;
        assert!(matches!(result, Err(MailerError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_password_is_missing() {
        let mailer = SmtpMailer::new(RelayConfig {
            host: "relay.invalid".to_string(),
            port: 587,
            app_password: Some(String::new()),
        });

        let result = mailer.deliver(&sender(), message()).await;
        assert!(matches!(result, Err(MailerError::Configuration(_))));
    }

    #[test]
    fn test_credentials_use_sender_identity() {
        let mailer = SmtpMailer::new(RelayConfig {
            host: "smtp.example.com".to_string(),
            port: 2587,
            app_password: Some("secret".to_string()),
        });
        let credentials = mailer.credentials(&sender()).unwrap();
        assert_eq!(
            credentials,
            Credentials::new("jane@example.com".to_string(), "secret".to_string())
        );
    }
}
