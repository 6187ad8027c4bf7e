//! Typed configuration, read once at process start
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `SENDER` | yes | JSON sender profile |
//! | `BUCKET_NAME` | at use | |
//! | `OBJECT_KEY` | at use | |
//! | `APP_PASSWORD` | at use | |
//! | `SMTP_HOST` | no | `smtp.gmail.com` |
//! | `SMTP_PORT` | no | `587` |
//! | `ATTACHMENT_NAME` | no | `<sender name>_Resume.pdf` |
//! | `FETCH_POLICY` | no | `once` (`once`, `per_message`) |
//! | `BATCH_POLICY` | no | `fail_fast` (`fail_fast`, `isolated`) |
//! | `REPLY_TO` | no | `true` |
//! | `HIGH_PRIORITY` | no | `true` |
//!
//! Bucket, key and password stay optional here; the component that needs
//! them reports their absence as a configuration error when it runs.

use crate::compose::{AttachmentName, ComposeOptions};
use crate::error::MailerError;
use crate::types::SenderProfile;

/// Default SMTP relay (Gmail submission endpoint)
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// When the document is read from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Fetch on the first well-formed record, reuse for the rest of the batch
    #[default]
    OncePerInvocation,
    /// Fetch again for every message
    PerMessage,
}

/// How a failing record affects the rest of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// First failure ends the invocation
    #[default]
    FailFast,
    /// Each record succeeds or fails on its own; the response aggregates
    Isolated,
}

/// Object storage coordinates of the resume
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLocation {
    pub bucket: Option<String>,
    pub key: Option<String>,
}

/// SMTP relay endpoint and credential
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub app_password: Option<String>,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("app_password", &self.app_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            app_password: None,
        }
    }
}

/// Complete mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub sender: SenderProfile,
    pub document: DocumentLocation,
    pub relay: RelayConfig,
    pub compose: ComposeOptions,
    pub fetch_policy: FetchPolicy,
    pub batch_policy: BatchPolicy,
}

impl MailerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_sender = non_empty(lookup("SENDER"))
            .ok_or_else(|| MailerError::Configuration("SENDER is not set".to_string()))?;
        let sender = SenderProfile::from_json(&raw_sender)?;

        let port = match non_empty(lookup("SMTP_PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| MailerError::Configuration(format!("invalid SMTP_PORT: {raw}")))?,
            None => DEFAULT_SMTP_PORT,
        };

        let fetch_policy = match non_empty(lookup("FETCH_POLICY")).as_deref() {
            None | Some("once") => FetchPolicy::OncePerInvocation,
            Some("per_message") => FetchPolicy::PerMessage,
            Some(other) => {
                return Err(MailerError::Configuration(format!(
                    "invalid FETCH_POLICY: {other}"
                )))
            }
        };

        let batch_policy = match non_empty(lookup("BATCH_POLICY")).as_deref() {
            None | Some("fail_fast") => BatchPolicy::FailFast,
            Some("isolated") => BatchPolicy::Isolated,
            Some(other) => {
                return Err(MailerError::Configuration(format!(
                    "invalid BATCH_POLICY: {other}"
                )))
            }
        };

        let attachment_name = match non_empty(lookup("ATTACHMENT_NAME")) {
            Some(name) => AttachmentName::Fixed(name),
            None => AttachmentName::SenderName,
        };

        Ok(Self {
            sender,
            document: DocumentLocation {
                bucket: non_empty(lookup("BUCKET_NAME")),
                key: non_empty(lookup("OBJECT_KEY")),
            },
            relay: RelayConfig {
                host: non_empty(lookup("SMTP_HOST"))
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                app_password: non_empty(lookup("APP_PASSWORD")),
            },
            compose: ComposeOptions {
                attachment_name,
                reply_to: flag(lookup("REPLY_TO"), true),
                high_priority: flag(lookup("HIGH_PRIORITY"), true),
            },
            fetch_policy,
            batch_policy,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn flag(value: Option<String>, default: bool) -> bool {
    non_empty(value)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
