//! Resume Mailer Lambda - emails a stored resume to people who request it
//!
//! Triggered by a DynamoDB stream (one record per request) or an API Gateway
//! request. For each requester the handler:
//!
//! 1. **Fetches** the resume from S3 (`storage`), once per invocation or once
//!    per message. A failed fetch is logged and the email goes out without
//!    the attachment.
//! 2. **Composes** a multipart email with a plain-text body and the PDF
//!    attachment (`compose`).
//! 3. **Delivers** it through an SMTP relay over STARTTLS, authenticating as
//!    the sender with an application password (`delivery`).
//!
//! ## Architecture
//!
//! ```text
//! Contact form → API Gateway → DynamoDB → Stream → Lambda (this) → SMTP relay → Requester
//!                                                     ↑
//!                                                 S3 (resume)
//! ```
//!
//! ## Usage
//!
//! Deploy as an AWS Lambda function with a DynamoDB stream or API Gateway
//! trigger. See `main.rs` for the Lambda entry point and [`config`] for the
//! environment variables.

pub mod compose;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod storage;
pub mod types;

pub use compose::{compose, AttachmentName, ComposeOptions, ComposedMessage};
pub use config::{BatchPolicy, DocumentLocation, FetchPolicy, MailerConfig, RelayConfig};
pub use delivery::{Mailer, SmtpMailer};
pub use dispatch::Dispatcher;
pub use error::MailerError;
pub use event::{RequesterRecord, TriggerEvent};
pub use storage::{fetch_document, DocumentStore, S3DocumentStore};
pub use types::{Document, HandlerResponse, RecordOutcome, RequesterProfile, SenderProfile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    /// Regression test: Tracing subscriber has CloudWatch-compatible methods
    /// used by main.rs (`json`, `with_ansi`, `with_current_span`, `without_time`)
    #[test]
    fn test_tracing_cloudwatch_methods_exist() {
        fn _assert_cloudwatch_config_compiles() {
            use tracing_subscriber::fmt;

            let _ = fmt::fmt()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .without_time();
        }
    }

    #[test]
    fn test_version_is_set() {
        assert!(!super::VERSION.is_empty());
    }
}
