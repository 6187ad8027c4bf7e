//! Error taxonomy for the mailer
//!
//! Every failure inside an invocation is one of these variants. The dispatch
//! loop translates them into a status code and message; nothing escapes the
//! Lambda handler as a raw error.

use thiserror::Error;

/// HTTP-equivalent status for a successful invocation
pub const STATUS_OK: u16 = 200;

/// HTTP-equivalent status for malformed input
pub const STATUS_BAD_REQUEST: u16 = 400;

/// HTTP-equivalent status for composition or delivery failures
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailerError {
    /// A required setting is missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The document could not be read from object storage
    #[error("Failed to retrieve document: {0}")]
    Retrieval(String),

    /// A trigger record lacks the requester fields
    #[error("Malformed requester record: {0}")]
    MalformedRecord(String),

    #[error("Failed to compose message: {0}")]
    Composition(String),

    #[error("SMTP delivery failed: {0}")]
    Delivery(String),
}

impl MailerError {
    /// Status reported at the invocation boundary
    pub fn status_code(&self) -> u16 {
        match self {
            MailerError::MalformedRecord(_) => STATUS_BAD_REQUEST,
            MailerError::Configuration(_)
            | MailerError::Retrieval(_)
            | MailerError::Composition(_)
            | MailerError::Delivery(_) => STATUS_INTERNAL_ERROR,
        }
    }

    /// Short human-readable message for the response body
    pub fn public_message(&self) -> &'static str {
        match self {
            MailerError::MalformedRecord(_) => "Invalid requester information.",
            _ => "Error formatting message.",
        }
    }
}
