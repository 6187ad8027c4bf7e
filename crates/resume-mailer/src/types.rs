//! Profiles, documents and response structures

use serde::{Deserialize, Serialize};

use crate::error::{MailerError, STATUS_OK};

/// Owner of the resume; also the authenticated SMTP identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub github_url: String,
    #[serde(rename = "linkedInUrl")]
    pub linked_in_url: String,
}

impl SenderProfile {
    /// Parse the JSON-encoded `SENDER` setting
    pub fn from_json(raw: &str) -> Result<Self, MailerError> {
        let profile: SenderProfile = serde_json::from_str(raw)
            .map_err(|e| MailerError::Configuration(format!("invalid SENDER profile: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Name and email are needed for the subject and login; the rest may be blank
    pub fn validate(&self) -> Result<(), MailerError> {
        if self.name.trim().is_empty() {
            return Err(MailerError::Configuration(
                "SENDER profile has an empty name".to_string(),
            ));
        }
        if !is_deliverable_address(&self.email) {
            return Err(MailerError::Configuration(format!(
                "SENDER profile has an invalid email: {}",
                self.email
            )));
        }
        Ok(())
    }
}

/// The person who asked for the resume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterProfile {
    pub name: String,
    pub email: String,
}

impl RequesterProfile {
    /// Build a profile from raw fields, rejecting blanks and bad addresses
    pub fn new(name: Option<&str>, email: Option<&str>) -> Result<Self, MailerError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| MailerError::MalformedRecord("missing requester name".to_string()))?;
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| MailerError::MalformedRecord("missing requester email".to_string()))?;

        if !is_deliverable_address(email) {
            return Err(MailerError::MalformedRecord(format!(
                "invalid requester email: {email}"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Valid per RFC 5322 and accepted by the SMTP message builder
///
/// lettre is stricter than `email_address` (no quoted local parts, no
/// address literals); both must agree or composition fails later.
fn is_deliverable_address(email: &str) -> bool {
    email_address::EmailAddress::is_valid(email) && email.parse::<lettre::Address>().is_ok()
}

/// Raw bytes of the stored resume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Result of processing one requester record in isolated mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    /// Position of the record in the trigger batch
    pub index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub status_code: u16,

    pub message: String,
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Lambda response, shaped for API Gateway proxy integrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,

    pub body: String,

    /// Per-record results (isolated batches only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<RecordOutcome>,
}

impl HandlerResponse {
    pub fn success() -> Self {
        Self {
            status_code: STATUS_OK,
            body: "Email with attachment sent successfully.".to_string(),
            results: vec![],
        }
    }

    pub fn from_error(err: &MailerError) -> Self {
        Self {
            status_code: err.status_code(),
            body: err.public_message().to_string(),
            results: vec![],
        }
    }
}
