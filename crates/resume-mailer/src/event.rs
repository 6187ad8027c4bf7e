//! Trigger payload parsing
//!
//! Three shapes are accepted:
//! - a DynamoDB stream batch (`Records[].dynamodb.NewImage`)
//! - a direct request `{"requester": {"name", "email"}}`
//! - an API Gateway proxy event whose `body` string holds either a
//!   `requester` object or top-level `name` / `email` fields
//!
//! Records are kept raw until the dispatch loop reaches them, so a malformed
//! record only fails when it is processed.

use serde_json::Value;

use crate::error::MailerError;
use crate::types::RequesterProfile;

/// One unit of work from the trigger
#[derive(Debug, Clone, PartialEq)]
pub enum RequesterRecord {
    /// `NewImage` map of a stream record, typed attribute values (`{"S": ..}`)
    StreamImage(Value),
    /// Plain `{name, email}` object
    Direct(Value),
}

impl RequesterRecord {
    /// Extract the requester, failing on missing or non-string fields
    pub fn requester(&self) -> Result<RequesterProfile, MailerError> {
        match self {
            RequesterRecord::StreamImage(image) => RequesterProfile::new(
                string_attribute(image, "name"),
                string_attribute(image, "email"),
            ),
            RequesterRecord::Direct(object) => RequesterProfile::new(
                object.get("name").and_then(Value::as_str),
                object.get("email").and_then(Value::as_str),
            ),
        }
    }
}

fn string_attribute<'a>(image: &'a Value, field: &str) -> Option<&'a str> {
    image.get(field)?.get("S")?.as_str()
}

/// Parsed trigger event
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub records: Vec<RequesterRecord>,
}

impl TriggerEvent {
    /// Classify a raw Lambda payload
    pub fn from_value(payload: &Value) -> Result<Self, MailerError> {
        if let Some(records) = payload.get("Records") {
            let records = records.as_array().ok_or_else(|| {
                MailerError::MalformedRecord("Records is not an array".to_string())
            })?;
            return Ok(Self {
                records: records.iter().map(stream_record).collect(),
            });
        }

        if let Some(requester) = payload.get("requester") {
            return Ok(Self {
                records: vec![RequesterRecord::Direct(requester.clone())],
            });
        }

        if let Some(body) = payload.get("body") {
            let body = match body {
                Value::String(raw) => serde_json::from_str(raw).map_err(|e| {
                    MailerError::MalformedRecord(format!("request body is not JSON: {e}"))
                })?,
                Value::Object(_) => body.clone(),
                _ => {
                    return Err(MailerError::MalformedRecord(
                        "request body is empty".to_string(),
                    ))
                }
            };
            let requester = body.get("requester").cloned().unwrap_or(body);
            return Ok(Self {
                records: vec![RequesterRecord::Direct(requester)],
            });
        }

        Err(MailerError::MalformedRecord(
            "unrecognized trigger payload".to_string(),
        ))
    }
}

/// A stream record without a `NewImage` (e.g. REMOVE) becomes an empty image,
/// which then fails extraction like any other record missing its fields.
fn stream_record(record: &Value) -> RequesterRecord {
    let image = record
        .get("dynamodb")
        .and_then(|d| d.get("NewImage"))
        .cloned()
        .unwrap_or(Value::Null);
    RequesterRecord::StreamImage(image)
}
