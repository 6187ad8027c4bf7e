//! Dispatch loop
//!
//! Walks the requester records of one invocation in order, running
//! fetch -> compose -> deliver for each, and folds the outcome into a single
//! [`HandlerResponse`]. Errors never leave this module.

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::compose::{compose, ComposeOptions};
use crate::config::{BatchPolicy, DocumentLocation, FetchPolicy, MailerConfig};
use crate::delivery::Mailer;
use crate::error::{MailerError, STATUS_OK};
use crate::event::{RequesterRecord, TriggerEvent};
use crate::storage::{fetch_document, DocumentStore};
use crate::types::{Document, HandlerResponse, RecordOutcome, SenderProfile};

/// Stateless handler wired to its store and mailer
pub struct Dispatcher<S, M> {
    sender: SenderProfile,
    document: DocumentLocation,
    compose: ComposeOptions,
    fetch_policy: FetchPolicy,
    batch_policy: BatchPolicy,
    store: S,
    mailer: M,
}

impl<S, M> Dispatcher<S, M>
where
    S: DocumentStore,
    M: Mailer,
{
    pub fn new(config: MailerConfig, store: S, mailer: M) -> Self {
        Self {
            sender: config.sender,
            document: config.document,
            compose: config.compose,
            fetch_policy: config.fetch_policy,
            batch_policy: config.batch_policy,
            store,
            mailer,
        }
    }

    /// Handle a raw Lambda payload
    #[instrument(skip(self, payload), fields(policy = ?self.batch_policy))]
    pub async fn handle(&self, payload: &Value) -> HandlerResponse {
        let event = match TriggerEvent::from_value(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejected trigger payload");
                return HandlerResponse::from_error(&e);
            }
        };

        info!(records = event.records.len(), "Processing trigger");

        match self.batch_policy {
            BatchPolicy::FailFast => self.run_fail_fast(&event).await,
            BatchPolicy::Isolated => self.run_isolated(&event).await,
        }
    }

    async fn run_fail_fast(&self, event: &TriggerEvent) -> HandlerResponse {
        let mut cache = None;
        for (index, record) in event.records.iter().enumerate() {
            if let Err(e) = self.process_record(record, &mut cache).await {
                error!(index, error = %e, "Aborting batch");
                return HandlerResponse::from_error(&e);
            }
        }
        HandlerResponse::success()
    }

    async fn run_isolated(&self, event: &TriggerEvent) -> HandlerResponse {
        let mut cache = None;
        let mut results = Vec::with_capacity(event.records.len());

        for (index, record) in event.records.iter().enumerate() {
            let outcome = match self.process_record(record, &mut cache).await {
                Ok(email) => RecordOutcome {
                    index,
                    email: Some(email),
                    status_code: STATUS_OK,
                    message: "Email sent.".to_string(),
                },
                Err(e) => {
                    error!(index, error = %e, "Record failed");
                    RecordOutcome {
                        index,
                        email: record.requester().ok().map(|r| r.email),
                        status_code: e.status_code(),
                        message: e.public_message().to_string(),
                    }
                }
            };
            results.push(outcome);
        }

        aggregate(results)
    }

    /// Fetch, compose and deliver for one record; returns the recipient
    async fn process_record(
        &self,
        record: &RequesterRecord,
        cache: &mut Option<Option<Document>>,
    ) -> Result<String, MailerError> {
        let requester = record.requester()?;
        let document = self.document(cache).await?;

        let message = compose(&self.sender, &requester, document.as_ref(), &self.compose)?;
        self.mailer.deliver(&self.sender, message).await?;

        info!(to = %requester.email, "Resume delivered");
        Ok(requester.email)
    }

    /// Resolve the document according to the fetch policy
    async fn document(
        &self,
        cache: &mut Option<Option<Document>>,
    ) -> Result<Option<Document>, MailerError> {
        match self.fetch_policy {
            FetchPolicy::PerMessage => fetch_document(&self.store, &self.document).await,
            FetchPolicy::OncePerInvocation => {
                if let Some(document) = cache {
                    return Ok(document.clone());
                }
                let document = fetch_document(&self.store, &self.document).await?;
                *cache = Some(document.clone());
                Ok(document)
            }
        }
    }
}

/// Fold per-record outcomes into one response; the most severe status wins
fn aggregate(results: Vec<RecordOutcome>) -> HandlerResponse {
    let sent = results.iter().filter(|r| r.is_success()).count();
    let total = results.len();

    if sent == total {
        return HandlerResponse {
            results,
            ..HandlerResponse::success()
        };
    }

    let status_code = results
        .iter()
        .map(|r| r.status_code)
        .max()
        .unwrap_or(STATUS_OK);

    HandlerResponse {
        status_code,
        body: format!("{sent} of {total} emails sent."),
        results,
    }
}
