//! End-to-end dispatch tests with in-memory storage and relay

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use resume_mailer::{
    BatchPolicy, ComposeOptions, ComposedMessage, Dispatcher, DocumentLocation, DocumentStore,
    FetchPolicy, Mailer, MailerConfig, MailerError, RelayConfig, SenderProfile,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct MemoryStore {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, MailerError> {
        assert_eq!((bucket, key), ("resumes", "jane.pdf"));
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(b"%PDF-1.7 resume".to_vec())
    }
}

#[derive(Clone, Default)]
struct RecordingRelay {
    delivered: Arc<Mutex<Vec<ComposedMessage>>>,
}

#[async_trait]
impl Mailer for RecordingRelay {
    async fn deliver(
        &self,
        sender: &SenderProfile,
        message: ComposedMessage,
    ) -> Result<(), MailerError> {
        assert_eq!(sender.email, "jane@example.com");
        self.delivered.lock().unwrap().push(message);
        Ok(())
    }
}

fn config(batch_policy: BatchPolicy) -> MailerConfig {
    MailerConfig {
        sender: SenderProfile {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "555-0100".to_string(),
            github_url: "https://github.com/janedoe".to_string(),
            linked_in_url: "https://linkedin.com/in/janedoe".to_string(),
        },
        document: DocumentLocation {
            bucket: Some("resumes".to_string()),
            key: Some("jane.pdf".to_string()),
        },
        relay: RelayConfig::default(),
        compose: ComposeOptions::default(),
        fetch_policy: FetchPolicy::OncePerInvocation,
        batch_policy,
    }
}

fn record(name: Option<&str>, email: Option<&str>) -> Value {
    let mut image = serde_json::Map::new();
    if let Some(name) = name {
        image.insert("name".to_string(), json!({ "S": name }));
    }
    if let Some(email) = email {
        image.insert("email".to_string(), json!({ "S": email }));
    }
    json!({ "eventName": "INSERT", "dynamodb": { "NewImage": image } })
}

fn setup(
    policy: BatchPolicy,
) -> (
    Dispatcher<MemoryStore, RecordingRelay>,
    MemoryStore,
    RecordingRelay,
) {
    let store = MemoryStore::default();
    let relay = RecordingRelay::default();
    let dispatcher = Dispatcher::new(config(policy), store.clone(), relay.clone());
    (dispatcher, store, relay)
}

fn recipients(relay: &RecordingRelay) -> Vec<String> {
    relay
        .delivered
        .lock()
        .unwrap()
        .iter()
        .map(|m| m.to.clone())
        .collect()
}

#[tokio::test]
async fn two_healthy_records_are_both_delivered() {
    let (dispatcher, store, relay) = setup(BatchPolicy::FailFast);
    let payload = json!({
        "Records": [
            record(Some("Sam"), Some("sam@hiring.example")),
            record(Some("Alex"), Some("alex@hiring.example")),
        ]
    });

    let response = dispatcher.handle(&payload).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "Email with attachment sent successfully.");
    assert_eq!(
        recipients(&relay),
        vec!["sam@hiring.example", "alex@hiring.example"]
    );
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);

    let delivered = relay.delivered.lock().unwrap();
    assert!(delivered
        .iter()
        .all(|m| m.attachment.as_deref() == Some("Jane Doe_Resume.pdf")));
}

#[tokio::test]
async fn malformed_record_aborts_the_rest_of_the_batch() {
    let (dispatcher, _store, relay) = setup(BatchPolicy::FailFast);
    let payload = json!({
        "Records": [
            record(Some("Sam"), Some("sam@hiring.example")),
            record(Some("No Email"), None),
            record(Some("Alex"), Some("alex@hiring.example")),
        ]
    });

    let response = dispatcher.handle(&payload).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, "Invalid requester information.");
    assert_eq!(recipients(&relay), vec!["sam@hiring.example"]);
}

#[tokio::test]
async fn isolated_batch_continues_past_malformed_record() {
    let (dispatcher, _store, relay) = setup(BatchPolicy::Isolated);
    let payload = json!({
        "Records": [
            record(Some("Sam"), Some("sam@hiring.example")),
            record(Some("No Email"), None),
            record(Some("Alex"), Some("alex@hiring.example")),
        ]
    });

    let response = dispatcher.handle(&payload).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, "2 of 3 emails sent.");
    assert_eq!(
        recipients(&relay),
        vec!["sam@hiring.example", "alex@hiring.example"]
    );
    let statuses: Vec<u16> = response.results.iter().map(|r| r.status_code).collect();
    assert_eq!(statuses, vec![200, 400, 200]);
}

#[tokio::test]
async fn api_gateway_request_is_delivered() {
    let (dispatcher, _store, relay) = setup(BatchPolicy::FailFast);
    let payload = json!({
        "httpMethod": "POST",
        "body": r#"{"requester": {"name": "Sam", "email": "sam@hiring.example"}}"#
    });

    let response = dispatcher.handle(&payload).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(recipients(&relay), vec!["sam@hiring.example"]);
}

#[tokio::test]
async fn response_serializes_for_api_gateway() {
    let (dispatcher, _store, _relay) = setup(BatchPolicy::FailFast);
    let response = dispatcher.handle(&json!({ "Records": [] })).await;

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(
        body,
        json!({ "statusCode": 200, "body": "Email with attachment sent successfully." })
    );
}

#[tokio::test]
async fn address_literal_is_bad_request() {
    let (dispatcher, _store, relay) = setup(BatchPolicy::FailFast);
    let payload = json!({
        "Records": [record(Some("Sam"), Some("sam@[127.0.0.1]"))]
    });

    let response = dispatcher.handle(&payload).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, "Invalid requester information.");
    assert!(recipients(&relay).is_empty());
}

#[tokio::test]
async fn lambda_event_payload_is_dispatched() {
    let (dispatcher, _store, relay) = setup(BatchPolicy::FailFast);
    let event = lambda_runtime::LambdaEvent::new(
        json!({ "Records": [record(Some("Sam"), Some("sam@hiring.example"))] }),
        lambda_runtime::Context::default(),
    );

    let response = dispatcher.handle(&event.payload).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(recipients(&relay), vec!["sam@hiring.example"]);
}
