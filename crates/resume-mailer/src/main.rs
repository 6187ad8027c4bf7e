//! AWS Lambda entry point for the resume mailer
//!
//! Accepts DynamoDB stream batches and API Gateway requests (see
//! `resume_mailer::event`) and always answers with a status/body pair.
//!
//! ## Deployment
//!
//! ```bash
//! # Install cargo-lambda
//! cargo install cargo-lambda
//!
//! # Build for ARM64
//! cargo lambda build --release --arm64
//!
//! # Deploy
//! cargo lambda deploy --iam-role arn:aws:iam::ACCOUNT:role/resume-mailer-lambda
//! ```

use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use resume_mailer::{Dispatcher, HandlerResponse, MailerConfig, S3DocumentStore, SmtpMailer};
use serde_json::Value;
use tracing::{info, instrument};

type ResumeDispatcher = Dispatcher<S3DocumentStore, SmtpMailer>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Local runs read a .env file; Lambda provides the environment directly
    dotenvy::dotenv().ok();

    // See: https://docs.aws.amazon.com/lambda/latest/dg/rust-logging.html
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false) // CloudWatch doesn't support ANSI colors
        .with_current_span(false)
        .without_time() // CloudWatch adds ingestion time
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("resume_mailer=info".parse()?),
        )
        .init();

    let config = MailerConfig::from_env().context("loading mailer configuration")?;
    info!(
        version = resume_mailer::VERSION,
        relay = %config.relay.host,
        batch_policy = ?config.batch_policy,
        fetch_policy = ?config.fetch_policy,
        "Starting resume mailer Lambda"
    );

    let mailer = SmtpMailer::new(config.relay.clone());
    let store = S3DocumentStore::new().await;
    let dispatcher = Arc::new(Dispatcher::new(config, store, mailer));

    run(service_fn(|event: LambdaEvent<Value>| {
        let dispatcher = dispatcher.clone();
        async move { handler(event, dispatcher).await }
    }))
    .await
}

#[instrument(skip(event, dispatcher), fields(request_id = %event.context.request_id))]
async fn handler(
    event: LambdaEvent<Value>,
    dispatcher: Arc<ResumeDispatcher>,
) -> Result<HandlerResponse, Error> {
    let response = dispatcher.handle(&event.payload).await;
    info!(
        status = response.status_code,
        body = %response.body,
        "Invocation finished"
    );
    Ok(response)
}
