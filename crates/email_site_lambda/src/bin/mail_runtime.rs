use chrono::Utc;
use email_site_lambda::adapters::document_store::DynamoRecordStore;
use email_site_lambda::adapters::object_store::S3BlobStore;
use email_site_lambda::config::RuntimeConfig;
use email_site_lambda::handlers::handle_invocation;
use email_site_lambda::handlers::ingest::IngestConfig;
use email_site_lambda::handlers::retrieve::RetrieveConfig;
use email_site_lambda::telemetry::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

struct RuntimeDependencies {
    config: RuntimeConfig,
    retrieve_config: RetrieveConfig,
    records: DynamoRecordStore,
    blobs: S3BlobStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let ingest_config = IngestConfig::from_runtime(&deps.config, Utc::now().to_rfc3339());
    let response = handle_invocation(
        &event.payload,
        &ingest_config,
        &deps.retrieve_config,
        &deps.records,
        &deps.blobs,
    )?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env()?;
    init_logging(&config.log_level);
    info!(
        component = "mail_runtime",
        event = "runtime_started",
        docs_table = %config.docs_table_name,
        email_bucket = %config.email_bucket_name,
        static_bucket = config.static_bucket_name.as_deref().unwrap_or("unset"),
        public_url = config.public_url.as_deref().unwrap_or("unset"),
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        retrieve_config: RetrieveConfig::from_runtime(&config),
        records: DynamoRecordStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            config.docs_table_name.clone(),
        ),
        blobs: S3BlobStore::new(
            aws_sdk_s3::Client::new(&aws_config),
            config.email_bucket_name.clone(),
        ),
        config,
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| handle_request(event, deps))).await
}
