//! Kinesis Data Streams writer.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::error::{DisplayErrorContext, SdkError};
use aws_sdk_kinesis::operation::put_records::PutRecordsError;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use rf_error::{Result, StreamError};
use rf_traits::StreamWriter;
use rf_types::{PutRecordsOutcome, Record, RecordOutcome};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Configuration for Kinesis access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KinesisConfig {
    /// Target stream name
    pub stream_name: String,

    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack)
    pub endpoint: Option<String>,

    /// Explicit AWS access key (optional)
    pub access_key: Option<String>,

    /// Explicit AWS secret key (optional)
    pub secret_key: Option<String>,

    /// AWS profile name (optional)
    pub profile: Option<String>,
}

impl KinesisConfig {
    /// Create a configuration for a stream.
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Default::default()
        }
    }

    /// Set a custom endpoint (for LocalStack).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the AWS profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.stream_name.is_empty() {
            return Err("stream name is required".to_string());
        }
        Ok(())
    }
}

/// Create a Kinesis client from configuration.
pub async fn create_kinesis_client(config: &KinesisConfig) -> Client {
    use aws_config::Region;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        let credentials = aws_sdk_kinesis::config::Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "replayflow",
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    let aws_config = loader.load().await;
    Client::new(&aws_config)
}

/// [`StreamWriter`] over the Kinesis `PutRecords` API.
#[derive(Clone)]
pub struct KinesisStream {
    client: Client,
    stream_name: String,
}

impl KinesisStream {
    pub fn new(client: Client, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
        }
    }
}

#[async_trait]
impl StreamWriter for KinesisStream {
    async fn put_records(&self, records: &[Record]) -> Result<PutRecordsOutcome> {
        let entries = records
            .iter()
            .map(|record| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(record.data().to_vec()))
                    .partition_key(record.partition_key())
                    .build()
                    .map_err(|e| StreamError::InvalidRequest(e.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let output = self
            .client
            .put_records()
            .stream_name(&self.stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| map_put_records_error(&self.stream_name, e))?;

        let outcomes: Vec<RecordOutcome> = output
            .records()
            .iter()
            .map(|entry| match entry.error_code() {
                Some(code) => {
                    RecordOutcome::failed(code, entry.error_message().unwrap_or_default())
                }
                None => RecordOutcome::accepted(
                    entry.shard_id().unwrap_or_default(),
                    entry.sequence_number().unwrap_or_default(),
                ),
            })
            .collect();

        let mut outcome = PutRecordsOutcome::from_records(outcomes);
        if let Some(reported) = output.failed_record_count() {
            outcome.failed_count = outcome.failed_count.max(reported.max(0) as usize);
        }

        trace!(
            stream = %self.stream_name,
            records = records.len(),
            failed = outcome.failed_count,
            "PutRecords completed"
        );

        Ok(outcome)
    }

    fn target(&self) -> &str {
        &self.stream_name
    }
}

fn map_put_records_error(stream: &str, err: SdkError<PutRecordsError>) -> StreamError {
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::ServiceError(service) => {
            let e = service.err();
            if e.is_provisioned_throughput_exceeded_exception() || e.is_kms_throttling_exception()
            {
                StreamError::Throttled(message)
            } else if e.is_resource_not_found_exception() {
                StreamError::NotFound(stream.to_string())
            } else if e.is_access_denied_exception() || e.is_kms_access_denied_exception() {
                StreamError::AccessDenied(message)
            } else if e.is_invalid_argument_exception() {
                StreamError::InvalidRequest(message)
            } else {
                StreamError::Unavailable(message)
            }
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            StreamError::Connection(message)
        }
        _ => StreamError::Unavailable(message),
    }
}
