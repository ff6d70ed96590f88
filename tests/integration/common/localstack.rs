//! LocalStack test context and utilities.

use aws_sdk_kinesis::Client as KinesisClient;
use aws_sdk_kinesis::types::{ShardIteratorType, StreamStatus};
use aws_sdk_s3::Client as S3Client;
use rf_archive::{S3ArchiveStore, S3Config, create_s3_client};
use rf_publisher::{KinesisConfig, KinesisStream, create_kinesis_client};
use std::time::Duration;

/// LocalStack test context providing S3 and Kinesis clients.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub kinesis: KinesisClient,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let s3 = create_s3_client(&Self::s3_config(&endpoint, &region)).await;
        let kinesis = create_kinesis_client(
            &KinesisConfig::new("unused")
                .with_endpoint(&endpoint)
                .with_region(&region)
                .with_credentials("test", "test"),
        )
        .await;

        Self {
            s3,
            kinesis,
            endpoint,
            region,
        }
    }

    fn s3_config(endpoint: &str, region: &str) -> S3Config {
        S3Config::new()
            .with_endpoint(endpoint)
            .with_region(region)
            .with_credentials("test", "test")
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        // Both services must answer; this fails quickly if LocalStack isn't running
        self.s3.list_buckets().send().await.is_ok()
            && self.kinesis.list_streams().send().await.is_ok()
    }

    /// Archive store over the LocalStack S3 endpoint.
    pub fn archive_store(&self) -> S3ArchiveStore {
        S3ArchiveStore::new(self.s3.clone())
    }

    /// Stream writer over the LocalStack Kinesis endpoint.
    pub fn stream_writer(&self, stream_name: &str) -> KinesisStream {
        KinesisStream::new(self.kinesis.clone(), stream_name)
    }

    /// Create an S3 bucket for testing.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if !exists {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Upload an archive object.
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: &str,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.as_bytes().to_vec().into())
            .content_type("application/json")
            .send()
            .await?;
        Ok(())
    }

    /// Create a single-shard stream and wait until it is active.
    pub async fn create_stream(&self, name: &str) -> Result<(), aws_sdk_kinesis::Error> {
        self.kinesis
            .create_stream()
            .stream_name(name)
            .shard_count(1)
            .send()
            .await?;

        for _ in 0..50 {
            let summary = self
                .kinesis
                .describe_stream_summary()
                .stream_name(name)
                .send()
                .await?;
            let active = summary
                .stream_description_summary()
                .is_some_and(|s| s.stream_status() == &StreamStatus::Active);
            if active {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(())
    }

    /// Delete a stream.
    pub async fn delete_stream(&self, name: &str) -> Result<(), aws_sdk_kinesis::Error> {
        self.kinesis
            .delete_stream()
            .stream_name(name)
            .enforce_consumer_deletion(true)
            .send()
            .await?;
        Ok(())
    }

    /// Read every record currently in the stream as `(partition key, data)`.
    pub async fn read_stream(
        &self,
        name: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, aws_sdk_kinesis::Error> {
        let shards = self.kinesis.list_shards().stream_name(name).send().await?;
        let mut records = Vec::new();

        for shard in shards.shards() {
            let iterator = self
                .kinesis
                .get_shard_iterator()
                .stream_name(name)
                .shard_id(shard.shard_id())
                .shard_iterator_type(ShardIteratorType::TrimHorizon)
                .send()
                .await?;
            let mut next = iterator.shard_iterator().map(String::from);

            while let Some(it) = next.take() {
                let output = self
                    .kinesis
                    .get_records()
                    .shard_iterator(it)
                    .limit(1000)
                    .send()
                    .await?;
                for record in output.records() {
                    records.push((
                        record.partition_key().unwrap_or_default().to_string(),
                        record.data().as_ref().to_vec(),
                    ));
                }
                // An empty page means the shard has been read up to its tip
                if !output.records().is_empty() {
                    next = output.next_shard_iterator().map(String::from);
                }
            }
        }

        Ok(records)
    }
}

/// Generate `count` JSON records written back to back, the way a delivery
/// stream archives them.
pub fn generate_concatenated_json(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| {
            serde_json::json!({
                "id": format!("{prefix}-{i}"),
                "user": {"id": format!("user-{}", i % 3)},
                "value": i,
            })
            .to_string()
        })
        .collect()
}

/// Unique resource name per test run.
pub fn unique_name(base: &str) -> String {
    format!("{base}-{}", chrono::Utc::now().timestamp_millis())
}
