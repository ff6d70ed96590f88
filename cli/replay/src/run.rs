//! Main execution logic for the replayflow CLI.

use crate::config::Settings;
use anyhow::{Context, Result};
use rf_archive::{S3ArchiveStore, create_s3_client};
use rf_parser::JsonSchemaValidator;
use rf_publisher::{KinesisStream, create_kinesis_client};
use rf_replay::{Replay, ReplaySnapshot};
use std::sync::Arc;
use tracing::info;

/// Build the AWS-backed stages and run the replay.
pub async fn execute(settings: Settings) -> Result<ReplaySnapshot> {
    let Settings {
        replay: config,
        s3,
        kinesis,
        schema,
        ..
    } = settings;

    let s3_client = create_s3_client(&s3).await;
    let store = Arc::new(S3ArchiveStore::new(s3_client));

    let kinesis_client = create_kinesis_client(&kinesis).await;
    let stream = Arc::new(KinesisStream::new(kinesis_client, kinesis.stream_name.clone()));

    let mut replay = Replay::new(config, store, stream);
    if let Some(reference) = schema {
        let validator = JsonSchemaValidator::from_reference(&reference)
            .with_context(|| format!("failed to load JSON schema {reference}"))?;
        info!(schema = %reference, "Validating records against schema");
        replay = replay.with_validator(Arc::new(validator));
    }

    Ok(replay.run().await?)
}
