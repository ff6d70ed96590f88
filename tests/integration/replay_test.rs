//! End-to-end replay from S3 to Kinesis using LocalStack.

use crate::common::{LocalStackTestContext, generate_concatenated_json, unique_name};
use rf_archive::{ArchiveConfig, ScanOutcome};
use rf_parser::ParserConfig;
use rf_publisher::PublisherConfig;
use rf_replay::{Replay, ReplayConfig};
use std::sync::Arc;
use std::time::Duration;

fn config(bucket: &str) -> ReplayConfig {
    ReplayConfig::new(
        ArchiveConfig::new(bucket).with_prefix("events/"),
        ParserConfig::new("user.id"),
        PublisherConfig::new()
            .with_batch_window(Duration::from_millis(200))
            .with_backoff_interval(Duration::from_millis(100)),
    )
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_replay_archive_into_stream() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("rf-replay");
    let stream_name = unique_name("rf-replay");
    ctx.create_bucket(&bucket).await.unwrap();
    ctx.create_stream(&stream_name).await.unwrap();

    for hour in 0..3 {
        let key = format!("events/2024/01/01/{hour:02}/part");
        let body = generate_concatenated_json(&format!("h{hour}"), 10);
        ctx.upload_object(&bucket, &key, &body).await.unwrap();
    }

    let replay = Replay::new(
        config(&bucket),
        Arc::new(ctx.archive_store()),
        Arc::new(ctx.stream_writer(&stream_name)),
    );
    let snapshot = replay.run().await.unwrap();

    assert_eq!(snapshot.scan, ScanOutcome::Exhausted);
    assert_eq!(snapshot.archive.objects_downloaded, 3);
    assert_eq!(snapshot.parser.records_emitted, 30);
    assert_eq!(snapshot.publisher.records_published, 30);
    assert!(!snapshot.is_partial());

    let stored = ctx.read_stream(&stream_name).await.unwrap();
    assert_eq!(stored.len(), 30);
    for (key, data) in &stored {
        let doc: serde_json::Value = serde_json::from_slice(data).unwrap();
        assert_eq!(doc["user"]["id"].as_str(), Some(key.as_str()));
    }

    ctx.delete_stream(&stream_name).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_replay_window_bounds() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("rf-window");
    let stream_name = unique_name("rf-window");
    ctx.create_bucket(&bucket).await.unwrap();
    ctx.create_stream(&stream_name).await.unwrap();

    for hour in 0..4 {
        let key = format!("events/{hour:02}");
        let body = generate_concatenated_json(&format!("h{hour}"), 2);
        ctx.upload_object(&bucket, &key, &body).await.unwrap();
    }

    let mut config = config(&bucket);
    config.archive = config
        .archive
        .with_start_after("events/00")
        .with_stop_at("events/03");

    let snapshot = Replay::new(
        config,
        Arc::new(ctx.archive_store()),
        Arc::new(ctx.stream_writer(&stream_name)),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(snapshot.scan, ScanOutcome::StoppedAt("events/03".to_string()));
    assert_eq!(snapshot.archive.objects_downloaded, 2);
    assert_eq!(ctx.read_stream(&stream_name).await.unwrap().len(), 4);

    ctx.delete_stream(&stream_name).await.ok();
}
