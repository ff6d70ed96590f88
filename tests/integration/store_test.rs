//! S3 archive store and Kinesis writer tests against LocalStack.

use crate::common::{LocalStackTestContext, unique_name};
use rf_error::{ArchiveError, RfError, StreamError};
use rf_traits::{ArchiveStore, ListRequest, StreamWriter};
use rf_types::Record;

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_store_lists_in_key_order() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("rf-list");
    ctx.create_bucket(&bucket).await.unwrap();
    for key in ["events/b", "events/a", "events/c", "other/x"] {
        ctx.upload_object(&bucket, key, "{}").await.unwrap();
    }

    let store = ctx.archive_store();
    let request = ListRequest::new(&bucket)
        .with_prefix("events/")
        .with_start_after("events/a");
    let page = store.list_page(&request, None).await.unwrap();

    let keys: Vec<&str> = page.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["events/b", "events/c"]);
    assert!(page.next_token.is_none());

    let data = store.download(&bucket, "events/b").await.unwrap();
    assert_eq!(&data[..], b"{}");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_store_missing_object() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("rf-missing");
    ctx.create_bucket(&bucket).await.unwrap();

    let result = ctx.archive_store().download(&bucket, "nope").await;
    assert!(matches!(
        result,
        Err(RfError::Archive(ArchiveError::Download { .. }))
    ));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_kinesis_writer_round_trip() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let stream_name = unique_name("rf-writer");
    ctx.create_stream(&stream_name).await.unwrap();

    let writer = ctx.stream_writer(&stream_name);
    let records = vec![
        Record::new(r#"{"id":"a"}"#, "a").unwrap(),
        Record::new(r#"{"id":"b"}"#, "b").unwrap(),
    ];
    let outcome = writer.put_records(&records).await.unwrap();
    assert_eq!(outcome.failed_count, 0);
    assert!(outcome.failed_positions().is_empty());

    let stored = ctx.read_stream(&stream_name).await.unwrap();
    let keys: Vec<&str> = stored.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);

    ctx.delete_stream(&stream_name).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_kinesis_writer_missing_stream() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let writer = ctx.stream_writer(&unique_name("rf-absent"));
    let records = vec![Record::new("{}", "k").unwrap()];

    let result = writer.put_records(&records).await;
    assert!(matches!(
        result,
        Err(RfError::Stream(StreamError::NotFound(_)))
    ));
}
