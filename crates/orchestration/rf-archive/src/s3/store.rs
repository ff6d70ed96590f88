//! Archive store over the S3 object API.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use chrono::DateTime;
use rf_error::{ArchiveError, Result};
use rf_traits::{ArchiveStore, ListPage, ListRequest};
use rf_types::ArchiveEntry;
use tracing::trace;

/// [`ArchiveStore`] backed by an S3 bucket.
#[derive(Clone)]
pub struct S3ArchiveStore {
    client: Client,
}

impl S3ArchiveStore {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArchiveStore for S3ArchiveStore {
    async fn list_page(&self, request: &ListRequest, token: Option<String>) -> Result<ListPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&request.bucket)
            .set_prefix(request.prefix.clone())
            .set_start_after(request.start_after.clone())
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| ArchiveError::List(DisplayErrorContext(&e).to_string()))?;

        let mut entries = Vec::new();
        for obj in resp.contents.unwrap_or_default() {
            let key = obj.key.unwrap_or_default();

            let last_modified = obj
                .last_modified
                .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

            let mut entry = ArchiveEntry::new(key).with_size(obj.size.unwrap_or(0).max(0) as u64);
            entry.last_modified = last_modified;
            entries.push(entry);
        }

        let next_token = if resp.is_truncated == Some(true) {
            resp.next_continuation_token
        } else {
            None
        };

        trace!(
            bucket = %request.bucket,
            count = entries.len(),
            more = next_token.is_some(),
            "Listed archive page"
        );

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let download_error = |message: String| ArchiveError::Download {
            key: key.to_string(),
            message,
        };

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| download_error(DisplayErrorContext(&e).to_string()))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| download_error(e.to_string()))?
            .into_bytes();

        Ok(data)
    }
}
