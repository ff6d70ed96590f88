//! Integration tests for replayflow.
//!
//! These tests require LocalStack with S3 and Kinesis enabled. They are marked
//! as `#[ignore]` by default to avoid running them in CI without proper setup.
//!
//! ## Running Integration Tests
//!
//! 1. Start LocalStack:
//!    ```bash
//!    docker run -d -p 4566:4566 -e SERVICES=s3,kinesis localstack/localstack
//!    ```
//!
//! 2. Run the integration tests:
//!    ```bash
//!    LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test -p integration-tests -- --ignored
//!    ```

mod common;
mod replay_test;
mod store_test;
