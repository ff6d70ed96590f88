//! replayflow CLI
//!
//! Replays an S3 archive of stream records into a Kinesis stream.

use clap::Parser;
use rf_cli_common::{format_bytes, format_duration, format_number, init_logging};
use tracing::info;

mod args;
mod config;
mod run;

use args::Cli;
use config::{FileConfig, Settings};

/// Exit code for a run that finished but did not cover the whole range.
const EXIT_PARTIAL: i32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let (file, config_path) = FileConfig::load(args.config.as_deref())?;
    let settings = Settings::resolve(args, file)?;

    init_logging(settings.log_level, settings.log_format)?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "Loaded config file");
    }

    let snapshot = run::execute(settings).await?;

    // Report results to stderr
    eprintln!();
    eprintln!("Replay completed:");
    eprintln!("  Scan:              {}", snapshot.scan);
    eprintln!(
        "  Objects listed:    {}",
        format_number(snapshot.archive.keys_listed)
    );
    eprintln!(
        "  Objects read:      {}",
        format_number(snapshot.archive.objects_downloaded)
    );
    eprintln!(
        "  Bytes read:        {}",
        format_bytes(snapshot.archive.bytes_downloaded)
    );
    eprintln!(
        "  Records parsed:    {}",
        format_number(snapshot.parser.records_emitted)
    );
    eprintln!(
        "  Records dropped:   {}",
        format_number(snapshot.parser.dropped())
    );
    eprintln!(
        "  Records published: {}",
        format_number(snapshot.publisher.records_published)
    );
    eprintln!(
        "  Batches published: {}",
        format_number(snapshot.publisher.batches_published)
    );

    if let Ok(duration) = snapshot.duration().to_std() {
        eprintln!("  Duration:          {}", format_duration(duration));
        if snapshot.publisher.records_published > 0 {
            eprintln!(
                "  Throughput:        {} records/sec",
                format_number(snapshot.records_per_sec() as u64)
            );
        }
    }

    let retries = snapshot.archive.download_failures
        + snapshot.publisher.request_failures
        + snapshot.publisher.partial_retries;
    if retries > 0 {
        eprintln!(
            "  Retries:           {} download, {} request, {} partial",
            snapshot.archive.download_failures,
            snapshot.publisher.request_failures,
            snapshot.publisher.partial_retries
        );
    }

    if snapshot.is_partial() {
        eprintln!("  Incomplete:        scan {}", snapshot.scan);
        std::process::exit(EXIT_PARTIAL);
    }

    Ok(())
}
