//! Settla Daemon
//!
//! Replays a call journal against a fresh trade factory and OTC pool and
//! prints every committed event as a JSON line.
//!
//! # Usage
//!
//! ```bash
//! SETTLA_ENV=test SETTLA_JOURNAL=calls.jsonl cargo run -p settlad
//! ```
//!
//! # Environment Variables
//!
//! - `SETTLA_ENV`: Environment (test, development, production)
//! - `SETTLA_GOVERNOR`: Genesis governor address (required outside test)
//! - `SETTLA_FEE_RECEIVER`: Fee receiver (default: governor)
//! - `SETTLA_MAX_FEE_PERCENT`: Fee ceiling in percent (default: 0)
//! - `SETTLA_OTC_PROVIDER`: OTC provider address (optional)
//! - `SETTLA_JOURNAL`: Path of the JSONL call journal

use settlad::{event_line, run_journal, Config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the event stream
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("settlad=info".parse()?))
        .init();

    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        governor = %config.governance.governor,
        max_fee = %config.governance.max_fee,
        "Settla Daemon"
    );

    let (summary, events) = run_journal(&config).await?;
    for event in &events {
        println!("{}", event_line(event));
    }

    info!(applied = summary.applied, rejected = summary.rejected, events = events.len(), "Done");
    Ok(())
}
