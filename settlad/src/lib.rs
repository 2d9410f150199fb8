//! Settla Daemon Library
//!
//! Host for the trade factory and the OTC pool: loads configuration, builds
//! both over one in-memory store and replays a call journal against them.
//!
//! # Components
//!
//! - **Config**: Environment-based configuration
//! - **Replay**: Journal format and the replayer
//!
//! # Example
//!
//! ```rust,ignore
//! use settlad::{run_journal, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let (summary, events) = run_journal(&config).await.expect("Replay error");
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod replay;

pub use config::{Config, Environment, GovernanceConfig};
pub use error::{DaemonError, DaemonResult};
pub use replay::{start_time, Call, Operation, ReplaySummary, Replayer};

use serde_json::json;
use settla_store::StoredEvent;

/// Replay the configured journal against a fresh system.
///
/// The clock starts at [`start_time`] of the journal, so the outcome depends
/// on the journal alone. Returns the counters and every committed event.
pub async fn run_journal(config: &Config) -> DaemonResult<(ReplaySummary, Vec<StoredEvent>)> {
    let path = config
        .journal
        .as_ref()
        .ok_or_else(|| DaemonError::Config("SETTLA_JOURNAL is not set".to_string()))?;
    let journal = tokio::fs::read_to_string(path).await?;

    let replayer = Replayer::new(config, start_time(&journal))?;
    let summary = replayer.replay(&journal)?;
    let events = replayer.events_after(0)?;
    Ok((summary, events))
}

/// One output line per event
pub fn event_line(event: &StoredEvent) -> String {
    json!({ "seq": event.seq, "event": event.event }).to_string()
}
