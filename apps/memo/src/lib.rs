//! Spaced-repetition review queue over a folder of problem files.
//!
//! [`Session`] is the entry point for a presentation layer: `next` grades
//! the shown problem and picks the following one, `rescan` registers new
//! files under the store folder.

pub mod commands;
pub mod config;
pub mod db;
pub mod events;
pub mod scanner;
pub mod session;
pub mod state;

pub use config::Settings;
pub use events::{Notifier, NullNotifier, Progress};
pub use scanner::ScanReport;
pub use session::{NextOutcome, RescanStatus, Session, SessionState, StudySummary};
pub use state::{StoreHandle, StoreState};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Log lines go to stderr so they do not mix with the review output.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
