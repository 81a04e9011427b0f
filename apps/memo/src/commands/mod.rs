//! Terminal commands: the presentation layer of the `memo` binary.

pub mod rescan;
pub mod review;
pub mod stats;

pub use rescan::rescan;
pub use review::{review, TerminalNotifier};
pub use stats::stats;
