//! Problem discovery command.

use crate::events::Notifier;
use crate::session::{RescanStatus, Session};
use std::io::Write;

/// Rescan the store folder and describe what happened.
pub fn rescan<N: Notifier, W: Write>(
    session: &mut Session<N>,
    out: &mut W,
) -> anyhow::Result<RescanStatus> {
    let status = session.rescan();
    match &status {
        RescanStatus::Scanned(report) => {
            writeln!(out, "{} new problems added", report.discovered)?;
        }
        RescanStatus::StoreSwitched { previous, report } => {
            writeln!(
                out,
                "Switched problem store from {} to {}",
                previous.display(),
                session.settings().store_path.display()
            )?;
            writeln!(out, "{} new problems added", report.discovered)?;
        }
        RescanStatus::Unavailable => {
            writeln!(out, "Problem store is unavailable")?;
        }
    }
    if let RescanStatus::Scanned(report) | RescanStatus::StoreSwitched { report, .. } = &status {
        if report.skipped > 0 {
            writeln!(out, "{} entries could not be read", report.skipped)?;
        }
    }
    Ok(status)
}
