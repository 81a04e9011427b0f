//! Notifications sent from the session to the presentation layer.

use std::fmt;
use std::path::{Path, PathBuf};

/// Progress shown next to the current problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Progress {
    /// `todo` problems left in the queue being worked, `total` not yet mastered.
    Remaining { todo: usize, total: usize },
    AllDone,
}

impl Progress {
    pub fn new(todo: usize, total: usize) -> Self {
        if todo > 0 {
            Self::Remaining { todo, total }
        } else {
            Self::AllDone
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remaining { todo, total } => write!(f, "{} ({})", todo, total),
            Self::AllDone => f.write_str("All done"),
        }
    }
}

/// Receiver of session notifications.
pub trait Notifier {
    fn progress(&mut self, progress: &Progress);

    /// The presentation layer should show the problem stored at `path`.
    fn load_problem(&mut self, path: &Path);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn progress(&mut self, _progress: &Progress) {}

    fn load_problem(&mut self, _path: &Path) {}
}

/// A notification, as kept by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Progress(Progress),
    LoadProblem(PathBuf),
}

/// Notifier that keeps every notification in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub events: Vec<Event>,
}

impl RecordingNotifier {
    /// Progress strings in the order they were sent.
    pub fn progress_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Progress(progress) => Some(progress.to_string()),
                Event::LoadProblem(_) => None,
            })
            .collect()
    }

    pub fn loaded(&self) -> Vec<&Path> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::LoadProblem(path) => Some(path.as_path()),
                Event::Progress(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn progress(&mut self, progress: &Progress) {
        self.events.push(Event::Progress(*progress));
    }

    fn load_problem(&mut self, path: &Path) {
        self.events.push(Event::LoadProblem(path.to_path_buf()));
    }
}
