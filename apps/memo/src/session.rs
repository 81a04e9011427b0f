//! Review session: grades the presented problem and picks the next one.
//!
//! The next problem comes from the due queue (problems whose due date has
//! arrived). Once that is empty the session falls back to a buffer of every
//! problem last graded below the mastery threshold, refilled from the store
//! whenever it runs dry, so weak problems keep coming back until they are
//! graded well.

use crate::config::{store_folder, Settings};
use crate::db::date_utils::get_adjusted_today;
use crate::db::{DbError, ProblemRepository, SqliteRepository, StatsRepository};
use crate::events::{Notifier, NullNotifier, Progress};
use crate::scanner::{self, problem_path, ScanReport};
use crate::state::{StoreHandle, StoreState};
use chrono::NaiveDate;
use memo_core::{DailyStats, Grade, Problem, SpacedRepetitionAlgorithm, Sm2};
use std::collections::VecDeque;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No problem is shown.
    Idle,
    /// A problem was handed out and waits for its grade.
    Presenting,
}

/// Result of [`Session::next`].
#[derive(Debug, Clone, PartialEq)]
pub struct NextOutcome {
    /// `None` when the store is unavailable.
    pub progress: Option<Progress>,
    pub problem: Option<Problem>,
    /// File of `problem` under the scan root.
    pub path: Option<PathBuf>,
}

impl NextOutcome {
    fn unavailable() -> Self {
        Self {
            progress: None,
            problem: None,
            path: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.progress.is_some()
    }
}

/// Result of [`Session::rescan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescanStatus {
    Scanned(ScanReport),
    /// The configured store differed from the open one: the old store was
    /// closed, the session cursor reset and the new store scanned.
    StoreSwitched { previous: PathBuf, report: ScanReport },
    /// The store could not be opened or read.
    Unavailable,
}

/// Aggregate numbers for a stats screen.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StudySummary {
    pub today: DailyStats,
    /// Oldest first, ending with today.
    pub history: Vec<DailyStats>,
    /// Problems per last grade.
    pub distribution: [u32; 6],
    pub due: usize,
    pub incomplete: usize,
    pub total: usize,
}

struct Selection {
    problem: Option<Problem>,
    todo: usize,
    total: usize,
}

/// A single user's review session over one problem store.
pub struct Session<N = NullNotifier> {
    settings: Settings,
    store: StoreHandle,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    current: Option<Problem>,
    low_quality: VecDeque<Problem>,
    notifier: N,
}

impl<N: Notifier> Session<N> {
    pub fn new(settings: Settings, notifier: N) -> Self {
        Self {
            settings,
            store: StoreHandle::new(),
            algorithm: Box::new(Sm2::default()),
            current: None,
            low_quality: VecDeque::new(),
            notifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Point the session at another store; takes effect on the next rescan.
    pub fn set_store_path(&mut self, path: impl Into<PathBuf>) {
        self.settings.store_path = path.into();
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn store_state(&self) -> StoreState {
        self.store.state()
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Presenting
        } else {
            SessionState::Idle
        }
    }

    pub fn current(&self) -> Option<&Problem> {
        self.current.as_ref()
    }

    /// Problems waiting in the low-quality buffer.
    pub fn buffered(&self) -> usize {
        self.low_quality.len()
    }

    /// Study day, honoring the daily reset hour.
    pub fn today(&self) -> NaiveDate {
        get_adjusted_today(self.settings.daily_reset_hour)
    }

    /// Open the store lazily. A store that is already open is kept even if
    /// the configured path changed since; [`Session::rescan`] handles that.
    fn open_store(&mut self) -> bool {
        if self.store.state() == StoreState::Open {
            return true;
        }
        let path = self.settings.store_path.clone();
        self.store.ensure_open(&path)
    }

    /// Folder the open store's problem ids are relative to. This is the
    /// configured scan root until a store is open.
    fn problem_root(&self) -> PathBuf {
        self.store
            .path()
            .map(store_folder)
            .unwrap_or_else(|| self.settings.scan_root())
    }

    /// Grade the presented problem (absent grade = skip) and present the next one.
    pub fn next(&mut self, grade: Option<Grade>) -> NextOutcome {
        let today = self.today();
        self.next_on(grade, today)
    }

    /// [`Session::next`] with an explicit study day.
    pub fn next_on(&mut self, grade: Option<Grade>, today: NaiveDate) -> NextOutcome {
        if !self.open_store() {
            return NextOutcome::unavailable();
        }
        let Some(repo) = self.store.repo() else {
            return NextOutcome::unavailable();
        };

        if let Some(problem) = self.current.take() {
            let grade = grade.unwrap_or(Grade::SKIP);
            if let Err(e) = apply_grade(repo, self.algorithm.as_ref(), problem, grade, today) {
                tracing::warn!("Failed to record grade: {}", e);
            }
        }

        let threshold = self.settings.mastery_threshold;
        let selection = match select_next(repo, &mut self.low_quality, today, threshold) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!("Failed to select next problem: {}", e);
                return NextOutcome::unavailable();
            }
        };

        let progress = Progress::new(selection.todo, selection.total);
        self.notifier.progress(&progress);

        let root = self.problem_root();
        let path = selection.problem.as_ref().map(|problem| {
            let path = problem_path(&root, &problem.id);
            self.notifier.load_problem(&path);
            path
        });

        self.current = selection.problem.clone();
        NextOutcome {
            progress: Some(progress),
            problem: selection.problem,
            path,
        }
    }

    /// Re-synchronize the store location and register new problems.
    pub fn rescan(&mut self) -> RescanStatus {
        let today = self.today();
        self.rescan_on(today)
    }

    /// [`Session::rescan`] with an explicit study day.
    pub fn rescan_on(&mut self, today: NaiveDate) -> RescanStatus {
        self.current = None;

        let configured = self.settings.store_path.clone();
        let previous = match (self.store.state(), self.store.path()) {
            (StoreState::Open, Some(open)) if open != configured => Some(open.to_path_buf()),
            _ => None,
        };
        if let Some(previous) = &previous {
            tracing::info!(
                "Store location changed from {} to {}",
                previous.display(),
                configured.display()
            );
            self.store.close();
            self.low_quality.clear();
        }

        if !self.store.ensure_open(&configured) {
            return RescanStatus::Unavailable;
        }
        let Some(repo) = self.store.repo() else {
            return RescanStatus::Unavailable;
        };

        let root = self.settings.scan_root();
        match scanner::scan(repo, &root, &self.settings, today) {
            Ok(report) => match previous {
                Some(previous) => RescanStatus::StoreSwitched { previous, report },
                None => RescanStatus::Scanned(report),
            },
            Err(e) => {
                tracing::warn!("Scan of {} failed: {}", root.display(), e);
                RescanStatus::Unavailable
            }
        }
    }

    /// Today's counters, the last `days` days, and queue sizes.
    pub fn summary(&mut self, days: usize) -> Option<StudySummary> {
        let today = self.today();
        self.summary_on(days, today)
    }

    pub fn summary_on(&mut self, days: usize, today: NaiveDate) -> Option<StudySummary> {
        if !self.open_store() {
            return None;
        }
        let threshold = self.settings.mastery_threshold;
        let result = self.store.with_repo(|repo| -> Result<StudySummary, DbError> {
            Ok(StudySummary {
                today: repo.get_or_create_stats(today)?,
                history: repo.stats_history(days, today)?,
                distribution: repo.grade_distribution()?,
                due: repo.count_due(today)?,
                incomplete: repo.count_incomplete(threshold)?,
                total: repo.count_problems()?,
            })
        })?;

        match result {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Failed to read statistics: {}", e);
                None
            }
        }
    }

    /// Drop the cursor, then compact and close the store.
    pub fn shutdown(&mut self) {
        self.current = None;
        self.low_quality.clear();
        self.store.close();
    }
}

/// Schedule `problem` with `grade`, persist it and count the grade for `today`.
fn apply_grade(
    repo: &SqliteRepository,
    algorithm: &dyn SpacedRepetitionAlgorithm,
    problem: Problem,
    grade: Grade,
    today: NaiveDate,
) -> Result<Problem, DbError> {
    // The buffered copy may be older than the stored row
    let problem = repo.get_problem(&problem.id)?.unwrap_or(problem);
    let result = algorithm.schedule(&problem, grade, today);
    repo.record_review(&result.problem, grade, today)?;

    tracing::debug!(
        "{} graded {} => {} ({} easiness {:.2})",
        result.problem.id,
        grade,
        result.next_due,
        algorithm.name(),
        result.problem.easiness
    );
    Ok(result.problem)
}

/// Pick the next problem: first due, else the front of the low-quality buffer.
fn select_next(
    repo: &SqliteRepository,
    low_quality: &mut VecDeque<Problem>,
    today: NaiveDate,
    threshold: u8,
) -> Result<Selection, DbError> {
    // Counted before picking, so the numbers include the returned problem
    let todo = repo.count_due(today)?;
    let total = repo.count_incomplete(threshold)?;

    if let Some(problem) = repo.due_today(today)? {
        return Ok(Selection {
            problem: Some(problem),
            todo,
            total,
        });
    }

    if low_quality.is_empty() {
        low_quality.extend(repo.low_quality_batch(threshold)?);
    }
    Ok(Selection {
        todo: low_quality.len(),
        problem: low_quality.pop_front(),
        total,
    })
}
