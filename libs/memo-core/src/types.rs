//! Core types for the review queue.

use crate::error::{CoreError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Easiness given to a newly discovered problem.
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Easiness never drops below this value.
pub const MIN_EASINESS: f64 = 1.3;

/// Longest interval the scheduler hands out, in days.
pub const MAX_INTERVAL: u32 = 36_500;

/// Due dates stay within four-digit years so their stored text sorts by date.
pub const MAX_DUE_YEAR: i32 = 9999;

/// Problems last graded below this are resurfaced once the due queue is empty.
pub const MASTERY_THRESHOLD: u8 = 4;

/// Self-reported recall quality, 0 to 5.
///
/// 0 is a skip: the problem is pushed to tomorrow without touching its
/// schedule. 3 and above count as a correct response.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const SKIP: Grade = Grade(0);
    pub const MAX: u8 = 5;

    /// Create from a value that must already be in range.
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(CoreError::InvalidGrade(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Clamp any integer into 0..=5; negatives become a skip.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    /// Parse user input.
    ///
    /// Accepts a plain number (`"4"`, clamped) or a button id whose last
    /// character is the grade digit (`"memo_4"`). Anything else is a skip.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Ok(value) = input.parse::<i64>() {
            return Self::clamped(value);
        }
        input
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .map(|d| Self::clamped(i64::from(d)))
            .unwrap_or(Self::SKIP)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_skip(self) -> bool {
        self.0 == 0
    }

    /// Grade 3 or better.
    pub fn is_qualifying(self) -> bool {
        self.0 >= 3
    }

    /// All six grades in ascending order.
    pub fn all() -> impl Iterator<Item = Grade> {
        (0..=Self::MAX).map(Grade)
    }
}

impl TryFrom<u8> for Grade {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One review item, identified by its path relative to the scan root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub due_date: NaiveDate,
    pub easiness: f64,
    pub interval: u32,
    pub streak: u32,
    pub last_grade: Grade,
}

impl Problem {
    /// A freshly discovered problem, due on `today`.
    pub fn new(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            due_date: today,
            easiness: DEFAULT_EASINESS,
            interval: 0,
            streak: 0,
            last_grade: Grade::SKIP,
        }
    }

    /// Check the invariants that hold for every stored problem.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        // Negated so that NaN is rejected as well.
        if !(self.easiness >= MIN_EASINESS) {
            return Err(CoreError::EasinessBelowFloor {
                id: self.id.clone(),
                value: self.easiness,
            });
        }
        if !self.last_grade.is_skip() && self.interval == 0 {
            return Err(CoreError::ZeroInterval {
                id: self.id.clone(),
                grade: self.last_grade.value(),
            });
        }
        if !(0..=MAX_DUE_YEAR).contains(&self.due_date.year()) {
            return Err(CoreError::DueDateOutOfRange {
                id: self.id.clone(),
                date: self.due_date,
            });
        }
        if !self.last_grade.is_qualifying() && self.streak != 0 {
            return Err(CoreError::StreakNotReset {
                id: self.id.clone(),
                streak: self.streak,
                grade: self.last_grade.value(),
            });
        }
        Ok(())
    }
}

/// Aggregate counters for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub count_by_grade: [u32; 6],
    pub completed: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            count_by_grade: [0; 6],
            completed: 0,
        }
    }

    /// Count one grade submission.
    pub fn record(&mut self, grade: Grade) {
        self.count_by_grade[usize::from(grade.value())] += 1;
        self.completed += 1;
    }

    pub fn count(&self, grade: Grade) -> u32 {
        self.count_by_grade[usize::from(grade.value())]
    }
}
