//! SM-2 spaced repetition algorithm.
//!
//! The original SuperMemo 2 update rule with one extension: grade 0 is a
//! skip that only pushes the due date to tomorrow.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{Grade, Problem, MAX_DUE_YEAR, MAX_INTERVAL, MIN_EASINESS};
use chrono::{Datelike, Duration, NaiveDate};

/// SM-2 algorithm.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub minimum_easiness: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            minimum_easiness: MIN_EASINESS,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn schedule(&self, problem: &Problem, grade: Grade, today: NaiveDate) -> SchedulingResult {
        let mut next = problem.clone();

        if grade.is_skip() {
            next.due_date = add_days(today, 1);
            return SchedulingResult {
                next_due: next.due_date,
                problem: next,
            };
        }

        if grade.is_qualifying() {
            next.interval = match problem.streak {
                0 => 1,
                1 => 6,
                _ => (f64::from(problem.interval) * problem.easiness)
                    .round()
                    .clamp(1.0, f64::from(MAX_INTERVAL)) as u32,
            };
            next.streak = problem.streak.saturating_add(1);
        } else {
            next.streak = 0;
            next.interval = 1;
        }

        next.last_grade = grade;
        next.easiness = self.next_easiness(problem.easiness, grade);
        next.due_date = add_days(today, next.interval);

        SchedulingResult {
            next_due: next.due_date,
            problem: next,
        }
    }
}

/// `today` plus `days`, saturating at the last day of the last allowed year.
fn add_days(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_signed(Duration::days(i64::from(days)))
        .filter(|date| date.year() <= MAX_DUE_YEAR)
        .or_else(|| NaiveDate::from_ymd_opt(MAX_DUE_YEAR, 12, 31))
        .unwrap_or(today)
}

impl Sm2 {
    fn next_easiness(&self, easiness: f64, grade: Grade) -> f64 {
        let miss = f64::from(Grade::MAX - grade.value());
        (easiness + (0.1 - miss * (0.08 + miss * 0.02))).max(self.minimum_easiness)
    }
}
