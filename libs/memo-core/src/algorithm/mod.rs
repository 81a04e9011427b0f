//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::types::{Grade, Problem};
use chrono::NaiveDate;

/// Result of scheduling a problem after a grade.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub problem: Problem,
    pub next_due: NaiveDate,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next schedule of a problem after it was graded on `today`.
    fn schedule(&self, problem: &Problem, grade: Grade, today: NaiveDate) -> SchedulingResult;
}
