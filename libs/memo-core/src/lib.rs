//! Core spaced-repetition library for the memo review queue.
//!
//! Provides:
//! - SM-2 scheduling behind the `SpacedRepetitionAlgorithm` trait
//! - Shared types (Problem, Grade, DailyStats)
//!
//! Nothing in this crate touches the file system or the store.

pub mod algorithm;
pub mod error;
pub mod types;

pub use algorithm::{sm2::Sm2, SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{CoreError, Result};
pub use types::{
    DailyStats, Grade, Problem, DEFAULT_EASINESS, MASTERY_THRESHOLD, MAX_DUE_YEAR, MAX_INTERVAL,
    MIN_EASINESS,
};
