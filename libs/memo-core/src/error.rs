//! Error types for memo-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when a value breaks a Problem or Grade invariant.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("grade {0} is outside 0..=5")]
    InvalidGrade(i64),

    #[error("problem id is empty")]
    EmptyId,

    #[error("easiness {value} of problem {id} is below the floor")]
    EasinessBelowFloor { id: String, value: f64 },

    #[error("problem {id} was graded {grade} but has interval 0")]
    ZeroInterval { id: String, grade: u8 },

    #[error("due date {date} of problem {id} is outside years 0..=9999")]
    DueDateOutOfRange { id: String, date: chrono::NaiveDate },

    #[error("problem {id} keeps streak {streak} after non-qualifying grade {grade}")]
    StreakNotReset { id: String, streak: u32, grade: u8 },
}
