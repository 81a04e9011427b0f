//! Local SQLite problem store.

pub mod date_utils;
pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{ProblemRepository, SqliteRepository, StatsRepository};
