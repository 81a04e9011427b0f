//! Repository pattern for database access.

use crate::db::date_utils::{format_date, parse_date};
use crate::db::error::DbError;
use crate::db::schema::{INIT_SCHEMA_VERSION, SCHEMA, SCHEMA_VERSION};
use chrono::{Duration, NaiveDate};
use memo_core::{DailyStats, Grade, Problem};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for problem records.
pub trait ProblemRepository {
    /// Register a problem with default schedule; returns true if it was new.
    fn insert_if_absent(&self, id: &str, today: NaiveDate) -> Result<bool>;
    fn get_problem(&self, id: &str) -> Result<Option<Problem>>;
    fn update(&self, problem: &Problem) -> Result<()>;
    /// First problem (by insertion order) due on or before `today`.
    fn due_today(&self, today: NaiveDate) -> Result<Option<Problem>>;
    /// Every problem last graded below `threshold`, in insertion order.
    fn low_quality_batch(&self, threshold: u8) -> Result<Vec<Problem>>;
    fn count_due(&self, today: NaiveDate) -> Result<usize>;
    fn count_incomplete(&self, threshold: u8) -> Result<usize>;
    fn count_problems(&self) -> Result<usize>;
}

/// Repository for per-day statistics.
pub trait StatsRepository {
    fn get_or_create_stats(&self, date: NaiveDate) -> Result<DailyStats>;
    fn save_stats(&self, stats: &DailyStats) -> Result<()>;
    /// The last `days` days ending at `today`, oldest first.
    fn stats_history(&self, days: usize, today: NaiveDate) -> Result<Vec<DailyStats>>;
    /// Number of problems per last grade.
    fn grade_distribution(&self) -> Result<[u32; 6]>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating it and its folder if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute(INIT_SCHEMA_VERSION, params![SCHEMA_VERSION])?;
        Ok(())
    }

    /// Rebuild the database file to reclaim free pages.
    pub fn compact(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// Persist a graded problem and count the grade for `date`, atomically.
    pub fn record_review(
        &self,
        problem: &Problem,
        grade: Grade,
        date: NaiveDate,
    ) -> Result<DailyStats> {
        let tx = self.conn.unchecked_transaction()?;
        self.update(problem)?;
        let mut stats = self.get_or_create_stats(date)?;
        stats.record(grade);
        self.save_stats(&stats)?;
        tx.commit()?;
        Ok(stats)
    }

    /// Close the connection, reporting any error sqlite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

/// Raw column values of a problem row, validated before use.
struct ProblemRow {
    id: String,
    due_date: String,
    easiness: f64,
    interval: i64,
    streak: i64,
    last_grade: i64,
}

impl ProblemRow {
    const COLUMNS: &'static str = "id, due_date, easiness, interval, streak, last_grade";

    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            due_date: row.get(1)?,
            easiness: row.get(2)?,
            interval: row.get(3)?,
            streak: row.get(4)?,
            last_grade: row.get(5)?,
        })
    }

    fn into_problem(self) -> Result<Problem> {
        let due_date = parse_date(&self.due_date)
            .ok_or_else(|| invalid_field(&self.id, "due date", &self.due_date))?;
        let interval = u32::try_from(self.interval)
            .map_err(|_| invalid_field(&self.id, "interval", self.interval))?;
        let streak = u32::try_from(self.streak)
            .map_err(|_| invalid_field(&self.id, "streak", self.streak))?;
        let last_grade = u8::try_from(self.last_grade)
            .ok()
            .and_then(|g| Grade::new(g).ok())
            .ok_or_else(|| invalid_field(&self.id, "last grade", self.last_grade))?;

        let problem = Problem {
            id: self.id,
            due_date,
            easiness: self.easiness,
            interval,
            streak,
            last_grade,
        };
        problem.validate()?;
        Ok(problem)
    }
}

fn invalid_field(id: &str, what: &str, value: impl std::fmt::Debug) -> DbError {
    DbError::InvalidData(format!("problem {}: {} {:?}", id, what, value))
}

impl SqliteRepository {
    fn query_problems(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Problem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, ProblemRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(ProblemRow::into_problem).collect()
    }

    fn query_problem(&self, sql: &str, args: impl rusqlite::Params) -> Result<Option<Problem>> {
        self.conn
            .query_row(sql, args, ProblemRow::from_row)
            .optional()?
            .map(ProblemRow::into_problem)
            .transpose()
    }
}

impl ProblemRepository for SqliteRepository {
    fn insert_if_absent(&self, id: &str, today: NaiveDate) -> Result<bool> {
        let problem = Problem::new(id, today);
        problem.validate()?;
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO problems (id, due_date, easiness, interval, streak, last_grade) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                problem.id,
                format_date(problem.due_date),
                problem.easiness,
                problem.interval,
                problem.streak,
                problem.last_grade.value(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn get_problem(&self, id: &str) -> Result<Option<Problem>> {
        let sql = format!("SELECT {} FROM problems WHERE id = ?1", ProblemRow::COLUMNS);
        self.query_problem(&sql, params![id])
    }

    fn update(&self, problem: &Problem) -> Result<()> {
        problem.validate()?;
        let changed = self.conn.execute(
            "UPDATE problems SET due_date = ?1, easiness = ?2, interval = ?3, streak = ?4, last_grade = ?5 WHERE id = ?6",
            params![
                format_date(problem.due_date),
                problem.easiness,
                problem.interval,
                problem.streak,
                problem.last_grade.value(),
                problem.id,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::ProblemNotFound(problem.id.clone()));
        }
        Ok(())
    }

    fn due_today(&self, today: NaiveDate) -> Result<Option<Problem>> {
        let sql = format!(
            "SELECT {} FROM problems WHERE due_date <= ?1 ORDER BY rowid LIMIT 1",
            ProblemRow::COLUMNS
        );
        self.query_problem(&sql, params![format_date(today)])
    }

    fn low_quality_batch(&self, threshold: u8) -> Result<Vec<Problem>> {
        let sql = format!(
            "SELECT {} FROM problems WHERE last_grade < ?1 ORDER BY rowid",
            ProblemRow::COLUMNS
        );
        self.query_problems(&sql, params![threshold])
    }

    fn count_due(&self, today: NaiveDate) -> Result<usize> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM problems WHERE due_date <= ?1",
            params![format_date(today)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_incomplete(&self, threshold: u8) -> Result<usize> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM problems WHERE last_grade < ?1",
            params![threshold],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_problems(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM problems", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl SqliteRepository {
    fn get_stats(&self, date: NaiveDate) -> Result<Option<DailyStats>> {
        self.conn
            .query_row(
                "SELECT m0, m1, m2, m3, m4, m5, completed FROM daily_stats WHERE date = ?1",
                params![format_date(date)],
                |row| {
                    Ok(DailyStats {
                        date,
                        count_by_grade: [
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                        ],
                        completed: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}

impl StatsRepository for SqliteRepository {
    fn get_or_create_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        self.conn.execute(
            "INSERT OR IGNORE INTO daily_stats (date) VALUES (?1)",
            params![format_date(date)],
        )?;
        self.get_stats(date)?
            .ok_or_else(|| DbError::InvalidData(format!("stats row for {} vanished", date)))
    }

    fn save_stats(&self, stats: &DailyStats) -> Result<()> {
        let [m0, m1, m2, m3, m4, m5] = stats.count_by_grade;
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_stats (date, m0, m1, m2, m3, m4, m5, completed) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![format_date(stats.date), m0, m1, m2, m3, m4, m5, stats.completed],
        )?;
        Ok(())
    }

    fn stats_history(&self, days: usize, today: NaiveDate) -> Result<Vec<DailyStats>> {
        let mut data = Vec::with_capacity(days);

        for i in 0..days {
            let date = today - Duration::days(i as i64);
            let stats = self.get_stats(date)?.unwrap_or_else(|| DailyStats::new(date));
            data.push(stats);
        }

        // Reverse so oldest is first
        data.reverse();
        Ok(data)
    }

    fn grade_distribution(&self) -> Result<[u32; 6]> {
        let mut stmt = self
            .conn
            .prepare("SELECT last_grade, COUNT(*) FROM problems GROUP BY last_grade")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut distribution = [0u32; 6];
        for (grade, count) in rows {
            let slot = usize::try_from(grade)
                .ok()
                .filter(|g| *g < distribution.len())
                .ok_or_else(|| DbError::InvalidData(format!("last grade {}", grade)))?;
            distribution[slot] = count;
        }
        Ok(distribution)
    }
}
