//! Statistics command.

use crate::events::Notifier;
use crate::session::Session;
use memo_core::Grade;
use std::io::Write;

/// Print today's counters, the recent history and the grade distribution.
pub fn stats<N: Notifier, W: Write>(
    session: &mut Session<N>,
    days: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    let Some(summary) = session.summary(days) else {
        writeln!(out, "Problem store is unavailable")?;
        return Ok(());
    };

    writeln!(
        out,
        "{} problems, {} due, {} not yet mastered",
        summary.total, summary.due, summary.incomplete
    )?;
    writeln!(out, "Today: {} reviewed", summary.today.completed)?;

    writeln!(out, "\ndate        done  0  1  2  3  4  5")?;
    for day in &summary.history {
        write!(out, "{}  {:>4}", day.date, day.completed)?;
        for count in day.count_by_grade {
            write!(out, " {:>2}", count)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "\nLast grade distribution:")?;
    for grade in Grade::all() {
        writeln!(out, "  {}: {}", grade, summary.distribution[usize::from(grade.value())])?;
    }
    Ok(())
}
