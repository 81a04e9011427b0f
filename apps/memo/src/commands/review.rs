//! Interactive review loop.

use crate::events::{Notifier, Progress};
use crate::session::Session;
use memo_core::Grade;
use std::io::{BufRead, Write};
use std::path::Path;

/// Notifier that prints progress and problem paths to a terminal.
pub struct TerminalNotifier<W: Write> {
    out: W,
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn progress(&mut self, progress: &Progress) {
        // Output errors are not the session's concern
        let _ = writeln!(self.out, "[{}]", progress);
    }

    fn load_problem(&mut self, path: &Path) {
        let _ = writeln!(self.out, "{}", path.display());
    }
}

const PROMPT: &str = "grade 0-5 (enter = skip, q = quit)> ";

/// Present problems until the queue is exhausted, input ends, or the user
/// quits. Returns the number of grades submitted.
pub fn review<R: BufRead, W: Write>(
    session: &mut Session<TerminalNotifier<W>>,
    input: R,
) -> anyhow::Result<usize> {
    let mut lines = input.lines();
    let mut grade = None;
    let mut graded = 0;

    loop {
        let outcome = session.next(grade.take());
        if !outcome.is_available() {
            writeln!(session.notifier_mut().out(), "Problem store is unavailable")?;
            break;
        }
        if outcome.problem.is_none() {
            break;
        }

        let out = session.notifier_mut().out();
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        grade = Some(Grade::parse(line));
        graded += 1;
    }

    Ok(graded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::ProblemRepository;
    use std::fs;
    use std::io::Cursor;

    fn session_with(files: &[&str]) -> (tempfile::TempDir, Session<TerminalNotifier<Vec<u8>>>) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            fs::write(dir.path().join(file), b"(;GM[1])").unwrap();
        }
        let settings = Settings {
            store_path: dir.path().join("memo.db"),
            ..Settings::default()
        };
        let mut session = Session::new(settings, TerminalNotifier::new(Vec::new()));
        session.rescan();
        (dir, session)
    }

    fn output(session: &mut Session<TerminalNotifier<Vec<u8>>>) -> String {
        String::from_utf8(session.notifier_mut().out().clone()).unwrap()
    }

    #[test]
    fn grades_until_queue_is_mastered() {
        let (dir, mut session) = session_with(&["a.sgf", "b.sgf"]);

        let graded = review(&mut session, Cursor::new("5\nmemo_4\n")).unwrap();
        assert_eq!(graded, 2);

        let text = output(&mut session);
        assert!(text.starts_with("[2 (2)]\n"), "{text}");
        assert!(text.contains(&dir.path().join("a.sgf").display().to_string()));
        assert!(text.contains(&dir.path().join("b.sgf").display().to_string()));
        assert!(text.trim_end().ends_with("[All done]"), "{text}");

        let repo = session.store().repo().unwrap();
        let mut grades: Vec<_> = ["a.sgf", "b.sgf"]
            .iter()
            .map(|id| repo.get_problem(id).unwrap().unwrap().last_grade.value())
            .collect();
        grades.sort();
        assert_eq!(grades, vec![4, 5]);
    }

    #[test]
    fn quit_leaves_problem_ungraded() {
        let (_dir, mut session) = session_with(&["a.sgf"]);

        let graded = review(&mut session, Cursor::new("q\n")).unwrap();
        assert_eq!(graded, 0);
        let repo = session.store().repo().unwrap();
        assert_eq!(repo.get_problem("a.sgf").unwrap().unwrap().last_grade, Grade::SKIP);
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        let (_dir, mut session) = session_with(&["a.sgf"]);
        let graded = review(&mut session, Cursor::new("")).unwrap();
        assert_eq!(graded, 0);
        assert!(output(&mut session).ends_with(PROMPT));
    }
}
