//! End-to-end review sessions against a store file on disk.

use chrono::{Duration, NaiveDate};
use memo_core::Grade;
use memo_lib::db::{ProblemRepository, SqliteRepository, StatsRepository};
use memo_lib::events::RecordingNotifier;
use memo_lib::{Progress, RescanStatus, Session, Settings, StoreState};
use std::fs;
use std::path::Path;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"(;GM[1]SZ[19])").unwrap();
}

fn settings(root: &Path) -> Settings {
    Settings {
        store_path: root.join("memo.db"),
        ..Settings::default()
    }
}

fn grade(value: i64) -> Option<Grade> {
    Some(Grade::clamped(value))
}

#[test]
fn schedule_and_stats_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "tsumego/001.sgf");
    touch(dir.path(), "tsumego/002.sgf");
    touch(dir.path(), "notes.txt");

    let mut session = Session::new(settings(dir.path()), RecordingNotifier::default());
    match session.rescan_on(today()) {
        RescanStatus::Scanned(report) => assert_eq!(report.discovered, 2),
        other => panic!("unexpected status {:?}", other),
    }

    let first = session.next_on(None, today());
    let first_id = first.problem.unwrap().id;
    assert!(first_id.starts_with("tsumego/"));
    session.next_on(grade(5), today());
    session.shutdown();
    assert_eq!(session.store_state(), StoreState::Closed);

    let repo = SqliteRepository::open(dir.path().join("memo.db")).unwrap();
    let stored = repo.get_problem(&first_id).unwrap().unwrap();
    assert_eq!(stored.streak, 1);
    assert_eq!(stored.interval, 1);
    assert_eq!(stored.due_date, today() + Duration::days(1));
    let stats = repo.get_or_create_stats(today()).unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.count(Grade::clamped(5)), 1);
    repo.close().unwrap();

    // A new process sees the same schedule and does not rediscover files
    let mut session = Session::new(settings(dir.path()), RecordingNotifier::default());
    match session.rescan_on(today()) {
        RescanStatus::Scanned(report) => assert_eq!(report.discovered, 0),
        other => panic!("unexpected status {:?}", other),
    }
    let outcome = session.next_on(None, today());
    assert_eq!(outcome.progress, Some(Progress::Remaining { todo: 1, total: 1 }));
    assert_ne!(outcome.problem.unwrap().id, first_id);
}

#[test]
fn intervals_grow_over_several_days() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.sgf");
    let mut session = Session::new(settings(dir.path()), RecordingNotifier::default());
    session.rescan_on(today());

    let mut day = today();
    let mut intervals = Vec::new();
    for _ in 0..3 {
        let outcome = session.next_on(None, day);
        assert_eq!(outcome.problem.unwrap().id, "a.sgf");
        session.next_on(grade(5), day);
        let stored = session.store().repo().unwrap().get_problem("a.sgf").unwrap().unwrap();
        intervals.push(stored.interval);
        day = stored.due_date;
        // Nothing else to do until then
        session.shutdown();
    }
    assert_eq!(intervals, vec![1, 6, 16]);
}

#[test]
fn presentation_layer_receives_paths_under_store_folder() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "deep/er/x.sgf");
    let mut session = Session::new(settings(dir.path()), RecordingNotifier::default());
    session.rescan_on(today());
    session.next_on(None, today());

    let expected = dir.path().join("deep").join("er").join("x.sgf");
    assert_eq!(session.notifier().loaded(), vec![expected.as_path()]);
    assert_eq!(session.notifier().progress_lines(), vec!["1 (1)"]);
}

#[test]
fn corrupted_store_file_is_disabled_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("memo.db"), b"this is not a sqlite database, just text padding it out").unwrap();
    let mut session = Session::new(settings(dir.path()), RecordingNotifier::default());

    let outcome = session.next_on(grade(3), today());
    assert!(!outcome.is_available());
    assert_eq!(session.store_state(), StoreState::Disabled);
    assert_eq!(session.rescan_on(today()), RescanStatus::Unavailable);
    assert!(session.notifier().events.is_empty());
}
