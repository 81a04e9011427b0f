//! Discovery of review items under the scan root.
//!
//! Folders are walked breadth-first from an explicit worklist. Every file
//! with a recognized extension is registered as a problem; existing problems
//! are never touched, and problems whose file disappeared are kept.

use crate::config::Settings;
use crate::db::{DbError, ProblemRepository};
use chrono::NaiveDate;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanReport {
    /// Problems registered by this scan.
    pub discovered: usize,
    pub visited_dirs: usize,
    /// Folders and entries that could not be read.
    pub skipped: usize,
}

/// Register every recognized file under `root` that is not yet in the store.
///
/// Unreadable folders and entries are logged and skipped. Directory symlinks
/// are followed, but each real folder is read at most once, so symlink
/// cycles terminate. Only store failures abort the scan.
pub fn scan<R: ProblemRepository>(
    repo: &R,
    root: &Path,
    settings: &Settings,
    today: NaiveDate,
) -> Result<ScanReport, DbError> {
    let mut report = ScanReport::default();
    let mut pending = VecDeque::from([root.to_path_buf()]);
    let mut visited = HashSet::new();

    while let Some(folder) = pending.pop_front() {
        let real = match fs::canonicalize(&folder) {
            Ok(real) => real,
            Err(e) => {
                tracing::warn!("Skipping folder {}: {}", folder.display(), e);
                report.skipped += 1;
                continue;
            }
        };
        if !visited.insert(real) {
            tracing::debug!("Already scanned {}", folder.display());
            continue;
        }

        let entries = match fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping folder {}: {}", folder.display(), e);
                report.skipped += 1;
                continue;
            }
        };
        report.visited_dirs += 1;

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping entry in {}: {}", folder.display(), e);
                    report.skipped += 1;
                    continue;
                }
            };

            // fs::metadata follows symlinks
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    report.skipped += 1;
                    continue;
                }
            };

            if metadata.is_dir() {
                pending.push_back(path);
            } else if metadata.is_file() && settings.matches_extension(&path) {
                let Some(id) = problem_id(root, &path) else {
                    tracing::warn!("Skipping {}: path is not valid UTF-8", path.display());
                    report.skipped += 1;
                    continue;
                };
                if repo.insert_if_absent(&id, today)? {
                    tracing::debug!("Discovered {}", id);
                    report.discovered += 1;
                }
            }
        }
    }

    tracing::info!("{} new problems added", report.discovered);
    Ok(report)
}

/// Problem id of `path`: its path relative to `root`, joined with `/`.
pub fn problem_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// File path of problem `id` under `root`.
pub fn problem_path(root: &Path, id: &str) -> PathBuf {
    id.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRepository;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = problem_path(root, relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"(;GM[1])").unwrap();
    }

    fn ids(repo: &SqliteRepository) -> Vec<String> {
        let mut ids: Vec<_> = repo
            .low_quality_batch(6)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn discovers_nested_problems_with_slash_ids() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.sgf");
        touch(dir.path(), "life/death/b.SGF");
        touch(dir.path(), "life/c.sgf");
        touch(dir.path(), "life/readme.txt");
        touch(dir.path(), "tesuji/notes.md");

        let repo = SqliteRepository::open_in_memory().unwrap();
        let report = scan(&repo, dir.path(), &Settings::default(), today()).unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.visited_dirs, 4);
        assert_eq!(report.skipped, 0);
        assert_eq!(ids(&repo), vec!["a.sgf", "life/c.sgf", "life/death/b.SGF"]);

        let problem = repo.get_problem("life/c.sgf").unwrap().unwrap();
        assert_eq!(problem.due_date, today());
    }

    #[test]
    fn second_scan_of_unchanged_tree_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.sgf");
        touch(dir.path(), "x/b.sgf");
        let repo = SqliteRepository::open_in_memory().unwrap();

        let first = scan(&repo, dir.path(), &Settings::default(), today()).unwrap();
        let second = scan(&repo, dir.path(), &Settings::default(), today()).unwrap();
        assert_eq!(first.discovered, 2);
        assert_eq!(second.discovered, 0);
        assert_eq!(repo.count_problems().unwrap(), 2);
    }

    #[test]
    fn removed_files_stay_registered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.sgf");
        let repo = SqliteRepository::open_in_memory().unwrap();
        scan(&repo, dir.path(), &Settings::default(), today()).unwrap();

        fs::remove_file(dir.path().join("a.sgf")).unwrap();
        touch(dir.path(), "b.sgf");
        let report = scan(&repo, dir.path(), &Settings::default(), today()).unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(ids(&repo), vec!["a.sgf", "b.sgf"]);
    }

    #[test]
    fn custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.sgf");
        touch(dir.path(), "b.md");
        let settings = Settings {
            extensions: vec!["md".to_string()],
            ..Settings::default()
        };
        let repo = SqliteRepository::open_in_memory().unwrap();
        scan(&repo, dir.path(), &settings, today()).unwrap();
        assert_eq!(ids(&repo), vec!["b.md"]);
    }

    #[test]
    fn missing_root_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepository::open_in_memory().unwrap();
        let report = scan(&repo, &dir.path().join("gone"), &Settings::default(), today()).unwrap();
        assert_eq!(report.discovered, 0);
        assert_eq!(report.visited_dirs, 0);
        assert_eq!(report.skipped, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_terminate() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "loop/a.sgf");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop").join("back")).unwrap();

        let repo = SqliteRepository::open_in_memory().unwrap();
        let report = scan(&repo, dir.path(), &Settings::default(), today()).unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(ids(&repo), vec!["loop/a.sgf"]);
    }

    #[test]
    fn problem_id_relative_to_root() {
        let root = Path::new("/data/problems");
        assert_eq!(
            problem_id(root, &root.join("a").join("b.sgf")),
            Some("a/b.sgf".to_string())
        );
        assert_eq!(problem_id(root, Path::new("/elsewhere/b.sgf")), None);
        assert_eq!(problem_id(root, root), None);
    }

    #[test]
    fn problem_path_joins_segments() {
        let root = Path::new("/data/problems");
        assert_eq!(
            problem_path(root, "a/b.sgf"),
            root.join("a").join("b.sgf")
        );
    }
}
