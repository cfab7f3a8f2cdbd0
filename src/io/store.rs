use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::{Task, Timestamp};
use crate::ops::{SanitizeError, SanitizeReport, sanitize_tasks};
use crate::timer::FocusTimer;

const TASKS_FILE: &str = "tasks.json";
const PROJECTS_FILE: &str = "projects.json";
const TIMER_FILE: &str = "timer.json";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no data directory: set --data-dir, $TALLY_DIR, or $HOME")]
    NoDataDir,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode {what}: {source}")]
    EncodeError {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}

/// Resolve the data directory: explicit flag, then `$TALLY_DIR`, then
/// `$HOME/.tally`. The directory itself is created lazily on first write.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, StoreError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var("TALLY_DIR")
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".tally")),
        _ => Err(StoreError::NoDataDir),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Read the task list, running it through the sanitizer so every caller sees
/// unique IDs and a normalized completion pair. A missing file is an empty
/// list, not an error.
pub fn load_tasks(data_dir: &Path, now: Timestamp) -> Result<SanitizeReport, StoreError> {
    let path = data_dir.join(TASKS_FILE);
    if !path.exists() {
        return Ok(SanitizeReport {
            tasks: Vec::new(),
            dropped: 0,
            rekeyed: 0,
        });
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
            path: path.clone(),
            source: e,
        })?;
    let report = sanitize_tasks(value, now)?;
    if report.dropped > 0 || report.rekeyed > 0 {
        log::warn!(
            "sanitized {}: dropped {}, rekeyed {}",
            path.display(),
            report.dropped,
            report.rekeyed
        );
    }
    Ok(report)
}

/// Write the task list atomically.
pub fn save_tasks(data_dir: &Path, tasks: &[Task]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(tasks).map_err(|e| StoreError::EncodeError {
        what: "tasks",
        source: e,
    })?;
    write_file(&data_dir.join(TASKS_FILE), json.as_bytes())
}

// ---------------------------------------------------------------------------
// Project registry
// ---------------------------------------------------------------------------

/// Known project names in registry order. Missing file is an empty registry.
pub fn load_projects(data_dir: &Path) -> Result<Vec<String>, StoreError> {
    let path = data_dir.join(PROJECTS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| StoreError::ParseError { path, source: e })
}

/// Write the project registry atomically.
pub fn save_projects(data_dir: &Path, projects: &[String]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(projects).map_err(|e| StoreError::EncodeError {
        what: "projects",
        source: e,
    })?;
    write_file(&data_dir.join(PROJECTS_FILE), json.as_bytes())
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// The persisted timer, or None when the file is missing or unreadable.
/// Because the running phase stores an absolute end instant, a countdown
/// started by one invocation stays correct when the next one loads it.
pub fn load_timer(data_dir: &Path) -> Option<FocusTimer> {
    let path = data_dir.join(TIMER_FILE);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(timer) => Some(timer),
        Err(e) => {
            log::warn!("ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the timer state atomically.
pub fn save_timer(data_dir: &Path, timer: &FocusTimer) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(timer).map_err(|e| StoreError::EncodeError {
        what: "timer",
        source: e,
    })?;
    write_file(&data_dir.join(TIMER_FILE), json.as_bytes())
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

fn write_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    atomic_write(path, content).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write via a temp file in the target directory, then persist over the
/// destination, so readers never observe a half-written file.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerPhase;
    use tempfile::TempDir;

    // --- Data dir resolution ---

    #[test]
    fn explicit_flag_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/elsewhere"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/elsewhere"));
    }

    // --- Tasks ---

    #[test]
    fn missing_tasks_file_is_an_empty_list() {
        let tmp = TempDir::new().unwrap();
        let report = load_tasks(tmp.path(), 0).unwrap();
        assert!(report.tasks.is_empty());
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn tasks_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut task = Task::new("t-001".to_string(), "Water plants".to_string(), 1_000);
        task.tags = vec!["home".to_string()];
        save_tasks(tmp.path(), &[task.clone()]).unwrap();

        let report = load_tasks(tmp.path(), 2_000).unwrap();
        assert_eq!(report.tasks, vec![task]);
        assert_eq!(report.rekeyed, 0);
    }

    #[test]
    fn load_runs_the_sanitizer() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("tasks.json"),
            r#"[
                {"id": "t-001", "title": "a", "created_at": 1},
                {"id": "t-001", "title": "b", "completed": true, "created_at": 2},
                {"nope": true}
            ]"#,
        )
        .unwrap();

        let report = load_tasks(tmp.path(), 5_000).unwrap();
        assert_eq!(report.dropped, 1);
        assert_eq!(report.rekeyed, 1);
        assert_eq!(report.tasks[1].id, "t-002");
        assert_eq!(report.tasks[1].completed_at, Some(5_000));
    }

    #[test]
    fn non_array_tasks_file_is_a_hard_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tasks.json"), r#"{"tasks": []}"#).unwrap();
        assert!(matches!(
            load_tasks(tmp.path(), 0),
            Err(StoreError::Sanitize(SanitizeError::InvalidFormat))
        ));
    }

    #[test]
    fn unparseable_json_reports_the_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tasks.json"), "not json").unwrap();
        let err = load_tasks(tmp.path(), 0).unwrap_err();
        assert!(err.to_string().contains("tasks.json"));
    }

    #[test]
    fn save_creates_the_data_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("fresh");
        save_tasks(&nested, &[]).unwrap();
        assert!(nested.join("tasks.json").exists());
    }

    // --- Projects ---

    #[test]
    fn projects_round_trip_and_default_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(load_projects(tmp.path()).unwrap().is_empty());

        let names = vec!["Work".to_string(), "Home".to_string()];
        save_projects(tmp.path(), &names).unwrap();
        assert_eq!(load_projects(tmp.path()).unwrap(), names);
    }

    // --- Timer ---

    #[test]
    fn timer_round_trip_preserves_the_running_deadline() {
        let tmp = TempDir::new().unwrap();
        let mut timer = FocusTimer::default();
        timer.start(1_000_000);
        save_timer(tmp.path(), &timer).unwrap();

        let loaded = load_timer(tmp.path()).unwrap();
        assert_eq!(loaded, timer);
        assert!(matches!(loaded.phase, TimerPhase::Running { .. }));
    }

    #[test]
    fn corrupt_timer_file_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("timer.json"), "{broken").unwrap();
        assert!(load_timer(tmp.path()).is_none());
        assert!(load_timer(tmp.path().join("missing").as_path()).is_none());
    }

    // --- Atomic write ---

    #[test]
    fn atomic_write_replaces_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        fs::write(&path, "old").unwrap();
        save_tasks(tmp.path(), &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
