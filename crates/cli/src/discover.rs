use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use handoff_runtime_config::SessionSettings;
use serde_json::Value;

/// Session-log files relevant to a resume, each optional.
#[derive(Debug, Default)]
pub struct SessionFiles {
    pub record: Option<PathBuf>,
    pub todos: Option<PathBuf>,
    pub history: Option<PathBuf>,
}

/// Locate the newest handoff record, newest todos snapshot and the todo
/// history in `logs_dir`. Only top-level files are considered, so the
/// archive subdirectory never contributes.
pub fn find_session_files(logs_dir: &Path, settings: &SessionSettings) -> SessionFiles {
    if !logs_dir.is_dir() {
        tracing::debug!("No session log directory at {}", logs_dir.display());
        return SessionFiles::default();
    }
    let history = logs_dir.join(&settings.history_file);
    SessionFiles {
        record: latest_with_suffix(logs_dir, &settings.record_suffix),
        todos: latest_with_suffix(logs_dir, &settings.todos_suffix),
        history: history.is_file().then_some(history),
    }
}

/// Newest regular file in `dir` whose name ends with `suffix`.
pub fn latest_with_suffix(dir: &Path, suffix: &str) -> Option<PathBuf> {
    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(suffix)
    );
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Invalid session file pattern {}: {}", pattern, e);
            return None;
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    // Sort by modification time, newest first; ties broken by name so the
    // choice is stable.
    files.sort_by(|a, b| modified(b).cmp(&modified(a)).then_with(|| b.cmp(a)));
    files.into_iter().next()
}

fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read an optional side file; any failure is logged and treated as absent.
pub fn read_optional_json(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    match read_json(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Skipping {}: {:#}", path.display(), e);
            None
        }
    }
}
