//! Filesystem layout for the resume hook.
//!
//! Everything here is pure path arithmetic except `user_config_dir`, which
//! asks the platform for its config root. Callers decide what to do with
//! paths that do not exist.

use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;
use handoff_runtime_config::{CONFIG_FILE_NAME, SessionSettings};

/// Directory under the project root holding host-tool settings.
pub const PROJECT_CONFIG_DIR: &str = ".claude";
/// Directory under the plugin root holding reference docs.
pub const PLUGIN_REFERENCES_DIR: &str = "references";

const APP_NAME: &str = "handoff-resume";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathsError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,

    #[error("branch name cannot be used as a path: {0:?}")]
    InvalidBranch(String),
}

pub type Result<T> = std::result::Result<T, PathsError>;

// ─── Config files ──────────────────────────────────────────────────────

/// Per-user config directory, e.g. `~/.config/handoff-resume` on Linux.
pub fn user_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(PathsError::NoConfigDir)
}

pub fn user_config_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME)
}

/// Config files to try, highest precedence first.
///
/// An explicit path wins outright; otherwise the project file is tried before
/// the user file. The user file is skipped when the platform has no config
/// directory.
pub fn config_candidates(explicit: Option<&Path>, project_dir: &Path) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![project_config_path(project_dir)];
    if let Ok(user) = user_config_path() {
        candidates.push(user);
    }
    candidates
}

// ─── Session logs ──────────────────────────────────────────────────────

/// `<project>/<tasks_root>/<branch>/<logs_dir>`.
///
/// Branches like `feature/auth` map to nested directories. Branch names that
/// would escape the tasks root (absolute, `..`) are rejected.
pub fn session_logs_dir(
    project_dir: &Path,
    branch: &str,
    settings: &SessionSettings,
) -> Result<PathBuf> {
    let branch_path = branch_relative_path(branch)?;
    Ok(project_dir
        .join(&settings.tasks_root)
        .join(branch_path)
        .join(&settings.logs_dir))
}

fn branch_relative_path(branch: &str) -> Result<PathBuf> {
    let trimmed = branch.trim();
    if trimmed.is_empty() {
        return Err(PathsError::InvalidBranch(branch.to_string()));
    }
    let path = Path::new(trimmed);
    let safe = path
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !safe {
        return Err(PathsError::InvalidBranch(branch.to_string()));
    }
    Ok(path.to_path_buf())
}

// ─── Plugin references ─────────────────────────────────────────────────

pub fn plugin_references_dir(plugin_root: &Path) -> PathBuf {
    plugin_root.join(PLUGIN_REFERENCES_DIR)
}

pub fn reference_target_dir(project_dir: &Path, target_dir: &str) -> PathBuf {
    project_dir.join(target_dir)
}

/// Render `path` relative to `base` when it lives underneath it.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
