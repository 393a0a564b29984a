//! Shared configuration types for the resume hook.
//!
//! The hook reads `handoff.toml` with these types. Every field has a serde
//! default so a partial file (or none at all) yields a working config; path
//! resolution for the file itself lives in `handoff-paths`.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "handoff.toml";

/// Top-level hook configuration (persisted as `handoff.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HookConfig {
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub hook: HookSettings,
    #[serde(default)]
    pub references: ReferenceSettings,
}

/// Where handoff records live: `<project>/<tasks_root>/<branch>/<logs_dir>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    #[serde(default = "default_tasks_root", alias = "task_root")]
    pub tasks_root: String,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    #[serde(default = "default_record_suffix")]
    pub record_suffix: String,
    #[serde(default = "default_todos_suffix")]
    pub todos_suffix: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tasks_root: default_tasks_root(),
            logs_dir: default_logs_dir(),
            record_suffix: default_record_suffix(),
            todos_suffix: default_todos_suffix(),
            history_file: default_history_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HookSettings {
    /// How long to wait for the host's stdin payload before moving on.
    #[serde(default = "default_stdin_timeout_ms")]
    pub stdin_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub copy_references: bool,
    /// Slash-command namespace shown in notice tips.
    #[serde(default = "default_command_namespace", alias = "plugin_name")]
    pub command_namespace: String,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            stdin_timeout_ms: default_stdin_timeout_ms(),
            copy_references: true,
            command_namespace: default_command_namespace(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSettings {
    /// Project-relative directory receiving the plugin's reference docs.
    #[serde(default = "default_reference_target")]
    pub target_dir: String,
    #[serde(default = "default_gitignore_comment")]
    pub gitignore_comment: String,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            target_dir: default_reference_target(),
            gitignore_comment: default_gitignore_comment(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_tasks_root() -> String {
    "docs/tasks".to_string()
}
fn default_logs_dir() -> String {
    "session_logs".to_string()
}
fn default_record_suffix() -> String {
    "_handoff.json".to_string()
}
fn default_todos_suffix() -> String {
    "_todos.json".to_string()
}
fn default_history_file() -> String {
    "todos_history.json".to_string()
}
fn default_stdin_timeout_ms() -> u64 {
    2_000
}
fn default_command_namespace() -> String {
    "spectre".to_string()
}
fn default_reference_target() -> String {
    ".claude/spectre".to_string()
}
fn default_gitignore_comment() -> String {
    "# spectre plugin files".to_string()
}

/// Replace blank values that would produce unusable paths or globs.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut HookConfig) -> bool {
    let defaults = HookConfig::default();
    let mut changed = false;

    let mut fill = |value: &mut String, default: &str| {
        if value.trim().is_empty() {
            *value = default.to_string();
            changed = true;
        }
    };
    fill(&mut config.sessions.tasks_root, &defaults.sessions.tasks_root);
    fill(&mut config.sessions.logs_dir, &defaults.sessions.logs_dir);
    fill(
        &mut config.sessions.record_suffix,
        &defaults.sessions.record_suffix,
    );
    fill(
        &mut config.sessions.todos_suffix,
        &defaults.sessions.todos_suffix,
    );
    fill(
        &mut config.sessions.history_file,
        &defaults.sessions.history_file,
    );
    fill(
        &mut config.hook.command_namespace,
        &defaults.hook.command_namespace,
    );
    fill(
        &mut config.references.target_dir,
        &defaults.references.target_dir,
    );

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: HookConfig = toml::from_str("").expect("parse toml");
        assert_eq!(cfg, HookConfig::default());
        assert_eq!(cfg.sessions.tasks_root, "docs/tasks");
        assert_eq!(cfg.sessions.record_suffix, "_handoff.json");
        assert_eq!(cfg.hook.stdin_timeout_ms, 2_000);
        assert!(cfg.hook.copy_references);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg: HookConfig = toml::from_str(
            r#"
[sessions]
tasks_root = "docs/active_tasks"

[hook]
copy_references = false
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.sessions.tasks_root, "docs/active_tasks");
        assert_eq!(cfg.sessions.logs_dir, "session_logs");
        assert!(!cfg.hook.copy_references);
        assert_eq!(cfg.hook.command_namespace, "spectre");
    }

    #[test]
    fn compat_aliases_are_accepted() {
        let cfg: HookConfig = toml::from_str(
            r#"
[sessions]
task_root = "work"

[hook]
plugin_name = "sesh"
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.sessions.tasks_root, "work");
        assert_eq!(cfg.hook.command_namespace, "sesh");
    }

    #[test]
    fn retired_keys_are_ignored() {
        let cfg: HookConfig = toml::from_str(
            r#"
[sessions]
archive_dir = "old"
logs_dir = "logs"
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.sessions.logs_dir, "logs");
        assert_eq!(cfg.sessions.record_suffix, "_handoff.json");
    }

    #[test]
    fn apply_compat_fallbacks_fills_blank_values() {
        let mut cfg = HookConfig::default();
        cfg.sessions.record_suffix = "  ".to_string();
        cfg.hook.command_namespace.clear();

        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.sessions.record_suffix, "_handoff.json");
        assert_eq!(cfg.hook.command_namespace, "spectre");
    }

    #[test]
    fn apply_compat_fallbacks_is_noop_for_complete_config() {
        let mut cfg = HookConfig::default();
        let before = cfg.clone();
        assert!(!apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg, before);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = HookConfig::default();
        let encoded = toml::to_string(&cfg).expect("serialize config");
        assert!(encoded.contains("[sessions]"));
        assert!(encoded.contains("history_file = \"todos_history.json\""));
        let decoded: HookConfig = toml::from_str(&encoded).expect("parse config");
        assert_eq!(decoded, cfg);
    }
}
