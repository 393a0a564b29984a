//! The SessionStart hook flow.
//!
//! Everything before output is fail-open: a missing directory, an unreadable
//! side file or a git failure degrades to a default. Only writing the JSON
//! to stdout can fail the process.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use handoff_core::{Extras, TodoHistory, TodoSnapshot, compile, welcome_notice};
use handoff_paths::{display_relative, session_logs_dir};
use handoff_runtime_config::HookConfig;

use crate::Cli;
use crate::config::load_config;
use crate::discover::{find_session_files, read_json, read_optional_json};
use crate::git::{UNKNOWN_BRANCH, current_branch};
use crate::output::HookOutput;
use crate::references::spawn_bg_copy;
use crate::stdin::{parse_hook_input, read_hook_input};

pub async fn run_resume(cli: &Cli) -> Result<()> {
    let project_dir = cli.project_dir()?;
    let config = load_config(cli.config.as_deref(), &project_dir);

    if !cli.no_stdin {
        let timeout = Duration::from_millis(config.hook.stdin_timeout_ms);
        if let Some(raw) = read_hook_input(timeout).await {
            let input = parse_hook_input(&raw);
            tracing::debug!(
                session_id = input.session_id.as_deref().unwrap_or("-"),
                source = input.source.as_deref().unwrap_or("-"),
                "SessionStart hook input"
            );
        }
    }

    if config.hook.copy_references
        && let Some(plugin_root) = cli.plugin_root.as_deref()
        && let Err(e) = spawn_bg_copy(cli, &project_dir, plugin_root)
    {
        tracing::warn!("Skipping reference copy: {:#}", e);
    }

    let output = resume_output(&project_dir, cli.branch.as_deref(), &config);
    match output {
        Some(output) => output.write_to(&mut std::io::stdout().lock()),
        None => Ok(()),
    }
}

/// Build the hook output for `project_dir`.
///
/// `None` means the latest record exists but could not be loaded; the hook
/// then stays silent instead of showing a stale or misleading welcome.
pub fn resume_output(
    project_dir: &Path,
    branch: Option<&str>,
    config: &HookConfig,
) -> Option<HookOutput> {
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => current_branch(project_dir),
    };
    let namespace = config.hook.command_namespace.as_str();

    let logs_dir = match session_logs_dir(project_dir, &branch, &config.sessions) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("{}", e);
            return Some(HookOutput::message(welcome_notice(namespace)));
        }
    };
    let files = find_session_files(&logs_dir, &config.sessions);

    let Some(record_path) = files.record else {
        if branch == UNKNOWN_BRANCH {
            tracing::debug!("No git branch and no handoff record");
        }
        return Some(HookOutput::message(welcome_notice(namespace)));
    };

    let record = match read_json(&record_path) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Not resuming: {:#}", e);
            return None;
        }
    };

    let todos = read_optional_json(files.todos.as_deref())
        .map(|value| TodoSnapshot::from_value(&value))
        .filter(|snapshot| !snapshot.is_empty());
    if let Some(snapshot) = &todos {
        tracing::debug!(
            session_id = snapshot.session_id.as_deref().unwrap_or("unknown"),
            unfinished = snapshot.unfinished(),
            "Carrying over previous session todos"
        );
    }

    let extras = Extras {
        record_path: Some(display_relative(&record_path, project_dir)),
        todos,
        history: read_optional_json(files.history.as_deref())
            .map(|value| TodoHistory::from_value(&value)),
        command_namespace: Some(namespace.to_string()),
    };

    let rendered = compile(&record, &extras);
    tracing::info!("Resuming from {}", record_path.display());
    let additional_context = rendered.additional_context();
    Some(HookOutput::session_start(rendered.notice, additional_context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::testing;

    fn logs_dir(project: &Path, branch: &str) -> std::path::PathBuf {
        let dir = project.join("docs/tasks").join(branch).join("session_logs");
        std::fs::create_dir_all(&dir).expect("create logs dir");
        dir
    }

    #[test]
    fn no_record_yields_welcome() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let output = resume_output(tmp.path(), Some("main"), &HookConfig::default())
            .expect("welcome output");
        assert!(output.hook_specific_output.is_none());
        assert!(output.system_message.contains("Getting Started:"));
        assert!(output.system_message.contains("/spectre:handoff"));
    }

    #[test]
    fn malformed_record_is_silent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = logs_dir(tmp.path(), "main");
        std::fs::write(dir.join("x_handoff.json"), "{ truncated").expect("write record");

        assert!(resume_output(tmp.path(), Some("main"), &HookConfig::default()).is_none());
    }

    #[test]
    fn record_is_compiled_with_relative_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = logs_dir(tmp.path(), "feature/auth");
        let record = testing::record_v1_1("OAuth work");
        std::fs::write(
            dir.join("2024-01-15_handoff.json"),
            serde_json::to_string(&record).expect("encode"),
        )
        .expect("write record");

        let output = resume_output(tmp.path(), Some("feature/auth"), &HookConfig::default())
            .expect("output");
        assert!(output.system_message.contains("Session Resumed: OAuth work"));
        assert!(output.system_message.contains(
            "Full details: docs/tasks/feature/auth/session_logs/2024-01-15_handoff.json"
        ));
        let specific = output.hook_specific_output.expect("context");
        assert_eq!(specific.hook_event_name, "SessionStart");
        assert!(specific.additional_context.starts_with("<session-context>\n"));
        assert!(specific.additional_context.ends_with("</session-context>"));
    }

    #[test]
    fn custom_namespace_reaches_notice() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = HookConfig::default();
        config.hook.command_namespace = "sesh".to_string();

        let output = resume_output(tmp.path(), Some("main"), &config).expect("output");
        assert!(output.system_message.contains("/sesh:forget"));
    }

    #[test]
    fn escaping_branch_falls_back_to_welcome() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let output =
            resume_output(tmp.path(), Some("../elsewhere"), &HookConfig::default()).expect("output");
        assert!(output.hook_specific_output.is_none());
    }
}
