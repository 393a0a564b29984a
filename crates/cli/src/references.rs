use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use handoff_paths::{plugin_references_dir, reference_target_dir};
use handoff_runtime_config::ReferenceSettings;

use crate::Cli;
use crate::config::load_config;

/// Entry point for the hidden `--bg-copy-refs` mode.
pub fn run_bg_copy(cli: &Cli) -> Result<()> {
    let Some(plugin_root) = cli.plugin_root.as_deref() else {
        tracing::debug!("No plugin root; nothing to copy");
        return Ok(());
    };
    let project_dir = cli.project_dir()?;
    let config = load_config(cli.config.as_deref(), &project_dir);

    match sync_references(plugin_root, &project_dir, &config.references) {
        Ok(copied) => tracing::info!("Copied {} reference file(s)", copied),
        Err(e) => tracing::warn!("Reference copy failed: {:#}", e),
    }
    Ok(())
}

/// Re-run this binary in `--bg-copy-refs` mode without waiting for it.
pub fn spawn_bg_copy(cli: &Cli, project_dir: &Path, plugin_root: &Path) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate hook executable")?;
    let mut cmd = Command::new(exe);
    cmd.arg("--bg-copy-refs")
        .arg("--project-dir")
        .arg(project_dir)
        .arg("--plugin-root")
        .arg(plugin_root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(config) = &cli.config {
        cmd.arg("--config").arg(config);
    }
    cmd.spawn().context("Failed to spawn reference copy")?;
    Ok(())
}

/// Copy plugin reference docs into the project and make sure git ignores them.
/// Returns the number of files copied.
pub fn sync_references(
    plugin_root: &Path,
    project_dir: &Path,
    settings: &ReferenceSettings,
) -> Result<usize> {
    let source = plugin_references_dir(plugin_root);
    if !source.is_dir() {
        return Ok(0);
    }
    let target = reference_target_dir(project_dir, &settings.target_dir);
    let copied = copy_markdown(&source, &target)?;
    ensure_gitignored(project_dir, settings)?;
    Ok(copied)
}

/// Copy `*.md` files from `source` to `target`, leaving existing files alone.
fn copy_markdown(source: &Path, target: &Path) -> Result<usize> {
    std::fs::create_dir_all(target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let mut copied = 0;
    for entry in std::fs::read_dir(source)
        .with_context(|| format!("Failed to read {}", source.display()))?
    {
        let path = entry?.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        if !is_markdown || !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let dest = target.join(name);
        if dest.exists() {
            continue;
        }
        std::fs::copy(&path, &dest)
            .with_context(|| format!("Failed to copy {}", path.display()))?;
        copied += 1;
    }
    Ok(copied)
}

/// Append the target dir to an existing `.gitignore` unless it is already
/// covered. Returns true when the file was changed.
fn ensure_gitignored(project_dir: &Path, settings: &ReferenceSettings) -> Result<bool> {
    let gitignore = project_dir.join(".gitignore");
    if !gitignore.is_file() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(&gitignore)
        .with_context(|| format!("Failed to read {}", gitignore.display()))?;

    let target = settings.target_dir.trim_end_matches('/');
    let parent_entry = target
        .split_once('/')
        .map(|(first, _)| format!("{first}/"));
    let covered = content.contains(&format!("{target}/"))
        || parent_entry.is_some_and(|entry| content.contains(&entry));
    if covered {
        return Ok(false);
    }

    let mut updated = content;
    updated.push_str(&format!("\n{}\n{}/\n", settings.gitignore_comment, target));
    std::fs::write(&gitignore, updated)
        .with_context(|| format!("Failed to update {}", gitignore.display()))?;
    Ok(true)
}
