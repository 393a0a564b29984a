use anyhow::{Context, Result};
use handoff_paths::config_candidates;
use handoff_runtime_config::{HookConfig, apply_compat_fallbacks};
use std::path::Path;

/// Load the hook config, falling back to defaults.
///
/// The first candidate file that exists is used. A file that cannot be read
/// or parsed is reported and ignored rather than failing the hook.
pub fn load_config(explicit: Option<&Path>, project_dir: &Path) -> HookConfig {
    let mut config = config_candidates(explicit, project_dir)
        .into_iter()
        .find(|path| path.exists())
        .and_then(|path| match read_config(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Ignoring config: {:#}", e);
                None
            }
        })
        .unwrap_or_default();

    if let Some(path) = explicit
        && !path.exists()
    {
        tracing::warn!("Config file {} not found, using defaults", path.display());
    }

    if apply_compat_fallbacks(&mut config) {
        tracing::debug!("Filled blank config values with defaults");
    }
    config
}

fn read_config(path: &Path) -> Result<HookConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
