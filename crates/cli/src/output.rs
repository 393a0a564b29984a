use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

const SESSION_START: &str = "SessionStart";

/// JSON object the host reads from the hook's stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub system_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub additional_context: String,
}

impl HookOutput {
    /// Notice only; nothing is injected into the session.
    pub fn message(system_message: String) -> Self {
        Self {
            system_message,
            hook_specific_output: None,
        }
    }

    /// Notice plus context injected at session start.
    pub fn session_start(system_message: String, additional_context: String) -> Self {
        Self {
            system_message,
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: SESSION_START,
                additional_context,
            }),
        }
    }

    pub fn write_to(&self, out: &mut impl Write) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize hook output")?;
        writeln!(out, "{}", json).context("Failed to write hook output")?;
        out.flush().context("Failed to flush hook output")?;
        Ok(())
    }
}
