use std::io::{IsTerminal, Read};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::oneshot;

/// Fields of the host's SessionStart payload that the hook looks at.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Drain stdin, giving up after `timeout`.
///
/// An interactive terminal never carries a hook payload, so it is skipped
/// without waiting. Returns `None` on timeout, read error or empty input.
pub async fn read_hook_input(timeout: Duration) -> Option<String> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    drain(stdin, interactive, timeout).await
}

/// The read runs on a plain thread so an abandoned read never holds up
/// runtime shutdown.
async fn drain<R>(mut reader: R, interactive: bool, timeout: Duration) -> Option<String>
where
    R: Read + Send + 'static,
{
    if interactive {
        tracing::debug!("stdin is a terminal; skipping hook input");
        return None;
    }

    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut buf = String::new();
        let result = reader.read_to_string(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(Ok(input))) if !input.trim().is_empty() => Some(input),
        Ok(Ok(Ok(_))) => None,
        Ok(Ok(Err(e))) => {
            tracing::warn!("Failed to read hook input: {}", e);
            None
        }
        Ok(Err(_)) => None,
        Err(_) => {
            tracing::debug!("No hook input within {:?}", timeout);
            None
        }
    }
}

/// Parse the payload; malformed input is logged and treated as absent.
pub fn parse_hook_input(raw: &str) -> HookInput {
    match serde_json::from_str(raw.trim()) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!("Failed to parse hook input: {}", e);
            HookInput::default()
        }
    }
}
