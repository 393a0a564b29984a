//! Schema normalization for persisted handoff records.
//!
//! Records written as schema 1.0 have no `working_set` and keep key files
//! under `context`; 1.1 adds goal/now/constraints/open questions and the
//! working set. Both map onto [`NormalizedContext`] without a migration step.
//! Normalization is total: anything missing or of the wrong type becomes a
//! default.

use serde_json::Value;
use tracing::debug;

use crate::tasks::{TaskRecord, tasks_from_beads};
use crate::value::{Object, field, flag, object, scalar_text, text_list};

pub const UNKNOWN: &str = "unknown";
pub const DEFAULT_SUMMARY: &str = "No summary available.";

/// Prose fields from the record's `progress_update` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub summary: String,
    pub goal: Option<String>,
    pub constraints: Vec<String>,
    pub accomplished: Vec<String>,
    /// What the previous session was in the middle of (`now`).
    pub active_work: Option<String>,
    pub next_steps: Vec<String>,
    pub blockers: Vec<String>,
    pub open_questions: Vec<String>,
    pub decisions: Vec<String>,
    pub confidence: String,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    pub key_files: Vec<String>,
    pub active_ids: Vec<String>,
    pub recent_commands: Vec<String>,
}

impl WorkingSet {
    pub fn is_empty(&self) -> bool {
        self.key_files.is_empty() && self.active_ids.is_empty() && self.recent_commands.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub last_commit: String,
    pub wip_state: String,
}

/// Single internal shape for every supported record version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContext {
    /// Diagnostics only; rendering never branches on it.
    pub schema_version: String,
    pub task_name: String,
    pub branch_name: String,
    pub progress: Progress,
    pub working_set: WorkingSet,
    pub repo: RepoContext,
    /// Records predating the `available` flag always had tasks available.
    pub tasks_available: bool,
    pub tasks: Vec<TaskRecord>,
}

impl NormalizedContext {
    /// Whether the task hierarchy belongs in the rendered context.
    pub fn shows_tasks(&self) -> bool {
        self.tasks_available && !self.tasks.is_empty()
    }
}

/// Records which fields fell back to a default, for debug logging.
#[derive(Default)]
struct Defaults(Vec<&'static str>);

impl Defaults {
    fn text(&mut self, obj: Option<&Object>, key: &'static str, default: &str) -> String {
        scalar_text(field(obj, key)).unwrap_or_else(|| {
            self.0.push(key);
            default.to_string()
        })
    }
}

/// Map a raw record of any supported version onto [`NormalizedContext`].
pub fn normalize(record: &Value) -> NormalizedContext {
    let root = record.as_object();
    if root.is_none() {
        debug!("handoff record is not an object; using defaults for every field");
    }
    let mut defaults = Defaults::default();

    let progress_obj = object(field(root, "progress_update"));
    let progress = Progress {
        summary: defaults.text(progress_obj, "summary", DEFAULT_SUMMARY),
        goal: scalar_text(field(progress_obj, "goal")),
        constraints: text_list(field(progress_obj, "constraints")),
        accomplished: text_list(field(progress_obj, "accomplished")),
        active_work: scalar_text(field(progress_obj, "now")),
        next_steps: text_list(field(progress_obj, "next_steps")),
        blockers: text_list(field(progress_obj, "blockers")),
        open_questions: text_list(field(progress_obj, "open_questions")),
        decisions: text_list(field(progress_obj, "decisions")),
        confidence: defaults.text(progress_obj, "confidence", UNKNOWN),
        risks: text_list(field(progress_obj, "risks")),
    };

    let repo_obj = object(field(root, "context"));
    let working_set = normalize_working_set(object(field(root, "working_set")), repo_obj);
    let repo = RepoContext {
        last_commit: defaults.text(repo_obj, "last_commit", UNKNOWN),
        wip_state: defaults.text(repo_obj, "wip_state", UNKNOWN),
    };

    let beads = field(root, "beads");
    let tasks_available = flag(field(object(beads), "available"), true);
    let tasks = tasks_from_beads(beads);

    let normalized = NormalizedContext {
        schema_version: defaults.text(root, "version", UNKNOWN),
        task_name: defaults.text(root, "task_name", UNKNOWN),
        branch_name: defaults.text(root, "branch_name", UNKNOWN),
        progress,
        working_set,
        repo,
        tasks_available,
        tasks,
    };

    debug!(
        schema_version = %normalized.schema_version,
        defaulted = ?defaults.0,
        task_count = normalized.tasks.len(),
        "normalized handoff record"
    );
    normalized
}

/// Current-schema working set, with key files falling back to the legacy
/// `context.key_files` list when the current one is missing or empty.
fn normalize_working_set(current: Option<&Object>, legacy: Option<&Object>) -> WorkingSet {
    let mut key_files = text_list(field(current, "key_files"));
    if key_files.is_empty() {
        key_files = text_list(field(legacy, "key_files"));
    }
    WorkingSet {
        key_files,
        active_ids: text_list(field(current, "active_ids")),
        recent_commands: text_list(field(current, "recent_commands")),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
