//! Carry-over of the previous session's captured todo list.
//!
//! A todo capture hook writes `*_todos.json` snapshots and a rolling
//! `todos_history.json` next to the handoff records. When present they are
//! surfaced as an extra body section, and any unfinished primary todos turn
//! into an instruction to restore them in the new session.

use serde_json::Value;

use crate::value::{count, field, object, scalar_text};

const COMPLETED: &str = "completed";
const IN_PROGRESS: &str = "in_progress";
const PENDING: &str = "pending";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub content: String,
    pub status: String,
}

impl Todo {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = Some(value.as_object()?);
        Some(Self {
            content: scalar_text(field(obj, "content")).unwrap_or_else(|| "Unknown".to_string()),
            status: scalar_text(field(obj, "status")).unwrap_or_else(|| PENDING.to_string()),
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED
    }

    fn checkbox(&self) -> char {
        match self.status.as_str() {
            COMPLETED => 'x',
            IN_PROGRESS => '>',
            _ => ' ',
        }
    }

    fn render_line(&self) -> String {
        format!("- [{}] {}", self.checkbox(), self.content)
    }
}

fn todo_list(value: Option<&Value>) -> Vec<Todo> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Todo::from_value).collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub completed: u64,
    pub in_progress: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubagentTodos {
    pub agent_id: String,
    pub todos: Vec<Todo>,
}

/// Latest `*_todos.json` capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoSnapshot {
    pub session_id: Option<String>,
    pub summary: Option<TodoCounts>,
    pub primary: Vec<Todo>,
    pub subagents: Vec<SubagentTodos>,
}

impl TodoSnapshot {
    pub fn from_value(value: &Value) -> Self {
        let root = value.as_object();
        let summary = object(field(root, "summary"))
            .filter(|counts| !counts.is_empty())
            .map(|counts| TodoCounts {
                completed: count(counts.get(COMPLETED)),
                in_progress: count(counts.get(IN_PROGRESS)),
                pending: count(counts.get(PENDING)),
            });
        let subagents = match field(root, "subagents") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(|agent| SubagentTodos {
                    agent_id: scalar_text(agent.get("agent_id"))
                        .unwrap_or_else(|| "unknown".to_string()),
                    todos: todo_list(agent.get("todos")),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            session_id: scalar_text(field(root, "session_id")),
            summary,
            primary: todo_list(field(root, "primary")),
            subagents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.subagents.is_empty()
    }

    /// Primary todos that were not finished.
    pub fn unfinished(&self) -> usize {
        self.primary.iter().filter(|todo| !todo.is_completed()).count()
    }

    /// `## Previous Session Todos` body section, or `None` when there is
    /// nothing to show.
    pub fn render_section(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut lines = vec!["## Previous Session Todos".to_string()];
        if let Some(counts) = self.summary {
            lines.push(format!(
                "**Summary**: {} completed, {} in progress, {} pending",
                counts.completed, counts.in_progress, counts.pending
            ));
        }
        if !self.primary.is_empty() {
            lines.push("\n### Main Tasks".to_string());
            lines.extend(self.primary.iter().map(Todo::render_line));
        }
        for agent in self.subagents.iter().filter(|agent| !agent.todos.is_empty()) {
            lines.push(format!("\n### Subagent {}", agent.agent_id));
            lines.extend(agent.todos.iter().map(Todo::render_line));
        }
        Some(lines.join("\n"))
    }

    /// Instruction appended after the tagged context when unfinished todos
    /// should be restored into the new session.
    pub fn restore_note(&self) -> Option<String> {
        let unfinished = self.unfinished();
        if unfinished == 0 {
            return None;
        }
        Some(format!(
            "\n\n**IMPORTANT**: Previous session had active todos. \
             Use TodoWrite immediately to restore them so they appear in the UI. \
             There are {unfinished} non-completed todos to restore."
        ))
    }
}

/// Rolling `todos_history.json` aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoHistory {
    pub session_count: usize,
    pub total_completed: u64,
}

impl TodoHistory {
    pub fn from_value(value: &Value) -> Self {
        let root = value.as_object();
        let session_count = field(root, "sessions")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let aggregate = object(field(root, "aggregate"));
        Self {
            session_count,
            total_completed: count(field(aggregate, "total_completed")),
        }
    }

    pub fn render_line(&self) -> Option<String> {
        if self.session_count == 0 {
            return None;
        }
        Some(format!(
            "\n**Todo History**: {} tasks completed across {} recent session(s)",
            self.total_completed, self.session_count
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> TodoSnapshot {
        TodoSnapshot::from_value(&json!({
            "session_id": "prev-session",
            "summary": {"completed": 1, "in_progress": 1, "pending": 1},
            "primary": [
                {"content": "Write parser", "status": "completed"},
                {"content": "Wire CLI", "status": "in_progress", "activeForm": "Wiring CLI"},
                {"content": "Add docs"}
            ],
            "subagents": [
                {"agent_id": "explorer", "todos": [{"content": "Map modules", "status": "pending"}]},
                {"agent_id": "idle", "todos": []}
            ]
        }))
    }

    #[test]
    fn section_renders_checkboxes_per_status() {
        let section = snapshot().render_section().expect("section");
        assert!(section.starts_with("## Previous Session Todos"));
        assert!(section.contains("**Summary**: 1 completed, 1 in progress, 1 pending"));
        assert!(section.contains("\n### Main Tasks\n- [x] Write parser\n- [>] Wire CLI\n- [ ] Add docs"));
        assert!(section.contains("\n### Subagent explorer\n- [ ] Map modules"));
        assert!(!section.contains("Subagent idle"));
    }

    #[test]
    fn restore_note_counts_unfinished_primary_todos() {
        let note = snapshot().restore_note().expect("note");
        assert!(note.contains("There are 2 non-completed todos to restore."));
    }

    #[test]
    fn all_completed_means_no_restore_note() {
        let snapshot = TodoSnapshot::from_value(&json!({
            "primary": [{"content": "Done", "status": "completed"}]
        }));
        assert_eq!(snapshot.restore_note(), None);
        assert!(snapshot.render_section().is_some());
    }

    #[test]
    fn empty_or_malformed_snapshot_renders_nothing() {
        for raw in [json!({}), json!(null), json!({"primary": "x", "subagents": 3})] {
            let snapshot = TodoSnapshot::from_value(&raw);
            assert!(snapshot.is_empty());
            assert_eq!(snapshot.render_section(), None);
        }
    }

    #[test]
    fn snapshot_keeps_capturing_session_id() {
        let snapshot = snapshot();
        assert_eq!(snapshot.session_id.as_deref(), Some("prev-session"));
        assert_eq!(snapshot.unfinished(), 2);
        assert_eq!(
            TodoSnapshot::from_value(&json!({"primary": []})).session_id,
            None
        );
    }

    #[test]
    fn missing_todo_fields_default() {
        let snapshot = TodoSnapshot::from_value(&json!({"primary": [{}]}));
        assert_eq!(snapshot.primary[0].content, "Unknown");
        assert_eq!(snapshot.primary[0].status, "pending");
        assert_eq!(snapshot.summary, None);
    }

    #[test]
    fn history_line_requires_sessions() {
        let history = TodoHistory::from_value(&json!({
            "sessions": [{}, {}, {}],
            "aggregate": {"total_completed": 9, "total_sessions": 3}
        }));
        assert_eq!(
            history.render_line().as_deref(),
            Some("\n**Todo History**: 9 tasks completed across 3 recent session(s)")
        );
        assert_eq!(TodoHistory::from_value(&json!({})).render_line(), None);
    }
}
