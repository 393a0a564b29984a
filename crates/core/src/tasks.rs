//! Task hierarchy reconstruction and checkbox rendering.
//!
//! Handoff records carry tasks as a flat list. Older writers link a task to
//! its parent through the child's `parent` field, newer ones through the
//! parent's `children` array, and some records mix both. The forest built
//! here treats either link as authoritative and renders every task exactly
//! once.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::value::{field, flag, object, scalar_text, text_list};

/// Rendered in place of the hierarchy when a record has no tasks.
pub const NO_TASKS: &str = "No tasks found.";
/// Status that never produces a badge.
pub const DEFAULT_STATUS: &str = "open";
const UNTITLED: &str = "Untitled";
const UNKNOWN_ID: &str = "unknown";
const INDENT: &str = "  ";
/// Deeper tasks render at this indentation.
pub const MAX_INDENT_DEPTH: usize = 32;

// ─── Records ─────────────────────────────────────────────────────────────────

/// One entry of a record's task list, after lenient decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub completed: bool,
    /// `None` for roots. JSON null, an empty string and the literal `"null"`
    /// all decode to `None`.
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub resume_command: Option<String>,
}

impl TaskRecord {
    /// Decode a task entry. Returns `None` for anything that is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let obj = Some(obj);
        let parent = scalar_text(field(obj, "parent")).filter(|parent| parent != "null");
        Some(Self {
            id: scalar_text(field(obj, "id")),
            title: scalar_text(field(obj, "title")),
            status: scalar_text(field(obj, "status")),
            completed: flag(field(obj, "completed"), false),
            parent,
            children: text_list(field(obj, "children")),
            resume_command: scalar_text(field(obj, "resume_command")),
        })
    }

    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or(UNKNOWN_ID)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    pub fn display_status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    /// Command a fresh session runs to pick the task back up.
    pub fn resume_command(&self) -> String {
        match &self.resume_command {
            Some(cmd) => cmd.clone(),
            None => format!("bd update {} --status in_progress", self.display_id()),
        }
    }

    /// Checkbox line for this task at the given nesting depth.
    /// Indentation stops growing past [`MAX_INDENT_DEPTH`].
    pub fn render_line(&self, depth: usize) -> String {
        let indent = INDENT.repeat(depth.min(MAX_INDENT_DEPTH));
        let title = self.display_title();
        let id = self.display_id();
        if self.completed {
            return format!("{indent}- [x] {title} ({id}) - COMPLETED");
        }
        let status = self.display_status();
        let badge = if status == DEFAULT_STATUS {
            String::new()
        } else {
            format!(" [{status}]")
        };
        format!(
            "{indent}- [ ] {title} ({id}){badge} - `{}`",
            self.resume_command()
        )
    }
}

/// Decode a record's `tasks` array, dropping entries that are not objects.
pub(crate) fn tasks_from_value(value: Option<&Value>) -> Vec<TaskRecord> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(TaskRecord::from_value).collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn tasks_from_beads(beads: Option<&Value>) -> Vec<TaskRecord> {
    tasks_from_value(field(object(beads), "tasks"))
}

// ─── Forest ──────────────────────────────────────────────────────────────────

/// A placed task. `index` points into the task slice the forest was built
/// from; `parent` is the index of the task it renders under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskNode {
    pub index: usize,
    pub depth: usize,
    pub parent: Option<usize>,
}

/// Task hierarchy reconstructed from a flat list, stored in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForest {
    /// Pre-order: every node follows its parent and precedes its later
    /// siblings.
    pub nodes: Vec<TaskNode>,
    /// Roots that only exist because their declared parent could not be
    /// reached: dangling references, cycles, or records without any root.
    pub orphan_roots: usize,
}
/// Lookup tables over an immutable task slice.
struct TaskIndex<'a> {
    by_id: HashMap<&'a str, Vec<usize>>,
    by_parent: HashMap<&'a str, Vec<usize>>,
    /// Positions listed in some other task's `children` array.
    claimed: HashSet<usize>,
}

impl<'a> TaskIndex<'a> {
    fn new(tasks: &'a [TaskRecord]) -> Self {
        let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut by_parent: HashMap<&str, Vec<usize>> = HashMap::new();
        for (pos, task) in tasks.iter().enumerate() {
            if let Some(id) = task.id.as_deref() {
                by_id.entry(id).or_default().push(pos);
            }
            if let Some(parent) = task.parent.as_deref() {
                by_parent.entry(parent).or_default().push(pos);
            }
        }

        let mut claimed = HashSet::new();
        for (pos, task) in tasks.iter().enumerate() {
            for child_id in &task.children {
                if let Some(positions) = by_id.get(child_id.as_str()) {
                    claimed.extend(positions.iter().copied().filter(|&child| child != pos));
                }
            }
        }

        Self {
            by_id,
            by_parent,
            claimed,
        }
    }

    /// Union of parent-linked and children-linked tasks, in list order.
    fn children_of(&self, tasks: &[TaskRecord], pos: usize) -> Vec<usize> {
        let task = &tasks[pos];
        let mut children: Vec<usize> = task
            .id
            .as_deref()
            .and_then(|id| self.by_parent.get(id))
            .cloned()
            .unwrap_or_default();
        for child_id in &task.children {
            if let Some(positions) = self.by_id.get(child_id.as_str()) {
                children.extend_from_slice(positions);
            }
        }
        children.retain(|&child| child != pos);
        children.sort_unstable();
        children.dedup();
        children
    }
}

impl TaskForest {
    /// Reconstruct the hierarchy.
    ///
    /// Parentless tasks become roots in list order, unless another task
    /// claims them through `children`. Anything still unrendered after the
    /// roots are walked is appended as an orphan root, so no task is lost.
    pub fn build(tasks: &[TaskRecord]) -> Self {
        let index = TaskIndex::new(tasks);
        let mut walker = Walker {
            tasks,
            index: &index,
            rendered: vec![false; tasks.len()],
            nodes: Vec::with_capacity(tasks.len()),
            stack: Vec::new(),
        };

        let root_candidates: Vec<usize> = (0..tasks.len())
            .filter(|&pos| tasks[pos].parent.is_none() && !index.claimed.contains(&pos))
            .collect();
        for pos in root_candidates {
            walker.walk(pos);
        }

        let mut orphan_roots = 0;
        for pos in 0..tasks.len() {
            if !walker.rendered[pos] {
                orphan_roots += 1;
                walker.walk(pos);
            }
        }

        Self {
            nodes: walker.nodes,
            orphan_roots,
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter().filter(|node| node.parent.is_none())
    }

    /// Render as indented checkbox lines joined by newlines.
    pub fn render(&self, tasks: &[TaskRecord]) -> String {
        self.nodes
            .iter()
            .map(|node| tasks[node.index].render_line(node.depth))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Depth-first walk over the index with an explicit stack, so arbitrarily
/// long parent chains cannot exhaust the call stack.
struct Walker<'t, 'i> {
    tasks: &'t [TaskRecord],
    index: &'i TaskIndex<'t>,
    rendered: Vec<bool>,
    nodes: Vec<TaskNode>,
    stack: Vec<TaskNode>,
}

impl Walker<'_, '_> {
    fn walk(&mut self, root: usize) {
        self.stack.push(TaskNode {
            index: root,
            depth: 0,
            parent: None,
        });
        while let Some(node) = self.stack.pop() {
            // A sibling's subtree may have reached this task first.
            if self.rendered[node.index] {
                continue;
            }
            self.rendered[node.index] = true;
            self.nodes.push(node);

            let children = self.index.children_of(self.tasks, node.index);
            for &child in children.iter().rev() {
                if !self.rendered[child] {
                    self.stack.push(TaskNode {
                        index: child,
                        depth: node.depth + 1,
                        parent: Some(node.index),
                    });
                }
            }
        }
    }
}

/// Render a flat task list as a nested checkbox tree.
pub fn render_forest(tasks: &[TaskRecord]) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }
    let forest = TaskForest::build(tasks);
    if forest.orphan_roots > 0 {
        debug!(
            roots = forest.roots().count(),
            orphan_roots = forest.orphan_roots,
            "tasks with unresolved parents rendered as roots"
        );
    }
    forest.render(tasks)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use serde_json::json;

    fn decode(value: Value) -> Vec<TaskRecord> {
        tasks_from_value(Some(&value))
    }

    fn child_indices(forest: &TaskForest, parent: usize) -> Vec<usize> {
        forest
            .nodes
            .iter()
            .filter(|node| node.parent == Some(parent))
            .map(|node| node.index)
            .collect()
    }

    fn chain(len: usize) -> Vec<TaskRecord> {
        (0..len)
            .map(|i| {
                let id = format!("t{i}");
                if i == 0 {
                    testing::task(&id, "Step")
                } else {
                    testing::child_task(&id, "Step", &format!("t{}", i - 1))
                }
            })
            .collect()
    }

    #[test]
    fn very_deep_parent_chain_renders_without_overflow() {
        let tasks = chain(20_000);
        let rendered = render_forest(&tasks);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 20_000);
        assert!(lines[0].starts_with("- [ ] Step (t0)"));
        assert!(lines[1].starts_with("  - [ ] Step (t1)"));

        let capped = INDENT.repeat(MAX_INDENT_DEPTH);
        assert!(lines[19_999].starts_with(&format!("{capped}- [ ] Step (t19999)")));
        assert!(!lines[19_999].starts_with(&format!("{capped}{INDENT}")));

        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 1);
        assert_eq!(forest.nodes[19_999].depth, 19_999);
        assert_eq!(forest.orphan_roots, 0);
    }

    #[test]
    fn shared_child_renders_under_first_reaching_parent() {
        let tasks = decode(json!([
            {"id": "a", "title": "A", "children": ["s"]},
            {"id": "b", "title": "B", "children": ["s"]},
            {"id": "s", "title": "Shared"}
        ]));
        let forest = TaskForest::build(&tasks);
        assert_eq!(child_indices(&forest, 0), vec![2]);
        assert!(child_indices(&forest, 1).is_empty());
        assert_eq!(
            forest.nodes.iter().map(|n| n.index).collect::<Vec<_>>(),
            vec![0, 2, 1]
        );
    }

    #[test]
    fn empty_list_renders_sentinel() {
        assert_eq!(render_forest(&[]), NO_TASKS);
    }

    #[test]
    fn open_task_with_default_status_has_no_badge() {
        let tasks = decode(json!([
            {"id": "t1", "title": "Patch", "completed": false, "status": "open", "parent": null}
        ]));
        assert_eq!(
            render_forest(&tasks),
            "- [ ] Patch (t1) - `bd update t1 --status in_progress`"
        );
    }

    #[test]
    fn non_default_status_gets_badge() {
        let mut task = testing::task("t2", "Refactor");
        task.status = Some("in_progress".to_string());
        assert_eq!(
            task.render_line(0),
            "- [ ] Refactor (t2) [in_progress] - `bd update t2 --status in_progress`"
        );
    }

    #[test]
    fn completed_task_ignores_status() {
        let mut task = testing::task("t3", "Ship");
        task.completed = true;
        task.status = Some("blocked".to_string());
        assert_eq!(task.render_line(1), "  - [x] Ship (t3) - COMPLETED");
    }

    #[test]
    fn explicit_resume_command_wins() {
        let tasks = decode(json!([
            {"id": "t4", "title": "Deploy", "resume_command": "make deploy"}
        ]));
        assert_eq!(render_forest(&tasks), "- [ ] Deploy (t4) - `make deploy`");
    }

    #[test]
    fn missing_title_and_id_fall_back() {
        let tasks = decode(json!([{}]));
        assert_eq!(
            render_forest(&tasks),
            "- [ ] Untitled (unknown) - `bd update unknown --status in_progress`"
        );
    }

    #[test]
    fn literal_null_parent_is_a_root() {
        let tasks = decode(json!([
            {"id": "a", "title": "A", "parent": "null"},
            {"id": "b", "title": "B", "parent": ""}
        ]));
        assert!(tasks.iter().all(|task| task.parent.is_none()));
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 2);
        assert_eq!(forest.orphan_roots, 0);
    }

    #[test]
    fn parent_field_nests_children() {
        let tasks = vec![
            testing::task("epic", "Epic"),
            testing::child_task("s1", "Step one", "epic"),
            testing::child_task("s2", "Step two", "epic"),
        ];
        let rendered = render_forest(&tasks);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("- [ ] Epic (epic)"));
        assert!(lines[1].starts_with("  - [ ] Step one (s1)"));
        assert!(lines[2].starts_with("  - [ ] Step two (s2)"));
    }

    #[test]
    fn children_array_claims_parentless_task() {
        let tasks = decode(json!([
            {"id": "A", "title": "Alpha", "children": ["B"]},
            {"id": "B", "title": "Beta", "parent": null}
        ]));
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 1);
        assert_eq!(child_indices(&forest, 0), vec![1]);

        let rendered = render_forest(&tasks);
        assert_eq!(rendered.matches("(B)").count(), 1);
        assert!(rendered.contains("\n  - [ ] Beta (B)"));
    }

    #[test]
    fn claimed_task_nests_even_when_listed_first() {
        let tasks = decode(json!([
            {"id": "B", "title": "Beta"},
            {"id": "A", "title": "Alpha", "children": ["B"]}
        ]));
        let rendered = render_forest(&tasks);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- [ ] Alpha (A)"));
        assert!(lines[1].starts_with("  - [ ] Beta (B)"));
    }

    #[test]
    fn both_linkage_styles_are_unioned_in_list_order() {
        let tasks = decode(json!([
            {"id": "root", "title": "Root", "children": ["c2"]},
            {"id": "c1", "title": "Via parent", "parent": "root"},
            {"id": "c2", "title": "Via children"},
            {"id": "c3", "title": "Via both", "parent": "root"}
        ]));
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 1);
        assert_eq!(child_indices(&forest, 0), vec![1, 2, 3]);
    }

    #[test]
    fn grandchildren_indent_two_levels() {
        let tasks = vec![
            testing::task("r", "Root"),
            testing::child_task("c", "Child", "r"),
            testing::child_task("g", "Grandchild", "c"),
        ];
        let rendered = render_forest(&tasks);
        assert!(rendered.contains("\n    - [ ] Grandchild (g)"));
    }

    #[test]
    fn all_dangling_parents_fall_back_to_flat_list() {
        let tasks = vec![
            testing::child_task("x", "X", "missing"),
            testing::child_task("y", "Y", "gone"),
        ];
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 2);
        assert_eq!(forest.orphan_roots, 2);
        let rendered = forest.render(&tasks);
        assert!(rendered.starts_with("- [ ] X (x)"));
        assert!(rendered.contains("\n- [ ] Y (y)"));
    }

    #[test]
    fn dangling_parent_is_kept_beside_intact_tree() {
        let tasks = vec![
            testing::task("r", "Root"),
            testing::child_task("c", "Child", "r"),
            testing::child_task("o", "Orphan", "nope"),
        ];
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 2);
        assert_eq!(forest.orphan_roots, 1);
        assert_eq!(forest.nodes.len(), 3);
    }

    #[test]
    fn linkage_cycle_terminates_and_renders_each_task_once() {
        let tasks = decode(json!([
            {"id": "a", "title": "A", "parent": "b", "children": ["b"]},
            {"id": "b", "title": "B", "parent": "a", "children": ["a"]}
        ]));
        let rendered = render_forest(&tasks);
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.starts_with("- [ ] A (a)"));
        assert!(rendered.contains("\n  - [ ] B (b)"));
    }

    #[test]
    fn self_reference_is_ignored() {
        let tasks = decode(json!([
            {"id": "a", "title": "A", "children": ["a"]}
        ]));
        let forest = TaskForest::build(&tasks);
        assert_eq!(forest.roots().count(), 1);
        assert!(child_indices(&forest, 0).is_empty());
    }

    #[test]
    fn non_object_task_entries_are_dropped() {
        let tasks = decode(json!(["oops", 3, null, {"id": "ok", "title": "Fine"}]));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].display_id(), "ok");
        assert!(tasks_from_value(Some(&json!("not a list"))).is_empty());
    }

    #[test]
    fn numeric_ids_link_to_numeric_parents() {
        let tasks = decode(json!([
            {"id": 1, "title": "One"},
            {"id": 2, "title": "Two", "parent": 1}
        ]));
        let rendered = render_forest(&tasks);
        assert!(rendered.contains("\n  - [ ] Two (2)"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let tasks = decode(json!([
            {"id": "p", "title": "P", "children": ["q", "r"]},
            {"id": "q", "title": "Q", "parent": "p"},
            {"id": "r", "title": "R", "completed": true},
            {"id": "s", "title": "S", "parent": "missing"}
        ]));
        assert_eq!(render_forest(&tasks), render_forest(&tasks));
    }
}
