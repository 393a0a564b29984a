//! Context assembly: turns a normalized record into the user-facing notice
//! and the `<session-context>` block handed to the downstream model.
//!
//! Section headings and the tag name are a wire contract with the consumer
//! of the context block; keep them stable.

use serde_json::Value;

use crate::format::{format_bullets, format_list};
use crate::normalize::{NormalizedContext, normalize};
use crate::tasks::render_forest;
use crate::todos::{TodoHistory, TodoSnapshot};

/// Tag wrapping the machine-readable body.
pub const CONTEXT_TAG: &str = "session-context";
/// Slash-command namespace used in notice tips when none is configured.
pub const DEFAULT_COMMAND_NAMESPACE: &str = "spectre";

const BANNER: [&str; 3] = [
    "░█▀▀░█▀█░█▀▀░█▀▀░▀█▀░█▀▄░█▀▀",
    "░▀▀█░█▀▀░█▀▀░█░░░░█░░█▀▄░█▀▀",
    "░▀▀▀░▀░░░▀▀▀░▀▀▀░░▀░░▀░▀░▀▀▀",
];

/// Already-resolved inputs that do not come from the record itself.
#[derive(Debug, Clone, Default)]
pub struct Extras {
    /// Location of the record, shown in the notice as "Full details".
    pub record_path: Option<String>,
    pub todos: Option<TodoSnapshot>,
    pub history: Option<TodoHistory>,
    pub command_namespace: Option<String>,
}

impl Extras {
    fn namespace(&self) -> &str {
        self.command_namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_COMMAND_NAMESPACE)
    }
}

/// Output of one compile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContext {
    /// Short message displayed to the user.
    pub notice: String,
    /// `body` wrapped in the `<session-context>` delimiter pair.
    pub tag: String,
    /// Full structured context.
    pub body: String,
    /// Todo restore instruction, appended after `tag` for the host.
    pub restore_note: Option<String>,
}

impl RenderedContext {
    /// Payload for the host's additional-context slot.
    pub fn additional_context(&self) -> String {
        match &self.restore_note {
            Some(note) => format!("{}{note}", self.tag),
            None => self.tag.clone(),
        }
    }
}

/// Run the whole pipeline: normalize, render the task forest, assemble.
pub fn compile(record: &Value, extras: &Extras) -> RenderedContext {
    let normalized = normalize(record);
    let forest = if normalized.shows_tasks() {
        render_forest(&normalized.tasks)
    } else {
        String::new()
    };
    assemble(&normalized, &forest, extras)
}

/// Compose the notice and tagged body from normalized fields.
pub fn assemble(ctx: &NormalizedContext, forest_text: &str, extras: &Extras) -> RenderedContext {
    let notice = build_notice(ctx, extras);
    let body = build_body(ctx, forest_text, extras);
    let tag = wrap_context(&body);
    let restore_note = extras.todos.as_ref().and_then(TodoSnapshot::restore_note);
    RenderedContext {
        notice,
        tag,
        body,
        restore_note,
    }
}

/// Wrap a body in the fixed `<session-context>` delimiters.
pub fn wrap_context(body: &str) -> String {
    format!("<{CONTEXT_TAG}>\n{body}\n</{CONTEXT_TAG}>")
}

fn banner() -> String {
    let mut lines = vec![""];
    lines.extend(BANNER);
    lines.join("\n")
}

fn build_notice(ctx: &NormalizedContext, extras: &Extras) -> String {
    let progress = &ctx.progress;
    let mut lines = vec![banner()];
    lines.push(format!(
        "\n\u{1f504} Session Resumed: {} | Branch: {}",
        ctx.task_name, ctx.branch_name
    ));
    if let Some(goal) = &progress.goal {
        lines.push(format!("\n\u{1f3af} Goal: {goal}"));
    }
    lines.push(format!("\n\u{1f4dd} Summary: {}", progress.summary));
    if !progress.next_steps.is_empty() {
        lines.push("\n\u{27a1}\u{fe0f} Next Steps:".to_string());
        for step in &progress.next_steps {
            lines.push(format!("  - {step}"));
        }
    }
    if let Some(path) = &extras.record_path {
        lines.push(format!("\n\u{1f4c1} Full details: {path}"));
    }
    lines.push(format!(
        "\n\u{1f4a1} Run /{}:forget to clear session memory and start fresh.",
        extras.namespace()
    ));
    lines.join("\n")
}

fn push_list_section(body: &mut String, heading: &str, items: &[String]) {
    if !items.is_empty() {
        body.push_str(&format!("\n### {heading}\n{}", format_bullets(items)));
    }
}

fn build_body(ctx: &NormalizedContext, forest_text: &str, extras: &Extras) -> String {
    let progress = &ctx.progress;
    let mut body = format!("# Session Context: {}", ctx.task_name);

    if let Some(section) = extras.todos.as_ref().and_then(TodoSnapshot::render_section) {
        body.push('\n');
        body.push_str(&section);
        if let Some(line) = extras.history.as_ref().and_then(TodoHistory::render_line) {
            body.push_str(&line);
        }
    }

    body.push_str(&format!("\n## Last Session Summary\n{}", progress.summary));
    if let Some(goal) = &progress.goal {
        body.push_str(&format!("\n### Goal\n{goal}"));
    }
    push_list_section(&mut body, "Constraints", &progress.constraints);
    push_list_section(&mut body, "What We Accomplished", &progress.accomplished);
    if let Some(now) = &progress.active_work {
        body.push_str(&format!("\n### Active Work (Resume Here)\n**{now}**"));
    }
    push_list_section(&mut body, "What's Next", &progress.next_steps);
    push_list_section(&mut body, "Blockers", &progress.blockers);
    push_list_section(&mut body, "Open Questions", &progress.open_questions);
    push_list_section(&mut body, "Decisions Made", &progress.decisions);

    let risks = if progress.risks.is_empty() {
        "None identified".to_string()
    } else {
        format_list(&progress.risks, "")
    };
    body.push_str(&format!(
        "\n**Confidence**: {} | **Risks**: {risks}",
        progress.confidence
    ));

    let ws = &ctx.working_set;
    let ws_lines: Vec<String> = [
        ("Key Files", &ws.key_files),
        ("Active IDs", &ws.active_ids),
        ("Recent Commands", &ws.recent_commands),
    ]
    .into_iter()
    .filter(|(_, items)| !items.is_empty())
    .map(|(label, items)| format!("- **{label}**: {}", items.join(", ")))
    .collect();
    if !ws_lines.is_empty() {
        body.push_str(&format!("\n### Working Set\n{}", ws_lines.join("\n")));
    }

    body.push_str(&format!(
        "\n---\n\n## Context\n- **Branch**: {}\n- **Last Commit**: {}\n- **WIP State**: {}",
        ctx.branch_name, ctx.repo.last_commit, ctx.repo.wip_state
    ));

    if ctx.shows_tasks() && !forest_text.is_empty() {
        body.push_str(&format!("\n### Beads Tasks\n{forest_text}"));
    }

    body
}

/// Notice shown when there is no previous session to resume.
pub fn welcome_notice(namespace: &str) -> String {
    let ns = if namespace.is_empty() {
        DEFAULT_COMMAND_NAMESPACE
    } else {
        namespace
    };
    let tips = [
        String::new(),
        "Getting Started:".to_string(),
        String::new(),
        "\u{2699}\u{fe0f}  Tip: Turn off auto-compact via /config; manual context management works best here".to_string(),
        format!("\u{1f4be}  Use /{ns}:handoff when context is getting full but you're still going, to save state for the next session"),
        format!("\u{1f9f9}  Use /{ns}:forget to clear session memory and start fresh"),
        format!("\u{1f680}  Use /{ns}:scope to start building features with the full workflow"),
        format!("\u{1f393}  Use /{ns}:learn to create a documentation skill that your agent will auto-load when relevant."),
    ];
    format!("{}\n{}", banner(), tips.join("\n"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
