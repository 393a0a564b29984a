use serde_json::{Value, json};

use crate::tasks::TaskRecord;

/// Open root task with the given id and title.
pub fn task(id: &str, title: &str) -> TaskRecord {
    TaskRecord {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        status: Some("open".to_string()),
        ..TaskRecord::default()
    }
}

/// Open task linked to `parent` through its own `parent` field.
pub fn child_task(id: &str, title: &str, parent: &str) -> TaskRecord {
    TaskRecord {
        parent: Some(parent.to_string()),
        ..task(id, title)
    }
}

/// Schema 1.0 record: no working set, key files under `context`.
pub fn record_v1_0(task_name: &str) -> Value {
    json!({
        "version": "1.0",
        "timestamp": "2024-01-01-120000",
        "branch_name": "main",
        "task_name": task_name,
        "progress_update": {
            "summary": "Legacy summary",
            "accomplished": ["Did something"],
            "next_steps": ["Do more"],
            "decisions": [],
            "blockers": [],
            "confidence": "medium",
            "risks": []
        },
        "beads": {
            "tasks": [{"id": "v10-task", "title": "V1.0 Task", "completed": false, "status": "open"}]
        },
        "context": {
            "key_files": ["legacy_file.py", "old_test.py"],
            "last_commit": "abc123",
            "wip_state": "clean"
        }
    })
}

/// Schema 1.1 record with every section populated.
pub fn record_v1_1(task_name: &str) -> Value {
    json!({
        "version": "1.1",
        "timestamp": "2024-01-15-143000",
        "branch_name": "feature-auth",
        "task_name": task_name,
        "progress_update": {
            "summary": "Made good progress on OAuth2 integration with Google provider.",
            "goal": "Complete OAuth2 flow with refresh token handling",
            "constraints": ["Must support existing session middleware", "Cannot change database schema"],
            "accomplished": ["Implemented authorization endpoint", "Added token exchange logic"],
            "now": "Implementing refresh token rotation",
            "next_steps": ["Add token refresh endpoint", "Write integration tests"],
            "decisions": ["Use PKCE for public clients"],
            "blockers": ["Waiting on security review approval"],
            "open_questions": ["Should we support multiple OAuth providers?"],
            "confidence": "high",
            "risks": ["Security review might require changes"]
        },
        "working_set": {
            "key_files": ["src/auth/oauth.py", "src/auth/tokens.py"],
            "active_ids": ["AUTH-42", "AUTH-43"],
            "recent_commands": ["pytest tests/test_oauth.py -v"]
        },
        "beads": {
            "available": true,
            "tasks": [
                {"id": "auth-1", "title": "Setup OAuth config", "completed": true, "status": "closed"},
                {"id": "auth-2", "title": "Implement token refresh", "completed": false, "status": "in_progress"}
            ]
        },
        "context": {"last_commit": "def789abc", "wip_state": "uncommitted"}
    })
}
