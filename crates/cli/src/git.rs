use std::path::Path;
use std::process::Command;

/// Branch name reported when git cannot tell us one.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Current branch of the repository at `cwd`, or [`UNKNOWN_BRANCH`].
pub fn current_branch(cwd: &Path) -> String {
    git_cmd(cwd, &["rev-parse", "--abbrev-ref", "HEAD"]).unwrap_or_else(|| {
        tracing::debug!("Could not resolve git branch in {}", cwd.display());
        UNKNOWN_BRANCH.to_string()
    })
}

fn git_cmd(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(cwd)
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_repo_is_unknown() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert_eq!(current_branch(tmp.path()), UNKNOWN_BRANCH);
    }

    #[test]
    fn reads_branch_of_committed_repo() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let run = |args: &[&str]| {
            let status = Command::new("git")
                .arg("-C")
                .arg(tmp.path())
                .args(args)
                .status()
                .expect("run git");
            assert!(status.success(), "git {:?}", args);
        };
        run(&["init", "--initial-branch=feature-auth"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test User"]);
        run(&["commit", "--allow-empty", "-m", "init"]);

        assert_eq!(current_branch(tmp.path()), "feature-auth");
    }
}
