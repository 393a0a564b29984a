/// Rendered after the bullet when a list has no items.
pub const NONE_SENTINEL: &str = "None";
pub const DEFAULT_BULLET: &str = "- ";

/// Render one line per item, each prefixed by `bullet`.
///
/// An empty list renders as a single `<bullet>None` line. An empty bullet is
/// allowed for inline lists such as risks.
pub fn format_list<S: AsRef<str>>(items: &[S], bullet: &str) -> String {
    if items.is_empty() {
        return format!("{bullet}{NONE_SENTINEL}");
    }
    items
        .iter()
        .map(|item| format!("{bullet}{}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`format_list`] with the default `"- "` bullet.
pub fn format_bullets<S: AsRef<str>>(items: &[S]) -> String {
    format_list(items, DEFAULT_BULLET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_renders_none_sentinel() {
        let empty: [&str; 0] = [];
        assert_eq!(format_bullets(&empty), "- None");
        assert_eq!(format_list(&empty, "* "), "* None");
        assert_eq!(format_list(&empty, ""), "None");
    }

    #[test]
    fn items_are_prefixed_and_newline_joined() {
        assert_eq!(format_bullets(&["one", "two"]), "- one\n- two");
    }

    #[test]
    fn empty_bullet_renders_bare_lines() {
        let risks = vec!["Timeline tight".to_string(), "Flaky CI".to_string()];
        assert_eq!(format_list(&risks, ""), "Timeline tight\nFlaky CI");
    }
}
