/// Remove one pair of wrapping double quotes if present (e.g. `"C:\a"` -> `C:\a`).
/// The flag reports whether a pair was removed.
pub fn strip_quotes(s: &str) -> (&str, bool) {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        (&s[1..s.len() - 1], true)
    } else {
        (s, false)
    }
}

/// Translate a user exclude glob into an anchored regex source.
/// Only `.` is escaped and `*` expanded; anything else is passed through as regex syntax.
pub fn glob_to_regex(glob: &str) -> String {
    let escaped = glob.replace('.', r"\.").replace('*', ".*");
    format!("^{}$", escaped)
}

/// Shorten long clipboard text for log lines: first 20 and last 20 chars around an ellipsis.
pub fn shorten(text: &str) -> String {
    let count = text.chars().count();
    if count <= 50 {
        return text.to_string();
    }
    let head: String = text.chars().take(20).collect();
    let tail: String = text.chars().skip(count - 20).collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_pair_of_quotes() {
        assert_eq!(strip_quotes(r#""C:\a""#), (r"C:\a", true));
        assert_eq!(strip_quotes(r#"""C:\a"""#), (r#""C:\a""#, true));
    }

    #[test]
    fn leaves_unbalanced_quotes() {
        assert_eq!(strip_quotes(r#""C:\a"#), (r#""C:\a"#, false));
        assert_eq!(strip_quotes(r#"C:\a""#), (r#"C:\a""#, false));
        assert_eq!(strip_quotes("\""), ("\"", false));
    }

    #[test]
    fn empty_quotes_strip_to_empty() {
        assert_eq!(strip_quotes("\"\""), ("", true));
    }

    #[test]
    fn glob_escapes_dots_then_expands_stars() {
        assert_eq!(glob_to_regex("*.tmp"), r"^.*\.tmp$");
        assert_eq!(glob_to_regex("http://*"), "^http://.*$");
    }

    #[test]
    fn shorten_keeps_short_text() {
        let s = "C:\\Users\\test\\file.txt";
        assert_eq!(shorten(s), s);
    }

    #[test]
    fn shorten_cuts_long_text() {
        let s = "a".repeat(30) + &"b".repeat(30);
        let out = shorten(&s);
        assert_eq!(out, format!("{}...{}", "a".repeat(20), "b".repeat(20)));
    }

    #[test]
    fn shorten_is_char_aware() {
        let s = "路".repeat(60);
        assert_eq!(shorten(&s).chars().count(), 43);
    }
}
