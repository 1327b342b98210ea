use regex::Regex;

use crate::text::glob_to_regex;

/// Protocol prefixes that are never treated as paths, checked before any user pattern.
pub const BUILTIN_PREFIXES: [&str; 5] = ["http://", "https://", "mailto:", "ftp://", "file://"];

/// Default user exclude globs.
pub fn default_patterns() -> Vec<String> {
    ["http://*", "https://*", "mailto:*", "ftp://*", "file://*"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Returns the built-in prefix `text` starts with, ignoring case.
pub fn builtin_prefix(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BUILTIN_PREFIXES.iter().copied().find(|p| lower.starts_with(p))
}

/// Compiled, immutable set of user exclude patterns.
#[derive(Debug, Default)]
pub struct ExcludeRules {
    rules: Vec<(String, Regex)>,
}

impl ExcludeRules {
    /// Compile globs in order. Patterns that fail to compile are logged and skipped.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut rules = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Regex::new(&glob_to_regex(pattern)) {
                Ok(re) => rules.push((pattern.to_string(), re)),
                Err(e) => log::warn!("Skipping exclude pattern '{}': {}", pattern, e),
            }
        }
        ExcludeRules { rules }
    }

    /// First pattern matching the whole of `text`.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(pattern, _)| pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
