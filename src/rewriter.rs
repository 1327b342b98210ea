use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;

use crate::exclude::{ExcludeRules, builtin_prefix};
use crate::text::{shorten, strip_quotes};

/// A `%NAME%` run somewhere in the text.
static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[^%]+%").expect("env var regex compiles"));

/// Why a text was excluded from rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Protocol(&'static str),
    Pattern(String),
    /// A `%`-delimited variable name itself contains a backslash.
    EnvVar,
}

/// Which path shape made a text eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    DriveLetter,
    Unc,
    Backslash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Empty,
    NoBackslash,
    Excluded(Exclusion),
    Eligible(Shape),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible(_))
    }
}

/// Decides whether clipboard text is a Windows path and rewrites its separators.
pub struct PathRewriter {
    rules: RwLock<Arc<ExcludeRules>>,
}

impl PathRewriter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        PathRewriter {
            rules: RwLock::new(Arc::new(ExcludeRules::compile(patterns))),
        }
    }

    /// Replace the whole exclude set. Readers see either the old or the new set, never a mix.
    pub fn update_exclude_patterns<S: AsRef<str>>(&self, patterns: &[S]) {
        let compiled = Arc::new(ExcludeRules::compile(patterns));
        log::debug!("Exclude patterns updated: {} active", compiled.len());
        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = compiled;
    }

    fn current_rules(&self) -> Arc<ExcludeRules> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn evaluate(&self, text: &str) -> Verdict {
        if text.is_empty() {
            return Verdict::Empty;
        }
        let (content, _) = strip_quotes(text);
        if !content.contains('\\') {
            return Verdict::NoBackslash;
        }
        if let Some(reason) = self.is_excluded(content) {
            return Verdict::Excluded(reason);
        }
        Verdict::Eligible(shape_of(content))
    }

    pub fn should_convert(&self, text: &str) -> bool {
        self.evaluate(text).is_eligible()
    }

    /// Built-in prefixes first, then user patterns, then the env var rule.
    pub fn is_excluded(&self, text: &str) -> Option<Exclusion> {
        if let Some(prefix) = builtin_prefix(text) {
            log::debug!("Excluded protocol {}: {}", prefix, shorten(text));
            return Some(Exclusion::Protocol(prefix));
        }

        if let Some(pattern) = self.current_rules().find_match(text) {
            log::debug!("Excluded by pattern '{}': {}", pattern, shorten(text));
            return Some(Exclusion::Pattern(pattern.to_string()));
        }

        // Odd segments of a '%' split are the variable names between paired delimiters.
        if ENV_VAR.is_match(text) {
            let parts: Vec<&str> = text.split('%').collect();
            let named_backslash = parts[..parts.len() - 1]
                .iter()
                .skip(1)
                .step_by(2)
                .any(|segment| segment.contains('\\'));
            if named_backslash {
                log::debug!("Excluded env var text: {}", shorten(text));
                return Some(Exclusion::EnvVar);
            }
        }

        None
    }

    /// Rewrite every backslash to a forward slash, keeping one pair of wrapping quotes.
    /// Returns `text` unchanged when there is nothing to rewrite.
    pub fn convert(&self, text: &str) -> String {
        let (content, quoted) = strip_quotes(text);
        if !content.contains('\\') {
            return text.to_string();
        }
        let converted = content.replace('\\', "/");
        let out = if quoted {
            format!("\"{}\"", converted)
        } else {
            converted
        };
        log::debug!("Rewrote {} -> {}", shorten(text), shorten(&out));
        out
    }
}

fn shape_of(content: &str) -> Shape {
    let bytes = content.as_bytes();
    if bytes.len() >= 3 && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/') {
        Shape::DriveLetter
    } else if content.starts_with(r"\\") {
        Shape::Unc
    } else {
        Shape::Backslash
    }
}

#[cfg(test)]
#[path = "rewriter_tests.rs"]
mod tests;
