//! # Include/Exclude Glob Matching (`common::archive::pattern`)
//!
//! File: cli/src/common/archive/pattern.rs
//!
//! ## Overview
//!
//! Decides which entries an archive or extract operation touches. Patterns are
//! compiled once with `globset` so that `*` and `?` stay inside one path
//! segment while `**` spans any number of directories (`dir/*/*.log`,
//! `**/*.txt`). Candidate paths always use `/` as the separator.
//!
//! ## Soft failures
//!
//! A malformed pattern never aborts an operation. It compiles to a rule that
//! matches nothing and a warning is logged, so a broken include selects no
//! entries and a broken exclude removes none.
//!
//! ## Usage
//!
//! ```rust
//! let patterns = PatternSet::new(Some("*.txt"), Some("secret*"));
//! assert!(patterns.selects("notes.txt"));
//! assert!(!patterns.selects("secret.txt"));
//! assert!(!patterns.selects("build.log"));
//! ```
//!
use globset::{GlobBuilder, GlobMatcher};
use std::fmt;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
enum Rule {
    Glob(GlobMatcher),
    /// Pattern failed to compile; recovered as "matches nothing".
    Invalid,
}

/// A single compiled glob.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    rule: Rule,
}

impl Pattern {
    /// Compiles `pattern`. Compilation errors are logged and recovered.
    pub fn compile(pattern: &str) -> Self {
        let rule = match GlobBuilder::new(pattern).literal_separator(true).build() {
            Ok(glob) => Rule::Glob(glob.compile_matcher()),
            Err(e) => {
                warn!(
                    "Invalid glob pattern '{}': {}; treating it as matching nothing",
                    pattern, e
                );
                Rule::Invalid
            }
        };
        Self {
            text: pattern.to_string(),
            rule,
        }
    }

    /// Whether the pattern compiled successfully.
    pub fn is_valid(&self) -> bool {
        matches!(self.rule, Rule::Glob(_))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Tests a `/`-separated relative path against the pattern.
    pub fn is_match(&self, path: &str) -> bool {
        match &self.rule {
            Rule::Glob(matcher) => matcher.is_match(path),
            Rule::Invalid => {
                trace!("Skipping match of '{}' against invalid pattern '{}'", path, self.text);
                false
            }
        }
    }
}

/// One-shot match of `path` against `pattern`. Malformed patterns never match.
///
/// Operations compile their patterns once through `PatternSet`; this form is
/// for checking single globs.
#[cfg(test)]
pub fn matches(pattern: &str, path: &str) -> bool {
    Pattern::compile(pattern).is_match(path)
}

/// The include/exclude pair applied to every entry.
///
/// An entry is selected iff it matches the include pattern (or there is none)
/// and does not match the exclude pattern (or there is none).
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    include: Option<Pattern>,
    exclude: Option<Pattern>,
}

impl PatternSet {
    /// Builds a set from optional patterns; empty strings mean "no filter".
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        let compile = |p: Option<&str>| p.filter(|p| !p.is_empty()).map(Pattern::compile);
        Self {
            include: compile(include),
            exclude: compile(exclude),
        }
    }

    /// Whether the set filters anything at all.
    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn selects(&self, path: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |p| p.is_match(path));
        let excluded = self.exclude.as_ref().map_or(false, |p| p.is_match(path));
        trace!(path, included, excluded, "Pattern decision");
        included && !excluded
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "'{}'", self.as_str())
        } else {
            write!(f, "'{}' (invalid)", self.as_str())
        }
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.include, &self.exclude) {
            (None, None) => f.write_str("all entries"),
            (Some(include), None) => write!(f, "include {}", include),
            (None, Some(exclude)) => write!(f, "exclude {}", exclude),
            (Some(include), Some(exclude)) => {
                write!(f, "include {}, exclude {}", include, exclude)
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn selected<'a>(set: &PatternSet, paths: &[&'a str]) -> Vec<&'a str> {
        paths.iter().copied().filter(|p| set.selects(p)).collect()
    }

    const FLAT: [&str; 3] = ["file1.txt", "file2.log", "file3.txt"];

    #[test]
    fn test_include_only() {
        let set = PatternSet::new(Some("*.txt"), None);
        assert_eq!(selected(&set, &FLAT), vec!["file1.txt", "file3.txt"]);
    }

    #[test]
    fn test_include_all_exclude_logs() {
        let set = PatternSet::new(Some("*"), Some("*.log"));
        assert_eq!(selected(&set, &FLAT), vec!["file1.txt", "file3.txt"]);

        let set = PatternSet::new(Some("*"), Some("file1.txt"));
        assert_eq!(selected(&set, &FLAT), vec!["file2.log", "file3.txt"]);
    }

    #[test]
    fn test_empty_patterns_select_everything() {
        let set = PatternSet::new(Some(""), None);
        assert!(set.is_empty());
        assert_eq!(selected(&set, &FLAT), FLAT.to_vec());
    }

    #[test]
    fn test_wildcards_respect_separators() {
        assert!(matches("dir/*", "dir/file1.txt"));
        assert!(!matches("dir/*", "dir/sub/file1.txt"));
        assert!(matches("dir/*/*.log", "dir/subdir/file1.log"));
        assert!(!matches("dir/*/*.log", "dir/file1.log"));
        assert!(matches("**/*.log", "a/b/c/file.log"));
        assert!(!matches("*.txt", "sub/file.txt"));
    }

    #[test]
    fn test_question_mark() {
        assert!(matches("file?.txt", "file1.txt"));
        assert!(!matches("file?.txt", "file10.txt"));
        assert!(matches("dir/???.log", "dir/abc.log"));
        assert!(matches("file?*.txt", "file1abc.txt"));
        assert!(matches("*file.txt", "myfile.txt"));
    }

    #[test]
    fn test_invalid_pattern_is_soft_failure() {
        let broken = Pattern::compile("[unclosed");
        assert!(!broken.is_valid());
        assert_eq!(broken.as_str(), "[unclosed");
        assert!(!broken.is_match("[unclosed"));

        // A broken include selects nothing, a broken exclude removes nothing.
        let set = PatternSet::new(Some("[unclosed"), None);
        assert!(selected(&set, &FLAT).is_empty());
        let set = PatternSet::new(None, Some("{a,b"));
        assert_eq!(selected(&set, &FLAT), FLAT.to_vec());
        assert_eq!(set.to_string(), "exclude '{a,b' (invalid)");
    }
}
