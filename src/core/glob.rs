//! Glob masks: compiles user-supplied include/exclude patterns into path matchers.
//!
//! Patterns are translated to anchored regular expressions over normalized paths.
//! `**` crosses directory boundaries, `*` and `?` stay within one segment, and
//! every other character matches itself.

use regex::Regex;
use std::collections::HashMap;

use super::path::normalize;

/// A single compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: String,
    regex: Option<Regex>,
}

impl Matcher {
    /// The pattern text this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Tests a path against the pattern. The path is normalized first; a path that
    /// cannot be normalized never matches.
    pub fn test(&self, path: &str) -> bool {
        normalize(path).is_some_and(|p| self.test_normalized(&p))
    }

    /// Tests an already normalized path.
    pub(crate) fn test_normalized(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path))
    }
}

/// Compiles one glob pattern into a [`Matcher`].
pub fn compile(pattern: &str) -> Matcher {
    let cleaned = clean_pattern(pattern);
    let source = glob_to_regex(&cleaned);
    let regex = match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            // Only reachable through the regex size limit; the grammar itself always compiles.
            tracing::error!("Failed to compile glob pattern {:?}: {}", pattern, e);
            None
        }
    };
    Matcher {
        pattern: cleaned,
        regex,
    }
}

/// Compiles a list of patterns, dropping blank and whitespace-only entries.
pub fn compile_set<S: AsRef<str>>(patterns: &[S]) -> Vec<Matcher> {
    patterns
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|p| !p.trim().is_empty())
        .map(compile)
        .collect()
}

fn clean_pattern(pattern: &str) -> String {
    let unified = pattern.trim().replace('\\', "/");
    unified.trim_start_matches('/').to_string()
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                if i - start == 1 {
                    out.push_str("[^/]*");
                    continue;
                }

                let at_segment_start = start == 0 || chars[start - 1] == '/';
                if at_segment_start && chars.get(i) == Some(&'/') {
                    // "**/" may match zero segments.
                    out.push_str("(?:.*/)?");
                    i += 1;
                } else if at_segment_start && i == chars.len() && start > 0 {
                    // Trailing "/**" also matches the directory path itself.
                    out.pop();
                    out.push_str("(?:/.*)?");
                } else {
                    out.push_str(".*");
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Combined include/exclude evaluation.
///
/// Precedence: an exclude match always rejects; an empty include list accepts
/// everything not excluded; otherwise a path must match at least one include.
#[derive(Debug, Clone, Default)]
pub struct MaskMatcher {
    include: Vec<Matcher>,
    exclude: Vec<Matcher>,
}

impl MaskMatcher {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Self {
        Self {
            include: compile_set(include),
            exclude: compile_set(exclude),
        }
    }

    /// Builds a mask from matchers that were compiled elsewhere, e.g. by a [`MatcherCache`].
    pub fn from_matchers(include: Vec<Matcher>, exclude: Vec<Matcher>) -> Self {
        Self { include, exclude }
    }

    pub fn include(&self) -> &[Matcher] {
        &self.include
    }

    pub fn exclude(&self) -> &[Matcher] {
        &self.exclude
    }

    pub fn matches(&self, path: &str) -> bool {
        normalize(path).is_some_and(|p| self.matches_normalized(&p))
    }

    /// Returns `true` if an exclude pattern matches the path.
    pub fn is_excluded(&self, path: &str) -> bool {
        normalize(path).is_some_and(|p| self.is_excluded_normalized(&p))
    }

    pub(crate) fn matches_normalized(&self, path: &str) -> bool {
        if self.is_excluded_normalized(path) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|m| m.test_normalized(path))
    }

    pub(crate) fn is_excluded_normalized(&self, path: &str) -> bool {
        self.exclude.iter().any(|m| m.test_normalized(path))
    }
}

/// Builds a path predicate from include and exclude patterns.
pub fn create_matcher<S: AsRef<str>>(include: &[S], exclude: &[S]) -> impl Fn(&str) -> bool {
    let mask = MaskMatcher::new(include, exclude);
    move |path: &str| mask.matches(path)
}

/// Memoizes compiled matchers by pattern text.
#[derive(Debug, Default)]
pub struct MatcherCache {
    compiled: HashMap<String, Matcher>,
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&mut self, pattern: &str) -> Matcher {
        self.compiled
            .entry(pattern.to_string())
            .or_insert_with(|| compile(pattern))
            .clone()
    }

    /// Compiles a mask, reusing previously compiled patterns.
    pub fn mask<S: AsRef<str>>(&mut self, include: &[S], exclude: &[S]) -> MaskMatcher {
        let mut compile_all = |patterns: &[S]| -> Vec<Matcher> {
            patterns
                .iter()
                .map(AsRef::<str>::as_ref)
                .filter(|p| !p.trim().is_empty())
                .map(|p| self.get_or_compile(p))
                .collect()
        };
        let include = compile_all(include);
        let exclude = compile_all(exclude);
        MaskMatcher::from_matchers(include, exclude)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
