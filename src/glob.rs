//! Glob-style URL filtering
//!
//! Discovered links are only admitted to the frontier when they match one of
//! the job's glob patterns. Patterns look like full URLs with wildcards:
//!
//! ```text
//! https://github.com/microsoft/dotnet/blob/**/*.md
//! ```
//!
//! Semantics:
//!
//! - `*` matches any run of characters within a single path segment (never
//!   crosses `/`),
//! - `**` matches any run of characters across segments; a full `**/`
//!   segment matches zero or more whole segments (`a/**/b.md` admits
//!   `a/b.md`),
//! - `?` matches exactly one character within a segment,
//! - everything else matches literally.
//!
//! The scheme/host portion of a pattern matches case-insensitively; the path
//! is case-sensitive. An empty pattern list matches every URL, an empty or
//! malformed pattern string is an [`CrawlError::InvalidPattern`] surfaced at
//! job start.

use regex::Regex;

use crate::error::CrawlError;

/// A compiled set of glob patterns.
#[derive(Debug)]
pub struct GlobSet {
    patterns: Vec<Regex>,
}

impl GlobSet {
    /// Compile a list of glob patterns.
    ///
    /// Fails with [`CrawlError::InvalidPattern`] on the first pattern that
    /// does not compile, aborting the job before any fetch is issued.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, CrawlError> {
        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Test a candidate URL against the set.
    ///
    /// Returns true when any pattern matches, or when the set is empty (no
    /// globs means no restriction).
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(url))
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no patterns were supplied.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translate one glob pattern into an anchored regex.
fn compile_pattern(pattern: &str) -> Result<Regex, CrawlError> {
    let invalid = |reason: &str| CrawlError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    if pattern.is_empty() {
        return Err(invalid("pattern is empty"));
    }

    // The path starts after the authority (`scheme://host`); everything
    // before it is matched case-insensitively, the path as written.
    let path_start = match pattern.find("://") {
        Some(scheme_end) => pattern[scheme_end + 3..]
            .find('/')
            .map(|i| scheme_end + 3 + i)
            .unwrap_or(pattern.len()),
        None => 0,
    };

    let mut regex = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    let mut byte_pos = 0;
    let mut case_insensitive_open = false;

    if path_start > 0 {
        regex.push_str("(?i:");
        case_insensitive_open = true;
    }

    while i < chars.len() {
        if case_insensitive_open && byte_pos >= path_start {
            regex.push(')');
            case_insensitive_open = false;
        }
        let c = chars[i];
        match c {
            '*' => {
                let run = chars[i..].iter().take_while(|&&c| c == '*').count();
                match run {
                    1 => regex.push_str("[^/]*"),
                    2 => {
                        // A full "**/" segment matches zero or more whole
                        // segments, so "docs/**/*.md" also admits
                        // "docs/x.md". Elsewhere "**" is a plain any-run.
                        let segment_start = i == 0 || chars[i - 1] == '/';
                        if segment_start && chars.get(i + run) == Some(&'/') {
                            regex.push_str("(?:.*/)?");
                            i += run + 1;
                            byte_pos += run + 1;
                            continue;
                        }
                        regex.push_str(".*");
                    }
                    _ => return Err(invalid("more than two consecutive '*'")),
                }
                i += run;
                byte_pos += run;
                continue;
            }
            '?' => regex.push_str("[^/]"),
            _ => regex.push_str(&regex::escape(&c.to_string())),
        }
        byte_pos += c.len_utf8();
        i += 1;
    }
    if case_insensitive_open {
        regex.push(')');
    }
    regex.push('$');

    Regex::new(&regex).map_err(|e| invalid(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_star_stays_in_segment() {
        let globs = GlobSet::compile(&["https://example.com/docs/*.md"]).unwrap();
        assert!(globs.matches("https://example.com/docs/intro.md"));
        assert!(!globs.matches("https://example.com/docs/guide/intro.md"));
    }

    #[test]
    fn double_star_crosses_segments() {
        let globs = GlobSet::compile(&["https://example.com/**/*.md"]).unwrap();
        assert!(globs.matches("https://example.com/a/b/c/x.md"));
        assert!(!globs.matches("https://example.com/a/b/c/x.txt"));
    }

    #[test]
    fn host_is_case_insensitive_path_is_not() {
        let globs = GlobSet::compile(&["https://Example.COM/Docs/*"]).unwrap();
        assert!(globs.matches("https://example.com/Docs/a"));
        assert!(!globs.matches("https://example.com/docs/a"));
    }

    #[test]
    fn triple_star_is_invalid() {
        assert!(GlobSet::compile(&["https://example.com/***/x"]).is_err());
    }
}
