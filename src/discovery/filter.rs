//! Include-path filtering.

use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// A set of include patterns. Empty admits every path; otherwise a path
/// must match at least one pattern to be submitted to discovery at all —
/// filtered paths are invisible to the cache, not merely excluded from
/// results.
#[derive(Debug, Default)]
pub struct PathFilter {
    patterns: Vec<Regex>,
}

impl PathFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn admits(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let text = path.to_string_lossy();
        self.patterns.iter().any(|pattern| pattern.is_match(&text))
    }
}
