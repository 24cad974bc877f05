//! Watch pattern matching
//!
//! Gitignore-style globs, inverted: a pattern selects the paths whose
//! events are delivered instead of hiding them.

use crate::EngineError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Compiled watch patterns for one session
pub struct PatternFilter {
    /// Watch root the patterns are anchored to
    root: PathBuf,

    /// Compiled globs; `None` when no patterns were given
    globs: Option<Gitignore>,
}

impl PatternFilter {
    /// Compile patterns anchored at the watch root
    pub fn compile(root: &Path, patterns: &[String]) -> Result<Self, EngineError> {
        if patterns.is_empty() {
            return Ok(Self {
                root: root.to_path_buf(),
                globs: None,
            });
        }

        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| EngineError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }

        Ok(Self {
            root: root.to_path_buf(),
            globs: Some(builder.build().map_err(|source| EngineError::Pattern {
                pattern: patterns.join(", "),
                source,
            })?),
        })
    }

    /// Whether events for this path should be delivered
    pub fn matches(&self, path: &Path) -> bool {
        let globs = match &self.globs {
            Some(globs) => globs,
            None => return true,
        };

        // Patterns are written relative to the watch root
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let is_dir = path.is_dir();
        globs.matched(rel, is_dir).is_ignore()
    }
}
