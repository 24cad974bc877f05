//! Per-session watch options

use crate::event::EffectType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend latency, matching the upstream watcher default
const DEFAULT_LATENCY: Duration = Duration::from_millis(150);

/// Options for one watch session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Watch the whole subtree rooted at the path
    pub recursive: bool,

    /// Descend into symlinked directories; off by default, the backend
    /// then watches the link itself
    pub follow_symlinks: bool,

    /// Latency hint forwarded to the backend's poll fallback
    pub latency: Duration,

    /// Deliver only these effect types; `None` delivers everything
    pub effects: Option<Vec<EffectType>>,

    /// Gitignore-style globs; when non-empty, only matching paths are
    /// delivered
    pub patterns: Vec<String>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            latency: DEFAULT_LATENCY,
            effects: None,
            patterns: Vec::new(),
        }
    }
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_effect_filters(mut self, effects: Vec<EffectType>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Whether an effect passes the configured filter
    pub(crate) fn wants_effect(&self, effect: EffectType) -> bool {
        match &self.effects {
            Some(effects) => effects.contains(&effect),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = WatchOptions::default();
        assert!(opts.recursive);
        assert!(!opts.follow_symlinks);
        assert_eq!(opts.latency, Duration::from_millis(150));
        assert!(opts.effects.is_none());
        assert!(opts.patterns.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let opts = WatchOptions::new()
            .with_recursive(false)
            .with_latency(Duration::from_millis(50))
            .with_effect_filters(vec![EffectType::Create, EffectType::Destroy])
            .with_patterns(vec!["**/*.txt".to_string()]);

        assert!(!opts.recursive);
        assert_eq!(opts.latency, Duration::from_millis(50));
        assert!(opts.wants_effect(EffectType::Create));
        assert!(!opts.wants_effect(EffectType::Modify));
        assert_eq!(opts.patterns.len(), 1);
    }

    #[test]
    fn test_no_filter_wants_everything() {
        let opts = WatchOptions::default();
        assert!(opts.wants_effect(EffectType::Other));
        assert!(opts.wants_effect(EffectType::Owner));
    }
}
