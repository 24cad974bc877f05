//! Watch engine adapter for watchbridge
//!
//! Wraps the platform file watching backend (`notify`) behind an owning
//! session handle with:
//! - Stable effect/path-type classification codes
//! - Per-session effect and pattern filtering
//! - Guaranteed callback silence after close

pub mod event;
pub mod filter;
pub mod options;
pub mod session;

pub use event::{EffectType, Event, PathType};
pub use options::WatchOptions;
pub use session::Session;

use thiserror::Error;

/// Errors surfaced by the engine adapter
#[derive(Debug, Error)]
pub enum EngineError {
    /// The watch backend refused to initialize or watch the path
    #[error("watch backend error: {0}")]
    Backend(#[from] notify::Error),

    /// A watch pattern failed to parse
    #[error("invalid watch pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: ignore::Error,
    },
}
