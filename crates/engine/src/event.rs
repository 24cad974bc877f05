//! Filesystem event model
//!
//! Classification codes are pinned to the wire contract consumed by host
//! bindings and must not be renumbered.

use notify::event::{CreateKind, EventKind, MetadataKind, ModifyKind, RemoveKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// What kind of change happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Rename,
    Modify,
    Create,
    Destroy,
    Owner,
    Other,
}

impl EffectType {
    /// Stable wire code for this effect
    pub const fn code(self) -> i8 {
        match self {
            EffectType::Rename => 0,
            EffectType::Modify => 1,
            EffectType::Create => 2,
            EffectType::Destroy => 3,
            EffectType::Owner => 4,
            EffectType::Other => 5,
        }
    }

    /// Parse a human-readable effect name (used by CLI filters)
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rename" => Some(EffectType::Rename),
            "modify" => Some(EffectType::Modify),
            "create" => Some(EffectType::Create),
            "destroy" => Some(EffectType::Destroy),
            "owner" => Some(EffectType::Owner),
            "other" => Some(EffectType::Other),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EffectType::Rename => "rename",
            EffectType::Modify => "modify",
            EffectType::Create => "create",
            EffectType::Destroy => "destroy",
            EffectType::Owner => "owner",
            EffectType::Other => "other",
        }
    }
}

/// What kind of filesystem entry the event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    Dir,
    File,
    HardLink,
    SymLink,
    Watcher,
    Other,
}

impl PathType {
    /// Stable wire code for this path type
    pub const fn code(self) -> i8 {
        match self {
            PathType::Dir => 0,
            PathType::File => 1,
            PathType::HardLink => 2,
            PathType::SymLink => 3,
            PathType::Watcher => 4,
            PathType::Other => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PathType::Dir => "dir",
            PathType::File => "file",
            PathType::HardLink => "hard_link",
            PathType::SymLink => "sym_link",
            PathType::Watcher => "watcher",
            PathType::Other => "other",
        }
    }
}

/// One observed filesystem change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Path the change concerns
    pub path: PathBuf,
    /// What happened
    pub effect: EffectType,
    /// What the path is
    pub path_type: PathType,
    /// Nanoseconds since the epoch, stamped at translation time
    pub time_ns: i64,
}

impl Event {
    fn new(path: PathBuf, effect: EffectType, path_type: PathType) -> Self {
        let time_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        Self {
            path,
            effect,
            path_type,
            time_ns,
        }
    }
}

/// Classify a backend event kind
pub(crate) fn effect_of(kind: &EventKind) -> EffectType {
    match kind {
        EventKind::Create(_) => EffectType::Create,
        EventKind::Remove(_) => EffectType::Destroy,
        EventKind::Modify(ModifyKind::Name(_)) => EffectType::Rename,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Ownership)) => EffectType::Owner,
        EventKind::Modify(_) => EffectType::Modify,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => EffectType::Other,
    }
}

/// Classify what a path is, preferring the backend's own hint over a stat
/// (removed paths can no longer be stat'ed)
pub(crate) fn path_type_of(kind: &EventKind, path: &Path) -> PathType {
    match kind {
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => {
            return PathType::File
        }
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {
            return PathType::Dir
        }
        _ => {}
    }

    match path.symlink_metadata() {
        Ok(meta) => {
            let ft = meta.file_type();
            if ft.is_symlink() {
                PathType::SymLink
            } else if ft.is_dir() {
                PathType::Dir
            } else if ft.is_file() {
                PathType::File
            } else {
                PathType::Other
            }
        }
        Err(_) => PathType::Other,
    }
}

/// Translate one backend event into zero or more engine events
///
/// Backend events may carry several paths (renames do); each becomes its
/// own single-path event, matching what crosses the bridge.
pub(crate) fn translate(raw: &notify::Event) -> Vec<Event> {
    let effect = effect_of(&raw.kind);
    raw.paths
        .iter()
        .map(|p| Event::new(p.clone(), effect, path_type_of(&raw.kind, p)))
        .collect()
}
