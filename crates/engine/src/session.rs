//! Owning handle for one watch session
//!
//! The backend delivers raw events on its own thread; the session's fixed
//! handler filters and translates them there, then hands each event to the
//! subscriber callback. Callbacks must therefore be quick and non-blocking,
//! typically a channel send.

use crate::event::{self, Event};
use crate::filter::PatternFilter;
use crate::{EngineError, WatchOptions};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Subscriber callback, invoked once per delivered event on the backend's
/// thread
pub type EventCallback = Box<dyn Fn(Event) + Send + Sync>;

/// One active watch session
///
/// Move-only owner of the backend resources for a single watched path.
/// Dropping the session stops delivery; `close` does the same but surfaces
/// the backend's result.
pub struct Session {
    path: PathBuf,
    watcher: RecommendedWatcher,
    alive: Arc<AtomicBool>,
}

impl Session {
    /// Open a session rooted at `path`
    ///
    /// The path is handed to the backend unvalidated; whatever it reports
    /// (missing path, permissions) comes back as `EngineError::Backend`.
    pub fn open(
        path: &Path,
        options: WatchOptions,
        callback: EventCallback,
    ) -> Result<Self, EngineError> {
        let filter = PatternFilter::compile(path, &options.patterns)?;
        let recursive = options.recursive;
        let follow_symlinks = options.follow_symlinks;
        let latency = options.latency;
        let alive = Arc::new(AtomicBool::new(true));

        let handler_alive = Arc::clone(&alive);
        let handler = move |result: Result<notify::Event, notify::Error>| {
            // A close may have raced us on the backend thread
            if !handler_alive.load(Ordering::Acquire) {
                return;
            }

            let raw = match result {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("watch backend error: {}", err);
                    return;
                }
            };

            for ev in event::translate(&raw) {
                if !options.wants_effect(ev.effect) {
                    continue;
                }
                if !filter.matches(&ev.path) {
                    continue;
                }
                callback(ev);
            }
        };

        let config = Config::default()
            .with_poll_interval(latency)
            .with_follow_symlinks(follow_symlinks);
        let mut watcher = RecommendedWatcher::new(handler, config)?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode)?;

        debug!("opened watch session for {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            watcher,
            alive,
        })
    }

    /// Path this session watches
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the session, blocking until the backend has let go
    ///
    /// The alive flag is cleared before teardown, so the handler forwards
    /// nothing once this starts. Delivery that already passed the flag
    /// check is assumed to drain before `unwatch` returns, which holds
    /// for the message-loop backends this builds against.
    pub fn close(mut self) -> Result<(), EngineError> {
        self.alive.store(false, Ordering::Release);
        self.watcher.unwatch(&self.path)?;
        debug!("closed watch session for {}", self.path.display());
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EffectType;
    use crossbeam_channel::{unbounded, RecvTimeoutError};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
    const SILENCE_WINDOW: Duration = Duration::from_millis(400);

    fn open_with_channel(
        path: &Path,
        options: WatchOptions,
    ) -> (Session, crossbeam_channel::Receiver<Event>) {
        let (tx, rx) = unbounded();
        let session = Session::open(path, options, Box::new(move |ev| {
            let _ = tx.send(ev);
        }))
        .unwrap();
        (session, rx)
    }

    fn wait_for(
        rx: &crossbeam_channel::Receiver<Event>,
        pred: impl Fn(&Event) -> bool,
    ) -> Option<Event> {
        let deadline = std::time::Instant::now() + EVENT_TIMEOUT;
        while let Some(remaining) = deadline.checked_duration_since(std::time::Instant::now()) {
            match rx.recv_timeout(remaining) {
                Ok(ev) if pred(&ev) => return Some(ev),
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        None
    }

    #[test]
    fn test_create_is_observed() {
        let dir = TempDir::new().unwrap();
        let (session, rx) = open_with_channel(dir.path(), WatchOptions::default());

        let file = dir.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();

        let ev = wait_for(&rx, |ev| {
            ev.effect == EffectType::Create && ev.path.ends_with("a.txt")
        })
        .expect("create event not delivered");
        assert_eq!(ev.path_type.code(), crate::PathType::File.code());

        session.close().unwrap();
    }

    #[test]
    fn test_nothing_delivered_after_close() {
        let dir = TempDir::new().unwrap();
        let (session, rx) = open_with_channel(dir.path(), WatchOptions::default());

        fs::write(dir.path().join("before.txt"), b"x").unwrap();
        wait_for(&rx, |ev| ev.path.ends_with("before.txt")).expect("warm-up event missing");

        session.close().unwrap();
        // Drain whatever was already in flight before close returned
        while rx.try_recv().is_ok() {}

        fs::write(dir.path().join("after.txt"), b"y").unwrap();
        match rx.recv_timeout(SILENCE_WINDOW) {
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
            Ok(ev) => panic!("event delivered after close: {:?}", ev),
        }
    }

    #[test]
    fn test_open_fails_for_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let result = Session::open(&missing, WatchOptions::default(), Box::new(|_| {}));
        assert!(matches!(result, Err(EngineError::Backend(_))));
    }

    #[test]
    fn test_pattern_filter_applies() {
        let dir = TempDir::new().unwrap();
        let options = WatchOptions::new().with_patterns(vec!["**/*.txt".to_string()]);
        let (session, rx) = open_with_channel(dir.path(), options);

        fs::write(dir.path().join("skipped.rs"), b"fn main() {}").unwrap();
        fs::write(dir.path().join("kept.txt"), b"hello").unwrap();

        let ev = wait_for(&rx, |ev| ev.effect == EffectType::Create)
            .expect("matching event not delivered");
        assert!(ev.path.ends_with("kept.txt"), "got {:?}", ev.path);

        session.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_are_not_followed_by_default() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let (session, rx) = open_with_channel(dir.path(), WatchOptions::default());

        fs::write(outside.path().join("behind-link.txt"), b"x").unwrap();
        // A change inside the watched dir proper still arrives
        fs::write(dir.path().join("direct.txt"), b"y").unwrap();

        let ev = wait_for(&rx, |ev| ev.effect == EffectType::Create)
            .expect("direct event not delivered");
        assert!(ev.path.ends_with("direct.txt"), "got {:?}", ev.path);
        assert!(
            !rx.try_iter().any(|ev| ev.path.ends_with("behind-link.txt")),
            "event delivered from behind a symlink"
        );

        session.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_are_followed_on_request() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let options = WatchOptions::new().with_follow_symlinks(true);
        let (session, rx) = open_with_channel(dir.path(), options);

        fs::write(outside.path().join("behind-link.txt"), b"x").unwrap();

        let ev = wait_for(&rx, |ev| {
            ev.effect == EffectType::Create && ev.path.ends_with("behind-link.txt")
        })
        .expect("event from behind the symlink not delivered");
        assert_eq!(ev.path_type, crate::PathType::File);

        session.close().unwrap();
    }

    #[test]
    fn test_effect_filter_applies() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"v1").unwrap();

        let options = WatchOptions::new().with_effect_filters(vec![EffectType::Destroy]);
        let (session, rx) = open_with_channel(dir.path(), options);

        fs::write(&file, b"v2").unwrap();
        fs::remove_file(&file).unwrap();

        let ev = wait_for(&rx, |ev| ev.path.ends_with("a.txt"))
            .expect("destroy event not delivered");
        assert_eq!(ev.effect, EffectType::Destroy);

        session.close().unwrap();
    }
}
