//! The three bridge operations plus relay registration
//!
//! `start_new_watcher` and `stop_watcher` are called by the host;
//! `handle_event` is called only from the engine's thread, once per
//! detected change. The host registers its relay with `set_event_relay`
//! before opening any watcher; hosts that cannot resolve a callback
//! symbol at link time get an explicit registration point instead.

use crate::raw::{BridgeEvent, EventRelayFn, SENTINEL_HANDLE};
use crate::registry::HandleRegistry;
use engine::{Event, Session, WatchOptions};
use parking_lot::RwLock;
use std::ffi::{c_char, c_int, CStr, CString, NulError};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static REGISTRY: LazyLock<HandleRegistry> = LazyLock::new(HandleRegistry::new);

/// Host relay, process-global, last writer wins
static RELAY: RwLock<Option<EventRelayFn>> = RwLock::new(None);

/// Register the host relay function
///
/// Events observed while no relay is registered are dropped.
#[no_mangle]
pub extern "C" fn set_event_relay(relay: EventRelayFn) -> c_int {
    *RELAY.write() = Some(relay);
    1
}

/// Open a watcher rooted at `path`, carrying `data` through to every event
///
/// `path` must be a NUL-terminated string that stays valid for the
/// duration of this call; it is not retained. Returns the sentinel handle
/// 0 if the engine refuses the path (missing, permission denied, not
/// UTF-8). The bridge itself validates nothing.
#[no_mangle]
pub extern "C" fn start_new_watcher(path: *const c_char, data: usize) -> u64 {
    if path.is_null() {
        return SENTINEL_HANDLE;
    }
    let path = unsafe { CStr::from_ptr(path) };
    let path = match path.to_str() {
        Ok(s) => Path::new(s).to_path_buf(),
        Err(_) => return SENTINEL_HANDLE,
    };

    let callback = Box::new(move |ev: Event| relay_event(ev, data));
    match Session::open(&path, WatchOptions::default(), callback) {
        Ok(session) => REGISTRY.insert(session),
        Err(err) => {
            warn!("failed to open watcher for {}: {}", path.display(), err);
            SENTINEL_HANDLE
        }
    }
}

/// Close a previously opened watcher
///
/// Returns 1 on success, 0 on failure. Closing an unknown or
/// already-closed handle fails without reaching the engine. May block
/// until the engine's monitoring thread lets go of its resources.
#[no_mangle]
pub extern "C" fn stop_watcher(handle: u64) -> c_int {
    let session = match REGISTRY.remove(handle) {
        Some(session) => session,
        None => return 0,
    };

    match session.close() {
        Ok(()) => 1,
        Err(err) => {
            warn!("failed to close watcher {}: {}", handle, err);
            0
        }
    }
}

/// Fixed trampoline: forward one event to the host relay
///
/// Runs on the engine's thread. Pure pass-through: the classification
/// codes are widened to `c_int`, the token crosses unchanged, and the
/// path pointer is only valid until the relay returns.
#[no_mangle]
pub extern "C" fn handle_event(event: BridgeEvent, data: usize) {
    let relay = *RELAY.read();
    match relay {
        Some(relay) => relay(
            event.path_name,
            event.effect_type as c_int,
            event.path_type as c_int,
            data,
        ),
        None => warn!("filesystem event dropped: no relay registered"),
    }
}

/// Pack an engine event and bounce it through the trampoline
///
/// The `CString` lives on this stack frame, which is exactly the lifetime
/// the relay is promised.
fn relay_event(ev: Event, token: usize) {
    let path = match c_path(&ev.path) {
        Ok(path) => path,
        // A path with an interior NUL cannot cross the C boundary
        Err(_) => return,
    };

    let event = BridgeEvent {
        path_name: path.as_ptr(),
        effect_type: ev.effect.code(),
        path_type: ev.path_type.code(),
        effect_time_ns: ev.time_ns,
    };
    handle_event(event, token);
}

#[cfg(unix)]
fn c_path(path: &Path) -> Result<CString, NulError> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn c_path(path: &Path) -> Result<CString, NulError> {
    CString::new(path.to_string_lossy().into_owned())
}
