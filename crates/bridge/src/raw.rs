//! Wire types crossing the C ABI

use std::ffi::{c_char, c_int};

/// Handle value returned when a watcher cannot be opened
///
/// Valid handles start at 1, so 0 is distinguishable forever.
pub const SENTINEL_HANDLE: u64 = 0;

/// One filesystem event as it crosses the boundary
///
/// `path_name` is borrowed from the bridge's stack and is valid only for
/// the duration of the trampoline invocation; the host must copy it out
/// before returning.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BridgeEvent {
    /// NUL-terminated path, valid for this call only
    pub path_name: *const c_char,
    /// Effect classification code (see the engine's `EffectType`)
    pub effect_type: i8,
    /// Path-type classification code (see the engine's `PathType`)
    pub path_type: i8,
    /// Nanoseconds since the epoch, stamped when the event was translated
    pub effect_time_ns: i64,
}

/// Host-provided relay, invoked once per event on the engine's thread
///
/// Classifications are widened to `c_int`; the token is the value given
/// to `start_new_watcher`, unchanged.
pub type EventRelayFn =
    extern "C" fn(path: *const c_char, effect: c_int, path_type: c_int, token: usize);
