//! C ABI bridge for the watch engine
//!
//! Adapts the engine's callback interface to a shape a garbage-collected
//! host language can consume: integer handles for sessions, an opaque
//! integer token round-tripped through every event, and a fixed trampoline
//! that repackages each event into primitives for a host-registered relay
//! function.
//!
//! The bridge holds no per-event state. The only things that outlive a
//! call are the handle registry and the relay pointer.

pub mod api;
pub mod raw;
pub mod registry;

pub use api::{handle_event, set_event_relay, start_new_watcher, stop_watcher};
pub use raw::{BridgeEvent, EventRelayFn, SENTINEL_HANDLE};
