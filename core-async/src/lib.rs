//! Runtime-agnostic async helpers for the discovery core.
//!
//! Catalog transports need timers that work both on a native Tokio runtime and
//! inside the browser event loop. Everything downstream depends on this crate
//! instead of reaching for Tokio or `gloo-timers` directly.
//!
//! - `time`: `sleep`, `timeout`, `Duration`
//! - `task`: fire-and-forget spawning on the current executor
//! - `runtime`: blocking entry points (native only)

pub mod runtime;
pub mod task;
pub mod time;

pub use task::spawn_detached;
pub use time::{sleep, timeout, Duration, TimeoutError};
