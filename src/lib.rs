//! Workspace umbrella crate.
//!
//! Host applications can depend on `discovery-workspace` and pick a feature
//! (`desktop-shims`, `wasm`, `catalog-only`, `playback-only`) instead of wiring
//! each workspace crate individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service as service;

#[cfg(feature = "catalog-only")]
pub use core_catalog as catalog;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;
