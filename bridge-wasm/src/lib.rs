//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the traits defined in `bridge-traits`, built on
//! `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate targets `wasm32-unknown-unknown` only. On other targets it
//! compiles to an empty library.
//!
//! # Implementations
//!
//! - [`WasmHttpClient`]: `fetch`-based HTTP client for the relay transports
//! - [`DomScriptHost`]: `<script>` injection for the cross-origin catalog bridge
//! - [`HtmlAudioTransport`]: an `HtmlAudioElement` as the playback device
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::build_wasm_bridges;
//!
//! let bridges = build_wasm_bridges()?;
//! let audio = bridges.audio();
//! audio.set_volume(0.5);
//! ```

#![cfg(target_arch = "wasm32")]

pub mod audio;
pub mod bootstrap;
pub mod error;
pub mod http;
pub mod script;

// Re-export commonly used types
pub use audio::HtmlAudioTransport;
pub use bootstrap::{build_wasm_bridges, install_panic_hook, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use script::DomScriptHost;
