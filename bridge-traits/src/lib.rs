//! # Host Bridge Traits
//!
//! Capabilities the discovery core needs from its host, expressed as traits so
//! the same core runs natively (tests, desktop tooling) and in the browser.
//!
//! ## Traits
//!
//! ### Catalog access
//! - [`HttpClient`](http::HttpClient) - `GET` requests used by the relay transports
//! - [`ScriptHost`](script::ScriptHost) - script-tag injection for the cross-origin bridge
//!
//! ### Playback
//! - [`AudioTransport`](playback::AudioTransport) - the single audio output device
//! - [`DeviceEvent`](playback::DeviceEvent) - asynchronous device notifications
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for cache expiry and deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Implementations
//!
//! | Platform | Implementation Crate | Provides |
//! |----------|---------------------|----------|
//! | Desktop  | `bridge-desktop`    | `HttpClient` |
//! | Web      | `bridge-wasm`       | `HttpClient`, `ScriptHost`, `AudioTransport` |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing, for example a catalog configured with neither a script host nor an
//! HTTP client.
//!
//! ## Thread Safety
//!
//! On native targets every bridge trait requires `Send + Sync` (see
//! [`PlatformSendSync`](platform::PlatformSendSync)). On `wasm32` the bounds are
//! dropped because browser handles are single-threaded.

pub mod error;
pub mod http;
pub mod platform;
pub mod playback;
pub mod script;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use platform::PlatformSendSync;
pub use playback::{AudioTransport, DeviceEvent};
pub use script::{ScriptCompletion, ScriptHandle, ScriptHost, ScriptOutcome};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
