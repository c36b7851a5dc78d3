//! # Desktop Bridge Implementations
//!
//! Native implementations of bridge traits, used by command-line tooling and
//! the native test suite.
//!
//! - `HttpClient` using `reqwest`
//!
//! Native hosts have no cross-origin boundary, so the catalog reaches the API
//! through a direct relay (`{raw}` template) and no `ScriptHost` is needed.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_desktop::ReqwestHttpClient;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! // Use in core configuration
//! ```

mod http;

pub use http::ReqwestHttpClient;
