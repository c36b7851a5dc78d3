//! Script-Tag Injection Bridge
//!
//! Browsers refuse cross-origin `fetch` for catalogs that do not send CORS
//! headers, but they will execute a `<script>` from any origin. The catalog
//! wraps its JSON in a call to a named global function, so the host only has
//! to insert the element and route that function (or a load error) back into
//! the core.
//!
//! The core owns callback naming and timeouts. A host implementation must:
//! - insert exactly one script element per [`ScriptHost::inject`] call
//! - invoke the completion at most once
//! - drop both the element and the global function on [`ScriptHost::remove`]

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::{error::Result, platform::PlatformSendSync};

/// Result delivered by the host for one injected script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome {
    /// The named callback fired with this argument.
    Payload(Value),
    /// The element failed to load (network error, blocked, 4xx/5xx).
    LoadFailed(String),
}

/// Completion invoked by the host when the script settles.
#[cfg(not(target_arch = "wasm32"))]
pub type ScriptCompletion = Arc<dyn Fn(ScriptOutcome) + Send + Sync>;

/// Completion invoked by the host when the script settles.
#[cfg(target_arch = "wasm32")]
pub type ScriptCompletion = Arc<dyn Fn(ScriptOutcome)>;

/// Opaque identifier of an injected script element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptHandle(pub String);

impl ScriptHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host capability for injecting cross-origin script elements.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use bridge_traits::script::{ScriptHost, ScriptOutcome};
///
/// fn load(host: &dyn ScriptHost) -> bridge_traits::error::Result<()> {
///     let handle = host.inject(
///         "https://api.example.com/chart?output=jsonp&callback=cb_1",
///         "cb_1",
///         Arc::new(|outcome: ScriptOutcome| println!("{outcome:?}")),
///     )?;
///     host.remove(handle);
///     Ok(())
/// }
/// ```
pub trait ScriptHost: PlatformSendSync {
    /// Insert a script element loading `src` and bind `callback_name` as a
    /// global function that forwards its argument to `on_complete`.
    ///
    /// # Errors
    ///
    /// Returns an error when the element cannot be created or attached, in
    /// which case `on_complete` is never invoked.
    fn inject(
        &self,
        src: &str,
        callback_name: &str,
        on_complete: ScriptCompletion,
    ) -> Result<ScriptHandle>;

    /// Remove the element and its global callback. Removing twice is a no-op.
    fn remove(&self, handle: ScriptHandle);
}
