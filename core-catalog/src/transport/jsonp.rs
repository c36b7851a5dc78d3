use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::script::{ScriptCompletion, ScriptHandle, ScriptHost, ScriptOutcome};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::CatalogTransport;
use crate::error::TransportError;
use crate::registry::CallbackRegistry;

/// Fetches through an injected script element that calls back a uniquely
/// named global function.
pub struct JsonpTransport {
    host: Arc<dyn ScriptHost>,
    registry: CallbackRegistry,
    timeout: Duration,
}

impl JsonpTransport {
    pub fn new(host: Arc<dyn ScriptHost>, callback_prefix: &str, timeout: Duration) -> Self {
        Self {
            host,
            registry: CallbackRegistry::new(callback_prefix),
            timeout,
        }
    }

    /// Registrations currently waiting for a script to settle.
    pub fn pending_callbacks(&self) -> usize {
        self.registry.len()
    }
}

/// Removes the script element when the attempt ends, however it ends.
struct InjectedScript {
    host: Arc<dyn ScriptHost>,
    handle: Option<ScriptHandle>,
}

impl Drop for InjectedScript {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!(script = %handle, "Removing injected script");
            self.host.remove(handle);
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CatalogTransport for JsonpTransport {
    fn name(&self) -> &str {
        "script"
    }

    async fn attempt(&self, url: &Url) -> Result<Value, TransportError> {
        let mut pending = self.registry.register();
        let callback_name = pending.name().to_string();

        let mut src = url.clone();
        src.query_pairs_mut()
            .append_pair("output", "jsonp")
            .append_pair("callback", &callback_name);

        let registry = self.registry.clone();
        let name = callback_name.clone();
        let on_complete: ScriptCompletion = Arc::new(move |outcome: ScriptOutcome| {
            if !registry.complete(&name, outcome) {
                debug!(callback = %name, "Script settled after its request was released");
            }
        });

        let handle = self.host.inject(src.as_str(), &callback_name, on_complete)?;
        let _script = InjectedScript {
            host: Arc::clone(&self.host),
            handle: Some(handle),
        };

        match core_async::timeout(self.timeout, pending.wait()).await {
            Ok(Ok(ScriptOutcome::Payload(payload))) => Ok(payload),
            Ok(Ok(ScriptOutcome::LoadFailed(reason))) => Err(TransportError::ScriptLoad(reason)),
            Ok(Err(_)) => Err(TransportError::ScriptLoad(
                "callback was released before the script settled".to_string(),
            )),
            Err(elapsed) => Err(TransportError::Timeout(elapsed.after)),
        }
    }
}
