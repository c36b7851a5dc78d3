use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use core_runtime::config::{RelayEndpoint, RELAY_ENCODED_PLACEHOLDER, RELAY_RAW_PLACEHOLDER};
use serde_json::Value;
use url::Url;

use super::CatalogTransport;
use crate::error::TransportError;

/// Substitute the target URL into a relay template.
///
/// `{url}` receives the percent-encoded target, `{raw}` the target as is.
pub fn render_relay_url(template: &str, target: &Url) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    template
        .replace(RELAY_ENCODED_PLACEHOLDER, &encoded)
        .replace(RELAY_RAW_PLACEHOLDER, target.as_str())
}

/// Plain HTTP GET through a relay (or directly, with the `{raw}` template).
pub struct RelayTransport {
    name: String,
    template: String,
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl RelayTransport {
    pub fn new(relay: &RelayEndpoint, client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            name: format!("relay:{}", relay.name),
            template: relay.template.clone(),
            client,
            timeout,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CatalogTransport for RelayTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, url: &Url) -> Result<Value, TransportError> {
        let request = HttpRequest::get(render_relay_url(&self.template, url))
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = core_async::timeout(
            self.timeout,
            self.client
                .execute_with_retry(request, RetryPolicy::single_attempt()),
        )
        .await
        .map_err(|elapsed| TransportError::Timeout(elapsed.after))??;

        if !response.is_success() {
            return Err(TransportError::HttpStatus(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
