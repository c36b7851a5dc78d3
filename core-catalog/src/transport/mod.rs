//! Catalog transports
//!
//! A transport performs one attempt to fetch a catalog URL and hands back the
//! decoded JSON. [`TransportChain`] tries transports in order and turns
//! error-shaped bodies into failures.

mod chain;
mod jsonp;
mod relay;

pub use chain::TransportChain;
pub use jsonp::JsonpTransport;
pub use relay::{render_relay_url, RelayTransport};

use async_trait::async_trait;
use bridge_traits::platform::PlatformSendSync;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// One way of reaching the catalog.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CatalogTransport: PlatformSendSync {
    /// Short label used in logs and failure reports.
    fn name(&self) -> &str;

    /// Fetch `url` once. Must settle within the transport's own timeout.
    async fn attempt(&self, url: &Url) -> Result<Value, TransportError>;
}
