//! # Catalog Client
//!
//! Read-only access to the remote music catalog: search, tracks, albums,
//! artists, charts and genres.
//!
//! ## Overview
//!
//! [`CatalogClient`] validates parameters, serves fresh responses from a
//! time-boxed cache and otherwise walks a [`TransportChain`]:
//!
//! - the script bridge ([`JsonpTransport`]) for browser hosts, where the
//!   catalog does not send cross-origin headers
//! - HTTP relays ([`RelayTransport`]) in configured order
//!
//! When every transport fails, the chart and genre list degrade to built-in
//! data; every other call reports [`CatalogError::Unavailable`].

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod models;
pub mod registry;
pub mod transport;

pub use cache::{CacheStats, ResponseCache};
pub use client::{CatalogClient, SearchOptions};
pub use endpoint::{Endpoint, EndpointKind};
pub use error::{AttemptFailure, CatalogError, Result, TransportError, CATALOG_UNAVAILABLE_MESSAGE};
pub use models::{Album, AlbumRef, Artist, ArtistRef, CatalogId, Chart, Genre, Page, Track};
pub use registry::{CallbackRegistry, PendingCallback};
pub use transport::{CatalogTransport, JsonpTransport, RelayTransport, TransportChain};
