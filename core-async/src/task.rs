//! Task spawning.
//!
//! On native targets tasks go to the ambient Tokio runtime and may move between
//! threads. In the browser everything runs on the page's single event loop via
//! `spawn_local`, so futures there do not need to be `Send`.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a task on the Tokio runtime and returns its handle.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a task whose result nobody waits for.
///
/// Used for long-lived pumps such as forwarding playback-device events into the
/// engine.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    drop(tokio::task::spawn(future));
}

/// Spawns a task whose result nobody waits for.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
