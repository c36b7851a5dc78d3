//! Runtime utilities that abstract over the underlying executor.
//!
//! Native targets wrap Tokio so downstream crates never name it directly. The
//! browser has no way to block, so only the spawn helper is exposed there.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a throwaway current-thread runtime.
///
/// Returns `None` when the runtime cannot be created (e.g. the process ran out
/// of file descriptors for the I/O driver).
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .ok()
        .map(|runtime| runtime.block_on(future))
}

#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen_futures::spawn_local;
