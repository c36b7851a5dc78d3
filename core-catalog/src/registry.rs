//! Callback name registry for script-injected requests
//!
//! Every script request gets a fresh global callback name. The registry maps
//! that name to the waiting request; a [`PendingCallback`] removes its entry
//! when dropped, so a request that times out or is cancelled never leaves a
//! registration behind.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::script::ScriptOutcome;
use futures::channel::oneshot;
use parking_lot::Mutex;
use uuid::Uuid;

type Waiters = Arc<Mutex<HashMap<String, oneshot::Sender<ScriptOutcome>>>>;

#[derive(Clone)]
pub struct CallbackRegistry {
    prefix: String,
    waiters: Waiters,
}

impl CallbackRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            waiters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reserve a unique callback name.
    pub fn register(&self) -> PendingCallback {
        let name = format!("{}_{}", self.prefix, Uuid::new_v4().simple());
        let (sender, receiver) = oneshot::channel();
        self.waiters.lock().insert(name.clone(), sender);

        PendingCallback {
            name,
            receiver,
            waiters: Arc::clone(&self.waiters),
        }
    }

    /// Deliver `outcome` to the request waiting on `name`.
    ///
    /// Returns `false` when nobody is waiting, e.g. the script fired after its
    /// request already timed out.
    pub fn complete(&self, name: &str, outcome: ScriptOutcome) -> bool {
        let sender = self.waiters.lock().remove(name);
        match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Number of outstanding registrations.
    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("prefix", &self.prefix)
            .field("pending", &self.len())
            .finish()
    }
}

/// A reserved callback name awaiting its outcome.
pub struct PendingCallback {
    name: String,
    receiver: oneshot::Receiver<ScriptOutcome>,
    waiters: Waiters,
}

impl PendingCallback {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the outcome. Fails only if the registration was dropped.
    pub async fn wait(&mut self) -> Result<ScriptOutcome, oneshot::Canceled> {
        (&mut self.receiver).await
    }
}

impl Drop for PendingCallback {
    fn drop(&mut self) {
        self.waiters.lock().remove(&self.name);
    }
}
