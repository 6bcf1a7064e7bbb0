//! Post-reload change callbacks.
//!
//! Registration appends under a mutex that guards only the list, never
//! callback execution. [`SubscriptionRegistry::notify`] copies the list,
//! releases the lock, and hands each callback to its own blocking task.
//! Callbacks are fire-and-forget: the reload loop never waits on them, and
//! a panic inside one is caught and logged without affecting the others.
//!
//! Registrations are permanent for the lifetime of the registry.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

pub type ChangeCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct SubscriptionRegistry<T> {
    callbacks: Mutex<Vec<ChangeCallback<T>>>,
}

impl<T> Default for SubscriptionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SubscriptionRegistry<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn register<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.lock().push(Arc::new(callback));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChangeCallback<T>>> {
        // The list is only ever pushed to, so a poisoned guard is still consistent.
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync + 'static> SubscriptionRegistry<T> {
    /// Dispatch `config` to every callback registered so far.
    ///
    /// Returns the number of callbacks dispatched. Must be called from
    /// within a Tokio runtime.
    pub fn notify(&self, config: &Arc<T>, generation: u64) -> usize {
        let callbacks = self.lock().clone();

        for (index, callback) in callbacks.iter().enumerate() {
            let callback = Arc::clone(callback);
            let config = Arc::clone(config);
            tokio::task::spawn_blocking(move || {
                if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(&config))) {
                    tracing::error!(
                        callback = index,
                        generation,
                        panic = panic_message(payload.as_ref()),
                        "config change callback panicked"
                    );
                }
            });
        }

        callbacks.len()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
