//! The cancellation handle returned by every `subscribe` call.

use crate::diagnostics;
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    sync::{Arc, RwLock},
};

type Finalizer = Box<dyn FnOnce() + Send + Sync>;

/// A handle to one active subscription.
///
/// Calling [`unsubscribe`](Subscription::unsubscribe) runs the subscription's
/// teardown exactly once; further calls are no-ops. Dropping the handle does
/// *not* unsubscribe — cancellation is always explicit.
pub struct Subscription {
    inner: Arc<RwLock<Option<Finalizer>>>,
}

impl Clone for Subscription {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(finalize: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Box::new(finalize)))),
        }
    }

    /// A subscription that was closed before it began, e.g. the result of
    /// subscribing to an already-completed subject.
    pub(crate) fn closed() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Cancels the subscription, running its teardown. Idempotent.
    pub fn unsubscribe(&self) {
        let finalize = self.inner.write().or_poisoned().take();
        match finalize {
            // run outside the lock, in case the teardown re-enters
            Some(finalize) => finalize(),
            None => diagnostics::warn_misuse(format_args!(
                "unsubscribe called on an already-closed subscription"
            )),
        }
    }

    /// Whether the subscription has already been unsubscribed.
    pub fn is_closed(&self) -> bool {
        self.inner.read().or_poisoned().is_none()
    }
}
