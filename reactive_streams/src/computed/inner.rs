use crate::{
    sets::ObserverSet,
    subscription::Subscription,
    traits::{OnEmit, OnError},
};
use std::sync::Arc;

pub(crate) type Compute<T> = Arc<dyn Fn() -> T + Send + Sync>;
pub(crate) type Attach =
    Arc<dyn Fn(OnEmit, OnError) -> Vec<Subscription> + Send + Sync>;

pub(crate) struct DerivedInner<T> {
    /// Cache of the last computed value. Fresh exactly while the node is
    /// observed; an unobserved node cannot see source emissions, so its cache
    /// is treated as unconditionally stale.
    pub(crate) value: Option<T>,
    pub(crate) compute: Compute<T>,
    pub(crate) attach: Attach,
    pub(crate) observers: ObserverSet<T>,
    /// Subscriptions to the change feed of every source; populated while the
    /// node is observed.
    pub(crate) upstream: Vec<Subscription>,
}

impl<T> DerivedInner<T> {
    pub(crate) fn new(compute: Compute<T>, attach: Attach) -> Self {
        Self {
            value: None,
            compute,
            attach,
            observers: ObserverSet::new(),
            upstream: Vec::new(),
        }
    }

    /// Observedness is keyed to the observer list, not `upstream`: a node
    /// over zero sources attaches nothing but is still fresh while
    /// subscribed.
    pub(crate) fn is_observed(&self) -> bool {
        !self.observers.is_empty()
    }
}
