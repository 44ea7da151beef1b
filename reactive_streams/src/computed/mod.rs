//! Derived values: memoized, lazily recomputed read-only nodes over one or
//! more sources.
//!
//! A [`Derived`] node attaches to its sources only while it has at least one
//! subscriber. While observed, every source emission triggers exactly one
//! recompute, fanned out to all of the node's observers — the compute function
//! never runs once per downstream subscriber. While unobserved, the node holds
//! no upstream subscriptions at all, and answers reads by pulling
//! [`Source::latest`](crate::traits::Source::latest) from each source on
//! demand.
//!
//! Derived nodes chain: a derived node is itself a [`Source`], so subscribing
//! to a downstream node subscribes it to its upstream nodes, propagating the
//! observer count (and therefore laziness and sharing) transitively. A source
//! failure propagates the same way: the error fans out to the node's
//! observers and the node detaches.

mod combine;
mod inner;

pub use combine::{from_latest, from_latest_named};

use crate::{
    observer::{Observer, StreamError},
    stream::Stream,
    subscription::Subscription,
    traits::{DefinedAt, OnEmit, OnError, Source, Sources, Subscribe, WithValue},
};
use inner::DerivedInner;
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    mem,
    panic::Location,
    sync::{Arc, RwLock},
};

/// Builds a derived value from one or more sources.
///
/// `sources` is a tuple of [`Source`]s (one through eight of them); `fun`
/// receives the tuple of their latest values and runs whenever any source
/// emits while the node is observed, or on demand when the node is read
/// while unobserved. For the single-source case,
/// [`Source::derive`](crate::traits::Source::derive) is the fluent form.
///
/// ```rust
/// use reactive_streams::{computed::derive, prelude::*, state::State};
///
/// let width = State::new(4);
/// let height = State::new(2);
/// let area = derive((width.clone(), height.clone()), |(w, h)| w * h);
///
/// assert_eq!(area.get(), 8);
/// width.next(6);
/// assert_eq!(area.get(), 12);
/// ```
#[track_caller]
pub fn derive<S, U>(
    sources: S,
    fun: impl Fn(S::Values) -> U + Send + Sync + 'static,
) -> Derived<U>
where
    S: Sources,
    U: Clone + Send + Sync + 'static,
{
    let pull = sources.clone();
    Derived::from_parts(
        move || fun(pull.pull()),
        move |on_emit, on_error| sources.attach(on_emit, on_error),
    )
}

/// A memoized, lazily recomputed read-only node.
///
/// Structurally like a [`State`](crate::state::State) — it has a current
/// value, replays it to new subscribers, and fans out changes — but its value
/// is computed from its sources rather than pushed in; there is no public
/// `next`.
pub struct Derived<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<RwLock<DerivedInner<T>>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Derived<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Derived")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> PartialEq for Derived<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Derived<T> {}

impl<T> Derived<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Construction is side-effect free: the compute function first runs when
    /// the value is read or the node gains its first subscriber.
    #[track_caller]
    pub(crate) fn from_parts(
        compute: impl Fn() -> T + Send + Sync + 'static,
        attach: impl Fn(OnEmit, OnError) -> Vec<Subscription>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner: Arc::new(RwLock::new(DerivedInner::new(
                Arc::new(compute),
                Arc::new(attach),
            ))),
        }
    }

    /// The number of currently-subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.inner.read().or_poisoned().observers.len()
    }

    /// Re-expresses this node as a plain [`Stream`], so the operator pipeline
    /// applies to it. Subscribing to the stream replays the current value,
    /// exactly as subscribing to the node itself does.
    #[track_caller]
    pub fn to_stream(&self) -> Stream<T> {
        let derived = self.clone();
        Stream::new(move |observer| {
            let subscription = derived.subscribe_observer(observer);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }

    /// Recomputes after a source emission and fans the result out; runs once
    /// per emission regardless of the number of observers.
    fn recompute_and_notify(inner: &Arc<RwLock<DerivedInner<T>>>) {
        let compute = Arc::clone(&inner.read().or_poisoned().compute);
        let value = compute();
        let snapshot = {
            let mut lock = inner.write().or_poisoned();
            lock.value = Some(value.clone());
            lock.observers.snapshot()
        };
        for observer in snapshot {
            observer.next(value.clone());
        }
    }

    /// Forwards a source failure to every observer, then detaches. Like a
    /// subject, a failed node delivers the error once and drops its
    /// observers; later reads still pull the sources on demand.
    fn fail_and_detach(
        inner: &Arc<RwLock<DerivedInner<T>>>,
        error: StreamError,
    ) {
        let (observers, upstream) = {
            let mut lock = inner.write().or_poisoned();
            (lock.observers.take(), mem::take(&mut lock.upstream))
        };
        for observer in observers {
            observer.error(Arc::clone(&error));
        }
        for subscription in upstream {
            subscription.unsubscribe();
        }
    }

    fn subscribe_with_replay(
        &self,
        observer: Observer<T>,
        replay: bool,
    ) -> Subscription {
        let current = {
            let mut lock = self.inner.write().or_poisoned();
            if !lock.is_observed() {
                // first observer: attach to every source, then catch up with
                // a single recompute. The catch-up refreshes the cache only;
                // it is not fanned out, so a chained derived node does not
                // recompute once per upstream attachment.
                let weak = Arc::downgrade(&self.inner);
                let on_emit: OnEmit = Arc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        Self::recompute_and_notify(&inner);
                    }
                });
                let weak = Arc::downgrade(&self.inner);
                let on_error: OnError = Arc::new(move |error| {
                    if let Some(inner) = weak.upgrade() {
                        Self::fail_and_detach(&inner, error);
                    }
                });
                let attach = Arc::clone(&lock.attach);
                lock.upstream = attach(on_emit, on_error);
                let value = (lock.compute)();
                lock.value = Some(value);
            }
            lock.observers.subscribe(observer.clone());
            if replay {
                lock.value.clone()
            } else {
                None
            }
        };
        if let Some(value) = current {
            observer.next(value);
        }
        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            let upstream = if let Some(inner) = weak.upgrade() {
                let mut lock = inner.write().or_poisoned();
                lock.observers.unsubscribe(&observer);
                if lock.observers.is_empty() {
                    // last observer gone: detach from every source so the
                    // whole chain can fall back to laziness
                    mem::take(&mut lock.upstream)
                } else {
                    Vec::new()
                }
            } else {
                Vec::new()
            };
            observer.close();
            for subscription in upstream {
                subscription.unsubscribe();
            }
        })
    }
}

impl<T> Subscribe for Derived<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.subscribe_with_replay(observer, true)
    }
}

impl<T> WithValue for Derived<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn try_with_value<U>(&self, fun: impl FnOnce(&T) -> U) -> Option<U> {
        let compute = {
            let lock = self.inner.read().or_poisoned();
            if lock.is_observed() {
                // every source emission recomputed the cache already
                return lock.value.as_ref().map(fun);
            }
            Arc::clone(&lock.compute)
        };
        // unobserved: pull the sources' latest values on demand
        let value = compute();
        Some(fun(&value))
    }
}

impl<T> Source for Derived<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn latest(&self) -> T {
        self.with_value(T::clone)
    }

    fn changes(&self, observer: Observer<T>) -> Subscription {
        self.subscribe_with_replay(observer, false)
    }
}

impl<T> DefinedAt for Derived<T> {
    #[inline(always)]
    fn defined_at(&self) -> Option<&'static Location<'static>> {
        #[cfg(debug_assertions)]
        {
            Some(self.defined_at)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}
