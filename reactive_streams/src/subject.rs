//! The multicast node: an observable that is also an observer.

use crate::{
    diagnostics,
    observer::{IntoObserver, Observer, StreamError},
    sets::ObserverSet,
    stream::Stream,
    subscription::Subscription,
    traits::{DefinedAt, Emit, Source, Subscribe},
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    panic::Location,
    sync::{Arc, RwLock},
};

/// A multicast stream.
///
/// Where a [`Stream`] re-runs its setup for every subscriber, a subject holds
/// one ordered list of observers and fans each [`next`](Emit::next) out to all
/// of them synchronously, in subscription order. Because a subject is itself
/// an observer (via [`IntoObserver`]), passing it to a stream's `subscribe`
/// shares that single upstream execution among all of the subject's own
/// subscribers — the multicast property.
///
/// [`complete`](Emit::complete) and [`error`](Emit::error) are terminal: the
/// observer list is cleared, later emissions are silently dropped, and later
/// subscriptions receive nothing.
pub struct Subject<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<RwLock<SubjectInner<T>>>,
}

struct SubjectInner<T> {
    observers: ObserverSet<T>,
    last: Option<T>,
    stopped: bool,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Subject<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Subject")
            .field("type", &std::any::type_name::<T>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> PartialEq for Subject<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Subject<T> {}

impl<T> Default for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a subject with no observers and no value.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    #[track_caller]
    pub fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner: Arc::new(RwLock::new(SubjectInner {
                observers: ObserverSet::new(),
                last: None,
                stopped: false,
            })),
        }
    }

    /// The number of currently-subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.inner.read().or_poisoned().observers.len()
    }

    /// Whether the subject has been completed or errored.
    pub fn is_stopped(&self) -> bool {
        self.inner.read().or_poisoned().stopped
    }

    /// Re-expresses this subject as a plain [`Stream`], so the operator
    /// pipeline applies to it.
    #[track_caller]
    pub fn to_stream(&self) -> Stream<T> {
        let subject = self.clone();
        Stream::new(move |observer| {
            let subscription = subject.subscribe_observer(observer);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }
}

impl<T> Emit for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn next(&self, value: T) {
        let snapshot = {
            let mut lock = self.inner.write().or_poisoned();
            if lock.stopped {
                drop(lock);
                diagnostics::warn_misuse(format_args!(
                    "next called on a stopped {self:?}"
                ));
                return;
            }
            lock.last = Some(value.clone());
            lock.observers.snapshot()
        };
        for observer in snapshot {
            observer.next(value.clone());
        }
    }

    fn error(&self, error: StreamError) {
        let snapshot = {
            let mut lock = self.inner.write().or_poisoned();
            if lock.stopped {
                drop(lock);
                diagnostics::warn_misuse(format_args!(
                    "error called on a stopped {self:?}"
                ));
                return;
            }
            lock.stopped = true;
            lock.observers.take()
        };
        for observer in snapshot {
            observer.error(Arc::clone(&error));
        }
    }

    fn complete(&self) {
        let snapshot = {
            let mut lock = self.inner.write().or_poisoned();
            if lock.stopped {
                drop(lock);
                diagnostics::warn_misuse(format_args!(
                    "complete called on a stopped {self:?}"
                ));
                return;
            }
            lock.stopped = true;
            lock.observers.take()
        };
        for observer in snapshot {
            observer.complete();
        }
    }
}

impl<T> Subscribe for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        {
            let mut lock = self.inner.write().or_poisoned();
            if lock.stopped {
                return Subscription::closed();
            }
            lock.observers.subscribe(observer.clone());
        }
        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.write().or_poisoned().observers.unsubscribe(&observer);
            }
            observer.close();
        })
    }
}

impl<T> Source for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Option<T>;

    /// The last emitted value; `None` until the subject first emits.
    fn latest(&self) -> Option<T> {
        self.inner.read().or_poisoned().last.clone()
    }

    fn changes(&self, observer: Observer<Option<T>>) -> Subscription {
        let on_next = observer.clone();
        let on_error = observer.clone();
        self.subscribe_observer(
            Observer::new(move |value| on_next.next(Some(value)))
                .on_error(move |error| on_error.error(error))
                .on_complete(move || observer.complete()),
        )
    }
}

impl<T> IntoObserver<T> for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_observer(self) -> Observer<T> {
        let on_next = self.clone();
        let on_error = self.clone();
        Observer::new(move |value| on_next.next(value))
            .on_error(move |error| on_error.error(error))
            .on_complete(move || self.complete())
    }
}

impl<T> DefinedAt for Subject<T> {
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
