//! The behaviour subject: a multicast node that retains its last value.

use crate::{
    diagnostics,
    observer::{IntoObserver, Observer, StreamError},
    stream::Stream,
    subject::Subject,
    subscription::Subscription,
    traits::{DefinedAt, Emit, Source, Subscribe, WithValue},
};
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result},
    panic::Location,
    sync::{Arc, RwLock},
};

/// A [`Subject`] with a current value.
///
/// The value is initialized at construction, updated by every
/// [`next`](Emit::next), and replayed synchronously as the first emission each
/// new observer receives. It can always be read through
/// [`get`](crate::traits::GetValue::get) or
/// [`with_value`](WithValue::with_value), with or without subscribers.
pub struct State<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    value: Arc<RwLock<T>>,
    subject: Subject<T>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            value: Arc::clone(&self.value),
            subject: self.subject.clone(),
        }
    }
}

impl<T> Debug for State<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("State")
            .field("type", &std::any::type_name::<T>())
            .field("value", &Arc::as_ptr(&self.value))
            .finish()
    }
}

impl<T> PartialEq for State<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Eq for State<T> {}

impl<T> Default for State<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    #[track_caller]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> State<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a state holding `value`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    #[track_caller]
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            value: Arc::new(RwLock::new(value)),
            subject: Subject::new(),
        }
    }

    /// The update-function form of [`next`](Emit::next): computes the next
    /// value from the previous one, then fans it out.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    #[track_caller]
    pub fn update(&self, fun: impl FnOnce(&T) -> T) {
        if self.subject.is_stopped() {
            diagnostics::warn_misuse(format_args!(
                "update called on a stopped {self:?}"
            ));
            return;
        }
        let next = fun(&self.value.read().or_poisoned());
        self.next(next);
    }

    /// The number of currently-subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    /// Whether the state has been completed or errored.
    pub fn is_stopped(&self) -> bool {
        self.subject.is_stopped()
    }

    /// Re-expresses this state as a plain [`Stream`], so the operator
    /// pipeline applies to it. Subscribing to the stream replays the current
    /// value, exactly as subscribing to the state itself does.
    #[track_caller]
    pub fn to_stream(&self) -> Stream<T> {
        let state = self.clone();
        Stream::new(move |observer| {
            let subscription = state.subscribe_observer(observer);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }
}

impl<T> Emit for State<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn next(&self, value: T) {
        if self.subject.is_stopped() {
            diagnostics::warn_misuse(format_args!(
                "next called on a stopped {self:?}"
            ));
            return;
        }
        *self.value.write().or_poisoned() = value.clone();
        self.subject.next(value);
    }

    fn error(&self, error: StreamError) {
        self.subject.error(error);
    }

    fn complete(&self) {
        self.subject.complete();
    }
}

impl<T> Subscribe for State<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        if self.subject.is_stopped() {
            return Subscription::closed();
        }
        let current = self.value.read().or_poisoned().clone();
        observer.next(current);
        self.subject.subscribe_observer(observer)
    }
}

impl<T> WithValue for State<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn try_with_value<U>(&self, fun: impl FnOnce(&T) -> U) -> Option<U> {
        self.value.read().ok().map(|value| fun(&value))
    }
}

impl<T> Source for State<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn latest(&self) -> T {
        self.value.read().or_poisoned().clone()
    }

    /// Future emissions only: the current value is not replayed.
    fn changes(&self, observer: Observer<T>) -> Subscription {
        self.subject.subscribe_observer(observer)
    }
}

impl<T> IntoObserver<T> for State<T>
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

impl<T> DefinedAt for State<T> {
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
