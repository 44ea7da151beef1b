//! The base unit of the system: a lazy, unicast observable.

use crate::{
    observer::Observer,
    operators,
    subscription::Subscription,
    traits::{DefinedAt, Subscribe},
};
use std::{
    fmt::{Debug, Formatter, Result},
    panic::Location,
    sync::Arc,
};

/// The teardown a stream's setup function may return; it runs when the
/// subscription produced by that setup execution is unsubscribed.
pub type Teardown = Option<Box<dyn FnOnce() + Send + Sync>>;

/// A lazy, unicast producer of a value sequence.
///
/// A stream wraps a single setup function and nothing else: it holds no
/// subscriber list and no state. Every call to
/// [`subscribe`](Subscribe::subscribe) re-runs the setup with a fresh
/// observer, so any side effect inside the setup happens once *per
/// subscription*, not once per stream. Multicasting is what a
/// [`Subject`](crate::subject::Subject) adds on top.
pub struct Stream<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    setup: Arc<dyn Fn(Observer<T>) -> Teardown + Send + Sync>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            setup: Arc::clone(&self.setup),
        }
    }
}

impl<T> Debug for Stream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Stream")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Stream<T> {
    /// Creates a stream from a setup function.
    ///
    /// Construction has no side effects; the setup runs only when the stream
    /// is subscribed. The setup may return a teardown to release whatever it
    /// acquired.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    #[track_caller]
    pub fn new(
        setup: impl Fn(Observer<T>) -> Teardown + Send + Sync + 'static,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            setup: Arc::new(setup),
        }
    }

    /// Transforms this stream with a single operator.
    ///
    /// Operators are plain functions from stream to stream, so `pipe` is just
    /// application; the [`pipe!`](crate::pipe) macro folds a stream through
    /// several operators at once.
    pub fn pipe<U>(self, op: impl FnOnce(Stream<T>) -> Stream<U>) -> Stream<U> {
        op(self)
    }

    /// Chainable form of [`operators::map`].
    #[track_caller]
    pub fn map<U: 'static>(
        self,
        fun: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> Stream<U> {
        self.pipe(operators::map(fun))
    }

    /// Chainable form of [`operators::filter`].
    #[track_caller]
    pub fn filter(
        self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Stream<T> {
        self.pipe(operators::filter(predicate))
    }

    /// Chainable form of [`operators::skip`].
    #[track_caller]
    pub fn skip(self, count: usize) -> Stream<T> {
        self.pipe(operators::skip(count))
    }
}

impl Stream<bool> {
    /// Chainable form of [`operators::ifelse`].
    #[track_caller]
    pub fn ifelse<U>(self, when_true: U, when_false: U) -> Stream<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.pipe(operators::ifelse(when_true, when_false))
    }

    /// Chainable form of [`operators::if_then`].
    #[track_caller]
    pub fn if_then<U>(self, value: U) -> Stream<Option<U>>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.pipe(operators::if_then(value))
    }
}

impl<T> DefinedAt for Stream<T> {
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

impl<T: 'static> Subscribe for Stream<T> {
    type Item = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all,)
    )]
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        let teardown = (self.setup)(observer.clone());
        Subscription::new(move || {
            observer.close();
            if let Some(teardown) = teardown {
                teardown();
            }
        })
    }
}
