//! The observer half of the stream contract: the record of `next`, `error`,
//! and `complete` callbacks a subscriber hands to a stream.

use crate::traits::Emit;
use std::{
    error::Error,
    fmt::{Debug, Formatter, Result},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// The error payload carried on the `error` channel of a stream.
///
/// Errors are reference-counted so that a single failure can fan out to many
/// observers.
pub type StreamError = Arc<dyn Error + Send + Sync>;

type NextFn<T> = Arc<dyn Fn(T) + Send + Sync>;
type ErrorFn = Arc<dyn Fn(StreamError) + Send + Sync>;
type CompleteFn = Arc<dyn Fn() + Send + Sync>;

/// The callback record consumed by [`subscribe`](crate::traits::Subscribe).
///
/// Any of the three callbacks may be omitted. A bare closure passed to
/// `subscribe` is normalized into an observer with only a `next` slot through
/// [`IntoObserver`].
///
/// Cloning an observer produces another handle to the same logical observer:
/// clones share the `closed` flag and compare equal, which is the identity
/// subjects use to remove an observer on unsubscribe.
pub struct Observer<T> {
    closed: Arc<AtomicBool>,
    next: Option<NextFn<T>>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            closed: Arc::clone(&self.closed),
            next: self.next.clone(),
            error: self.error.clone(),
            complete: self.complete.clone(),
        }
    }
}

impl<T> Debug for Observer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Observer")
            .field("type", &std::any::type_name::<T>())
            .field("id", &Arc::as_ptr(&self.closed))
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> PartialEq for Observer<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.closed, &other.closed)
    }
}

impl<T> Eq for Observer<T> {}

impl<T> Observer<T> {
    /// Creates an observer with only a `next` callback.
    pub fn new(next: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            next: Some(Arc::new(next)),
            error: None,
            complete: None,
        }
    }

    /// Creates an observer that ignores every emission.
    pub fn empty() -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Adds an `error` callback.
    pub fn on_error(
        mut self,
        error: impl Fn(StreamError) + Send + Sync + 'static,
    ) -> Self {
        self.error = Some(Arc::new(error));
        self
    }

    /// Adds a `complete` callback.
    pub fn on_complete(
        mut self,
        complete: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.complete = Some(Arc::new(complete));
        self
    }

    /// Delivers a value. A no-op after the observer has been closed.
    pub fn next(&self, value: T) {
        if self.is_closed() {
            return;
        }
        if let Some(next) = &self.next {
            next(value);
        }
    }

    /// Delivers a failure and closes the observer.
    ///
    /// ## Panics
    ///
    /// An observer without an `error` callback panics here: unhandled stream
    /// errors are not silently swallowed.
    pub fn error(&self, error: StreamError) {
        if self.is_closed() {
            return;
        }
        self.close();
        match &self.error {
            Some(callback) => callback(error),
            None => panic!("unhandled stream error: {error}"),
        }
    }

    /// Delivers completion and closes the observer.
    pub fn complete(&self) {
        if self.is_closed() {
            return;
        }
        self.close();
        if let Some(complete) = &self.complete {
            complete();
        }
    }

    /// Whether this observer has been closed by unsubscribing, an error, or
    /// completion.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl<T> Emit for Observer<T> {
    type Item = T;

    fn next(&self, value: T) {
        Observer::next(self, value);
    }

    fn error(&self, error: StreamError) {
        Observer::error(self, error);
    }

    fn complete(&self) {
        Observer::complete(self);
    }
}

/// Normalizes the argument of [`subscribe`](crate::traits::Subscribe::subscribe):
/// either a built [`Observer`] or a bare `next` closure.
pub trait IntoObserver<T> {
    /// Converts this value into an [`Observer`].
    fn into_observer(self) -> Observer<T>;
}

impl<T> IntoObserver<T> for Observer<T> {
    fn into_observer(self) -> Observer<T> {
        self
    }
}

impl<T, F> IntoObserver<T> for F
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn into_observer(self) -> Observer<T> {
        Observer::new(self)
    }
}
