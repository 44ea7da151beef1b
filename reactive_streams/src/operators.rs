//! Pure stream-to-stream transformations.
//!
//! Every operator is a factory function `op(args) -> impl FnOnce(Stream<T>) ->
//! Stream<U>`, applied either with [`Stream::pipe`], through the chainable
//! methods on [`Stream`], or folded through several operators at once with the
//! [`pipe!`](crate::pipe) macro.
//!
//! Operator state (such as the counter inside [`skip`]) is created inside the
//! setup of the produced stream, so every subscription runs an independent
//! copy of the pipeline.

use crate::{observer::Observer, stream::Stream, traits::Subscribe};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn forward_terminal<T: 'static, U: 'static>(
    inner: Observer<T>,
    downstream: &Observer<U>,
) -> Observer<T> {
    let on_error = downstream.clone();
    let on_complete = downstream.clone();
    inner
        .on_error(move |error| on_error.error(error))
        .on_complete(move || on_complete.complete())
}

/// Transforms each emitted value with `fun`.
#[track_caller]
pub fn map<T, U>(
    fun: impl Fn(T) -> U + Send + Sync + 'static,
) -> impl FnOnce(Stream<T>) -> Stream<U>
where
    T: 'static,
    U: 'static,
{
    let fun = Arc::new(fun);
    move |source: Stream<T>| {
        Stream::new(move |observer: Observer<U>| {
            let fun = Arc::clone(&fun);
            let downstream = observer.clone();
            let inner = forward_terminal(
                Observer::new(move |value| downstream.next(fun(value))),
                &observer,
            );
            let subscription = source.subscribe_observer(inner);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }
}

/// Suppresses values failing `predicate`.
#[track_caller]
pub fn filter<T>(
    predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
) -> impl FnOnce(Stream<T>) -> Stream<T>
where
    T: 'static,
{
    let predicate = Arc::new(predicate);
    move |source: Stream<T>| {
        Stream::new(move |observer: Observer<T>| {
            let predicate = Arc::clone(&predicate);
            let downstream = observer.clone();
            let inner = forward_terminal(
                Observer::new(move |value| {
                    if predicate(&value) {
                        downstream.next(value);
                    }
                }),
                &observer,
            );
            let subscription = source.subscribe_observer(inner);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }
}

/// Suppresses the first `count` emissions, then passes the rest through.
#[track_caller]
pub fn skip<T>(count: usize) -> impl FnOnce(Stream<T>) -> Stream<T>
where
    T: 'static,
{
    move |source: Stream<T>| {
        Stream::new(move |observer: Observer<T>| {
            // fresh per subscription
            let seen = AtomicUsize::new(0);
            let downstream = observer.clone();
            let inner = forward_terminal(
                Observer::new(move |value| {
                    if seen.fetch_add(1, Ordering::Relaxed) >= count {
                        downstream.next(value);
                    }
                }),
                &observer,
            );
            let subscription = source.subscribe_observer(inner);
            Some(Box::new(move || subscription.unsubscribe()))
        })
    }
}

/// Maps a boolean stream to one of two values, re-evaluated per emission.
#[track_caller]
pub fn ifelse<U>(
    when_true: U,
    when_false: U,
) -> impl FnOnce(Stream<bool>) -> Stream<U>
where
    U: Clone + Send + Sync + 'static,
{
    map(move |condition| {
        if condition {
            when_true.clone()
        } else {
            when_false.clone()
        }
    })
}

/// [`ifelse`] with an absent `else` branch: `true` maps to `Some(value)`,
/// `false` to `None`.
#[track_caller]
pub fn if_then<U>(value: U) -> impl FnOnce(Stream<bool>) -> Stream<Option<U>>
where
    U: Clone + Send + Sync + 'static,
{
    ifelse(Some(value), None)
}

/// Folds a stream through a sequence of operators.
///
/// ```rust
/// use reactive_streams::{operators::{filter, map}, pipe, prelude::*, state::State};
///
/// let n = State::new(4);
/// let labeled = pipe!(
///     n.to_stream(),
///     filter(|n: &i32| n % 2 == 0),
///     map(|n: i32| format!("{n} is even")),
/// );
/// let seen = std::sync::Arc::new(std::sync::RwLock::new(String::new()));
/// let subscription = labeled.subscribe({
///     let seen = seen.clone();
///     move |label: String| *seen.write().unwrap() = label
/// });
/// assert_eq!(seen.read().unwrap().as_str(), "4 is even");
/// subscription.unsubscribe();
/// ```
#[macro_export]
macro_rules! pipe {
    ($source:expr $(, $op:expr)+ $(,)?) => {{
        let __stream = $source;
        $(let __stream = ($op)(__stream);)+
        __stream
    }};
}
