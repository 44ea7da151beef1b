//! The capability traits implemented by the reactive primitives.
//!
//! ## Principles
//! 1. **Composition**: derived capabilities are blanket-implemented from more
//!    primitive ones ([`GetValue`] for every [`WithValue`] type with a `Clone`
//!    value, multi-parent [`Sources`] from single [`Source`]s).
//! 2. **Fallibility**: value access comes in a `try_` variant returning
//!    `None`, and a panicking variant that reports the node's construction
//!    site in debug builds.
//!
//! | Trait         | Implemented by                          | Description                                           |
//! |---------------|-----------------------------------------|-------------------------------------------------------|
//! | [`Subscribe`] | `Stream`, `Subject`, `State`, `Derived` | Registers an observer, returns a `Subscription`.      |
//! | [`Emit`]      | `Observer`, `Subject`, `State`          | Pushes `next` / `error` / `complete` into a node.     |
//! | [`WithValue`] | `State`, `Derived`                      | Applies a closure to the current value.               |
//! | [`GetValue`]  | blanket over [`WithValue`]              | Clones the current value.                             |
//! | [`Source`]    | `Subject`, `State`, `Derived`           | Latest-value pull + change feed; the `derive` seam.   |
//! | [`Sources`]   | tuples of [`Source`]s                   | Multi-parent input to [`derive`](crate::computed::derive). |

use crate::{
    computed::Derived,
    observer::{IntoObserver, Observer, StreamError},
    subscription::Subscription,
};
use std::{panic::Location, sync::Arc};

/// Panics on a failed value access, reporting where the node was constructed
/// in debug builds.
#[macro_export]
macro_rules! unwrap_stream {
    ($node:ident) => {{
        #[cfg(debug_assertions)]
        let location = std::panic::Location::caller();
        || {
            #[cfg(debug_assertions)]
            {
                panic!(
                    "{}",
                    $crate::traits::panic_value_access(
                        $node.defined_at(),
                        location
                    )
                );
            }
            #[cfg(not(debug_assertions))]
            {
                panic!(
                    "Tried to access the value of a reactive node that is no \
                     longer available."
                );
            }
        }
    }};
}

/// Registering an observer with a node.
pub trait Subscribe {
    /// The type of value the node emits.
    type Item;

    /// Registers a built [`Observer`].
    fn subscribe_observer(&self, observer: Observer<Self::Item>)
        -> Subscription;

    /// Registers an observer or a bare `next` closure, returning the handle
    /// that cancels the registration.
    #[track_caller]
    fn subscribe(&self, observer: impl IntoObserver<Self::Item>) -> Subscription {
        self.subscribe_observer(observer.into_observer())
    }
}

/// The observer-facing surface of a node: pushing emissions into it.
pub trait Emit {
    /// The type of value the node accepts.
    type Item;

    /// Pushes a value.
    fn next(&self, value: Self::Item);

    /// Pushes a failure.
    fn error(&self, error: StreamError);

    /// Marks the node complete.
    fn complete(&self);
}

/// Applies a closure to the current value of a node.
pub trait WithValue: DefinedAt {
    /// The type of the stored value.
    type Value: ?Sized;

    /// Applies the closure, or returns `None` if the value is inaccessible.
    fn try_with_value<U>(&self, fun: impl FnOnce(&Self::Value) -> U)
        -> Option<U>;

    /// Applies the closure to the current value.
    ///
    /// ## Panics
    ///
    /// Panics if the value is inaccessible (e.g. a poisoned lock).
    #[track_caller]
    fn with_value<U>(&self, fun: impl FnOnce(&Self::Value) -> U) -> U {
        self.try_with_value(fun).unwrap_or_else(unwrap_stream!(self))
    }
}

/// Clones out the current value of a node.
pub trait GetValue: DefinedAt {
    /// The type of the stored value.
    type Value;

    /// Clones the current value, or returns `None` if it is inaccessible.
    fn try_get(&self) -> Option<Self::Value>;

    /// Clones the current value.
    ///
    /// ## Panics
    ///
    /// Panics if the value is inaccessible (e.g. a poisoned lock).
    #[track_caller]
    fn get(&self) -> Self::Value {
        self.try_get().unwrap_or_else(unwrap_stream!(self))
    }
}

impl<T> GetValue for T
where
    T: WithValue,
    T::Value: Clone + Sized,
{
    type Value = <T as WithValue>::Value;

    fn try_get(&self) -> Option<Self::Value> {
        self.try_with_value(Self::Value::clone)
    }
}

/// A node a derived value can depend on: the latest value can be pulled
/// synchronously, and future changes can be observed without replay.
pub trait Source: Clone {
    /// The type of value this source produces.
    type Output: Clone + Send + Sync + 'static;

    /// The source's latest known value, without subscribing.
    fn latest(&self) -> Self::Output;

    /// Observes future emissions only; unlike
    /// [`subscribe`](Subscribe::subscribe) on a replaying node, the current
    /// value is not delivered.
    fn changes(&self, observer: Observer<Self::Output>) -> Subscription;

    /// Builds a derived value from this single source; the fluent form of
    /// [`derive`](crate::computed::derive).
    #[track_caller]
    fn derive<U>(
        &self,
        fun: impl Fn(Self::Output) -> U + Send + Sync + 'static,
    ) -> Derived<U>
    where
        Self: Send + Sync + Sized + 'static,
        U: Clone + Send + Sync + 'static,
    {
        crate::computed::derive((self.clone(),), move |(value,)| fun(value))
    }
}

/// The callback a derived node attaches to each of its sources; invoked once
/// per source emission.
pub type OnEmit = Arc<dyn Fn() + Send + Sync>;

/// The error half of [`OnEmit`]: invoked when a source fails, so the failure
/// can be forwarded to the derived node's own observers.
pub type OnError = Arc<dyn Fn(StreamError) + Send + Sync>;

/// One or more [`Source`]s feeding a derived value, as a tuple.
pub trait Sources: Clone + Send + Sync + 'static {
    /// The tuple of the sources' latest values, as passed to the compute
    /// function.
    type Values;

    /// Pulls the latest value of every source.
    fn pull(&self) -> Self::Values;

    /// Subscribes `on_emit` and `on_error` to the change feed of every
    /// source.
    fn attach(&self, on_emit: OnEmit, on_error: OnError) -> Vec<Subscription>;
}

macro_rules! impl_sources {
    ($($T:ident, $N:tt,)*) => {
        impl<$($T,)*> Sources for ($($T,)*)
        where
            $($T: Source + Send + Sync + 'static,)*
        {
            type Values = ($($T::Output,)*);

            fn pull(&self) -> Self::Values {
                ($(self.$N.latest(),)*)
            }

            fn attach(
                &self,
                on_emit: OnEmit,
                on_error: OnError,
            ) -> Vec<Subscription> {
                vec![$(
                    {
                        let on_emit = Arc::clone(&on_emit);
                        let on_error = Arc::clone(&on_error);
                        self.$N.changes(
                            Observer::new(move |_| on_emit())
                                .on_error(move |error| on_error(error)),
                        )
                    },
                )*]
            }
        }
    };
}

impl_sources!(A, 0,);
impl_sources!(A, 0, B, 1,);
impl_sources!(A, 0, B, 1, C, 2,);
impl_sources!(A, 0, B, 1, C, 2, D, 3,);
impl_sources!(A, 0, B, 1, C, 2, D, 3, E, 4,);
impl_sources!(A, 0, B, 1, C, 2, D, 3, E, 4, F, 5,);
impl_sources!(A, 0, B, 1, C, 2, D, 3, E, 4, F, 5, G, 6,);
impl_sources!(A, 0, B, 1, C, 2, D, 3, E, 4, F, 5, G, 6, H, 7,);

/// The construction site of a node, for debug-build error reporting.
pub trait DefinedAt {
    /// Where the node was constructed; `None` in release builds.
    fn defined_at(&self) -> Option<&'static Location<'static>>;
}

#[doc(hidden)]
pub fn panic_value_access(
    defined_at: Option<&'static Location<'static>>,
    location: &'static Location<'static>,
) -> String {
    if let Some(defined_at) = defined_at {
        format!(
            "At {location}, you tried to access the value of a reactive node \
             defined at {defined_at}, but it is no longer available."
        )
    } else {
        format!(
            "At {location}, you tried to access the value of a reactive \
             node, but it is no longer available."
        )
    }
}
