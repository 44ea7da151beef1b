//! An implementation of a synchronous reactive-stream system.
//!
//! The stream model composes four reactive primitives:
//! 1. **Streams**: lazy, unicast producers of a value sequence. Each call to
//!    [`subscribe`](traits::Subscribe::subscribe) independently re-runs the
//!    stream's setup function.
//! 2. **Subjects**: multicast nodes that are both a subscription target and an
//!    observer, so a single upstream execution can be shared by any number of
//!    downstream subscribers.
//! 3. **States**: subjects that retain their last value, replay it
//!    synchronously to new subscribers, and expose it through
//!    [`get`](traits::GetValue::get) even without subscribers.
//! 4. **Derived values**: memoized, lazily recomputed read-only nodes over one
//!    or more states or subjects, built with [`computed::derive`].
//!
//! ```rust
//! use reactive_streams::{prelude::*, state::State};
//!
//! let count = State::new(1);
//! let double_count = count.derive(|n| n * 2);
//!
//! // derived values can be read without any subscription in place
//! assert_eq!(double_count.get(), 2);
//!
//! // updating `count` recomputes `double_count` for its subscribers
//! count.next(2);
//! assert_eq!(double_count.get(), 4);
//! ```
//!
//! ## Design Principles and Assumptions
//! - **Everything is synchronous.** `next`, `subscribe`, and derived
//!   recomputation run to completion before returning control to the caller.
//!   There is no queuing, no buffering, and no async channel: a slow observer
//!   callback blocks the emitter, and an error surfaces at the call site that
//!   triggered it.
//! - **Cancellation is explicit.** The only way to cancel a subscription is to
//!   call [`Subscription::unsubscribe`](subscription::Subscription::unsubscribe).
//!   Dropping a [`Subscription`](subscription::Subscription) handle does
//!   nothing.
//! - **Laziness is subscriber-gated.** A derived node attaches to its sources
//!   only while it has at least one subscriber. While unobserved it answers
//!   reads by pulling the latest value of each source on demand.
//!
//! Observer lists are ordered by insertion, and fan-out iterates over a
//! snapshot, so subscribing or unsubscribing from inside a `next` callback is
//! safe.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use core::fmt::Arguments;

pub mod computed;
pub mod diagnostics;
pub mod observer;
pub mod operators;
pub(crate) mod sets;
pub mod state;
pub mod stream;
pub mod subject;
pub mod subscription;
pub mod traits;

/// Reexports frequently-used traits.
pub mod prelude {
    pub use crate::traits::*;
}

pub(crate) fn log_warning(text: Arguments) {
    #[cfg(feature = "tracing")]
    {
        tracing::warn!("{}", text);
    }
    #[cfg(all(
        not(feature = "tracing"),
        target_arch = "wasm32",
        target_os = "unknown"
    ))]
    {
        web_sys::console::warn_1(&text.to_string().into());
    }
    #[cfg(all(
        not(feature = "tracing"),
        not(all(target_arch = "wasm32", target_os = "unknown"))
    ))]
    {
        eprintln!("{}", text);
    }
}
