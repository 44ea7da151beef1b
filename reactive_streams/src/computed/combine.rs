//! Combinators that join the latest values of several like-typed sources.

use super::Derived;
use crate::{observer::Observer, traits::Source};
use indexmap::IndexMap;
use std::sync::Arc;

/// Combines an ordered list of sources into a derived node emitting the
/// positional array of their latest values whenever any of them emits.
///
/// Sources that have not emitted since subscription contribute their latest
/// known value (for a [`State`](crate::state::State), the current value; for
/// a bare [`Subject`](crate::subject::Subject), `None` until it first emits).
/// For differently-typed sources, use [`derive`](super::derive) with a source
/// tuple.
#[track_caller]
pub fn from_latest<S>(sources: impl IntoIterator<Item = S>) -> Derived<Vec<S::Output>>
where
    S: Source + Send + Sync + 'static,
{
    let sources: Arc<Vec<S>> = Arc::new(sources.into_iter().collect());
    let pull = Arc::clone(&sources);
    Derived::from_parts(
        move || pull.iter().map(Source::latest).collect(),
        move |on_emit, on_error| {
            sources
                .iter()
                .map(|source| {
                    let on_emit = Arc::clone(&on_emit);
                    let on_error = Arc::clone(&on_error);
                    source.changes(
                        Observer::new(move |_| on_emit())
                            .on_error(move |error| on_error(error)),
                    )
                })
                .collect()
        },
    )
}

/// [`from_latest`] over named sources: emits a map from name to latest value,
/// preserving the order the sources were given in.
#[track_caller]
pub fn from_latest_named<S>(
    entries: impl IntoIterator<Item = (&'static str, S)>,
) -> Derived<IndexMap<&'static str, S::Output>>
where
    S: Source + Send + Sync + 'static,
{
    let entries: Arc<Vec<(&'static str, S)>> =
        Arc::new(entries.into_iter().collect());
    let pull = Arc::clone(&entries);
    Derived::from_parts(
        move || {
            pull.iter()
                .map(|(name, source)| (*name, source.latest()))
                .collect()
        },
        move |on_emit, on_error| {
            entries
                .iter()
                .map(|(_, source)| {
                    let on_emit = Arc::clone(&on_emit);
                    let on_error = Arc::clone(&on_error);
                    source.changes(
                        Observer::new(move |_| on_emit())
                            .on_error(move |error| on_error(error)),
                    )
                })
                .collect()
        },
    )
}
