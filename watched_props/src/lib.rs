//! Transparent change-watching over named object properties.
//!
//! A [`PropertyObject`] is the dynamic record of named properties a component
//! instance exposes: each property is either a plain data slot or a
//! getter/setter pair. [`add_changed_listener`] instruments a property so that
//! registered listeners run after every write, without changing the property's
//! external read/write contract:
//!
//! - reads are unaffected in value and side effects;
//! - an original setter still runs on every write, *before* the listeners;
//! - listeners fire in registration order, once per write;
//! - when the last listener is removed, the original descriptor is restored
//!   exactly — pointer-identical accessors, current value for data slots —
//!   leaving no trace of the interception machinery.
//!
//! This is the bridge the property-reflection layer builds on to synchronize
//! a plain field with a reactive state node.
//!
//! ```rust
//! use std::sync::{Arc, RwLock};
//! use watched_props::{add_changed_listener, ChangeListener, PropertyObject};
//!
//! let object = PropertyObject::new();
//! object.define("label", String::from("off"));
//!
//! let writes = Arc::new(RwLock::new(Vec::new()));
//! let listener: ChangeListener<String> = Arc::new({
//!     let writes = writes.clone();
//!     move |value: &String| writes.write().unwrap().push(value.clone())
//! });
//! add_changed_listener(&object, "label", listener).unwrap();
//!
//! object.set("label", String::from("on")).unwrap();
//! assert_eq!(object.get("label").unwrap(), "on");
//! assert_eq!(writes.read().unwrap().as_slice(), ["on"]);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use indexmap::IndexMap;
use or_poisoned::OrPoisoned;
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};
use thiserror::Error;

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Enables or disables warnings on silently-ignored misuse, such as removing
/// a listener that was never registered. Process-wide, off by default.
pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

/// Whether misuse warnings are currently enabled.
pub fn debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// A property getter. `Arc`'d so that descriptor restoration is verifiable by
/// pointer identity.
pub type Getter<V> = Arc<dyn Fn() -> V + Send + Sync>;

/// A property setter; see [`Getter`].
pub type Setter<V> = Arc<dyn Fn(V) + Send + Sync>;

/// A change listener; receives the written value after the write has taken
/// effect. Listener identity (for deduplication and removal) is the `Arc`
/// pointer.
pub type ChangeListener<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// The error type of fallible property access.
#[derive(Error, Debug)]
pub enum PropertyError {
    /// The object has no property with the given name.
    #[error("no property named `{0}` is defined")]
    Undefined(String),
}

/// The externally visible shape of a property, as reflection sees it.
///
/// While a property is watched, its descriptor is an [`Accessor`]
/// (the interception pair); once the last listener is removed, the descriptor
/// reported here is again the original one.
///
/// [`Accessor`]: Descriptor::Accessor
pub enum Descriptor<V> {
    /// A plain data property.
    Data(V),
    /// A getter/setter pair.
    Accessor {
        /// The property's getter.
        get: Getter<V>,
        /// The property's setter.
        set: Setter<V>,
    },
}

impl<V: Clone> Clone for Descriptor<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Data(value) => Self::Data(value.clone()),
            Self::Accessor { get, set } => Self::Accessor {
                get: Arc::clone(get),
                set: Arc::clone(set),
            },
        }
    }
}

impl<V> Debug for Descriptor<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Data(_) => f.write_str("Descriptor::Data"),
            Self::Accessor { .. } => f.write_str("Descriptor::Accessor"),
        }
    }
}

/// What the property looked like before interception, kept for exact
/// restoration.
enum Original<V> {
    /// The live cell the interception accessors route a data property
    /// through; restoration snapshots its current value back into a plain
    /// data slot.
    Data(Arc<RwLock<V>>),
    Accessor { get: Getter<V>, set: Setter<V> },
}

struct WatchState<V> {
    original: Original<V>,
    listeners: Arc<RwLock<Vec<ChangeListener<V>>>>,
    /// The interception pair reported by [`PropertyObject::descriptor`] while
    /// the property is watched.
    get: Getter<V>,
    set: Setter<V>,
}

enum Slot<V> {
    Data(V),
    Accessor { get: Getter<V>, set: Setter<V> },
    Watched(WatchState<V>),
}

/// A dynamic record of named properties.
///
/// Property order is the definition order, and is preserved by watching and
/// unwatching.
pub struct PropertyObject<V> {
    inner: Arc<RwLock<IndexMap<String, Slot<V>>>>,
}

impl<V> Clone for PropertyObject<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Debug for PropertyObject<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PropertyObject")
            .field("type", &std::any::type_name::<V>())
            .field("data", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<V> Default for PropertyObject<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PropertyObject<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an object with no properties.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Defines (or redefines) a plain data property.
    pub fn define(&self, name: impl Into<String>, value: V) {
        self.inner
            .write()
            .or_poisoned()
            .insert(name.into(), Slot::Data(value));
    }

    /// Defines (or redefines) an accessor property.
    pub fn define_accessor(
        &self,
        name: impl Into<String>,
        get: impl Fn() -> V + Send + Sync + 'static,
        set: impl Fn(V) + Send + Sync + 'static,
    ) {
        self.inner.write().or_poisoned().insert(
            name.into(),
            Slot::Accessor {
                get: Arc::new(get),
                set: Arc::new(set),
            },
        );
    }

    /// The property names, in definition order.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().or_poisoned().keys().cloned().collect()
    }

    /// The current descriptor of a property, for reflection.
    pub fn descriptor(&self, name: &str) -> Option<Descriptor<V>> {
        let map = self.inner.read().or_poisoned();
        Some(match map.get(name)? {
            Slot::Data(value) => Descriptor::Data(value.clone()),
            Slot::Accessor { get, set } => Descriptor::Accessor {
                get: Arc::clone(get),
                set: Arc::clone(set),
            },
            Slot::Watched(state) => Descriptor::Accessor {
                get: Arc::clone(&state.get),
                set: Arc::clone(&state.set),
            },
        })
    }

    /// Reads a property, running its getter if it has one.
    pub fn get(&self, name: &str) -> Result<V, PropertyError> {
        // clone the getter out so user code never runs under the object lock
        let get = {
            let map = self.inner.read().or_poisoned();
            let slot = map
                .get(name)
                .ok_or_else(|| PropertyError::Undefined(name.to_string()))?;
            match slot {
                Slot::Data(value) => return Ok(value.clone()),
                Slot::Accessor { get, .. } => Arc::clone(get),
                Slot::Watched(state) => Arc::clone(&state.get),
            }
        };
        Ok(get())
    }

    /// Writes a property, running its setter if it has one and then any
    /// registered change listeners, in registration order.
    pub fn set(&self, name: &str, value: V) -> Result<(), PropertyError> {
        let set = {
            let mut map = self.inner.write().or_poisoned();
            let slot = map
                .get_mut(name)
                .ok_or_else(|| PropertyError::Undefined(name.to_string()))?;
            match slot {
                Slot::Data(current) => {
                    *current = value;
                    return Ok(());
                }
                Slot::Accessor { set, .. } => Arc::clone(set),
                Slot::Watched(state) => Arc::clone(&state.set),
            }
        };
        set(value);
        Ok(())
    }

    /// Registers `listener` to run after every write to the named property.
    ///
    /// The first listener replaces the property's descriptor with an
    /// interception accessor pair; registering the same listener (by `Arc`
    /// identity) again is a no-op.
    pub fn add_changed_listener(
        &self,
        name: &str,
        listener: ChangeListener<V>,
    ) -> Result<(), PropertyError> {
        let mut map = self.inner.write().or_poisoned();
        let slot = map
            .get_mut(name)
            .ok_or_else(|| PropertyError::Undefined(name.to_string()))?;
        match slot {
            Slot::Watched(state) => {
                let mut listeners = state.listeners.write().or_poisoned();
                if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
                    warn(format_args!(
                        "listener already registered for property `{name}`"
                    ));
                } else {
                    listeners.push(listener);
                }
            }
            Slot::Data(value) => {
                let cell = Arc::new(RwLock::new(value.clone()));
                let listeners = Arc::new(RwLock::new(vec![listener]));
                let get: Getter<V> = Arc::new({
                    let cell = Arc::clone(&cell);
                    move || cell.read().or_poisoned().clone()
                });
                let set: Setter<V> = Arc::new({
                    let cell = Arc::clone(&cell);
                    let listeners = Arc::clone(&listeners);
                    move |value: V| {
                        *cell.write().or_poisoned() = value.clone();
                        notify(&listeners, &value);
                    }
                });
                *slot = Slot::Watched(WatchState {
                    original: Original::Data(cell),
                    listeners,
                    get,
                    set,
                });
            }
            Slot::Accessor { get, set } => {
                let original_get = Arc::clone(get);
                let original_set = Arc::clone(set);
                let listeners = Arc::new(RwLock::new(vec![listener]));
                let wrapped_get: Getter<V> = Arc::new({
                    let get = Arc::clone(&original_get);
                    move || get()
                });
                let wrapped_set: Setter<V> = Arc::new({
                    let set = Arc::clone(&original_set);
                    let listeners = Arc::clone(&listeners);
                    move |value: V| {
                        // original setter side effects first, listeners after
                        set(value.clone());
                        notify(&listeners, &value);
                    }
                });
                *slot = Slot::Watched(WatchState {
                    original: Original::Accessor {
                        get: original_get,
                        set: original_set,
                    },
                    listeners,
                    get: wrapped_get,
                    set: wrapped_set,
                });
            }
        }
        Ok(())
    }

    /// Removes a previously registered listener (by `Arc` identity).
    ///
    /// Removing the last listener restores the property's original
    /// descriptor exactly. Removing a listener that was never added, or from
    /// a property that is not watched, is a no-op.
    pub fn remove_changed_listener(
        &self,
        name: &str,
        listener: &ChangeListener<V>,
    ) {
        let mut map = self.inner.write().or_poisoned();
        let Some(slot) = map.get_mut(name) else {
            warn(format_args!(
                "remove_changed_listener on undefined property `{name}`"
            ));
            return;
        };
        let restored = {
            let Slot::Watched(state) = &mut *slot else {
                warn(format_args!("property `{name}` is not being watched"));
                return;
            };
            {
                let mut listeners = state.listeners.write().or_poisoned();
                match listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
                    Some(pos) => {
                        listeners.remove(pos);
                    }
                    None => {
                        warn(format_args!(
                            "listener was never registered for property \
                             `{name}`"
                        ));
                        return;
                    }
                }
                if !listeners.is_empty() {
                    return;
                }
            }
            match &state.original {
                Original::Data(cell) => {
                    Slot::Data(cell.read().or_poisoned().clone())
                }
                Original::Accessor { get, set } => Slot::Accessor {
                    get: Arc::clone(get),
                    set: Arc::clone(set),
                },
            }
        };
        *slot = restored;
    }
}

fn notify<V>(listeners: &Arc<RwLock<Vec<ChangeListener<V>>>>, value: &V) {
    // iterate over a snapshot so a listener may remove itself mid-write
    let snapshot = listeners.read().or_poisoned().clone();
    for listener in snapshot {
        listener(value);
    }
}

fn warn(text: std::fmt::Arguments) {
    if !debug() {
        return;
    }
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

/// Free-function form of [`PropertyObject::add_changed_listener`], the shape
/// the property-reflection layer consumes.
pub fn add_changed_listener<V>(
    object: &PropertyObject<V>,
    name: &str,
    listener: ChangeListener<V>,
) -> Result<(), PropertyError>
where
    V: Clone + Send + Sync + 'static,
{
    object.add_changed_listener(name, listener)
}

/// Free-function form of [`PropertyObject::remove_changed_listener`].
pub fn remove_changed_listener<V>(
    object: &PropertyObject<V>,
    name: &str,
    listener: &ChangeListener<V>,
) where
    V: Clone + Send + Sync + 'static,
{
    object.remove_changed_listener(name, listener);
}
