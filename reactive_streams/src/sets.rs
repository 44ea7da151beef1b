//! The ordered collection of observers held by a multicast node.
//!
//! This is a linear map built on a `Vec<_>`: observer lists are small, and a
//! linear identity scan is not meaningfully more expensive than a hash and
//! lookup, while preserving subscription order for fan-out.

use crate::observer::Observer;
use std::{mem, slice, vec::IntoIter};

pub struct ObserverSet<T>(Vec<Observer<T>>);

impl<T> Default for ObserverSet<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> ObserverSet<T> {
    pub fn new() -> Self {
        Self(Vec::with_capacity(2))
    }

    pub fn subscribe(&mut self, observer: Observer<T>) {
        if !self.0.contains(&observer) {
            self.0.push(observer);
        }
    }

    pub fn unsubscribe(&mut self, observer: &Observer<T>) {
        if let Some(pos) = self.0.iter().position(|o| o == observer) {
            // note: do not use `.swap_remove()` here.
            // `.remove()` shifts the remaining items, but it maintains the
            // order of the observers, and emissions are specified to fan out
            // in subscription order.
            self.0.remove(pos);
        }
    }

    pub fn take(&mut self) -> Vec<Observer<T>> {
        mem::take(&mut self.0)
    }

    /// Copies the current observer handles so fan-out can iterate without
    /// holding the node's lock.
    pub fn snapshot(&self) -> Vec<Observer<T>> {
        self.0.to_vec()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> IntoIterator for ObserverSet<T> {
    type Item = Observer<T>;
    type IntoIter = IntoIter<Observer<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ObserverSet<T> {
    type Item = &'a Observer<T>;
    type IntoIter = slice::Iter<'a, Observer<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
