//! Process-wide diagnostics configuration.
//!
//! Several misuses are specified as silent no-ops: emitting on a completed
//! subject, unsubscribing twice, and the like. Turning the debug flag on makes
//! those paths log a warning instead of passing silently, which is usually the
//! fastest way to find a component that keeps writing into a torn-down
//! subject.
//!
//! The flag is process-wide, off by default, and mutable only through
//! [`set_debug`].

use core::fmt::Arguments;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Enables or disables warnings on silently-ignored misuse.
pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

/// Whether misuse warnings are currently enabled.
pub fn debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

pub(crate) fn warn_misuse(text: Arguments) {
    if debug() {
        crate::log_warning(text);
    }
}
