//! Automatic names for iterator instances.

use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_PREFIX: &str = "KM";

static GLOBAL: NameRegistry = NameRegistry::with_prefix(DEFAULT_PREFIX);

/// Monotonic counter handing out names such as `KM0`, `KM1`, ...
///
/// Increments are atomic, so instances may be constructed from several threads.
#[derive(Debug)]
pub struct NameRegistry {
    prefix: &'static str,
    next: AtomicUsize,
}

impl NameRegistry {
    /// Creates a registry with the default `KM` prefix, starting at zero.
    pub const fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Creates a registry with a custom prefix, starting at zero.
    pub const fn with_prefix(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicUsize::new(0),
        }
    }

    /// Process-wide registry used by [`KrasnoselskiiMann::new`](crate::iteration::KrasnoselskiiMann::new).
    pub fn global() -> &'static NameRegistry {
        &GLOBAL
    }

    /// Reserves the next name.
    pub fn next_name(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, index)
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
