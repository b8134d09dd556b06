//! Memoized shape hashes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// A lazily computed, cache-on-first-access hash code.
///
/// Zero means "not computed yet". Concurrent first accesses may both compute;
/// they store the same value, so no lock is taken.
#[derive(Default)]
pub(crate) struct HashCache(AtomicU64);

impl HashCache {
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        let cached = self.0.load(Ordering::Relaxed);
        if cached != 0 {
            return cached;
        }
        let value = compute().max(1);
        self.0.store(value, Ordering::Relaxed);
        value
    }
}

impl Clone for HashCache {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.0.load(Ordering::Relaxed)))
    }
}

impl std::fmt::Debug for HashCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashCache")
            .field(&self.0.load(Ordering::Relaxed))
            .finish()
    }
}

/// Hash a value with a deterministic hasher.
pub(crate) fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
