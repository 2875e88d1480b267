//! Bounded snapshot caches.
//!
//! Family checks look up both parents and every child, so the same person
//! snapshot is requested many times in one scan. Entries are shared `Rc`s and
//! evicted least-recently-used beyond the capacity.

use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;

use crate::error::Result;
use crate::model::Handle;

pub const PERSON_CAPACITY: usize = 20_000;
pub const FAMILY_CAPACITY: usize = 10_000;

pub struct SnapshotCache<T> {
    entries: LruCache<Handle, Rc<T>>,
    hits: u64,
    misses: u64,
}

impl<T> SnapshotCache<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SnapshotCache {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.entries.contains(handle)
    }

    /// Returns the cached snapshot, building and inserting it on a miss.
    /// A failed build leaves the cache untouched.
    pub fn get_or_build(
        &mut self,
        handle: &str,
        build: impl FnOnce() -> Result<T>,
    ) -> Result<Rc<T>> {
        if let Some(snapshot) = self.entries.get(handle) {
            self.hits += 1;
            return Ok(Rc::clone(snapshot));
        }

        self.misses += 1;
        let snapshot = Rc::new(build()?);
        self.entries.put(handle.to_string(), Rc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
