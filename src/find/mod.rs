//! Merged directory enumeration and the find-handle table.
//!
//! `FindTable` mirrors find-first / find-next / find-close for the
//! interception layer. Handles are opaque values (slab slot + generation);
//! a closed or foreign handle is reported as `InvalidHandle`, never reused
//! by accident.

mod candidates;
mod cursor;

pub use candidates::{CandidateSet, Phase};
pub use cursor::{EnumerationCursor, MergedEntry};

use slab::Slab;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::errors::FindError;
use crate::platform::FindData;
use crate::resolver::PathRedirector;

/// Opaque enumeration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindHandle(u64);

impl FindHandle {
    fn new(slot: usize, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (slot as u64 & 0xFFFF_FFFF))
    }

    fn slot(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw value for crossing an FFI boundary.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FindHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

struct Slot {
    generation: u32,
    cursor: Arc<Mutex<EnumerationCursor>>,
}

/// Open enumerations, keyed by handle.
#[derive(Default)]
pub struct FindTable {
    slots: Mutex<Slab<Slot>>,
    generation: AtomicU32,
}

impl fmt::Debug for FindTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindTable").field("open", &self.len()).finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panicking holder cannot leave the slab half-updated
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FindTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a merged enumeration; returns its handle and first entry.
    pub fn find_first(&self, redirector: &PathRedirector, query: &str) -> Result<(FindHandle, FindData), FindError> {
        let (cursor, first) = EnumerationCursor::open(redirector, query)?;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let slot = lock(&self.slots).insert(Slot {
            generation,
            cursor: Arc::new(Mutex::new(cursor)),
        });
        let handle = FindHandle::new(slot, generation);
        debug!(handle = %handle, query = %query, "Find opened");
        Ok((handle, first.data))
    }

    /// Next entry for `handle`.
    pub fn find_next(&self, handle: FindHandle) -> Result<FindData, FindError> {
        let cursor = self.cursor(handle)?;
        let mut cursor = lock(&cursor);
        cursor.next_entry().map(|e| e.data)
    }

    /// Close `handle`, releasing every open source.
    pub fn find_close(&self, handle: FindHandle) -> Result<(), FindError> {
        let mut slots = lock(&self.slots);
        match slots.get(handle.slot()) {
            Some(slot) if slot.generation == handle.generation() => {
                slots.remove(handle.slot());
                trace!(handle = %handle, "Find closed");
                Ok(())
            }
            _ => Err(FindError::InvalidHandle),
        }
    }

    /// Number of enumerations currently open.
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cursor(&self, handle: FindHandle) -> Result<Arc<Mutex<EnumerationCursor>>, FindError> {
        let slots = lock(&self.slots);
        match slots.get(handle.slot()) {
            Some(slot) if slot.generation == handle.generation() => Ok(slot.cursor.clone()),
            _ => Err(FindError::InvalidHandle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::test_support::*;

    #[test]
    fn handle_lifecycle() {
        let (td, ctx) = context("{}");
        touch(&td, r"C:\data\a.txt", "a");
        touch(&td, r"C:\data\b.txt", "b");
        let r = PathRedirector::from_context(ctx);
        let table = FindTable::new();

        let (h, first) = table.find_first(&r, r"C:\data\*").unwrap();
        assert_eq!(first.file_name, "a.txt");
        assert_eq!(table.find_next(h).unwrap().file_name, "b.txt");
        assert_eq!(table.find_next(h).unwrap_err(), FindError::NoMoreFiles);
        assert_eq!(table.len(), 1);
        table.find_close(h).unwrap();
        assert!(table.is_empty());

        assert_eq!(table.find_next(h).unwrap_err(), FindError::InvalidHandle);
        assert_eq!(table.find_close(h).unwrap_err(), FindError::InvalidHandle);
    }

    #[test]
    fn stale_handle_does_not_reach_reused_slot() {
        let (td, ctx) = context("{}");
        touch(&td, r"C:\data\a.txt", "a");
        let r = PathRedirector::from_context(ctx);
        let table = FindTable::new();
        let (old, _) = table.find_first(&r, r"C:\data\*").unwrap();
        table.find_close(old).unwrap();
        let (new, _) = table.find_first(&r, r"C:\data\*").unwrap();
        assert_ne!(old, new);
        assert_eq!(table.find_next(old).unwrap_err(), FindError::InvalidHandle);
        assert_eq!(FindHandle::from_raw(new.as_raw()), new);
    }

    #[test]
    fn failed_open_allocates_nothing() {
        let (_td, ctx) = context("{}");
        let r = PathRedirector::from_context(ctx);
        let table = FindTable::new();
        assert_eq!(
            table.find_first(&r, r"C:\missing\*").unwrap_err(),
            FindError::PathNotFound
        );
        assert!(table.is_empty());
    }
}
