//! Thread-local re-entrancy guard.
//!
//! The resolver calls the same primitives it is consulted about (directory
//! creation, copies, find). While a thread holds the guard, any nested call
//! on that thread passes straight through without redirection logic.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static IN_RESOLVER: Cell<bool> = const { Cell::new(false) };
}

/// Scoped hold on the current thread's guard; released on drop.
#[derive(Debug)]
pub struct ReentrancyGuard {
    // !Send: the flag belongs to the acquiring thread
    _not_send: PhantomData<*const ()>,
}

impl ReentrancyGuard {
    /// Take the guard, or `None` if this thread already holds it.
    pub fn try_acquire() -> Option<Self> {
        IN_RESOLVER.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(Self { _not_send: PhantomData })
            }
        })
    }

    /// True while some frame on this thread holds the guard.
    pub fn is_held() -> bool {
        IN_RESOLVER.with(Cell::get)
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        IN_RESOLVER.with(|flag| flag.set(false));
    }
}
