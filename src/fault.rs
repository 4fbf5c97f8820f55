//! Sticky fault channel
//!
//! The primitives in this crate report failures through [`Result`]. Some
//! callers sit on hot paths where they would rather take the sentinel value
//! (a null address, a zero count, an untouched receiver) and check for a
//! fault later. [`FaultSlot`] supports that style: [`FaultSlot::capture`]
//! turns a `Result` into an `Option`, remembering the kind of the last
//! failure until somebody calls [`FaultSlot::get_and_clear`].
//!
//! A slot holds one fault kind. A later fault overwrites an earlier one, and
//! a fault nobody reads stays in the slot, so it can be mistaken for the
//! result of a later call. Clear the slot between unrelated calls.
//!
//! Each thread owns a default slot, reachable through the free functions in
//! this module. Pass an explicit [`FaultSlot`] around when several
//! components on one thread must not see each other's faults.
//!
//! ```rust
//! use memview::{fault, FaultKind, MemoryRange};
//!
//! let mut buffer = *b"ABCDEFGHIJ";
//! let range = MemoryRange::from_mut_slice(&mut buffer);
//!
//! assert!(fault::capture(range.at(10, false)).is_none());
//! assert_eq!(fault::get_and_clear(), Some(FaultKind::OutOfRange));
//! assert_eq!(fault::get_and_clear(), None);
//! ```

use crate::error::{FaultKind, Result};
use std::cell::Cell;

/// A single-entry record of the most recent fault.
#[derive(Debug, Default)]
pub struct FaultSlot {
    last: Cell<Option<FaultKind>>,
}

impl FaultSlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            last: Cell::new(None),
        }
    }

    /// Record `kind` as the most recent fault, replacing any earlier one
    pub fn report(&self, kind: FaultKind) {
        log::trace!("memory fault recorded: {}", kind);
        self.last.set(Some(kind));
    }

    /// Return the recorded fault and reset the slot
    pub fn get_and_clear(&self) -> Option<FaultKind> {
        self.last.take()
    }

    /// Return the recorded fault without resetting the slot
    pub fn peek(&self) -> Option<FaultKind> {
        self.last.get()
    }

    /// Convert a result into its fail-soft form, recording the fault on error
    pub fn capture<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(err.kind());
                None
            }
        }
    }
}

thread_local! {
    static CURRENT: FaultSlot = const { FaultSlot::new() };
}

/// Run `f` with the current thread's default slot
pub fn with_current<R>(f: impl FnOnce(&FaultSlot) -> R) -> R {
    CURRENT.with(f)
}

/// Record a fault in the current thread's slot
pub fn report(kind: FaultKind) {
    with_current(|slot| slot.report(kind))
}

/// Read and reset the current thread's slot
pub fn get_and_clear() -> Option<FaultKind> {
    with_current(FaultSlot::get_and_clear)
}

/// Read the current thread's slot without resetting it
pub fn peek() -> Option<FaultKind> {
    with_current(FaultSlot::peek)
}

/// [`FaultSlot::capture`] on the current thread's slot
pub fn capture<T>(result: Result<T>) -> Option<T> {
    with_current(|slot| slot.capture(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoryError;

    #[test]
    fn test_slot_starts_empty() {
        let slot = FaultSlot::new();
        assert_eq!(slot.peek(), None);
        assert_eq!(slot.get_and_clear(), None);
    }

    #[test]
    fn test_report_and_clear() {
        let slot = FaultSlot::new();
        slot.report(FaultKind::NullPointer);
        assert_eq!(slot.peek(), Some(FaultKind::NullPointer));
        assert_eq!(slot.get_and_clear(), Some(FaultKind::NullPointer));
        assert_eq!(slot.get_and_clear(), None);
    }

    #[test]
    fn test_last_fault_wins() {
        let slot = FaultSlot::new();
        slot.report(FaultKind::OutOfRange);
        slot.report(FaultKind::ZeroElementSize);
        assert_eq!(slot.get_and_clear(), Some(FaultKind::ZeroElementSize));
    }

    #[test]
    fn test_capture() {
        let slot = FaultSlot::new();

        assert_eq!(slot.capture(Ok::<_, MemoryError>(7)), Some(7));
        assert_eq!(slot.peek(), None);

        let failed: Result<usize> = Err(MemoryError::out_of_range(3, 2));
        assert_eq!(slot.capture(failed), None);
        assert_eq!(slot.get_and_clear(), Some(FaultKind::OutOfRange));
    }

    #[test]
    fn test_successful_capture_keeps_stale_fault() {
        let slot = FaultSlot::new();
        slot.report(FaultKind::InvalidRange);
        assert_eq!(slot.capture(Ok::<_, MemoryError>(())), Some(()));
        assert_eq!(slot.get_and_clear(), Some(FaultKind::InvalidRange));
    }

    #[test]
    fn test_thread_local_isolation() {
        report(FaultKind::DifferentElementSize);

        let other = std::thread::spawn(get_and_clear).join().unwrap();
        assert_eq!(other, None);

        assert_eq!(get_and_clear(), Some(FaultKind::DifferentElementSize));
    }
}
