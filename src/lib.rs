//! # memview: Non-owning Memory Views and Raw Memory Algorithms
//!
//! This crate provides the low-level memory primitives a storage or
//! container layer is built on: views over caller-owned memory and the
//! chunk-optimized algorithms that operate on them.
//!
//! ## Key Features
//!
//! - **Memory Ranges**: validated `[begin, end)` byte views with containment
//!   checks, sub-ranges and in-place edits
//! - **Memory Blocks**: ranges indexed by a fixed element stride, with
//!   bounds-checked element addressing and typed reads and writes
//! - **Raw Algorithms**: compare, copy, overlap-safe move, fill and search,
//!   processing 8, 16, 32 or 64 bits per step
//! - **Fault Channel**: every fallible call returns a [`Result`]; callers that
//!   prefer sentinels can capture faults into a thread-local [`FaultSlot`]
//!
//! ## Quick Start
//!
//! ```rust
//! use memview::{MemoryBlock, MemoryRange};
//!
//! let mut buffer = *b"ABCDEFGHIJ";
//! let mut range = MemoryRange::from_mut_slice(&mut buffer);
//!
//! assert_eq!(range.get(9).unwrap(), b'J');
//! range.insert(0, b'_').unwrap();
//! assert_eq!(range.to_vec(), b"_ABCDEFGHI");
//!
//! let mut values = [1u32, 2, 3];
//! let block = MemoryBlock::from_mut_slice(&mut values);
//! assert_eq!(block.size(), 3);
//! assert_eq!(block.get::<u32>(2).unwrap(), 3);
//!
//! assert_eq!(memview::memory::raw_ops::find(b"hello world", b"world"), Some(6));
//! ```
//!
//! The views never allocate, never free and never grow the memory they view.
//! They are not thread-safe and cannot be sent across threads.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod fault;
pub mod memory;

// Re-export core types
pub use config::{Config, RawOpsConfig};
pub use error::{FaultKind, MemoryError, Result};
pub use fault::FaultSlot;
pub use memory::{ChunkWidth, MemoryBlock, MemoryRange, RawMemOps};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Widest chunk width the raw algorithms use on this target by default
pub fn native_chunk_width() -> ChunkWidth {
    ChunkWidth::native()
}

/// Initialize the library with the default raw ops dispatcher
pub fn init() {
    log::debug!(
        "Initializing memview v{} (native chunk width {} bits)",
        VERSION,
        native_chunk_width().bits()
    );
    memory::get_global_raw_ops();
}

/// Initialize the library with a configured raw ops dispatcher.
///
/// Must run before the first raw memory operation; the global dispatcher
/// cannot be replaced once created.
pub fn init_with_config(config: RawOpsConfig) -> Result<()> {
    log::debug!("Initializing memview v{} with {:?}", VERSION, config);
    memory::init_raw_ops(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        init();
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_native_chunk_width() {
        let width = native_chunk_width();

        #[cfg(target_pointer_width = "64")]
        assert_eq!(width, ChunkWidth::W64);

        #[cfg(target_pointer_width = "32")]
        assert_eq!(width, ChunkWidth::W32);

        assert_eq!(RawMemOps::new().max_width(), width);
    }

    #[test]
    fn test_init_after_first_use_is_rejected() {
        init();
        let err = init_with_config(RawOpsConfig::default()).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
