//! Memory views and raw memory algorithms
//!
//! This module provides the non-owning views [`MemoryRange`] and
//! [`MemoryBlock`], and the chunk-optimized raw algorithms in [`raw_ops`]
//! they are built on.

pub mod block;
pub mod chunk;
pub mod range;
pub mod raw_ops;

// Re-export main types
pub use block::MemoryBlock;
pub use chunk::{Chunk, ChunkPlan, ChunkSpan, ChunkWidth};
pub use range::MemoryRange;
pub use raw_ops::{get_global_raw_ops, init_raw_ops, RawMemOps};
