//! Chunk widths for the raw memory kernels
//!
//! Every raw algorithm is written once, generic over a [`Chunk`] type that
//! moves 1, 2, 4 or 8 bytes per step. A [`ChunkPlan`] splits a buffer into
//! spans: the widest allowed width covers as much of the buffer as it can
//! and the remainder falls back to successively narrower widths. A 13 byte
//! buffer with a 64-bit limit is walked as 8 + 4 + 1 bytes.
//!
//! All loads and stores are unaligned, so a span's width only depends on the
//! remaining length, never on the address.

use crate::error::{MemoryError, Result};
use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod private {
    pub trait Sealed {}
}

/// A fixed-width unit the kernels load, compare and store.
///
/// Implemented for `u8`, `u16`, `u32` and `u64` only.
pub trait Chunk: private::Sealed + Pod + Eq + fmt::Debug + Send + Sync {
    /// Width of the chunk in bytes
    const WIDTH: usize;

    /// Replicate a byte into every lane of the chunk
    fn splat(byte: u8) -> Self;

    /// Load a chunk from a possibly unaligned address
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `Self::WIDTH` bytes.
    unsafe fn load(ptr: *const u8) -> Self;

    /// Store the chunk to a possibly unaligned address
    ///
    /// # Safety
    /// `ptr` must be valid for writes of `Self::WIDTH` bytes.
    unsafe fn store(self, ptr: *mut u8);
}

macro_rules! impl_chunk {
    ($($ty:ty),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl Chunk for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline(always)]
                fn splat(byte: u8) -> Self {
                    <$ty>::from_ne_bytes([byte; std::mem::size_of::<$ty>()])
                }

                #[inline(always)]
                unsafe fn load(ptr: *const u8) -> Self {
                    unsafe { ptr.cast::<$ty>().read_unaligned() }
                }

                #[inline(always)]
                unsafe fn store(self, ptr: *mut u8) {
                    unsafe { ptr.cast::<$ty>().write_unaligned(self) }
                }
            }
        )*
    };
}

impl_chunk!(u8, u16, u32, u64);

/// Chunk widths supported by the kernels, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChunkWidth {
    /// One byte per step
    W8,
    /// Two bytes per step
    W16,
    /// Four bytes per step
    W32,
    /// Eight bytes per step
    W64,
}

impl ChunkWidth {
    /// Every width, narrowest first
    pub const ALL: [ChunkWidth; 4] = [Self::W8, Self::W16, Self::W32, Self::W64];

    /// Widest width that a plain register move handles on this target
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::W64
        } else if cfg!(target_pointer_width = "32") {
            Self::W32
        } else {
            Self::W16
        }
    }

    /// Width in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }

    /// Width in bits
    pub const fn bits(self) -> usize {
        self.bytes() * 8
    }

    /// Look up a width by its size in bits
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            8 => Some(Self::W8),
            16 => Some(Self::W16),
            32 => Some(Self::W32),
            64 => Some(Self::W64),
            _ => None,
        }
    }

    /// The next narrower width, if any
    pub const fn narrower(self) -> Option<Self> {
        match self {
            Self::W8 => None,
            Self::W16 => Some(Self::W8),
            Self::W32 => Some(Self::W16),
            Self::W64 => Some(Self::W32),
        }
    }

    /// Widest width no larger than `max` that fits in `remaining` bytes.
    ///
    /// Returns `W8` for lengths below two bytes, including zero.
    pub fn select(remaining: usize, max: ChunkWidth) -> Self {
        let mut width = max;
        while width.bytes() > remaining {
            match width.narrower() {
                Some(next) => width = next,
                None => break,
            }
        }
        width
    }
}

impl Default for ChunkWidth {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for ChunkWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for ChunkWidth {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches(['w', 'W']);
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(Self::from_bits)
            .ok_or_else(|| {
                MemoryError::configuration(format!(
                    "unsupported chunk width '{}', expected one of 8, 16, 32, 64",
                    s
                ))
            })
    }
}

/// One stretch of a buffer processed at a single width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Width used for the stretch
    pub width: ChunkWidth,
    /// Byte offset of the stretch from the buffer start
    pub offset: usize,
    /// Length of the stretch in bytes, a multiple of `width.bytes()`
    pub len: usize,
}

/// Iterator splitting `len` bytes into [`ChunkSpan`]s.
///
/// Forward plans yield spans front to back, starting at offset zero. Backward
/// plans yield spans back to front, the first one ending at `len`. Both cover
/// every byte exactly once.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    max: ChunkWidth,
    /// Bytes not yet covered by a yielded span
    remaining: usize,
    /// Offset of the first uncovered byte (forward plans only)
    cursor: usize,
    backward: bool,
}

impl ChunkPlan {
    /// Plan that walks `len` bytes from the front
    pub fn forward(len: usize, max: ChunkWidth) -> Self {
        Self {
            max,
            remaining: len,
            cursor: 0,
            backward: false,
        }
    }

    /// Plan that walks `len` bytes from the back
    pub fn backward(len: usize, max: ChunkWidth) -> Self {
        Self {
            max,
            remaining: len,
            cursor: 0,
            backward: true,
        }
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkSpan;

    fn next(&mut self) -> Option<ChunkSpan> {
        if self.remaining == 0 {
            return None;
        }

        let width = ChunkWidth::select(self.remaining, self.max);
        let len = self.remaining - self.remaining % width.bytes();

        let offset = if self.backward {
            self.remaining - len
        } else {
            let offset = self.cursor;
            self.cursor += len;
            offset
        };
        self.remaining -= len;

        Some(ChunkSpan { width, offset, len })
    }
}

/// Run a generic kernel instantiated for the chunk type matching `$width`.
macro_rules! dispatch_width {
    ($width:expr, $kernel:ident ( $($arg:expr),* $(,)? )) => {
        match $width {
            $crate::memory::chunk::ChunkWidth::W8 => $kernel::<u8>($($arg),*),
            $crate::memory::chunk::ChunkWidth::W16 => $kernel::<u16>($($arg),*),
            $crate::memory::chunk::ChunkWidth::W32 => $kernel::<u32>($($arg),*),
            $crate::memory::chunk::ChunkWidth::W64 => $kernel::<u64>($($arg),*),
        }
    };
}

pub(crate) use dispatch_width;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_widths() {
        assert_eq!(<u8 as Chunk>::WIDTH, 1);
        assert_eq!(<u16 as Chunk>::WIDTH, 2);
        assert_eq!(<u32 as Chunk>::WIDTH, 4);
        assert_eq!(<u64 as Chunk>::WIDTH, 8);
    }

    #[test]
    fn test_splat() {
        assert_eq!(u8::splat(0xAB), 0xAB);
        assert_eq!(u16::splat(0xAB), 0xABAB);
        assert_eq!(u32::splat(0x01), 0x0101_0101);
        assert_eq!(u64::splat(0xFF), u64::MAX);
    }

    #[test]
    fn test_load_store_unaligned() {
        let mut buffer = [0u8; 11];
        unsafe {
            0x0102_0304_0506_0708u64.store(buffer.as_mut_ptr().add(3));
            assert_eq!(u64::load(buffer.as_ptr().add(3)), 0x0102_0304_0506_0708);
        }
        assert_eq!(buffer[0..3], [0, 0, 0]);
    }

    #[test]
    fn test_select() {
        assert_eq!(ChunkWidth::select(0, ChunkWidth::W64), ChunkWidth::W8);
        assert_eq!(ChunkWidth::select(1, ChunkWidth::W64), ChunkWidth::W8);
        assert_eq!(ChunkWidth::select(3, ChunkWidth::W64), ChunkWidth::W16);
        assert_eq!(ChunkWidth::select(7, ChunkWidth::W64), ChunkWidth::W32);
        assert_eq!(ChunkWidth::select(64, ChunkWidth::W64), ChunkWidth::W64);
        assert_eq!(ChunkWidth::select(64, ChunkWidth::W16), ChunkWidth::W16);
    }

    #[test]
    fn test_forward_plan_falls_back_at_tail() {
        let spans: Vec<_> = ChunkPlan::forward(13, ChunkWidth::W64).collect();
        assert_eq!(
            spans,
            vec![
                ChunkSpan { width: ChunkWidth::W64, offset: 0, len: 8 },
                ChunkSpan { width: ChunkWidth::W32, offset: 8, len: 4 },
                ChunkSpan { width: ChunkWidth::W8, offset: 12, len: 1 },
            ]
        );
    }

    #[test]
    fn test_backward_plan_starts_at_tail() {
        let spans: Vec<_> = ChunkPlan::backward(13, ChunkWidth::W64).collect();
        assert_eq!(
            spans,
            vec![
                ChunkSpan { width: ChunkWidth::W64, offset: 5, len: 8 },
                ChunkSpan { width: ChunkWidth::W32, offset: 1, len: 4 },
                ChunkSpan { width: ChunkWidth::W8, offset: 0, len: 1 },
            ]
        );
    }

    #[test]
    fn test_plans_cover_every_byte() {
        for max in ChunkWidth::ALL {
            for len in 0..70 {
                let forward: usize = ChunkPlan::forward(len, max).map(|s| s.len).sum();
                let backward: usize = ChunkPlan::backward(len, max).map(|s| s.len).sum();
                assert_eq!(forward, len);
                assert_eq!(backward, len);
                assert!(ChunkPlan::forward(len, max).all(|s| s.width <= max));
            }
        }
        assert_eq!(ChunkPlan::forward(0, ChunkWidth::W64).count(), 0);
    }

    #[test]
    fn test_parse_width() {
        assert_eq!("16".parse::<ChunkWidth>().unwrap(), ChunkWidth::W16);
        assert_eq!("w64".parse::<ChunkWidth>().unwrap(), ChunkWidth::W64);
        assert!("12".parse::<ChunkWidth>().is_err());
        assert!("wide".parse::<ChunkWidth>().is_err());
        assert_eq!(ChunkWidth::W32.to_string(), "32");
    }
}
