//! # Raw Memory Operations
//!
//! Chunk-optimized compare, copy, move, fill and search over byte buffers.
//! These are the kernels the [`MemoryRange`](crate::memory::MemoryRange) and
//! [`MemoryBlock`](crate::memory::MemoryBlock) views are built on.
//!
//! ## Architecture
//! - **Width dispatch**: every kernel is written once, generic over a
//!   [`Chunk`] of 1, 2, 4 or 8 bytes. A [`ChunkPlan`] walks the buffer with
//!   the widest allowed width and falls back to narrower widths at the tail.
//! - **Pinned widths**: [`RawMemOps::with_max_width`] builds a dispatcher
//!   limited to one width, which is how the width-specialized forms of each
//!   algorithm are reached. `ChunkWidth::W8` is the plain byte-by-byte path.
//! - **Safe slices**: the public API takes slices and reports positions as
//!   offsets. [`RawMemOps::move_raw`] keeps an address-pair form for
//!   callers whose source and destination alias one buffer.
//!
//! ## Semantics worth knowing
//! - `compare` only looks at the overlapping prefix. Two buffers that agree
//!   on `min(len)` bytes compare equal even if their lengths differ.
//! - `find` never matches an empty needle or an empty haystack.
//! - `copy` assumes disjoint buffers, `move` picks its direction so
//!   overlapping buffers behave as if copied through a temporary.

use crate::config::{Config, RawOpsConfig};
use crate::error::{check_range, MemoryError, Result};
use crate::memory::chunk::{dispatch_width, Chunk, ChunkPlan, ChunkWidth};
use std::ops::Range;
use std::sync::OnceLock;

/// Raw memory operations dispatcher with a configurable chunk width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMemOps {
    /// Widest chunk the kernels may use
    max_width: ChunkWidth,
    /// Buffers shorter than this are processed byte by byte
    chunk_threshold: usize,
    /// Use the word-at-a-time scan for single byte search
    word_search: bool,
}

impl RawMemOps {
    /// Create a dispatcher from the default configuration
    pub fn new() -> Self {
        Self::from_config_unchecked(&RawOpsConfig::default())
    }

    /// Create a dispatcher from a validated configuration
    pub fn with_config(config: &RawOpsConfig) -> Result<Self> {
        config.validate()?;
        let ops = Self::from_config_unchecked(config);
        log::debug!(
            "raw memory ops configured: max width {} bits, chunk threshold {} bytes, \
             word search {}",
            ops.max_width.bits(),
            ops.chunk_threshold,
            ops.word_search
        );
        Ok(ops)
    }

    /// Create a dispatcher pinned to `width`, chunking buffers of any length
    pub fn with_max_width(width: ChunkWidth) -> Self {
        Self {
            max_width: width,
            chunk_threshold: 0,
            word_search: width == ChunkWidth::W64,
        }
    }

    fn from_config_unchecked(config: &RawOpsConfig) -> Self {
        Self {
            max_width: config.max_chunk_width,
            chunk_threshold: config.chunk_threshold,
            word_search: config.word_search,
        }
    }

    /// Widest chunk width this dispatcher uses
    pub fn max_width(&self) -> ChunkWidth {
        self.max_width
    }

    /// Length below which buffers are processed byte by byte
    pub fn chunk_threshold(&self) -> usize {
        self.chunk_threshold
    }

    /// Whether single byte search scans a word at a time
    pub fn word_search(&self) -> bool {
        self.word_search
    }

    #[inline]
    fn width_for(&self, len: usize) -> ChunkWidth {
        if len < self.chunk_threshold {
            ChunkWidth::W8
        } else {
            self.max_width
        }
    }
}

//==============================================================================
// PUBLIC SAFE APIS
//==============================================================================

impl RawMemOps {
    /// Offset in `lhs` of the first byte where `lhs` and `rhs` differ.
    ///
    /// Only the first `min(lhs.len(), rhs.len())` bytes are compared, so a
    /// pure length mismatch is not a difference. Returns `None` when the
    /// compared bytes are all equal or either buffer is empty.
    pub fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Option<usize> {
        let len = lhs.len().min(rhs.len());
        if len == 0 {
            return None;
        }
        // SAFETY: both buffers hold at least `len` bytes.
        unsafe { self.compare_unchecked(lhs.as_ptr(), rhs.as_ptr(), len) }
    }

    /// Offset in `lhs` of the differing byte nearest the end.
    ///
    /// The tails of both buffers are aligned and the overlapping
    /// `min(lhs.len(), rhs.len())` bytes are scanned from the back. The
    /// returned offset is still counted from the front of `lhs`.
    pub fn compare_from_end(&self, lhs: &[u8], rhs: &[u8]) -> Option<usize> {
        let len = lhs.len().min(rhs.len());
        if len == 0 {
            return None;
        }
        let lhs_start = lhs.len() - len;
        let rhs_start = rhs.len() - len;
        // SAFETY: both tails hold exactly `len` bytes.
        unsafe {
            self.compare_rev_unchecked(
                lhs.as_ptr().add(lhs_start),
                rhs.as_ptr().add(rhs_start),
                len,
            )
        }
        .map(|pos| lhs_start + pos)
    }

    /// Copy `min(dst.len(), src.len())` bytes from the front of `src` into
    /// the front of `dst`; returns the number of bytes copied.
    pub fn copy(&self, dst: &mut [u8], src: &[u8]) -> usize {
        let len = dst.len().min(src.len());
        if len > 0 {
            // SAFETY: `dst` and `src` are distinct borrows holding `len` bytes.
            unsafe { self.copy_unchecked(dst.as_mut_ptr(), src.as_ptr(), len) }
        }
        len
    }

    /// Copy the tail of `src` onto the tail of `dst`.
    ///
    /// Returns the offset in `dst` where the written region starts: a short
    /// source only overwrites the last `src.len()` bytes of `dst`, a long
    /// source only contributes its last `dst.len()` bytes and the result is 0.
    pub fn copy_from_end(&self, dst: &mut [u8], src: &[u8]) -> usize {
        let len = dst.len().min(src.len());
        let dst_start = dst.len() - len;
        let src_start = src.len() - len;
        if len > 0 {
            // SAFETY: both tails hold exactly `len` bytes and do not overlap.
            unsafe {
                self.copy_rev_unchecked(
                    dst.as_mut_ptr().add(dst_start),
                    src.as_ptr().add(src_start),
                    len,
                )
            }
        }
        dst_start
    }

    /// Move `min(dst.len(), src.len())` bytes from `src` into `dst`; returns
    /// the number of bytes moved.
    ///
    /// Distinct slices never overlap, so this produces the same bytes as
    /// [`copy`](Self::copy). Use [`move_within`](Self::move_within) or
    /// [`move_raw`](Self::move_raw) when source and destination share memory.
    pub fn move_bytes(&self, dst: &mut [u8], src: &[u8]) -> usize {
        let len = dst.len().min(src.len());
        if len > 0 {
            // SAFETY: both buffers hold at least `len` bytes.
            unsafe { self.move_unchecked(dst.as_mut_ptr(), src.as_ptr(), len) }
        }
        len
    }

    /// Move bytes between two possibly overlapping regions of `buf`.
    ///
    /// Copies `min(src.len(), dst.len())` bytes from `buf[src]` to
    /// `buf[dst]`, with the same result as copying through a temporary
    /// buffer. Returns the offset one past the last byte written.
    pub fn move_within(
        &self,
        buf: &mut [u8],
        src: Range<usize>,
        dst: Range<usize>,
    ) -> Result<usize> {
        check_range(src.start, src.end, buf.len())?;
        check_range(dst.start, dst.end, buf.len())?;

        let len = src.len().min(dst.len());
        if len > 0 {
            let base = buf.as_mut_ptr();
            // SAFETY: both regions were checked against `buf`.
            unsafe { self.move_unchecked(base.add(dst.start), base.add(src.start), len) }
        }
        Ok(dst.start + len)
    }

    /// Move between two address pairs that may alias each other.
    ///
    /// Copies `min` of the two lengths from `[src_begin, src_end)` to
    /// `[dst_begin, dst_end)`, choosing the copy direction so overlapping
    /// regions are handled correctly. A pair of null addresses is an empty
    /// buffer. Returns `dst_begin` advanced by the number of bytes moved.
    ///
    /// # Errors
    /// - `NullPointer` when only one address of a pair is null
    /// - `InvalidRange` when a pair has `begin > end`
    ///
    /// # Safety
    /// Each non-empty pair must describe memory valid for reads (source) or
    /// writes (destination) for its whole length, and no reference to the
    /// destination may be live during the call.
    pub unsafe fn move_raw(
        &self,
        dst_begin: *mut u8,
        dst_end: *mut u8,
        src_begin: *const u8,
        src_end: *const u8,
    ) -> Result<*mut u8> {
        let dst_len = pair_len(dst_begin, dst_end, "move destination")?;
        let src_len = pair_len(src_begin, src_end, "move source")?;
        let len = dst_len.min(src_len);
        if len > 0 {
            // SAFETY: the caller guarantees both pairs are dereferenceable.
            unsafe { self.move_unchecked(dst_begin, src_begin, len) }
        }
        Ok(dst_begin.wrapping_add(len))
    }

    /// Fill `dst` with `value`, writing whole chunks where possible
    pub fn fill(&self, dst: &mut [u8], value: u8) {
        if dst.is_empty() {
            return;
        }
        let base = dst.as_mut_ptr();
        for span in ChunkPlan::forward(dst.len(), self.width_for(dst.len())) {
            // SAFETY: spans partition `dst`.
            unsafe {
                dispatch_width!(span.width, fill_span(base.add(span.offset), span.len, value))
            }
        }
    }

    /// Write `value` into every `C::WIDTH`-byte element of `dst`.
    ///
    /// The byte length must be a multiple of the element width; otherwise
    /// nothing is written. Returns the number of elements written.
    pub fn fill_elements<C: Chunk>(&self, dst: &mut [u8], value: C) -> Result<usize> {
        if dst.len() % C::WIDTH != 0 {
            return Err(MemoryError::size_not_multiple(dst.len(), C::WIDTH));
        }
        let count = dst.len() / C::WIDTH;
        let base = dst.as_mut_ptr();
        for i in 0..count {
            // SAFETY: element `i` lies within `dst`.
            unsafe { value.store(base.add(i * C::WIDTH)) }
        }
        Ok(count)
    }

    /// Fill with 8-bit elements; never fails
    pub fn fill_u8(&self, dst: &mut [u8], value: u8) -> Result<usize> {
        self.fill(dst, value);
        Ok(dst.len())
    }

    /// Fill with 16-bit elements
    pub fn fill_u16(&self, dst: &mut [u8], value: u16) -> Result<usize> {
        self.fill_elements(dst, value)
    }

    /// Fill with 32-bit elements
    pub fn fill_u32(&self, dst: &mut [u8], value: u32) -> Result<usize> {
        self.fill_elements(dst, value)
    }

    /// Fill with 64-bit elements
    pub fn fill_u64(&self, dst: &mut [u8], value: u64) -> Result<usize> {
        self.fill_elements(dst, value)
    }

    /// Offset of the first occurrence of `needle` in `haystack`.
    ///
    /// An empty needle or empty haystack is never a match.
    pub fn find(&self, haystack: &[u8], needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || haystack.len() < needle.len() {
            return None;
        }
        let last_start = haystack.len() - needle.len();
        let mut start = 0;
        while start <= last_start {
            let pos = start + self.find_byte(&haystack[start..=last_start], needle[0])?;
            if self.compare(&haystack[pos..pos + needle.len()], needle).is_none() {
                return Some(pos);
            }
            start = pos + 1;
        }
        None
    }

    /// Offset of the occurrence of `needle` closest to the end of `haystack`
    pub fn find_from_end(&self, haystack: &[u8], needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || haystack.len() < needle.len() {
            return None;
        }
        let mut end = haystack.len() - needle.len() + 1;
        while end > 0 {
            let pos = haystack[..end].iter().rposition(|&b| b == needle[0])?;
            if self
                .compare_from_end(&haystack[pos..pos + needle.len()], needle)
                .is_none()
            {
                return Some(pos);
            }
            end = pos;
        }
        None
    }

    /// Index of the first byte equal to `needle`
    pub fn find_byte(&self, haystack: &[u8], needle: u8) -> Option<usize> {
        if haystack.is_empty() {
            return None;
        }
        if self.word_search && haystack.len() >= <u64 as Chunk>::WIDTH {
            // SAFETY: the pointer and length come from `haystack`.
            unsafe { find_byte_words(haystack.as_ptr(), haystack.len(), needle) }
        } else {
            haystack.iter().position(|&b| b == needle)
        }
    }

    /// Index of the first element of `haystack` equal to `value`
    pub fn find_value<C: Chunk>(&self, haystack: &[C], value: C) -> Option<usize> {
        if C::WIDTH == 1 {
            let bytes: &[u8] = bytemuck::cast_slice(haystack);
            return self.find_byte(bytes, bytemuck::bytes_of(&value)[0]);
        }
        haystack.iter().position(|&v| v == value)
    }
}

/// Byte length of an address pair; a pair of nulls is empty.
fn pair_len(begin: *const u8, end: *const u8, context: &'static str) -> Result<usize> {
    match (begin.is_null(), end.is_null()) {
        (true, true) => Ok(0),
        (false, false) if begin <= end => Ok(end as usize - begin as usize),
        (false, false) => Err(MemoryError::invalid_range(begin, end)),
        _ => Err(MemoryError::null_pointer(context)),
    }
}

//==============================================================================
// INTERNAL DISPATCH
//==============================================================================

impl RawMemOps {
    #[inline]
    unsafe fn compare_unchecked(&self, a: *const u8, b: *const u8, len: usize) -> Option<usize> {
        for span in ChunkPlan::forward(len, self.width_for(len)) {
            let found = unsafe {
                dispatch_width!(
                    span.width,
                    compare_span(a.add(span.offset), b.add(span.offset), span.len)
                )
            };
            if let Some(pos) = found {
                return Some(span.offset + pos);
            }
        }
        None
    }

    #[inline]
    unsafe fn compare_rev_unchecked(
        &self,
        a: *const u8,
        b: *const u8,
        len: usize,
    ) -> Option<usize> {
        for span in ChunkPlan::backward(len, self.width_for(len)) {
            let found = unsafe {
                dispatch_width!(
                    span.width,
                    compare_span_rev(a.add(span.offset), b.add(span.offset), span.len)
                )
            };
            if let Some(pos) = found {
                return Some(span.offset + pos);
            }
        }
        None
    }

    #[inline]
    unsafe fn copy_unchecked(&self, dst: *mut u8, src: *const u8, len: usize) {
        for span in ChunkPlan::forward(len, self.width_for(len)) {
            unsafe {
                dispatch_width!(
                    span.width,
                    copy_span(dst.add(span.offset), src.add(span.offset), span.len)
                )
            }
        }
    }

    #[inline]
    unsafe fn copy_rev_unchecked(&self, dst: *mut u8, src: *const u8, len: usize) {
        for span in ChunkPlan::backward(len, self.width_for(len)) {
            unsafe {
                dispatch_width!(
                    span.width,
                    copy_span_rev(dst.add(span.offset), src.add(span.offset), span.len)
                )
            }
        }
    }

    /// Overlap-safe copy.
    ///
    /// When `dst` starts at or before `src`, walking front to back reads every
    /// source chunk before any store can reach it. Otherwise walk back to
    /// front. Each chunk is loaded whole before it is stored.
    #[inline]
    pub(crate) unsafe fn move_unchecked(&self, dst: *mut u8, src: *const u8, len: usize) {
        if (dst as usize) <= (src as usize) {
            unsafe { self.copy_unchecked(dst, src, len) }
        } else {
            unsafe { self.copy_rev_unchecked(dst, src, len) }
        }
    }
}

//==============================================================================
// GENERIC CHUNK KERNELS
//==============================================================================

#[inline(always)]
unsafe fn first_mismatch(a: *const u8, b: *const u8, len: usize) -> Option<usize> {
    (0..len).find(|&i| unsafe { *a.add(i) != *b.add(i) })
}

#[inline(always)]
unsafe fn last_mismatch(a: *const u8, b: *const u8, len: usize) -> Option<usize> {
    (0..len).rev().find(|&i| unsafe { *a.add(i) != *b.add(i) })
}

/// `len` must be a multiple of `C::WIDTH`.
#[inline]
unsafe fn compare_span<C: Chunk>(a: *const u8, b: *const u8, len: usize) -> Option<usize> {
    let mut offset = 0;
    while offset < len {
        let (x, y) = unsafe { (C::load(a.add(offset)), C::load(b.add(offset))) };
        if x != y {
            return unsafe { first_mismatch(a.add(offset), b.add(offset), C::WIDTH) }
                .map(|i| offset + i);
        }
        offset += C::WIDTH;
    }
    None
}

#[inline]
unsafe fn compare_span_rev<C: Chunk>(a: *const u8, b: *const u8, len: usize) -> Option<usize> {
    let mut end = len;
    while end > 0 {
        let start = end - C::WIDTH;
        let (x, y) = unsafe { (C::load(a.add(start)), C::load(b.add(start))) };
        if x != y {
            return unsafe { last_mismatch(a.add(start), b.add(start), C::WIDTH) }
                .map(|i| start + i);
        }
        end = start;
    }
    None
}

#[inline]
unsafe fn copy_span<C: Chunk>(dst: *mut u8, src: *const u8, len: usize) {
    let mut offset = 0;
    while offset < len {
        unsafe {
            let chunk = C::load(src.add(offset));
            chunk.store(dst.add(offset));
        }
        offset += C::WIDTH;
    }
}

#[inline]
unsafe fn copy_span_rev<C: Chunk>(dst: *mut u8, src: *const u8, len: usize) {
    let mut end = len;
    while end > 0 {
        end -= C::WIDTH;
        unsafe {
            let chunk = C::load(src.add(end));
            chunk.store(dst.add(end));
        }
    }
}

#[inline]
unsafe fn fill_span<C: Chunk>(dst: *mut u8, len: usize, value: u8) {
    let pattern = C::splat(value);
    let mut offset = 0;
    while offset < len {
        unsafe { pattern.store(dst.add(offset)) }
        offset += C::WIDTH;
    }
}

const LOW_BITS: u64 = u64::from_ne_bytes([0x01; 8]);
const HIGH_BITS: u64 = u64::from_ne_bytes([0x80; 8]);

#[inline(always)]
fn has_zero_byte(word: u64) -> bool {
    word.wrapping_sub(LOW_BITS) & !word & HIGH_BITS != 0
}

/// Word-at-a-time byte search; a word XORed with the splatted needle has a
/// zero byte exactly where the needle occurs.
#[inline]
unsafe fn find_byte_words(ptr: *const u8, len: usize, needle: u8) -> Option<usize> {
    let pattern = u64::splat(needle);
    let mut offset = 0;
    while offset + 8 <= len {
        let word = unsafe { u64::load(ptr.add(offset)) } ^ pattern;
        if has_zero_byte(word) {
            break;
        }
        offset += 8;
    }
    (offset..len).find(|&i| unsafe { *ptr.add(i) } == needle)
}

//==============================================================================
// DEFAULT INSTANCE AND CONVENIENCE FUNCTIONS
//==============================================================================

impl Default for RawMemOps {
    fn default() -> Self {
        Self::new()
    }
}

/// Global raw memory operations instance for reuse
static GLOBAL_RAW_OPS: OnceLock<RawMemOps> = OnceLock::new();

/// Get the global raw memory operations instance
pub fn get_global_raw_ops() -> &'static RawMemOps {
    GLOBAL_RAW_OPS.get_or_init(RawMemOps::new)
}

/// Install the global instance from `config`.
///
/// Fails if the configuration is invalid or the global instance was already
/// created, either by an earlier call or by first use.
pub fn init_raw_ops(config: RawOpsConfig) -> Result<()> {
    let ops = RawMemOps::with_config(&config)?;
    GLOBAL_RAW_OPS
        .set(ops)
        .map_err(|_| MemoryError::configuration("raw memory operations are already initialized"))
}

/// [`RawMemOps::compare`] on the global instance
pub fn compare(lhs: &[u8], rhs: &[u8]) -> Option<usize> {
    get_global_raw_ops().compare(lhs, rhs)
}

/// [`RawMemOps::compare_from_end`] on the global instance
pub fn compare_from_end(lhs: &[u8], rhs: &[u8]) -> Option<usize> {
    get_global_raw_ops().compare_from_end(lhs, rhs)
}

/// [`RawMemOps::copy`] on the global instance
pub fn copy(dst: &mut [u8], src: &[u8]) -> usize {
    get_global_raw_ops().copy(dst, src)
}

/// [`RawMemOps::copy_from_end`] on the global instance
pub fn copy_from_end(dst: &mut [u8], src: &[u8]) -> usize {
    get_global_raw_ops().copy_from_end(dst, src)
}

/// [`RawMemOps::move_bytes`] on the global instance
pub fn move_bytes(dst: &mut [u8], src: &[u8]) -> usize {
    get_global_raw_ops().move_bytes(dst, src)
}

/// [`RawMemOps::move_within`] on the global instance
pub fn move_within(buf: &mut [u8], src: Range<usize>, dst: Range<usize>) -> Result<usize> {
    get_global_raw_ops().move_within(buf, src, dst)
}

/// [`RawMemOps::move_raw`] on the global instance
///
/// # Safety
/// See [`RawMemOps::move_raw`].
pub unsafe fn move_raw(
    dst_begin: *mut u8,
    dst_end: *mut u8,
    src_begin: *const u8,
    src_end: *const u8,
) -> Result<*mut u8> {
    unsafe { get_global_raw_ops().move_raw(dst_begin, dst_end, src_begin, src_end) }
}

/// [`RawMemOps::fill`] on the global instance
pub fn fill(dst: &mut [u8], value: u8) {
    get_global_raw_ops().fill(dst, value)
}

/// [`RawMemOps::fill_u8`] on the global instance
pub fn fill_u8(dst: &mut [u8], value: u8) -> Result<usize> {
    get_global_raw_ops().fill_u8(dst, value)
}

/// [`RawMemOps::fill_u16`] on the global instance
pub fn fill_u16(dst: &mut [u8], value: u16) -> Result<usize> {
    get_global_raw_ops().fill_u16(dst, value)
}

/// [`RawMemOps::fill_u32`] on the global instance
pub fn fill_u32(dst: &mut [u8], value: u32) -> Result<usize> {
    get_global_raw_ops().fill_u32(dst, value)
}

/// [`RawMemOps::fill_u64`] on the global instance
pub fn fill_u64(dst: &mut [u8], value: u64) -> Result<usize> {
    get_global_raw_ops().fill_u64(dst, value)
}

/// [`RawMemOps::find`] on the global instance
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    get_global_raw_ops().find(haystack, needle)
}

/// [`RawMemOps::find_from_end`] on the global instance
pub fn find_from_end(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    get_global_raw_ops().find_from_end(haystack, needle)
}

/// [`RawMemOps::find_byte`] on the global instance
pub fn find_u8(haystack: &[u8], value: u8) -> Option<usize> {
    get_global_raw_ops().find_byte(haystack, value)
}

/// [`RawMemOps::find_value`] on the global instance for 16-bit elements
pub fn find_u16(haystack: &[u16], value: u16) -> Option<usize> {
    get_global_raw_ops().find_value(haystack, value)
}

/// [`RawMemOps::find_value`] on the global instance for 32-bit elements
pub fn find_u32(haystack: &[u32], value: u32) -> Option<usize> {
    get_global_raw_ops().find_value(haystack, value)
}

/// [`RawMemOps::find_value`] on the global instance for 64-bit elements
pub fn find_u64(haystack: &[u64], value: u64) -> Option<usize> {
    get_global_raw_ops().find_value(haystack, value)
}
