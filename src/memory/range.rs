//! Non-owning byte range views
//!
//! A [`MemoryRange`] is a `[begin, end)` address pair over memory owned by
//! someone else. It never allocates or frees, never grows, and carries no
//! element typing; [`MemoryBlock`](crate::memory::MemoryBlock) layers an
//! element stride on top.
//!
//! # Validity
//!
//! A range is valid when both addresses are non-null with `begin <= end`,
//! or when both are null (the canonical empty range). Every operation
//! re-checks validity from the current addresses, so a range built from a
//! bad address pair is refused at the point of use rather than at
//! construction.
//!
//! # Safety model
//!
//! Ranges built with [`MemoryRange::from_mut_slice`] borrow the slice for
//! `'a`, so the viewed memory cannot be freed or touched by its owner while
//! the view exists. The view itself is `Copy`: copies share the memory and
//! reads and writes go through raw pointers, never through long-lived
//! references. The `unsafe` accessors [`as_bytes`](MemoryRange::as_bytes)
//! and [`as_bytes_mut`](MemoryRange::as_bytes_mut) hand out references and
//! make the caller responsible for not writing through another copy while
//! such a reference is live.
//!
//! ```rust
//! use memview::MemoryRange;
//!
//! let mut buffer = *b"ABCDEFGHIJ";
//! let range = MemoryRange::from_mut_slice(&mut buffer);
//!
//! assert_eq!(range.get(0).unwrap(), b'A');
//! assert_eq!(range.total_size(), 10);
//!
//! let sub = range.sub_range(2, 3).unwrap();
//! assert_eq!(sub.to_vec(), b"CDE");
//! ```

use crate::error::{check_range, MemoryError, Result};
use crate::memory::raw_ops::get_global_raw_ops;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

/// A validated `[begin, end)` view over caller-owned bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange<'a> {
    begin: *mut u8,
    end: *mut u8,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> MemoryRange<'a> {
    /// The canonical empty range: both addresses null
    pub const fn empty() -> Self {
        Self {
            begin: ptr::null_mut(),
            end: ptr::null_mut(),
            _marker: PhantomData,
        }
    }

    /// View the bytes of `slice`
    pub fn from_mut_slice(slice: &'a mut [u8]) -> Self {
        let bounds = slice.as_mut_ptr_range();
        Self {
            begin: bounds.start,
            end: bounds.end,
            _marker: PhantomData,
        }
    }

    /// Build a range from an address pair, stored verbatim.
    ///
    /// No validation happens here; an inverted or half-null pair produces an
    /// invalid range that every operation refuses.
    ///
    /// # Safety
    /// If the pair is valid and non-empty, `[begin, end)` must be a single
    /// allocation valid for reads and writes for `'a`, and must not be
    /// accessed through any reference while the view is used.
    pub const unsafe fn from_raw_parts(begin: *mut u8, end: *mut u8) -> Self {
        Self {
            begin,
            end,
            _marker: PhantomData,
        }
    }

    /// Replace the view with an address pair, stored verbatim
    ///
    /// # Safety
    /// Same contract as [`from_raw_parts`](Self::from_raw_parts).
    pub unsafe fn set(&mut self, begin: *mut u8, end: *mut u8) {
        self.begin = begin;
        self.end = end;
    }

    /// Replace the view with `length` bytes starting at `begin`.
    ///
    /// A null `begin` is rejected even for zero length, leaving the view
    /// unchanged.
    ///
    /// # Safety
    /// Same contract as [`from_raw_parts`](Self::from_raw_parts) for
    /// `[begin, begin + length)`.
    pub unsafe fn set_with_size(&mut self, begin: *mut u8, length: usize) -> Result<()> {
        if begin.is_null() {
            return Err(MemoryError::invalid_argument(
                "range start must be non-null when a length is given",
            ));
        }
        self.begin = begin;
        self.end = begin.wrapping_add(length);
        Ok(())
    }

    /// Like [`set_with_size`](Self::set_with_size), but a null `begin`
    /// yields the canonical empty range instead of failing.
    ///
    /// # Safety
    /// Same contract as [`from_raw_parts`](Self::from_raw_parts) for
    /// `[begin, begin + length)`.
    pub unsafe fn set_with_fallback(&mut self, begin: *mut u8, length: usize) {
        if begin.is_null() {
            self.clear();
        } else {
            self.begin = begin;
            self.end = begin.wrapping_add(length);
        }
    }

    /// Replace the view with the bytes of `slice`
    pub fn set_slice(&mut self, slice: &'a mut [u8]) {
        *self = Self::from_mut_slice(slice);
    }

    /// First address of the view
    #[inline]
    pub fn begin(&self) -> *mut u8 {
        self.begin
    }

    /// One past the last address of the view
    #[inline]
    pub fn end(&self) -> *mut u8 {
        self.end
    }

    /// Both addresses non-null with `begin <= end`, or both null
    #[inline]
    pub fn is_valid(&self) -> bool {
        match (self.begin.is_null(), self.end.is_null()) {
            (true, true) => true,
            (false, false) => self.begin <= self.end,
            _ => false,
        }
    }

    /// Both addresses null
    #[inline]
    pub fn is_unset(&self) -> bool {
        self.begin.is_null() && self.end.is_null()
    }

    /// `begin == end`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Signed distance `end - begin`; negative for an inverted range
    pub fn diff(&self) -> isize {
        (self.end as usize).wrapping_sub(self.begin as usize) as isize
    }

    /// Byte length, or 0 for an invalid range
    #[inline]
    pub fn total_size(&self) -> usize {
        if self.is_valid() {
            self.end as usize - self.begin as usize
        } else {
            0
        }
    }

    /// Same as [`total_size`](Self::total_size)
    #[inline]
    pub fn len(&self) -> usize {
        self.total_size()
    }

    /// Number of `element_size`-byte elements in the range.
    ///
    /// # Errors
    /// - `InvalidRange` for an invalid range
    /// - `SizeNotMultipleOfElementSize` when `element_size` is zero or does
    ///   not divide the byte length
    pub fn size(&self, element_size: usize) -> Result<usize> {
        let total = self.checked_len()?;
        if element_size == 0 || total % element_size != 0 {
            return Err(MemoryError::size_not_multiple(total, element_size));
        }
        Ok(total / element_size)
    }

    /// Whether the distance between the addresses is a multiple of
    /// `element_size`. Inverted ranges use the absolute distance.
    pub fn total_size_multiple_of(&self, element_size: usize) -> bool {
        element_size != 0 && self.diff().unsigned_abs() % element_size == 0
    }

    /// Whether both addresses are multiples of `alignment`
    pub fn is_aligned_to(&self, alignment: usize) -> bool {
        alignment != 0
            && (self.begin as usize) % alignment == 0
            && (self.end as usize) % alignment == 0
    }

    /// `addr` lies in `[begin, end)`
    pub fn has_ptr(&self, addr: *const u8) -> bool {
        self.contains_ptr(addr, false)
    }

    /// `addr` lies in `[begin, end)`, or in `[begin, end]` with `include_end`
    pub fn contains_ptr(&self, addr: *const u8, include_end: bool) -> bool {
        if addr.is_null() || self.is_unset() || !self.is_valid() {
            return false;
        }
        let begin = self.begin as *const u8;
        let end = self.end as *const u8;
        begin <= addr && (addr < end || (include_end && addr == end))
    }

    /// `[sub_begin, sub_end)` lies entirely inside the view
    pub fn has_range(&self, sub_begin: *const u8, sub_end: *const u8) -> bool {
        self.contains_range(sub_begin, sub_end, true)
    }

    /// `[sub_begin, sub_end)` lies inside the view; `sub_end` may equal the
    /// view's end only with `include_end`
    pub fn contains_range(
        &self,
        sub_begin: *const u8,
        sub_end: *const u8,
        include_end: bool,
    ) -> bool {
        sub_begin <= sub_end
            && self.contains_ptr(sub_begin, true)
            && self.contains_ptr(sub_end, include_end)
    }

    /// Copy another view's addresses
    pub fn assign(&mut self, other: &MemoryRange<'a>) {
        *self = *other;
    }

    /// Copy another view's addresses if that view is valid; otherwise leave
    /// this one untouched.
    pub fn assign_with_validate(&mut self, other: &MemoryRange<'a>) -> Result<()> {
        if !other.is_valid() {
            return Err(MemoryError::invalid_range(other.begin, other.end));
        }
        *self = *other;
        Ok(())
    }

    /// Swap the addresses of two views
    pub fn swap(&mut self, other: &mut MemoryRange<'a>) {
        std::mem::swap(self, other);
    }

    /// Take the addresses of `source`, leaving it as the canonical empty range
    pub fn exchange(&mut self, source: &mut MemoryRange<'a>) {
        *self = std::mem::take(source);
    }

    /// Reset to the canonical empty range
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Address of byte `index`, counted from the front or, with `from_end`,
    /// from the back (`end - 1 - index`).
    pub fn at(&self, index: usize, from_end: bool) -> Result<*mut u8> {
        let len = self.total_size();
        if index >= len {
            return Err(MemoryError::out_of_range(index, len));
        }
        let offset = if from_end { len - 1 - index } else { index };
        Ok(self.begin.wrapping_add(offset))
    }

    /// Address of the first byte
    pub fn front(&self) -> Result<*mut u8> {
        self.at(0, false)
    }

    /// Address of the last byte
    pub fn back(&self) -> Result<*mut u8> {
        self.at(0, true)
    }

    /// Read byte `index`
    pub fn get(&self, index: usize) -> Result<u8> {
        let addr = self.at(index, false)?;
        // SAFETY: `at` checked the index against a valid range.
        Ok(unsafe { addr.read() })
    }

    /// View of `[begin, end)` inside this range.
    ///
    /// `end` may equal this range's end only with `include_end`. Taking the
    /// full parent with `include_end` yields a range equal to the parent.
    ///
    /// # Errors
    /// - `InvalidRange` when this range is invalid or empty, or `begin > end`
    /// - `NullPointer` when either bound is null
    /// - `OutOfRange` when a bound lies outside this range
    pub fn make_sub_range(
        &self,
        begin: *const u8,
        end: *const u8,
        include_end: bool,
    ) -> Result<MemoryRange<'a>> {
        if !self.is_valid() || self.is_empty() {
            return Err(MemoryError::invalid_range(self.begin, self.end));
        }
        if begin.is_null() || end.is_null() {
            return Err(MemoryError::null_pointer("sub-range bounds"));
        }
        if begin > end {
            return Err(MemoryError::invalid_range(begin, end));
        }
        if !self.contains_ptr(begin, true) {
            return Err(MemoryError::address_out_of_range(begin, self.begin, self.end));
        }
        if !self.contains_ptr(end, include_end) {
            return Err(MemoryError::address_out_of_range(end, self.begin, self.end));
        }

        let offset = begin as usize - self.begin as usize;
        let len = end as usize - begin as usize;
        Ok(self.offset_range(offset, len))
    }

    /// View of `len` bytes starting at byte `offset`
    pub fn sub_range(&self, offset: usize, len: usize) -> Result<MemoryRange<'a>> {
        let total = self.checked_len()?;
        let end = offset
            .checked_add(len)
            .ok_or_else(|| MemoryError::out_of_range(usize::MAX, total))?;
        check_range(offset, end, total)?;
        Ok(self.offset_range(offset, len))
    }

    /// Insert `value` at byte `index`.
    ///
    /// Bytes from `index` on shift one place toward the end; the last byte
    /// falls off since the view never grows.
    pub fn insert(&mut self, index: usize, value: u8) -> Result<()> {
        let total = self.checked_len()?;
        if index >= total {
            return Err(MemoryError::out_of_range(index, total));
        }
        let slot = self.begin.wrapping_add(index);
        // SAFETY: `[index, total)` lies inside the valid range.
        unsafe {
            get_global_raw_ops().move_unchecked(slot.add(1), slot, total - index - 1);
            slot.write(value);
        }
        Ok(())
    }

    /// Insert the bytes of `src` at byte `index`.
    ///
    /// Existing bytes shift toward the end by `src.len()` and those pushed
    /// past the end are discarded. If `src` does not fit before the end, only
    /// its leading part is written. Returns the offset one past the last
    /// inserted byte.
    ///
    /// # Errors
    /// - `NullPointer` on the canonical empty range
    /// - `InvalidRange` when the range is invalid
    /// - `OutOfRange` when `index` is not a byte of the range
    pub fn insert_range(&mut self, index: usize, src: &[u8]) -> Result<usize> {
        if self.is_unset() {
            return Err(MemoryError::null_pointer("insert destination"));
        }
        let total = self.checked_len()?;
        if index >= total {
            return Err(MemoryError::out_of_range(index, total));
        }

        let count = src.len().min(total - index);
        let slot = self.begin.wrapping_add(index);
        let ops = get_global_raw_ops();
        // SAFETY: both moves stay inside `[index, total)`; `src` is a
        // separate borrow of at least `count` bytes.
        unsafe {
            ops.move_unchecked(slot.add(count), slot, total - index - count);
            ops.move_unchecked(slot, src.as_ptr(), count);
        }
        Ok(index + count)
    }

    /// Overwrite bytes from `index` with `src`, without shifting.
    ///
    /// Writes at most up to the end of the range and returns the number of
    /// bytes written.
    pub fn write(&mut self, index: usize, src: &[u8]) -> Result<usize> {
        let total = self.checked_len()?;
        if index >= total {
            return Err(MemoryError::out_of_range(index, total));
        }
        let count = src.len().min(total - index);
        // SAFETY: `[index, index + count)` lies inside the valid range.
        unsafe {
            get_global_raw_ops().move_unchecked(self.begin.add(index), src.as_ptr(), count);
        }
        Ok(count)
    }

    /// Set every byte of the range to `value`
    pub fn fill(&mut self, value: u8) -> Result<()> {
        let total = self.checked_len()?;
        if total > 0 {
            // SAFETY: the range is valid and non-empty; the slice lives only
            // for this call.
            let bytes = unsafe { std::slice::from_raw_parts_mut(self.begin, total) };
            get_global_raw_ops().fill(bytes, value);
        }
        Ok(())
    }

    /// Copy the viewed bytes into a new vector; empty for an invalid range
    pub fn to_vec(&self) -> Vec<u8> {
        // SAFETY: the borrow ends before this returns.
        unsafe { self.as_bytes() }.to_vec()
    }

    /// Borrow the viewed bytes; empty for an invalid or empty range.
    ///
    /// # Safety
    /// No copy of this view may write to the memory while the returned
    /// slice is live.
    pub unsafe fn as_bytes(&self) -> &'a [u8] {
        match self.total_size() {
            0 => &[],
            len => unsafe { std::slice::from_raw_parts(self.begin, len) },
        }
    }

    /// Mutably borrow the viewed bytes; empty for an invalid or empty range.
    ///
    /// # Safety
    /// No copy of this view may read or write the memory while the returned
    /// slice is live.
    pub unsafe fn as_bytes_mut(&mut self) -> &'a mut [u8] {
        match self.total_size() {
            0 => &mut [],
            len => unsafe { std::slice::from_raw_parts_mut(self.begin, len) },
        }
    }

    fn checked_len(&self) -> Result<usize> {
        if self.is_valid() {
            Ok(self.total_size())
        } else {
            Err(MemoryError::invalid_range(self.begin, self.end))
        }
    }

    /// Sub-view derived from this range's own addresses. Callers check that
    /// `[offset, offset + len)` fits.
    fn offset_range(&self, offset: usize, len: usize) -> MemoryRange<'a> {
        if self.is_unset() {
            return Self::empty();
        }
        let begin = self.begin.wrapping_add(offset);
        Self {
            begin,
            end: begin.wrapping_add(len),
            _marker: PhantomData,
        }
    }
}

impl Default for MemoryRange<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> From<&'a mut [u8]> for MemoryRange<'a> {
    fn from(slice: &'a mut [u8]) -> Self {
        Self::from_mut_slice(slice)
    }
}

impl fmt::Debug for MemoryRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRange")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("len", &self.total_size())
            .finish()
    }
}
