//! Element blocks: a byte range plus an element stride
//!
//! A [`MemoryBlock`] indexes a [`MemoryRange`] in units of `element_size`
//! bytes. The byte length does not have to be an exact multiple of the
//! element size; trailing bytes that do not form a whole element are simply
//! not addressable by index.

use crate::error::{MemoryError, Result};
use crate::memory::range::MemoryRange;
use bytemuck::Pod;
use std::mem;

/// A range viewed as a sequence of fixed-size elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MemoryBlock<'a> {
    range: MemoryRange<'a>,
    element_size: usize,
}

impl<'a> MemoryBlock<'a> {
    /// Wrap `range` with an element stride of `element_size` bytes
    pub fn new(range: MemoryRange<'a>, element_size: usize) -> Self {
        Self {
            range,
            element_size,
        }
    }

    /// View the elements of `slice`.
    ///
    /// Zero-sized element types give an empty block with element size zero.
    pub fn from_mut_slice<T: Pod>(slice: &'a mut [T]) -> Self {
        let range = match bytemuck::try_cast_slice_mut::<T, u8>(slice) {
            Ok(bytes) => MemoryRange::from_mut_slice(bytes),
            Err(_) => MemoryRange::empty(),
        };
        Self::new(range, mem::size_of::<T>())
    }

    /// Build a block from an address pair and element size
    ///
    /// # Safety
    /// Same contract as [`MemoryRange::from_raw_parts`].
    pub unsafe fn from_raw_parts(begin: *mut u8, end: *mut u8, element_size: usize) -> Self {
        Self::new(unsafe { MemoryRange::from_raw_parts(begin, end) }, element_size)
    }

    /// The underlying byte range
    pub fn range(&self) -> MemoryRange<'a> {
        self.range
    }

    /// Element stride in bytes
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of whole elements; zero when the element size is zero
    pub fn size(&self) -> usize {
        match self.element_size {
            0 => 0,
            es => self.range.total_size() / es,
        }
    }

    /// No whole element fits in the block
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// `index` names a whole element
    pub fn has_index(&self, index: usize) -> bool {
        index < self.size()
    }

    /// `lo..=hi` are all element indices; false when `lo > hi`
    pub fn has_index_range(&self, lo: usize, hi: usize) -> bool {
        lo <= hi && hi < self.size()
    }

    /// Start address of element `index`, counted from the front or, with
    /// `from_end`, from the back.
    ///
    /// # Errors
    /// - `ZeroElementSize` when the element size is zero
    /// - `OutOfRange` when `index` is not an element of the block
    pub fn at(&self, index: usize, from_end: bool) -> Result<*mut u8> {
        if self.element_size == 0 {
            return Err(MemoryError::ZeroElementSize);
        }
        let size = self.size();
        if index >= size {
            return Err(MemoryError::out_of_range(index, size));
        }
        let element = if from_end { size - 1 - index } else { index };
        Ok(self.range.begin().wrapping_add(element * self.element_size))
    }

    /// Start address of the first element
    pub fn front(&self) -> Result<*mut u8> {
        self.at(0, false)
    }

    /// Start address of the last element
    pub fn back(&self) -> Result<*mut u8> {
        self.at(0, true)
    }

    /// Start address of the element containing `addr`
    pub fn element_base_address(&self, addr: *const u8) -> Result<*mut u8> {
        if self.element_size == 0 {
            return Err(MemoryError::ZeroElementSize);
        }
        let begin = self.range.begin();
        if !self.range.has_ptr(addr) {
            return Err(MemoryError::address_out_of_range(addr, begin, self.range.end()));
        }
        let element = (addr as usize - begin as usize) / self.element_size;
        if element >= self.size() {
            return Err(MemoryError::address_out_of_range(addr, begin, self.range.end()));
        }
        Ok(begin.wrapping_add(element * self.element_size))
    }

    /// Read element `index` as a `T`; `T` must be exactly one element wide
    pub fn get<T: Pod>(&self, index: usize) -> Result<T> {
        self.check_element_type::<T>()?;
        let addr = self.at(index, false)?;
        // SAFETY: `at` checked that a whole element starts at `addr`; the
        // slice lives only for this call.
        let bytes = unsafe { std::slice::from_raw_parts(addr, self.element_size) };
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Write `value` into element `index`; `T` must be exactly one element wide
    pub fn put<T: Pod>(&mut self, index: usize, value: T) -> Result<()> {
        self.check_element_type::<T>()?;
        let addr = self.at(index, false)?;
        let bytes = bytemuck::bytes_of(&value);
        // SAFETY: `at` checked that a whole element starts at `addr`, and
        // `value` is a local that cannot overlap the viewed memory.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), addr, bytes.len()) };
        Ok(())
    }

    /// Swap two blocks with equal element sizes
    pub fn swap(&mut self, other: &mut MemoryBlock<'a>) -> Result<()> {
        self.check_same_element_size(other)?;
        mem::swap(self, other);
        Ok(())
    }

    /// Take the range of `source`, which is left as the canonical empty range.
    /// Element sizes must match.
    pub fn exchange(&mut self, source: &mut MemoryBlock<'a>) -> Result<()> {
        self.check_same_element_size(source)?;
        self.range.exchange(&mut source.range);
        Ok(())
    }

    /// Reset the range to canonical empty, keeping the element size
    pub fn clear(&mut self) {
        self.range.clear();
    }

    fn check_same_element_size(&self, other: &MemoryBlock<'_>) -> Result<()> {
        if self.element_size != other.element_size {
            return Err(MemoryError::different_element_size(
                self.element_size,
                other.element_size,
            ));
        }
        Ok(())
    }

    fn check_element_type<T: Pod>(&self) -> Result<()> {
        if mem::size_of::<T>() != self.element_size {
            return Err(MemoryError::different_element_size(
                self.element_size,
                mem::size_of::<T>(),
            ));
        }
        Ok(())
    }
}
