//! Error handling for the memview library
//!
//! Every fallible primitive returns a [`Result`] carrying a [`MemoryError`].
//! Each error maps onto a coarse [`FaultKind`], which is what the sticky
//! fault channel in [`crate::fault`] records for callers that prefer the
//! fail-soft style.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a precondition violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A null address was supplied where a buffer was required
    NullPointer,
    /// A range with `begin > end`, or with only one address set
    InvalidRange,
    /// An index or address outside the valid bounds
    OutOfRange,
    /// Two block operands disagree on their element size
    DifferentElementSize,
    /// An element operation on a block whose element size is zero
    ZeroElementSize,
    /// A byte length that is not an exact multiple of the element size
    SizeNotMultipleOfElementSize,
    /// Generic precondition failure
    InvalidArgument,
}

impl FaultKind {
    /// Stable short name, suitable for logs and metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NullPointer => "null_pointer",
            Self::InvalidRange => "invalid_range",
            Self::OutOfRange => "out_of_range",
            Self::DifferentElementSize => "different_element_size",
            Self::ZeroElementSize => "zero_element_size",
            Self::SizeNotMultipleOfElementSize => "size_not_multiple_of_element_size",
            Self::InvalidArgument => "invalid_argument",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the memview library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Null address where a buffer was required
    #[error("Null pointer: {context}")]
    NullPointer {
        /// What was expected to be non-null
        context: &'static str,
    },

    /// Malformed address pair
    #[error("Invalid memory range: begin {begin:#x}, end {end:#x}")]
    InvalidRange {
        /// Begin address of the rejected range
        begin: usize,
        /// End address of the rejected range
        end: usize,
    },

    /// Index outside the valid bounds
    #[error("Out of range: index {index}, size {size}")]
    OutOfRange {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Address outside the valid bounds
    #[error("Address out of range: {address:#x} not in [{begin:#x}, {end:#x})")]
    AddressOutOfRange {
        /// The rejected address
        address: usize,
        /// Begin of the valid region
        begin: usize,
        /// End of the valid region
        end: usize,
    },

    /// Block operands with mismatched element sizes
    #[error("Different element size: expected {expected}, got {actual}")]
    DifferentElementSize {
        /// Element size of the receiver
        expected: usize,
        /// Element size of the other operand
        actual: usize,
    },

    /// Element arithmetic on a zero element size
    #[error("Element size is zero")]
    ZeroElementSize,

    /// Byte length not divisible by the element size
    #[error("Size {size} is not a multiple of element size {element_size}")]
    SizeNotMultipleOfElementSize {
        /// Byte length of the range
        size: usize,
        /// Requested element size
        element_size: usize,
    },

    /// Generic precondition failure
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl MemoryError {
    /// Create a null pointer error
    pub fn null_pointer(context: &'static str) -> Self {
        Self::NullPointer { context }
    }

    /// Create an invalid range error from an address pair
    pub fn invalid_range(begin: *const u8, end: *const u8) -> Self {
        Self::InvalidRange {
            begin: begin as usize,
            end: end as usize,
        }
    }

    /// Create an out of range error
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Self::OutOfRange { index, size }
    }

    /// Create an address out of range error
    pub fn address_out_of_range(address: *const u8, begin: *const u8, end: *const u8) -> Self {
        Self::AddressOutOfRange {
            address: address as usize,
            begin: begin as usize,
            end: end as usize,
        }
    }

    /// Create a different element size error
    pub fn different_element_size(expected: usize, actual: usize) -> Self {
        Self::DifferentElementSize { expected, actual }
    }

    /// Create a size-not-multiple error
    pub fn size_not_multiple(size: usize, element_size: usize) -> Self {
        Self::SizeNotMultipleOfElementSize { size, element_size }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The fault kind recorded for this error
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::NullPointer { .. } => FaultKind::NullPointer,
            Self::InvalidRange { .. } => FaultKind::InvalidRange,
            Self::OutOfRange { .. } | Self::AddressOutOfRange { .. } => FaultKind::OutOfRange,
            Self::DifferentElementSize { .. } => FaultKind::DifferentElementSize,
            Self::ZeroElementSize => FaultKind::ZeroElementSize,
            Self::SizeNotMultipleOfElementSize { .. } => FaultKind::SizeNotMultipleOfElementSize,
            Self::InvalidArgument { .. } | Self::Configuration { .. } => FaultKind::InvalidArgument,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::NullPointer { .. } => "pointer",
            Self::InvalidRange { .. } => "range",
            Self::OutOfRange { .. } | Self::AddressOutOfRange { .. } => "bounds",
            Self::DifferentElementSize { .. }
            | Self::ZeroElementSize
            | Self::SizeNotMultipleOfElementSize { .. } => "element",
            Self::InvalidArgument { .. } => "argument",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(MemoryError::out_of_range(index, size))
    } else {
        Ok(())
    }
}

/// Assert that an index range `[start, end)` lies within `[0, size)`
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(MemoryError::InvalidRange { begin: start, end });
    }
    if end > size {
        return Err(MemoryError::out_of_range(end, size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(MemoryError::null_pointer("dst").kind(), FaultKind::NullPointer);
        assert_eq!(
            MemoryError::invalid_range(0x2000 as *const u8, 0x1000 as *const u8).kind(),
            FaultKind::InvalidRange
        );
        assert_eq!(MemoryError::out_of_range(10, 10).kind(), FaultKind::OutOfRange);
        assert_eq!(
            MemoryError::address_out_of_range(1 as *const u8, 2 as *const u8, 3 as *const u8)
                .kind(),
            FaultKind::OutOfRange
        );
        assert_eq!(
            MemoryError::different_element_size(24, 12).kind(),
            FaultKind::DifferentElementSize
        );
        assert_eq!(MemoryError::ZeroElementSize.kind(), FaultKind::ZeroElementSize);
        assert_eq!(
            MemoryError::size_not_multiple(65, 16).kind(),
            FaultKind::SizeNotMultipleOfElementSize
        );
        assert_eq!(MemoryError::invalid_argument("x").kind(), FaultKind::InvalidArgument);
        assert_eq!(MemoryError::configuration("x").kind(), FaultKind::InvalidArgument);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(MemoryError::null_pointer("src").category(), "pointer");
        assert_eq!(MemoryError::out_of_range(1, 0).category(), "bounds");
        assert_eq!(MemoryError::ZeroElementSize.category(), "element");
        assert_eq!(MemoryError::configuration("bad").category(), "config");
    }

    #[test]
    fn test_bounds_checking() {
        assert!(check_bounds(5, 10).is_ok());
        assert!(check_bounds(10, 10).is_err());
        assert!(check_bounds(0, 0).is_err());
        assert!(check_bounds(usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn test_range_checking() {
        assert!(check_range(2, 8, 10).is_ok());
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(5, 5, 5).is_ok());
        assert_eq!(
            check_range(8, 2, 10).unwrap_err().kind(),
            FaultKind::InvalidRange
        );
        assert_eq!(
            check_range(2, 15, 10).unwrap_err().kind(),
            FaultKind::OutOfRange
        );
    }

    #[test]
    fn test_error_display() {
        let bounds_err = MemoryError::out_of_range(10, 5);
        let display = format!("{}", bounds_err);
        assert!(display.contains("Out of range"));
        assert!(display.contains("10"));
        assert!(display.contains('5'));

        let range_err = MemoryError::invalid_range(0x2000 as *const u8, 0x1000 as *const u8);
        let display = format!("{}", range_err);
        assert!(display.contains("0x2000"));
        assert!(display.contains("0x1000"));

        assert_eq!(FaultKind::OutOfRange.to_string(), "out_of_range");
    }
}
