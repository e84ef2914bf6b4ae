use std::fmt;
use std::num::NonZero;

//===========================================================================//

/// The granularity at which a mapper switches banks.
///
/// A `PageSize` is a number of bytes that is guaranteed to be a power of two
/// no larger than the 64KB address space.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PageSize(NonZero<u8>);

impl PageSize {
    /// A 256-byte page, the finest granularity the page table tracks.
    pub const LINE: PageSize = PageSize(NonZero::new(9).unwrap());

    /// A 1KB page, as used for CHR banks on many mappers.
    pub const KB1: PageSize = PageSize(NonZero::new(11).unwrap());

    /// An 8KB page.
    pub const KB8: PageSize = PageSize(NonZero::new(14).unwrap());

    /// A 16KB page.
    pub const KB16: PageSize = PageSize(NonZero::new(15).unwrap());

    /// A 32KB page.
    pub const KB32: PageSize = PageSize(NonZero::new(16).unwrap());

    /// Returns the base-2 logarithm of the page size.
    pub fn log2(self) -> u32 {
        u32::from(self.0.get() - 1)
    }

    /// Returns the page size in bytes.
    pub fn bytes(self) -> u32 {
        1 << self.log2()
    }

    /// Returns the number of whole pages of this size in a store of
    /// `capacity` bytes, or `None` if the pages don't divide it evenly.
    pub fn pages_in(self, capacity: usize) -> Option<usize> {
        let bytes = self.bytes() as usize;
        if capacity % bytes == 0 { Some(capacity / bytes) } else { None }
    }
}

impl fmt::Debug for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PageSize(1 << {:?})", self.log2())
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let bytes = self.bytes();
        if bytes < 1024 {
            write!(f, "{bytes}B")
        } else {
            write!(f, "{}kB", bytes >> 10)
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PageSizeTryFromError;

    fn try_from(value: u32) -> Result<PageSize, PageSizeTryFromError> {
        if !value.is_power_of_two() {
            Err(PageSizeTryFromError::NotAPowerOfTwo)
        } else if value > 0x10000 {
            Err(PageSizeTryFromError::TooLarge)
        } else if value < PageSize::LINE.bytes() {
            Err(PageSizeTryFromError::TooSmall)
        } else {
            let log = value.ilog2() as u8;
            match NonZero::new(log + 1) {
                Some(repr) => Ok(PageSize(repr)),
                None => Err(PageSizeTryFromError::TooSmall),
            }
        }
    }
}

//===========================================================================//

/// The error type returned when a conversion to [`PageSize`] fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageSizeTryFromError {
    /// The value was not a power of two.
    NotAPowerOfTwo,
    /// The value was smaller than the page table's line size.
    TooSmall,
    /// The value was larger than the address space.
    TooLarge,
}

impl fmt::Display for PageSizeTryFromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            PageSizeTryFromError::NotAPowerOfTwo => {
                f.write_str("page size is not a power of two")
            }
            PageSizeTryFromError::TooSmall => {
                f.write_str("page size is smaller than 256 bytes")
            }
            PageSizeTryFromError::TooLarge => {
                f.write_str("page size is larger than 64kB")
            }
        }
    }
}

impl std::error::Error for PageSizeTryFromError {}

//===========================================================================//


//===========================================================================//
