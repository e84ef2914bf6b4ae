use super::PageSize;
use std::fmt;
use std::ops;

//===========================================================================//

/// Represents a nonempty, inclusive range of 16-bit bus addresses.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Range {
    first: u16,
    last: u16,
}

impl Range {
    /// A range that covers all possible addresses.
    pub const FULL: Range = Range { first: 0x0000, last: 0xffff };

    /// Returns an address range that contains `first`, `last`, and all
    /// addresses in between.
    ///
    /// Panics if `last < first`.
    pub const fn with_bounds(first: u16, last: u16) -> Range {
        assert!(first <= last);
        Range { first, last }
    }

    /// Returns a range containing only the single address `addr`.
    pub const fn single(addr: u16) -> Range {
        Range { first: addr, last: addr }
    }

    /// Returns the first address in the range.
    pub fn start(self) -> u16 {
        self.first
    }

    /// Returns the last address in the range.
    pub fn end(self) -> u16 {
        self.last
    }

    /// Returns the number of distinct addresses in this range.
    pub fn size(self) -> u32 {
        u32::from(self.last - self.first) + 1
    }

    /// Returns true if this range contains `addr`.
    pub fn contains(self, addr: u16) -> bool {
        (self.first..=self.last).contains(&addr)
    }

    /// Returns true if `self` contains all addresses in `other`.
    pub fn is_superset(self, other: Range) -> bool {
        self.first <= other.first && self.last >= other.last
    }

    /// Returns true if both ends of this range sit on page boundaries, so
    /// that the range is made up of whole pages of the given size.
    pub fn is_page_aligned(self, page: PageSize) -> bool {
        let bytes = page.bytes();
        u32::from(self.first) % bytes == 0 && self.size() % bytes == 0
    }

    /// Returns an iterator over the page-sized subranges of this range.  The
    /// final subrange is truncated if the range is not page-aligned.
    pub fn pages(self, page: PageSize) -> Pages {
        Pages { range: self, page, next_start: Some(self.first) }
    }
}

impl From<Range> for ops::RangeInclusive<u16> {
    fn from(value: Range) -> ops::RangeInclusive<u16> {
        value.first..=value.last
    }
}

impl TryFrom<ops::RangeInclusive<u16>> for Range {
    type Error = ();

    fn try_from(value: ops::RangeInclusive<u16>) -> Result<Range, ()> {
        let first = *value.start();
        let last = *value.end();
        if first <= last { Ok(Range { first, last }) } else { Err(()) }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "${:04X}-${:04X}", self.first, self.last)
    }
}

//===========================================================================//

/// An iterator over the page-sized subranges of an address range.
pub struct Pages {
    range: Range,
    page: PageSize,
    next_start: Option<u16>,
}

impl Iterator for Pages {
    type Item = Range;

    fn next(&mut self) -> Option<Range> {
        let start = self.next_start?;
        let limit = u32::from(start) + self.page.bytes() - 1;
        let end = limit.min(u32::from(self.range.last)) as u16;
        self.next_start =
            if end < self.range.last { Some(end + 1) } else { None };
        Some(Range { first: start, last: end })
    }
}

impl std::iter::FusedIterator for Pages {}

//===========================================================================//


//===========================================================================//
