use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use std::fmt;

//===========================================================================//

/// An error encountered while installing a bank binding into a page table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BusError {
    /// The cartridge has no backing store of the requested class.
    MissingStore {
        /// The requested memory class.
        kind: MemoryType,
    },
    /// The requested bank lies outside of its backing store.
    OutOfRange {
        /// The memory class being bound.
        kind: MemoryType,
        /// The signed bank index that was requested.
        bank: i32,
        /// The page size used to locate the bank.
        page_size: PageSize,
        /// The capacity of the backing store, in bytes.
        capacity: usize,
    },
    /// A slot index exceeds the number of slots in the mapper's window.
    SlotOutOfRange {
        /// The requested slot index.
        slot: u16,
        /// The number of slots in the window.
        slots: u16,
    },
    /// An address range does not start and end on page boundaries.
    Misaligned {
        /// The misaligned address range.
        range: Range,
        /// The page size the range should be aligned to.
        page_size: PageSize,
    },
    /// A memory class was bound into the wrong address space (e.g. CHR ROM
    /// into the CPU's address space).
    WrongSpace {
        /// The memory class being bound.
        kind: MemoryType,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            BusError::MissingStore { kind } => {
                write!(f, "cartridge has no {kind} store")
            }
            BusError::OutOfRange { kind, bank, page_size, capacity } => {
                write!(
                    f,
                    "bank {bank} of {page_size} pages is out of range for \
                     {capacity:#x}-byte {kind}"
                )
            }
            BusError::SlotOutOfRange { slot, slots } => {
                write!(f, "slot {slot} is out of range ({slots} slots)")
            }
            BusError::Misaligned { range, page_size } => {
                write!(f, "{range} is not aligned to {page_size} pages")
            }
            BusError::WrongSpace { kind } => {
                write!(f, "{kind} cannot be mapped into this address space")
            }
        }
    }
}

impl std::error::Error for BusError {}

//===========================================================================//
