use super::MemoryType;
use crate::addr::{PageSize, Range};
use crate::mapper::BusError;
use std::fmt;

//===========================================================================//

/// An error that prevents a cartridge from being loaded.  A cartridge that
/// fails with one of these must not be run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The image requests a mapper that isn't supported.
    UnsupportedMapper {
        /// The iNES mapper number.
        id: u16,
    },
    /// The image has no store of a class that every cartridge needs.
    MissingStore {
        /// The missing memory class.
        kind: MemoryType,
    },
    /// A store's size is not a whole number of the mapper's pages.
    PageSizeMismatch {
        /// The memory class of the store.
        kind: MemoryType,
        /// The mapper's page size for that class.
        page_size: PageSize,
        /// The store's capacity, in bytes.
        capacity: usize,
    },
    /// The mapper's register window lies outside of the cartridge's part of
    /// the CPU address space.
    RegisterWindow {
        /// The mapper's register window.
        range: Range,
    },
    /// The mapper's power-on bank bindings don't fit the cartridge's stores.
    Binding(BusError),
    /// A battery RAM image doesn't match the size of the cartridge's save
    /// RAM.
    BatteryRamSize {
        /// The size of the cartridge's save RAM.
        expected: usize,
        /// The size of the image that was supplied.
        found: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigError::UnsupportedMapper { id } => {
                write!(f, "unsupported mapper: {id}")
            }
            ConfigError::MissingStore { kind } => {
                write!(f, "cartridge has no {kind}")
            }
            ConfigError::PageSizeMismatch { kind, page_size, capacity } => {
                write!(
                    f,
                    "{capacity:#x}-byte {kind} is not a whole number of \
                     {page_size} pages"
                )
            }
            ConfigError::RegisterWindow { range } => {
                write!(f, "mapper register window {range} is out of range")
            }
            ConfigError::Binding(error) => {
                write!(f, "invalid power-on bank binding: {error}")
            }
            ConfigError::BatteryRamSize { expected, found } => {
                write!(
                    f,
                    "battery RAM image is {found:#x} bytes, expected \
                     {expected:#x}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Binding(error) => Some(error),
            _ => None,
        }
    }
}

impl From<BusError> for ConfigError {
    fn from(error: BusError) -> ConfigError {
        ConfigError::Binding(error)
    }
}

//===========================================================================//
