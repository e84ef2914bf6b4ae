//! Facilities for representing a loaded game cartridge: its memory chips,
//! its mapper, and the bank bindings that connect them to the console.

mod cartridge;
mod error;
mod ines;
mod store;

pub use cartridge::{CARTRIDGE_WINDOW, Cartridge};
pub use error::ConfigError;
pub use ines::CartridgeImage;
pub use store::{BackingStore, MemoryType, Stores};

//===========================================================================//
