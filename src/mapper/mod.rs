//! Cartridge mapper chips, and the page table they program.
//!
//! A mapper never touches memory directly.  Instead, whenever its registers
//! change, the cartridge clears the [`PageTable`] and asks the mapper to
//! rebuild every binding from scratch through [`Banking`], so that the
//! bindings are always a pure function of the mapper's registers.

mod banking;
mod error;
mod lh32;
mod mmc3;
mod nrom;
mod table;
mod uxrom;

pub use banking::{Banking, PRG_WINDOW_START, PageSizes};
pub use error::BusError;
pub use lh32::Lh32;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use table::{Access, Binding, PageTable, Resolved, Space, resolve_bank};
pub use uxrom::Uxrom;

use crate::addr::{PageSize, Range};
use crate::save::{FieldSet, StateError};

//===========================================================================//

/// The behavior of one kind of cartridge mapper chip.
pub trait MapperChip {
    /// Returns the name of this mapper, as recorded in save states.
    fn name(&self) -> &'static str;

    /// Returns the iNES mapper number for this mapper.
    fn ines_id(&self) -> u16;

    /// Returns the granularity at which this mapper switches PRG ROM banks.
    fn prg_page_size(&self) -> PageSize;

    /// Returns the granularity at which this mapper switches CHR banks.
    fn chr_page_size(&self) -> PageSize;

    /// Returns the granularity at which this mapper switches work RAM banks.
    fn work_ram_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    /// Returns all of this mapper's page sizes.
    fn page_sizes(&self) -> PageSizes {
        PageSizes {
            prg: self.prg_page_size(),
            chr: self.chr_page_size(),
            work_ram: self.work_ram_page_size(),
        }
    }

    /// Returns the range of CPU addresses whose writes are intercepted and
    /// passed to [`MapperChip::write_register`], or `None` if the mapper has
    /// no registers.
    fn register_range(&self) -> Option<Range>;

    /// Puts the registers into their power-on state.
    fn init_mapper(&mut self);

    /// Installs every bank binding implied by the current registers.  The
    /// page table is empty when this is called.
    fn update_state(&self, banks: &mut Banking);

    /// Handles a CPU write within [`MapperChip::register_range`].
    fn write_register(&mut self, addr: u16, data: u8);

    /// Appends every register to `fields`, in a fixed order.
    fn save_registers(&self, fields: &mut FieldSet);

    /// Restores every register from `fields`.  Either all registers are
    /// restored, or (on error) none are.
    fn load_registers(&mut self, fields: &FieldSet) -> Result<(), StateError>;
}

//===========================================================================//

macro_rules! dispatch {
    ($mapper:expr, $chip:ident => $body:expr) => {
        match $mapper {
            Mapper::Nrom($chip) => $body,
            Mapper::Uxrom($chip) => $body,
            Mapper::Mmc3($chip) => $body,
            Mapper::Lh32($chip) => $body,
        }
    };
}

/// The catalog of supported mapper chips.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mapper {
    /// iNES mapper 0.
    Nrom(Nrom),
    /// iNES mapper 2.
    Uxrom(Uxrom),
    /// iNES mapper 4.
    Mmc3(Mmc3),
    /// iNES mapper 125.
    Lh32(Lh32),
}

impl Mapper {
    /// Returns a new mapper for the given iNES mapper number, or `None` if
    /// that mapper isn't supported.
    pub fn from_ines_id(id: u16) -> Option<Mapper> {
        match id {
            0 => Some(Mapper::Nrom(Nrom::new())),
            2 => Some(Mapper::Uxrom(Uxrom::new())),
            4 => Some(Mapper::Mmc3(Mmc3::new())),
            125 => Some(Mapper::Lh32(Lh32::new())),
            _ => None,
        }
    }
}

impl MapperChip for Mapper {
    fn name(&self) -> &'static str {
        dispatch!(self, chip => chip.name())
    }

    fn ines_id(&self) -> u16 {
        dispatch!(self, chip => chip.ines_id())
    }

    fn prg_page_size(&self) -> PageSize {
        dispatch!(self, chip => chip.prg_page_size())
    }

    fn chr_page_size(&self) -> PageSize {
        dispatch!(self, chip => chip.chr_page_size())
    }

    fn work_ram_page_size(&self) -> PageSize {
        dispatch!(self, chip => chip.work_ram_page_size())
    }

    fn register_range(&self) -> Option<Range> {
        dispatch!(self, chip => chip.register_range())
    }

    fn init_mapper(&mut self) {
        dispatch!(self, chip => chip.init_mapper())
    }

    fn update_state(&self, banks: &mut Banking) {
        dispatch!(self, chip => chip.update_state(banks))
    }

    fn write_register(&mut self, addr: u16, data: u8) {
        dispatch!(self, chip => chip.write_register(addr, data))
    }

    fn save_registers(&self, fields: &mut FieldSet) {
        dispatch!(self, chip => chip.save_registers(fields))
    }

    fn load_registers(&mut self, fields: &FieldSet) -> Result<(), StateError> {
        dispatch!(self, chip => chip.load_registers(fields))
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Mapper, MapperChip};

    #[test]
    fn catalog() {
        let catalog = [(0, "NROM"), (2, "UxROM"), (4, "MMC3"), (125, "LH32")];
        for (id, name) in catalog {
            let mapper = Mapper::from_ines_id(id).unwrap();
            assert_eq!(mapper.ines_id(), id);
            assert_eq!(mapper.name(), name);
        }
        assert_eq!(Mapper::from_ines_id(1), None);
    }
}

//===========================================================================//
