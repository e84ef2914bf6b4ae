use super::{Banking, MapperChip};
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use crate::save::{FieldSet, StateError};

//===========================================================================//

const PRG_BANK_FIELD: &str = "prg_bank";

//===========================================================================//

/// The UxROM boards (iNES mapper 2).
///
/// `$8000-$BFFF` is a switchable 16KB PRG bank, selected by writing anywhere
/// in `$8000-$FFFF`; `$C000-$FFFF` is fixed to the last bank.  CHR is 8KB,
/// usually RAM.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Uxrom {
    prg_bank: u8,
}

impl Uxrom {
    /// Returns a new UxROM mapper in its power-on state.
    pub fn new() -> Uxrom {
        Uxrom { prg_bank: 0 }
    }
}

impl MapperChip for Uxrom {
    fn name(&self) -> &'static str {
        "UxROM"
    }

    fn ines_id(&self) -> u16 {
        2
    }

    fn prg_page_size(&self) -> PageSize {
        PageSize::KB16
    }

    fn chr_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    fn register_range(&self) -> Option<Range> {
        Some(Range::with_bounds(0x8000, 0xffff))
    }

    fn init_mapper(&mut self) {
        self.prg_bank = 0;
    }

    fn update_state(&self, banks: &mut Banking) {
        // Boards only connect as many select lines as the ROM needs, so
        // larger values wrap around.
        let num_banks = banks.bank_count(MemoryType::PrgRom).max(1);
        let bank = usize::from(self.prg_bank) % num_banks;
        banks.select_prg_page(0, bank as i32, MemoryType::PrgRom);
        banks.select_prg_page(1, -1, MemoryType::PrgRom);
        let chr = banks.chr_memory();
        banks.select_chr_page(0, 0, chr);
    }

    fn write_register(&mut self, _addr: u16, data: u8) {
        self.prg_bank = data;
    }

    fn save_registers(&self, fields: &mut FieldSet) {
        fields.push_u8(PRG_BANK_FIELD, self.prg_bank);
    }

    fn load_registers(&mut self, fields: &FieldSet) -> Result<(), StateError> {
        self.prg_bank = fields.get_u8(PRG_BANK_FIELD)?;
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
