use super::{Banking, MapperChip};
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use crate::save::{FieldSet, StateError};

//===========================================================================//

const PROTECT_FLAG_ENABLE_RAM: u8 = 0b1000_0000;
const PROTECT_FLAG_DENY_WRITE: u8 = 0b0100_0000;

const SELECT_FLAG_CHR_INVERT: u8 = 0b1000_0000;
const SELECT_FLAG_8000_FIXED: u8 = 0b0100_0000;

const BANK_SELECT_FIELD: &str = "bank_select";
const BANK_REGISTERS_FIELD: &str = "bank_registers";
const MIRRORING_FIELD: &str = "mirroring";
const RAM_PROTECT_FIELD: &str = "ram_protect";

//===========================================================================//

/// The MMC3 mapper chip (iNES mapper 4).
///
/// Eight bank registers select four switchable 1KB and two switchable 2KB CHR
/// banks, and two switchable 8KB PRG banks; the remaining PRG banks are fixed
/// to the second-to-last and last banks.  Scanline IRQs and nametable
/// mirroring aren't simulated, though the mirroring register is kept so that
/// it survives save states.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mmc3 {
    bank_select: u8,
    bank_registers: [u8; 8],
    mirroring: u8,
    ram_protect: u8,
}

impl Mmc3 {
    /// Returns a new MMC3 mapper in its power-on state.
    pub fn new() -> Mmc3 {
        Mmc3 {
            bank_select: 0,
            bank_registers: [0; 8],
            mirroring: 0,
            ram_protect: 0,
        }
    }

    fn prg_bank(&self, banks: &Banking, index: usize) -> i32 {
        let num_banks = banks.bank_count(MemoryType::PrgRom).max(1);
        (usize::from(self.bank_registers[index] & 0x3f) % num_banks) as i32
    }

    fn chr_bank(&self, banks: &Banking, kind: MemoryType, bank: u8) -> i32 {
        let num_banks = banks.bank_count(kind).max(1);
        (usize::from(bank) % num_banks) as i32
    }
}

impl MapperChip for Mmc3 {
    fn name(&self) -> &'static str {
        "MMC3"
    }

    fn ines_id(&self) -> u16 {
        4
    }

    fn prg_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    fn chr_page_size(&self) -> PageSize {
        PageSize::KB1
    }

    fn register_range(&self) -> Option<Range> {
        Some(Range::with_bounds(0x8000, 0xffff))
    }

    fn init_mapper(&mut self) {
        *self = Mmc3::new();
    }

    fn update_state(&self, banks: &mut Banking) {
        let switchable = self.prg_bank(banks, 6);
        let fixed_8000 = (self.bank_select & SELECT_FLAG_8000_FIXED) != 0;
        let (slot0, slot2) =
            if fixed_8000 { (-2, switchable) } else { (switchable, -2) };
        let slot1 = self.prg_bank(banks, 7);
        banks.select_prg_page(0, slot0, MemoryType::PrgRom);
        banks.select_prg_page(1, slot1, MemoryType::PrgRom);
        banks.select_prg_page(2, slot2, MemoryType::PrgRom);
        banks.select_prg_page(3, -1, MemoryType::PrgRom);

        // With A12 inversion, the two 2KB banks move to $1000-$1FFF and the
        // four 1KB banks to $0000-$0FFF.
        let chr = banks.chr_memory();
        let inverted = (self.bank_select & SELECT_FLAG_CHR_INVERT) != 0;
        let (wide_base, narrow_base) = if inverted { (4, 0) } else { (0, 4) };
        for (index, &register) in self.bank_registers[..2].iter().enumerate() {
            let slot = wide_base + 2 * index as u16;
            let even = self.chr_bank(banks, chr, register & 0xfe);
            let odd = self.chr_bank(banks, chr, register | 1);
            banks.select_chr_page(slot, even, chr);
            banks.select_chr_page(slot + 1, odd, chr);
        }
        for (index, &register) in self.bank_registers[2..6].iter().enumerate() {
            let bank = self.chr_bank(banks, chr, register);
            banks.select_chr_page(narrow_base + index as u16, bank, chr);
        }

        if let Some(ram) = banks.prg_ram() {
            if (self.ram_protect & PROTECT_FLAG_ENABLE_RAM) == 0 {
                banks.unmap_cpu_range(0x6000, 0x7fff);
            } else if (self.ram_protect & PROTECT_FLAG_DENY_WRITE) != 0 {
                banks.map_cpu_range_read_only(0x6000, 0x7fff, 0, ram);
            } else {
                banks.map_cpu_range(0x6000, 0x7fff, 0, ram);
            }
        }
    }

    fn write_register(&mut self, addr: u16, data: u8) {
        match addr {
            0x8000..0xa000 => {
                if (addr & 1) != 0 {
                    let index = usize::from(self.bank_select & 0b111);
                    self.bank_registers[index] = data;
                } else {
                    self.bank_select = data;
                }
            }
            0xa000..0xc000 => {
                if (addr & 1) != 0 {
                    self.ram_protect = data;
                } else {
                    self.mirroring = data & 1;
                }
            }
            _ => {
                // IRQ latch/reload/enable registers, which we don't
                // currently simulate.
            }
        }
    }

    fn save_registers(&self, fields: &mut FieldSet) {
        fields.push_u8(BANK_SELECT_FIELD, self.bank_select);
        fields.push_bytes(BANK_REGISTERS_FIELD, &self.bank_registers);
        fields.push_u8(MIRRORING_FIELD, self.mirroring);
        fields.push_u8(RAM_PROTECT_FIELD, self.ram_protect);
    }

    fn load_registers(&mut self, fields: &FieldSet) -> Result<(), StateError> {
        let restored = Mmc3 {
            bank_select: fields.get_u8(BANK_SELECT_FIELD)?,
            bank_registers: fields.get_array(BANK_REGISTERS_FIELD)?,
            mirroring: fields.get_u8(MIRRORING_FIELD)?,
            ram_protect: fields.get_u8(RAM_PROTECT_FIELD)?,
        };
        *self = restored;
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
