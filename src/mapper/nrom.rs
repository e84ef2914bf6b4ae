use super::{Banking, MapperChip};
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use crate::save::{FieldSet, StateError};

//===========================================================================//

/// The NROM board (iNES mapper 0): no bank switching at all.
///
/// 16KB of PRG ROM is mirrored at `$8000` and `$C000`; 32KB fills the whole
/// window.  Any PRG RAM appears at `$6000-$7FFF`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Nrom;

impl Nrom {
    /// Returns a new NROM mapper.
    pub fn new() -> Nrom {
        Nrom
    }
}

impl MapperChip for Nrom {
    fn name(&self) -> &'static str {
        "NROM"
    }

    fn ines_id(&self) -> u16 {
        0
    }

    fn prg_page_size(&self) -> PageSize {
        PageSize::KB16
    }

    fn chr_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    fn register_range(&self) -> Option<Range> {
        None
    }

    fn init_mapper(&mut self) {}

    fn update_state(&self, banks: &mut Banking) {
        if let Some(ram) = banks.prg_ram() {
            banks.map_cpu_range(0x6000, 0x7fff, 0, ram);
        }
        banks.select_prg_page(0, 0, MemoryType::PrgRom);
        banks.select_prg_page(1, -1, MemoryType::PrgRom);
        let chr = banks.chr_memory();
        banks.select_chr_page(0, 0, chr);
    }

    fn write_register(&mut self, _addr: u16, _data: u8) {}

    fn save_registers(&self, _fields: &mut FieldSet) {}

    fn load_registers(&mut self, _fields: &FieldSet) -> Result<(), StateError> {
        Ok(())
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Nrom;
    use crate::cart::MemoryType;
    use crate::mapper::{
        Access, Banking, MapperChip, PageTable, Resolved, Space,
    };

    fn build(prg_size: usize) -> PageTable {
        let mapper = Nrom::new();
        let mut table = PageTable::new(
            [(MemoryType::PrgRom, prg_size), (MemoryType::ChrRom, 0x2000)],
            mapper.register_range(),
        );
        let mut banks = Banking::new(&mut table, mapper.page_sizes());
        mapper.update_state(&mut banks);
        assert_eq!(banks.finish(), Ok(()));
        table
    }

    #[test]
    fn nrom_128_is_mirrored() {
        let table = build(0x4000);
        assert_eq!(
            table.resolve(Space::Cpu, 0x8123, Access::Read),
            table.resolve(Space::Cpu, 0xc123, Access::Read)
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x6000, Access::Read),
            Resolved::OpenBus
        );
    }

    #[test]
    fn nrom_256_is_linear() {
        let table = build(0x8000);
        assert_eq!(
            table.resolve(Space::Cpu, 0xc123, Access::Read),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x4123 }
        );
        assert_eq!(
            table.resolve(Space::Ppu, 0x1fff, Access::Read),
            Resolved::Memory { kind: MemoryType::ChrRom, offset: 0x1fff }
        );
    }

    #[test]
    fn no_registers() {
        let table = build(0x8000);
        assert_eq!(table.register_range(), None);
        assert_eq!(
            table.resolve(Space::Cpu, 0x8000, Access::Write),
            Resolved::OpenBus
        );
    }
}

//===========================================================================//
