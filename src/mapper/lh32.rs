use super::{Banking, MapperChip};
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use crate::save::{FieldSet, StateError};

//===========================================================================//

const PRG_REG_FIELD: &str = "prg_reg";

//===========================================================================//

/// The LH32 mapper (iNES mapper 125), from Whirlwind Manu's FDS-to-cartridge
/// conversions.
///
/// `$8000-$BFFF` is fixed to the fourth- and third-from-last 8KB PRG banks,
/// `$C000-$DFFF` is 8KB of work RAM, and `$E000-$FFFF` is fixed to the last
/// bank.  A single register at `$6000` selects the 8KB PRG bank visible at
/// `$6000-$7FFF`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lh32 {
    prg_reg: u8,
}

impl Lh32 {
    /// Returns a new LH32 mapper in its power-on state.
    pub fn new() -> Lh32 {
        Lh32 { prg_reg: 0 }
    }

    /// Returns the currently selected bank for `$6000-$7FFF`.
    pub fn prg_reg(&self) -> u8 {
        self.prg_reg
    }
}

impl MapperChip for Lh32 {
    fn name(&self) -> &'static str {
        "LH32"
    }

    fn ines_id(&self) -> u16 {
        125
    }

    fn prg_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    fn chr_page_size(&self) -> PageSize {
        PageSize::KB8
    }

    fn register_range(&self) -> Option<Range> {
        Some(Range::single(0x6000))
    }

    fn init_mapper(&mut self) {
        self.prg_reg = 0;
    }

    fn update_state(&self, banks: &mut Banking) {
        let ram = banks.prg_ram().unwrap_or(MemoryType::WorkRam);
        let chr = banks.chr_memory();
        banks.select_chr_page(0, 0, chr);
        banks.select_prg_page(0, -4, MemoryType::PrgRom);
        banks.select_prg_page(1, -3, MemoryType::PrgRom);
        banks.select_prg_page(2, 0, ram);
        banks.select_prg_page(3, -1, MemoryType::PrgRom);
        banks.map_cpu_range(
            0x6000,
            0x7fff,
            i32::from(self.prg_reg),
            MemoryType::PrgRom,
        );
    }

    fn write_register(&mut self, _addr: u16, data: u8) {
        self.prg_reg = data;
    }

    fn save_registers(&self, fields: &mut FieldSet) {
        fields.push_u8(PRG_REG_FIELD, self.prg_reg);
    }

    fn load_registers(&mut self, fields: &FieldSet) -> Result<(), StateError> {
        self.prg_reg = fields.get_u8(PRG_REG_FIELD)?;
        Ok(())
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Lh32;
    use crate::cart::MemoryType;
    use crate::mapper::{
        Access, Banking, MapperChip, PageTable, Resolved, Space,
    };
    use crate::save::FieldSet;

    fn rebuild(mapper: &Lh32, table: &mut PageTable) {
        table.clear();
        let mut banks = Banking::new(table, mapper.page_sizes());
        mapper.update_state(&mut banks);
        assert_eq!(banks.finish(), Ok(()));
    }

    fn make_table(mapper: &Lh32) -> PageTable {
        PageTable::new(
            [
                (MemoryType::PrgRom, 0x10000),
                (MemoryType::WorkRam, 0x2000),
                (MemoryType::ChrRam, 0x2000),
            ],
            mapper.register_range(),
        )
    }

    fn cpu_read(table: &PageTable, addr: u16) -> Resolved {
        table.resolve(Space::Cpu, addr, Access::Read)
    }

    #[test]
    fn power_on_layout() {
        let mut mapper = Lh32::new();
        mapper.init_mapper();
        let mut table = make_table(&mapper);
        rebuild(&mapper, &mut table);
        let prg =
            |offset| Resolved::Memory { kind: MemoryType::PrgRom, offset };
        assert_eq!(cpu_read(&table, 0x6000), prg(0x0000));
        assert_eq!(cpu_read(&table, 0x8000), prg(0x8000));
        assert_eq!(cpu_read(&table, 0xa000), prg(0xa000));
        assert_eq!(
            cpu_read(&table, 0xc000),
            Resolved::Memory { kind: MemoryType::WorkRam, offset: 0 }
        );
        assert_eq!(cpu_read(&table, 0xe000), prg(0xe000));
        assert_eq!(cpu_read(&table, 0xfffc), prg(0xfffc));
        assert_eq!(
            table.resolve(Space::Ppu, 0x1000, Access::Write),
            Resolved::Memory { kind: MemoryType::ChrRam, offset: 0x1000 }
        );
    }

    #[test]
    fn register_selects_6000_bank() {
        let mut mapper = Lh32::new();
        let mut table = make_table(&mapper);
        mapper.write_register(0x6000, 0x02);
        rebuild(&mapper, &mut table);
        assert_eq!(mapper.prg_reg(), 0x02);
        assert_eq!(
            cpu_read(&table, 0x6000),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x4000 }
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x6000, Access::Write),
            Resolved::Register
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0xc123, Access::Write),
            Resolved::Memory { kind: MemoryType::WorkRam, offset: 0x0123 }
        );
    }

    #[test]
    fn registers_round_trip() {
        let mut mapper = Lh32::new();
        mapper.write_register(0x6000, 0x05);
        let mut fields = FieldSet::new();
        mapper.save_registers(&mut fields);
        let mut restored = Lh32::new();
        restored.load_registers(&fields).unwrap();
        assert_eq!(restored, mapper);
    }

    #[test]
    fn failed_load_keeps_registers() {
        let mut mapper = Lh32::new();
        mapper.write_register(0x6000, 0x05);
        assert!(mapper.load_registers(&FieldSet::new()).is_err());
        assert_eq!(mapper.prg_reg(), 0x05);
    }
}

//===========================================================================//
