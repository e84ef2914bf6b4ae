use super::{BackingStore, CartridgeImage, ConfigError, MemoryType, Stores};
use crate::addr::Range;
use crate::bus::{OPEN_BUS, SimBus};
use crate::mapper::{
    Access, Banking, Binding, BusError, Mapper, MapperChip, PageTable,
    Resolved, Space,
};
use crate::save::{FieldSet, SaveState, StateError};
use std::io;

//===========================================================================//

/// The part of the CPU address space that is wired to the cartridge.
pub const CARTRIDGE_WINDOW: Range = Range::with_bounds(0x4020, 0xffff);

//===========================================================================//

/// A loaded cartridge: its backing stores, its mapper chip, and the page
/// table the mapper maintains over them.
pub struct Cartridge {
    stores: Stores,
    table: PageTable,
    mapper: Mapper,
}

impl Cartridge {
    /// Loads a parsed cartridge image, choosing the mapper from its iNES
    /// mapper number.
    pub fn load(image: CartridgeImage) -> Result<Cartridge, ConfigError> {
        let id = image.mapper_id;
        let mapper = Mapper::from_ines_id(id)
            .ok_or(ConfigError::UnsupportedMapper { id })?;
        Cartridge::with_mapper(mapper, image.into_stores())
    }

    /// Connects `mapper` to the given stores and puts it in its power-on
    /// state.  Fails if the stores don't fit the mapper's page sizes, or if
    /// any power-on binding is out of range.
    pub fn with_mapper(
        mut mapper: Mapper,
        stores: Stores,
    ) -> Result<Cartridge, ConfigError> {
        if stores.get(MemoryType::PrgRom).is_none() {
            return Err(ConfigError::MissingStore { kind: MemoryType::PrgRom });
        }
        let pages = mapper.page_sizes();
        for store in stores.iter() {
            let page_size = pages.for_kind(store.kind());
            if page_size.pages_in(store.len()).is_none() {
                return Err(ConfigError::PageSizeMismatch {
                    kind: store.kind(),
                    page_size,
                    capacity: store.len(),
                });
            }
        }
        if let Some(range) = mapper.register_range()
            && !CARTRIDGE_WINDOW.is_superset(range)
        {
            return Err(ConfigError::RegisterWindow { range });
        }
        let table = PageTable::new(
            stores.iter().map(|store| (store.kind(), store.len())),
            mapper.register_range(),
        );
        mapper.init_mapper();
        let mut cartridge = Cartridge { stores, table, mapper };
        cartridge.rebuild()?;
        log::info!("loaded {}", cartridge.description());
        Ok(cartridge)
    }

    /// Returns a human-readable description of this cartridge.
    pub fn description(&self) -> String {
        let stores: Vec<String> =
            self.stores.iter().map(BackingStore::description).collect();
        format!("{} with {}", self.mapper.name(), stores.join(" and "))
    }

    /// Returns the cartridge's mapper chip.
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Returns the cartridge's current page table.
    pub fn page_table(&self) -> &PageTable {
        &self.table
    }

    /// Returns the backing store of the given class, if the cartridge has
    /// one.
    pub fn store(&self, kind: MemoryType) -> Option<&BackingStore> {
        self.stores.get(kind)
    }

    /// Returns all of the cartridge's backing stores.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    fn rebuild(&mut self) -> Result<(), BusError> {
        self.table.clear();
        let mut banks = Banking::new(&mut self.table, self.mapper.page_sizes());
        self.mapper.update_state(&mut banks);
        banks.finish()
    }

    fn rebuild_or_warn(&mut self) {
        if let Err(error) = self.rebuild() {
            log::warn!(
                "{}: {error}; affected addresses will read as open bus",
                self.mapper.name()
            );
        }
    }

    /// Returns the mapper to its power-on state, as when the console's
    /// reset button is pressed.  RAM contents are kept.
    pub fn reset(&mut self) {
        self.mapper.init_mapper();
        self.rebuild_or_warn();
    }

    /// Resolves an access through the current bank bindings.
    pub fn resolve(&self, space: Space, addr: u16, access: Access) -> Resolved {
        self.table.resolve(space, addr, access)
    }

    /// Returns the store location that a read of `addr` currently reaches,
    /// if any.
    pub fn absolute_address(
        &self,
        space: Space,
        addr: u16,
    ) -> Option<(MemoryType, usize)> {
        match self.table.resolve(space, addr, Access::Read) {
            Resolved::Memory { kind, offset } => Some((kind, offset)),
            Resolved::Register | Resolved::OpenBus => None,
        }
    }

    /// Returns the current bank mapping of an address space.
    pub fn mappings(&self, space: Space) -> Vec<(Range, Binding)> {
        self.table.mappings(space)
    }

    /// Returns the byte that a read of `addr` would see, without side
    /// effects.  Unmapped addresses read as [`OPEN_BUS`].
    pub fn peek(&self, space: Space, addr: u16) -> u8 {
        self.absolute_address(space, addr)
            .and_then(|(kind, offset)| self.stores.read(kind, offset))
            .unwrap_or(OPEN_BUS)
    }

    /// Writes a byte to the given address space.  Writes into the mapper's
    /// register window reconfigure the mapper; writes to ROM or to unmapped
    /// addresses are discarded.
    pub fn write(&mut self, space: Space, addr: u16, data: u8) {
        match self.table.resolve(space, addr, Access::Write) {
            Resolved::Memory { kind, offset } => {
                self.stores.write(kind, offset, data)
            }
            Resolved::Register => {
                log::debug!(
                    "{} register write: ${addr:04X} <- ${data:02X}",
                    self.mapper.name()
                );
                self.mapper.write_register(addr, data);
                self.rebuild_or_warn();
            }
            Resolved::OpenBus => {}
        }
    }

    /// Returns the contents of battery-backed save RAM, if the cartridge has
    /// any.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.stores.get(MemoryType::SaveRam).map(BackingStore::data)
    }

    /// Replaces the contents of battery-backed save RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) -> Result<(), ConfigError> {
        let store = self
            .stores
            .get_mut(MemoryType::SaveRam)
            .ok_or(ConfigError::MissingStore { kind: MemoryType::SaveRam })?;
        if store.len() != data.len() {
            return Err(ConfigError::BatteryRamSize {
                expected: store.len(),
                found: data.len(),
            });
        }
        store.data_mut().copy_from_slice(data);
        Ok(())
    }

    /// Captures the mapper's registers and the contents of all RAM.
    pub fn snapshot(&self) -> SaveState {
        let mut fields = FieldSet::new();
        self.mapper.save_registers(&mut fields);
        for store in self.stores.iter() {
            if store.kind().is_writable() {
                fields.push_bytes(store.kind().name(), store.data());
            }
        }
        SaveState::new(self.mapper.name(), fields)
    }

    /// Restores a snapshot.  Either the whole snapshot is applied, or (on
    /// error) the cartridge is left untouched.
    pub fn restore(&mut self, state: &SaveState) -> Result<(), StateError> {
        let fields = state.fields_for(self.mapper.name())?;
        let mut images: Vec<(MemoryType, &[u8])> = Vec::new();
        for store in self.stores.iter() {
            let kind = store.kind();
            if !kind.is_writable() {
                continue;
            }
            let data = fields.get_bytes(kind.name())?;
            if data.len() != store.len() {
                return Err(StateError::InvalidValue {
                    name: kind.name().to_string(),
                });
            }
            images.push((kind, data));
        }
        let mut mapper = self.mapper.clone();
        mapper.load_registers(fields)?;

        let known = self.snapshot().fields;
        for (name, _) in fields.iter() {
            if known.get(name).is_none() {
                log::warn!("ignoring unknown save state field {name:?}");
            }
        }
        self.mapper = mapper;
        for (kind, data) in images {
            if let Some(store) = self.stores.get_mut(kind) {
                store.data_mut().copy_from_slice(data);
            }
        }
        self.rebuild_or_warn();
        Ok(())
    }

    /// Writes a save state of this cartridge to a stream.
    pub fn save_state<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.snapshot().write_to(writer)
    }

    /// Reads a save state from a stream and restores it.  Either the whole
    /// state is applied, or (on error) the cartridge is left untouched.
    pub fn load_state<R: io::BufRead>(
        &mut self,
        reader: &mut R,
    ) -> Result<(), StateError> {
        let state = SaveState::read_from(reader)?;
        self.restore(&state)
    }
}

impl SimBus for Cartridge {
    fn description(&self) -> String {
        Cartridge::description(self)
    }

    fn peek_byte(&self, addr: u16) -> u8 {
        self.peek(Space::Cpu, addr)
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        self.peek(Space::Cpu, addr)
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        self.write(Space::Cpu, addr, data)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Cartridge;
    use crate::addr::{PageSize, Range};
    use crate::cart::{
        BackingStore, CartridgeImage, ConfigError, MemoryType, Stores,
    };
    use crate::mapper::{BusError, Lh32, Mapper, Nrom, Space};
    use crate::save::StateError;

    fn patterned(kind: MemoryType, size: usize) -> BackingStore {
        let data: Vec<u8> =
            (0..size).map(|index| (index >> 13) as u8 | 0x80).collect();
        BackingStore::new(kind, data.into_boxed_slice())
    }

    fn lh32_stores(work_ram: usize) -> Stores {
        let mut stores = Stores::new();
        stores.insert(patterned(MemoryType::PrgRom, 0x10000));
        stores.insert(BackingStore::zeroed(MemoryType::WorkRam, work_ram));
        stores.insert(BackingStore::zeroed(MemoryType::ChrRam, 0x2000));
        stores
    }

    fn lh32() -> Cartridge {
        Cartridge::with_mapper(Mapper::Lh32(Lh32::new()), lh32_stores(0x2000))
            .unwrap()
    }

    #[test]
    fn description() {
        assert_eq!(
            lh32().description(),
            "LH32 with 64kB prg_rom and 8kB work_ram and 8kB chr_ram"
        );
    }

    #[test]
    fn load_from_image() {
        let image = CartridgeImage {
            mapper_id: 125,
            prg_rom: vec![0u8; 0x10000].into_boxed_slice(),
            chr_ram_size: 0x2000,
            save_ram_size: 0x2000,
            ..CartridgeImage::default()
        };
        let cartridge = Cartridge::load(image).unwrap();
        assert_eq!(
            cartridge.absolute_address(Space::Cpu, 0xc000),
            Some((MemoryType::SaveRam, 0))
        );
        let image =
            CartridgeImage { mapper_id: 1, ..CartridgeImage::default() };
        assert!(matches!(
            Cartridge::load(image),
            Err(ConfigError::UnsupportedMapper { id: 1 })
        ));
    }

    #[test]
    fn missing_work_ram_fails_to_load() {
        let result =
            Cartridge::with_mapper(Mapper::Lh32(Lh32::new()), lh32_stores(0));
        assert_eq!(
            result.err(),
            Some(ConfigError::Binding(BusError::MissingStore {
                kind: MemoryType::WorkRam
            }))
        );
    }

    #[test]
    fn page_size_mismatch_fails_to_load() {
        let mut stores = Stores::new();
        stores.insert(patterned(MemoryType::PrgRom, 0x6000));
        let result = Cartridge::with_mapper(Mapper::Nrom(Nrom::new()), stores);
        assert_eq!(
            result.err(),
            Some(ConfigError::PageSizeMismatch {
                kind: MemoryType::PrgRom,
                page_size: PageSize::KB16,
                capacity: 0x6000,
            })
        );
    }

    #[test]
    fn too_small_prg_rom_fails_to_load() {
        let mut stores = lh32_stores(0x2000);
        stores.insert(patterned(MemoryType::PrgRom, 0x4000));
        let result = Cartridge::with_mapper(Mapper::Lh32(Lh32::new()), stores);
        assert!(matches!(
            result.err(),
            Some(ConfigError::Binding(BusError::OutOfRange { bank: -4, .. }))
        ));
    }

    #[test]
    fn register_write_switches_banks() {
        let mut cartridge = lh32();
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), 0x80);
        cartridge.write(Space::Cpu, 0x6000, 0x02);
        assert!(matches!(
            cartridge.mapper(),
            Mapper::Lh32(chip) if chip.prg_reg() == 0x02
        ));
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), 0x82);
        assert_eq!(
            cartridge.absolute_address(Space::Cpu, 0x6000),
            Some((MemoryType::PrgRom, 0x4000))
        );
    }

    #[test]
    fn out_of_range_register_write_reads_open_bus() {
        let mut cartridge = lh32();
        cartridge.write(Space::Cpu, 0x6000, 0x40);
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), crate::bus::OPEN_BUS);
        assert_eq!(cartridge.peek(Space::Cpu, 0x8000), 0x84);
        cartridge.write(Space::Cpu, 0x6000, 0x01);
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), 0x81);
    }

    #[test]
    fn reset_restores_power_on_banks() {
        let mut cartridge = lh32();
        cartridge.write(Space::Cpu, 0x6000, 0x03);
        cartridge.write(Space::Cpu, 0xc000, 0x55);
        cartridge.reset();
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), 0x80);
        assert_eq!(cartridge.peek(Space::Cpu, 0xc000), 0x55);
    }

    #[test]
    fn mappings() {
        let cartridge = lh32();
        let ranges: Vec<(Range, MemoryType)> = cartridge
            .mappings(Space::Cpu)
            .into_iter()
            .map(|(range, binding)| (range, binding.kind))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (Range::with_bounds(0x6000, 0x7fff), MemoryType::PrgRom),
                (Range::with_bounds(0x8000, 0xbfff), MemoryType::PrgRom),
                (Range::with_bounds(0xc000, 0xdfff), MemoryType::WorkRam),
                (Range::with_bounds(0xe000, 0xffff), MemoryType::PrgRom),
            ]
        );
    }

    #[test]
    fn battery_ram() {
        let mut stores = lh32_stores(0);
        stores.insert(BackingStore::zeroed(MemoryType::SaveRam, 0x2000));
        let mut cartridge =
            Cartridge::with_mapper(Mapper::Lh32(Lh32::new()), stores).unwrap();
        cartridge.write(Space::Cpu, 0xc010, 0x99);
        assert_eq!(cartridge.battery_ram().unwrap()[0x10], 0x99);
        let image = vec![0x42u8; 0x2000];
        cartridge.load_battery_ram(&image).unwrap();
        assert_eq!(cartridge.peek(Space::Cpu, 0xc010), 0x42);
        assert_eq!(
            cartridge.load_battery_ram(&[0u8; 16]),
            Err(ConfigError::BatteryRamSize { expected: 0x2000, found: 16 })
        );
        assert_eq!(
            lh32().load_battery_ram(&image),
            Err(ConfigError::MissingStore { kind: MemoryType::SaveRam })
        );
    }

    #[test]
    fn save_state_includes_ram() {
        let mut cartridge = lh32();
        cartridge.write(Space::Cpu, 0x6000, 0x05);
        cartridge.write(Space::Cpu, 0xc001, 0x77);
        cartridge.write(Space::Ppu, 0x0002, 0x66);
        let state = cartridge.snapshot();
        let names: Vec<&str> =
            state.fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["prg_reg", "work_ram", "chr_ram"]);

        let mut other = lh32();
        other.restore(&state).unwrap();
        assert_eq!(other.peek(Space::Cpu, 0x6000), 0x85);
        assert_eq!(other.peek(Space::Cpu, 0xc001), 0x77);
        assert_eq!(other.peek(Space::Ppu, 0x0002), 0x66);
    }

    #[test]
    fn mismatched_ram_size_is_rejected() {
        let mut cartridge = lh32();
        let mut state = cartridge.snapshot();
        state.fields.push_bytes("work_ram", &[0u8; 0x100]);
        state.fields.push_u8("prg_reg", 0x03);
        assert!(matches!(
            cartridge.restore(&state),
            Err(StateError::InvalidValue { name }) if name == "work_ram"
        ));
        assert_eq!(cartridge.peek(Space::Cpu, 0x6000), 0x80);
    }
}

//===========================================================================//
