use super::{BusError, PageTable, Space};
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;

//===========================================================================//

/// The first address of the CPU's switchable PRG window.  PRG slot numbers
/// count pages upward from here.
pub const PRG_WINDOW_START: u16 = 0x8000;

const PRG_WINDOW_SIZE: u32 = 0x8000;
const CHR_WINDOW_SIZE: u32 = 0x2000;

//===========================================================================//

/// The page sizes a mapper switches banks at, per class of memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSizes {
    /// The page size for PRG ROM.
    pub prg: PageSize,
    /// The page size for CHR ROM and CHR RAM.
    pub chr: PageSize,
    /// The page size for work RAM and save RAM.
    pub work_ram: PageSize,
}

impl PageSizes {
    /// Returns the page size used for banks of the given memory class.
    pub fn for_kind(&self, kind: MemoryType) -> PageSize {
        match kind {
            MemoryType::PrgRom => self.prg,
            MemoryType::WorkRam | MemoryType::SaveRam => self.work_ram,
            MemoryType::ChrRom | MemoryType::ChrRam => self.chr,
        }
    }
}

//===========================================================================//

/// The interface through which a mapper installs bank bindings while
/// recomputing its state.
///
/// Binding failures don't interrupt the recomputation: the affected range is
/// left as open bus, the remaining bindings are still installed, and the
/// first failure is reported by [`Banking::finish`].
pub struct Banking<'a> {
    table: &'a mut PageTable,
    pages: PageSizes,
    error: Option<BusError>,
}

impl<'a> Banking<'a> {
    pub(crate) fn new(
        table: &'a mut PageTable,
        pages: PageSizes,
    ) -> Banking<'a> {
        Banking { table, pages, error: None }
    }

    /// Returns the page sizes in use.
    pub fn page_sizes(&self) -> PageSizes {
        self.pages
    }

    /// Returns the capacity of the store of the given class, or zero if the
    /// cartridge has none.
    pub fn capacity(&self, kind: MemoryType) -> usize {
        self.table.capacity(kind).unwrap_or(0)
    }

    /// Returns true if the cartridge has a store of the given class.
    pub fn has_store(&self, kind: MemoryType) -> bool {
        self.table.capacity(kind).is_some()
    }

    /// Returns the number of whole banks in the store of the given class,
    /// at that class's page size.
    pub fn bank_count(&self, kind: MemoryType) -> usize {
        self.pages.for_kind(kind).pages_in(self.capacity(kind)).unwrap_or(0)
    }

    /// Returns the class of the cartridge's PRG RAM: battery-backed save RAM
    /// if present, otherwise plain work RAM if present.
    pub fn prg_ram(&self) -> Option<MemoryType> {
        [MemoryType::SaveRam, MemoryType::WorkRam]
            .into_iter()
            .find(|&kind| self.has_store(kind))
    }

    /// Returns the class of the cartridge's CHR memory: CHR ROM if present,
    /// otherwise CHR RAM.
    pub fn chr_memory(&self) -> MemoryType {
        if self.has_store(MemoryType::ChrRom) {
            MemoryType::ChrRom
        } else {
            MemoryType::ChrRam
        }
    }

    fn record(&mut self, result: Result<(), BusError>) {
        if let Err(error) = result
            && self.error.is_none()
        {
            self.error = Some(error);
        }
    }

    fn slot_range(
        &mut self,
        slot: u16,
        page_size: PageSize,
        window_start: u16,
        window_size: u32,
    ) -> Option<Range> {
        let slots = (window_size / page_size.bytes()).max(1) as u16;
        if slot >= slots {
            self.record(Err(BusError::SlotOutOfRange { slot, slots }));
            return None;
        }
        let start =
            u32::from(window_start) + u32::from(slot) * page_size.bytes();
        let end = start + page_size.bytes().min(window_size) - 1;
        Some(Range::with_bounds(start as u16, end as u16))
    }

    /// Binds PRG slot `slot` (counting pages of the PRG page size up from
    /// `$8000`) to bank `bank` of the `kind` store.
    pub fn select_prg_page(&mut self, slot: u16, bank: i32, kind: MemoryType) {
        let page_size = self.pages.prg;
        if let Some(range) =
            self.slot_range(slot, page_size, PRG_WINDOW_START, PRG_WINDOW_SIZE)
        {
            self.map_range(Space::Cpu, range, bank, kind, true);
        }
    }

    /// Binds CHR slot `slot` (counting pages of the CHR page size up from
    /// PPU address `$0000`) to bank `bank` of the `kind` store.
    pub fn select_chr_page(&mut self, slot: u16, bank: i32, kind: MemoryType) {
        let page_size = self.pages.chr;
        if let Some(range) =
            self.slot_range(slot, page_size, 0x0000, CHR_WINDOW_SIZE)
        {
            self.map_range(Space::Ppu, range, bank, kind, true);
        }
    }

    /// Binds the CPU addresses `start..=end` to consecutive banks of the
    /// `kind` store, starting with bank `bank`.
    pub fn map_cpu_range(
        &mut self,
        start: u16,
        end: u16,
        bank: i32,
        kind: MemoryType,
    ) {
        let range = Range::with_bounds(start, end);
        self.map_range(Space::Cpu, range, bank, kind, true);
    }

    /// Like [`Banking::map_cpu_range`], but writes to the range are
    /// discarded even if the store is RAM.
    pub fn map_cpu_range_read_only(
        &mut self,
        start: u16,
        end: u16,
        bank: i32,
        kind: MemoryType,
    ) {
        let range = Range::with_bounds(start, end);
        self.map_range(Space::Cpu, range, bank, kind, false);
    }

    /// Binds the PPU addresses `start..=end` to consecutive banks of the
    /// `kind` store, starting with bank `bank`.
    pub fn map_ppu_range(
        &mut self,
        start: u16,
        end: u16,
        bank: i32,
        kind: MemoryType,
    ) {
        let range = Range::with_bounds(start, end);
        self.map_range(Space::Ppu, range, bank, kind, true);
    }

    /// Leaves the CPU addresses `start..=end` unbound, so that they read as
    /// open bus.
    pub fn unmap_cpu_range(&mut self, start: u16, end: u16) {
        self.table.unbind(Space::Cpu, Range::with_bounds(start, end));
    }

    fn map_range(
        &mut self,
        space: Space,
        range: Range,
        bank: i32,
        kind: MemoryType,
        writable: bool,
    ) {
        let page_size = self.pages.for_kind(kind);
        let result =
            self.table.bind_bank(space, range, bank, page_size, kind, writable);
        self.record(result);
    }

    /// Ends the recomputation, returning the first binding failure, if any.
    pub fn finish(self) -> Result<(), BusError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

//===========================================================================//


//===========================================================================//
