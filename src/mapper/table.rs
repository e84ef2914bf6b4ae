use super::BusError;
use crate::addr::{PageSize, Range};
use crate::cart::MemoryType;
use std::collections::HashMap;

//===========================================================================//

/// The address spaces that a cartridge is connected to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Space {
    /// The CPU's 64KB address space.
    Cpu,
    /// The PPU's pattern table space, `$0000-$1FFF`.
    Ppu,
}

impl Space {
    /// Returns the range of addresses that bindings may cover in this space.
    pub fn range(self) -> Range {
        match self {
            Space::Cpu => Range::FULL,
            Space::Ppu => Range::with_bounds(0x0000, 0x1fff),
        }
    }

    fn num_lines(self) -> usize {
        (self.range().size() >> PageSize::LINE.log2()) as usize
    }
}

/// Whether an access reads or writes memory.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Access {
    /// A read access.
    Read,
    /// A write access.
    Write,
}

//===========================================================================//

/// The binding of one 256-byte line of an address space to a location in a
/// backing store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Binding {
    /// The memory class of the backing store.
    pub kind: MemoryType,
    /// The byte offset within the backing store of the first byte of the
    /// line.
    pub offset: usize,
    /// Whether writes that resolve to this line reach the store.
    pub writable: bool,
}

/// The result of resolving an address through a [`PageTable`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Resolved {
    /// The access lands on a byte of a backing store.
    Memory {
        /// The memory class of the backing store.
        kind: MemoryType,
        /// The byte offset within the backing store.
        offset: usize,
    },
    /// The access is a write into the mapper's register window, and must be
    /// forwarded to the mapper.
    Register,
    /// Nothing answers the access: reads float to the open-bus value and
    /// writes are discarded.
    OpenBus,
}

//===========================================================================//

/// Resolves a signed bank index to the byte offset of that bank within a
/// store of `capacity` bytes.  Negative indices count backwards from the end
/// of the store, so that -1 is the final bank.
pub fn resolve_bank(
    kind: MemoryType,
    bank: i32,
    page_size: PageSize,
    capacity: usize,
) -> Result<usize, BusError> {
    let out_of_range =
        || BusError::OutOfRange { kind, bank, page_size, capacity };
    let num_banks = page_size.pages_in(capacity).ok_or_else(out_of_range)?;
    let index = if bank < 0 {
        let back = bank.unsigned_abs() as usize;
        num_banks.checked_sub(back).ok_or_else(out_of_range)?
    } else {
        bank as usize
    };
    if index >= num_banks {
        return Err(out_of_range());
    }
    Ok(index * page_size.bytes() as usize)
}

//===========================================================================//

/// The current set of bank bindings for a cartridge's address spaces.
///
/// Each address space is tracked as an array of 256-byte lines, so bindings
/// of different page sizes can coexist and can never overlap: installing a
/// binding always overwrites whatever was bound to its lines before.  Lines
/// with no binding float to open bus.
pub struct PageTable {
    cpu: Box<[Option<Binding>]>,
    ppu: Box<[Option<Binding>]>,
    registers: Option<Range>,
    capacities: HashMap<MemoryType, usize>,
}

impl PageTable {
    /// Returns an empty page table for a cartridge whose backing stores have
    /// the given capacities, and whose mapper intercepts CPU writes to the
    /// `registers` window (if any).
    pub fn new<I>(capacities: I, registers: Option<Range>) -> PageTable
    where
        I: IntoIterator<Item = (MemoryType, usize)>,
    {
        PageTable {
            cpu: vec![None; Space::Cpu.num_lines()].into_boxed_slice(),
            ppu: vec![None; Space::Ppu.num_lines()].into_boxed_slice(),
            registers,
            capacities: capacities
                .into_iter()
                .filter(|&(_, capacity)| capacity > 0)
                .collect(),
        }
    }

    /// Returns the CPU address range that the mapper intercepts writes to.
    pub fn register_range(&self) -> Option<Range> {
        self.registers
    }

    /// Returns the capacity of the backing store of the given class, if the
    /// cartridge has one.
    pub fn capacity(&self, kind: MemoryType) -> Option<usize> {
        self.capacities.get(&kind).copied()
    }

    fn lines(&self, space: Space) -> &[Option<Binding>] {
        match space {
            Space::Cpu => &self.cpu,
            Space::Ppu => &self.ppu,
        }
    }

    fn lines_mut(&mut self, space: Space) -> &mut [Option<Binding>] {
        match space {
            Space::Cpu => &mut self.cpu,
            Space::Ppu => &mut self.ppu,
        }
    }

    /// Removes every binding from both address spaces.
    pub fn clear(&mut self) {
        self.cpu.fill(None);
        self.ppu.fill(None);
    }

    /// Removes the bindings for `range`, so that it floats to open bus.
    /// Partial lines at either end of the range are unbound too.
    pub fn unbind(&mut self, space: Space, range: Range) {
        let shift = PageSize::LINE.log2();
        let first = usize::from(range.start() >> shift);
        let last = usize::from(range.end() >> shift);
        let lines = self.lines_mut(space);
        let last = last.min(lines.len().saturating_sub(1));
        if first <= last {
            lines[first..=last].fill(None);
        }
    }

    /// Binds `range` of the given address space to consecutive bytes of the
    /// `kind` store starting at `offset`.
    ///
    /// The range must be made of whole 256-byte lines inside the space, and
    /// must fit inside the store.  If the binding cannot be installed, the
    /// range is left unbound, and so reads as open bus.
    pub fn bind(
        &mut self,
        space: Space,
        range: Range,
        kind: MemoryType,
        offset: usize,
        writable: bool,
    ) -> Result<(), BusError> {
        let result = self.check_binding(space, range, kind, offset);
        if let Err(error) = result {
            self.unbind(space, range);
            return Err(error);
        }
        let shift = PageSize::LINE.log2();
        let first = usize::from(range.start() >> shift);
        let writable = writable && kind.is_writable();
        let line_bytes = PageSize::LINE.bytes() as usize;
        let num_lines = (range.size() >> shift) as usize;
        let lines = self.lines_mut(space);
        for (index, line) in
            lines[first..first + num_lines].iter_mut().enumerate()
        {
            *line = Some(Binding {
                kind,
                offset: offset + index * line_bytes,
                writable,
            });
        }
        Ok(())
    }

    fn check_binding(
        &self,
        space: Space,
        range: Range,
        kind: MemoryType,
        offset: usize,
    ) -> Result<(), BusError> {
        if kind.is_chr() != (space == Space::Ppu) {
            return Err(BusError::WrongSpace { kind });
        }
        if !range.is_page_aligned(PageSize::LINE)
            || !space.range().is_superset(range)
        {
            return Err(BusError::Misaligned {
                range,
                page_size: PageSize::LINE,
            });
        }
        let capacity =
            self.capacity(kind).ok_or(BusError::MissingStore { kind })?;
        let size = range.size() as usize;
        if offset.checked_add(size).is_none_or(|end| end > capacity) {
            let page_size = PageSize::LINE;
            let bank = i32::try_from(offset >> page_size.log2())
                .unwrap_or(i32::MAX);
            return Err(BusError::OutOfRange {
                kind,
                bank,
                page_size,
                capacity,
            });
        }
        Ok(())
    }

    /// Binds `range` to bank number `bank` (with pages of `page_size`) of the
    /// `kind` store.  Negative bank numbers count back from the last bank.
    /// If the range spans several pages, consecutive banks are bound to it.
    pub fn bind_bank(
        &mut self,
        space: Space,
        range: Range,
        bank: i32,
        page_size: PageSize,
        kind: MemoryType,
        writable: bool,
    ) -> Result<(), BusError> {
        if !range.is_page_aligned(page_size)
            && !(range.size() < page_size.bytes()
                && range.is_page_aligned(PageSize::LINE))
        {
            self.unbind(space, range);
            return Err(BusError::Misaligned { range, page_size });
        }
        let capacity = match self.capacity(kind) {
            Some(capacity) => capacity,
            None => {
                self.unbind(space, range);
                return Err(BusError::MissingStore { kind });
            }
        };
        let mut result = Ok(());
        for (index, page) in range.pages(page_size).enumerate() {
            let page_bank = bank.wrapping_add(index as i32);
            let outcome = resolve_bank(kind, page_bank, page_size, capacity)
                .and_then(|offset| {
                    self.bind(space, page, kind, offset, writable)
                });
            if let Err(error) = outcome {
                self.unbind(space, page);
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    }

    /// Returns the binding for the line containing `addr`, if any.
    pub fn binding(&self, space: Space, addr: u16) -> Option<Binding> {
        let index = usize::from(addr >> PageSize::LINE.log2());
        self.lines(space).get(index).copied().flatten()
    }

    /// Resolves an access to `addr` in the given address space.
    ///
    /// This never has side effects, and gives the same answer for the same
    /// inputs until the table is next modified.
    pub fn resolve(&self, space: Space, addr: u16, access: Access) -> Resolved {
        if space == Space::Cpu
            && access == Access::Write
            && self.registers.is_some_and(|range| range.contains(addr))
        {
            return Resolved::Register;
        }
        match self.binding(space, addr) {
            Some(binding) if access == Access::Read || binding.writable => {
                let mask = PageSize::LINE.bytes() as usize - 1;
                let within = usize::from(addr) & mask;
                Resolved::Memory {
                    kind: binding.kind,
                    offset: binding.offset + within,
                }
            }
            _ => Resolved::OpenBus,
        }
    }

    /// Returns the current bindings of an address space, merging adjacent
    /// lines that map to consecutive bytes of the same store.
    pub fn mappings(&self, space: Space) -> Vec<(Range, Binding)> {
        let line_bytes = PageSize::LINE.bytes() as usize;
        let mut result: Vec<(Range, Binding)> = Vec::new();
        for (index, line) in self.lines(space).iter().enumerate() {
            let Some(binding) = *line else { continue };
            let start = (index * line_bytes) as u16;
            let end = start + (line_bytes as u16 - 1);
            if let Some((range, last)) = result.last_mut()
                && usize::from(range.end()) + 1 == usize::from(start)
                && last.kind == binding.kind
                && last.writable == binding.writable
                && last.offset + range.size() as usize == binding.offset
            {
                *range = Range::with_bounds(range.start(), end);
                continue;
            }
            result.push((Range::with_bounds(start, end), binding));
        }
        result
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        Access, Binding, BusError, PageTable, Resolved, Space, resolve_bank,
    };
    use crate::addr::{PageSize, Range};
    use crate::cart::MemoryType;

    fn make_table() -> PageTable {
        PageTable::new(
            [
                (MemoryType::PrgRom, 0x10000),
                (MemoryType::WorkRam, 0x2000),
                (MemoryType::ChrRom, 0x2000),
            ],
            Some(Range::single(0x6000)),
        )
    }

    #[test]
    fn positive_and_negative_banks() {
        for (page_size, capacity) in [
            (PageSize::KB8, 0x10000usize),
            (PageSize::KB16, 0x40000),
            (PageSize::KB1, 0x2000),
            (PageSize::KB32, 0x8000),
        ] {
            let num_banks = capacity / page_size.bytes() as usize;
            for bank in 0..num_banks {
                assert_eq!(
                    resolve_bank(
                        MemoryType::PrgRom,
                        bank as i32,
                        page_size,
                        capacity
                    ),
                    Ok(bank * page_size.bytes() as usize)
                );
            }
            for back in 1..=num_banks {
                assert_eq!(
                    resolve_bank(
                        MemoryType::PrgRom,
                        -(back as i32),
                        page_size,
                        capacity
                    ),
                    resolve_bank(
                        MemoryType::PrgRom,
                        (num_banks - back) as i32,
                        page_size,
                        capacity
                    )
                );
            }
        }
    }

    #[test]
    fn banks_out_of_range() {
        let error = BusError::OutOfRange {
            kind: MemoryType::PrgRom,
            bank: 8,
            page_size: PageSize::KB8,
            capacity: 0x10000,
        };
        assert_eq!(
            resolve_bank(MemoryType::PrgRom, 8, PageSize::KB8, 0x10000),
            Err(error)
        );
        assert!(
            resolve_bank(MemoryType::PrgRom, -9, PageSize::KB8, 0x10000)
                .is_err()
        );
        assert!(
            resolve_bank(MemoryType::PrgRom, 0, PageSize::KB16, 0x6000)
                .is_err()
        );
        assert!(
            resolve_bank(MemoryType::WorkRam, 0, PageSize::KB8, 0).is_err()
        );
    }

    #[test]
    fn unbound_lines_are_open_bus() {
        let table = make_table();
        assert_eq!(
            table.resolve(Space::Cpu, 0x8000, Access::Read),
            Resolved::OpenBus
        );
        assert_eq!(
            table.resolve(Space::Ppu, 0x0000, Access::Read),
            Resolved::OpenBus
        );
        assert_eq!(table.mappings(Space::Cpu), vec![]);
    }

    #[test]
    fn bind_and_resolve() {
        let mut table = make_table();
        let range = Range::with_bounds(0x8000, 0x9fff);
        table
            .bind_bank(
                Space::Cpu,
                range,
                -4,
                PageSize::KB8,
                MemoryType::PrgRom,
                false,
            )
            .unwrap();
        assert_eq!(
            table.resolve(Space::Cpu, 0x8000, Access::Read),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x8000 }
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x9fff, Access::Read),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x9fff }
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x8123, Access::Write),
            Resolved::OpenBus
        );
        assert_eq!(
            table.mappings(Space::Cpu),
            vec![(
                range,
                Binding {
                    kind: MemoryType::PrgRom,
                    offset: 0x8000,
                    writable: false
                }
            )]
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut table = make_table();
        table
            .bind_bank(
                Space::Cpu,
                Range::with_bounds(0x6000, 0x7fff),
                0,
                PageSize::KB8,
                MemoryType::WorkRam,
                true,
            )
            .unwrap();
        let first = table.resolve(Space::Cpu, 0x6abc, Access::Write);
        for _ in 0..4 {
            assert_eq!(table.resolve(Space::Cpu, 0x6abc, Access::Write), first);
        }
        assert_eq!(
            first,
            Resolved::Memory { kind: MemoryType::WorkRam, offset: 0x0abc }
        );
    }

    #[test]
    fn register_window_only_intercepts_writes() {
        let mut table = make_table();
        table
            .bind_bank(
                Space::Cpu,
                Range::with_bounds(0x6000, 0x7fff),
                1,
                PageSize::KB8,
                MemoryType::PrgRom,
                false,
            )
            .unwrap();
        assert_eq!(
            table.resolve(Space::Cpu, 0x6000, Access::Write),
            Resolved::Register
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x6000, Access::Read),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x2000 }
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0x6001, Access::Write),
            Resolved::OpenBus
        );
        // The PPU never sees the CPU's register window.
        assert_eq!(
            table.resolve(Space::Ppu, 0x6000, Access::Write),
            Resolved::OpenBus
        );
    }

    #[test]
    fn bindings_overwrite() {
        let mut table = make_table();
        let range = Range::with_bounds(0x8000, 0xbfff);
        table
            .bind_bank(
                Space::Cpu,
                range,
                0,
                PageSize::KB16,
                MemoryType::PrgRom,
                false,
            )
            .unwrap();
        table
            .bind_bank(
                Space::Cpu,
                Range::with_bounds(0xa000, 0xbfff),
                0,
                PageSize::KB8,
                MemoryType::WorkRam,
                true,
            )
            .unwrap();
        assert_eq!(
            table.resolve(Space::Cpu, 0x9000, Access::Read),
            Resolved::Memory { kind: MemoryType::PrgRom, offset: 0x1000 }
        );
        assert_eq!(
            table.resolve(Space::Cpu, 0xa000, Access::Read),
            Resolved::Memory { kind: MemoryType::WorkRam, offset: 0x0000 }
        );
        assert_eq!(table.mappings(Space::Cpu).len(), 2);
    }

    #[test]
    fn out_of_range_binding_leaves_open_bus() {
        let mut table = make_table();
        let range = Range::with_bounds(0x6000, 0x7fff);
        table
            .bind_bank(
                Space::Cpu,
                range,
                0,
                PageSize::KB8,
                MemoryType::PrgRom,
                false,
            )
            .unwrap();
        let result = table.bind_bank(
            Space::Cpu,
            range,
            0x20,
            PageSize::KB8,
            MemoryType::PrgRom,
            false,
        );
        assert!(matches!(result, Err(BusError::OutOfRange { bank: 0x20, .. })));
        assert_eq!(
            table.resolve(Space::Cpu, 0x6000, Access::Read),
            Resolved::OpenBus
        );
    }

    #[test]
    fn bad_bindings() {
        let mut table = make_table();
        assert_eq!(
            table.bind(
                Space::Cpu,
                Range::with_bounds(0x0000, 0x1fff),
                MemoryType::ChrRom,
                0,
                false
            ),
            Err(BusError::WrongSpace { kind: MemoryType::ChrRom })
        );
        assert_eq!(
            table.bind(
                Space::Cpu,
                Range::with_bounds(0x6000, 0x7fff),
                MemoryType::SaveRam,
                0,
                true
            ),
            Err(BusError::MissingStore { kind: MemoryType::SaveRam })
        );
        assert!(matches!(
            table.bind(
                Space::Cpu,
                Range::with_bounds(0x6010, 0x7fff),
                MemoryType::WorkRam,
                0,
                true
            ),
            Err(BusError::Misaligned { .. })
        ));
        assert!(matches!(
            table.bind(
                Space::Ppu,
                Range::with_bounds(0x0000, 0x3fff),
                MemoryType::ChrRom,
                0,
                false
            ),
            Err(BusError::Misaligned { .. })
        ));
    }

    #[test]
    fn rom_is_never_writable() {
        let mut table = make_table();
        table
            .bind(
                Space::Ppu,
                Range::with_bounds(0x0000, 0x1fff),
                MemoryType::ChrRom,
                0,
                true,
            )
            .unwrap();
        assert_eq!(
            table.resolve(Space::Ppu, 0x0123, Access::Write),
            Resolved::OpenBus
        );
        assert_eq!(
            table.resolve(Space::Ppu, 0x0123, Access::Read),
            Resolved::Memory { kind: MemoryType::ChrRom, offset: 0x0123 }
        );
    }
}

//===========================================================================//
