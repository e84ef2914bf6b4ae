use std::fmt;

//===========================================================================//

/// The classes of cartridge memory that a mapper can bind into an address
/// space.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MemoryType {
    /// Program ROM, visible to the CPU.
    PrgRom,
    /// Volatile work RAM on the cartridge, visible to the CPU.
    WorkRam,
    /// Battery-backed work RAM, visible to the CPU.
    SaveRam,
    /// Character (pattern table) ROM, visible to the PPU.
    ChrRom,
    /// Character (pattern table) RAM, visible to the PPU.
    ChrRam,
}

impl MemoryType {
    /// Returns true if the CPU or PPU can write to memory of this class.
    pub fn is_writable(self) -> bool {
        match self {
            MemoryType::PrgRom | MemoryType::ChrRom => false,
            MemoryType::WorkRam | MemoryType::SaveRam | MemoryType::ChrRam => {
                true
            }
        }
    }

    /// Returns true if this memory class sits on the PPU's bus rather than
    /// the CPU's.
    pub fn is_chr(self) -> bool {
        matches!(self, MemoryType::ChrRom | MemoryType::ChrRam)
    }

    /// Returns a short name for this memory class, as used in save state
    /// field names and debugger output.
    pub fn name(self) -> &'static str {
        match self {
            MemoryType::PrgRom => "prg_rom",
            MemoryType::WorkRam => "work_ram",
            MemoryType::SaveRam => "save_ram",
            MemoryType::ChrRom => "chr_rom",
            MemoryType::ChrRam => "chr_ram",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

//===========================================================================//

/// A fixed-size block of cartridge memory of a single class.
///
/// The size of a store never changes after creation.  The contents of ROM
/// stores are only ever changed by the image loader; RAM stores are
/// mutated by bus writes that resolve into them.
#[derive(Clone, Eq, PartialEq)]
pub struct BackingStore {
    kind: MemoryType,
    data: Box<[u8]>,
}

impl BackingStore {
    /// Returns a new store of the given class holding `data`.
    pub fn new(kind: MemoryType, data: Box<[u8]>) -> BackingStore {
        BackingStore { kind, data }
    }

    /// Returns a new zero-filled store of the given class and size.
    pub fn zeroed(kind: MemoryType, size: usize) -> BackingStore {
        BackingStore { kind, data: vec![0u8; size].into_boxed_slice() }
    }

    /// Returns the memory class of this store.
    pub fn kind(&self) -> MemoryType {
        self.kind
    }

    /// Returns the capacity of this store, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if this store has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the full contents of this store.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns a human-readable description of this store.
    pub fn description(&self) -> String {
        let size = self.data.len();
        if size < 1024 {
            format!("{size}B {}", self.kind)
        } else if size < 1024 * 1024 {
            format!("{}kB {}", size >> 10, self.kind)
        } else {
            format!("{}MB {}", size >> 20, self.kind)
        }
    }
}

impl fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "BackingStore({})", self.description())
    }
}

//===========================================================================//

/// The set of backing stores belonging to one loaded cartridge, at most one
/// per memory class.
#[derive(Clone, Debug, Default)]
pub struct Stores {
    stores: Vec<BackingStore>,
}

impl Stores {
    /// Returns an empty set of stores.
    pub fn new() -> Stores {
        Stores { stores: Vec::new() }
    }

    /// Adds a store, replacing any existing store of the same class.  Empty
    /// stores are dropped, since nothing can be mapped from them.
    pub fn insert(&mut self, store: BackingStore) {
        self.stores.retain(|existing| existing.kind != store.kind);
        if !store.is_empty() {
            self.stores.push(store);
            self.stores.sort_by_key(BackingStore::kind);
        }
    }

    /// Returns the store of the given class, if the cartridge has one.
    pub fn get(&self, kind: MemoryType) -> Option<&BackingStore> {
        self.stores.iter().find(|store| store.kind == kind)
    }

    pub(crate) fn get_mut(
        &mut self,
        kind: MemoryType,
    ) -> Option<&mut BackingStore> {
        self.stores.iter_mut().find(|store| store.kind == kind)
    }

    /// Returns the capacity of the store of the given class, or zero if the
    /// cartridge has no such store.
    pub fn capacity(&self, kind: MemoryType) -> usize {
        self.get(kind).map_or(0, BackingStore::len)
    }

    /// Returns an iterator over all stores, ordered by memory class.
    pub fn iter(&self) -> impl Iterator<Item = &BackingStore> {
        self.stores.iter()
    }

    pub(crate) fn read(&self, kind: MemoryType, offset: usize) -> Option<u8> {
        self.get(kind).and_then(|store| store.data.get(offset).copied())
    }

    pub(crate) fn write(&mut self, kind: MemoryType, offset: usize, data: u8) {
        if let Some(byte) =
            self.get_mut(kind).and_then(|store| store.data.get_mut(offset))
        {
            *byte = data;
        }
    }
}

//===========================================================================//


//===========================================================================//
