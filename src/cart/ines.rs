use super::{BackingStore, MemoryType, Stores};
use std::io::{self, Read};

//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

const INES_MAGIC: &[u8; 4] = b"NES\x1a";
const TRAINER_SIZE: usize = 512;

const FLAGS6_BATTERY: u8 = 0b0000_0010;
const FLAGS6_TRAINER: u8 = 0b0000_0100;
const FLAGS7_NES2_MASK: u8 = 0b0000_1100;
const FLAGS7_NES2: u8 = 0b0000_1000;

//===========================================================================//

/// The contents of a cartridge image, as parsed from a file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CartridgeImage {
    /// The iNES mapper number.
    pub mapper_id: u16,
    /// The contents of PRG ROM.
    pub prg_rom: Box<[u8]>,
    /// The contents of CHR ROM (empty if the board uses CHR RAM).
    pub chr_rom: Box<[u8]>,
    /// The size of CHR RAM, in bytes.
    pub chr_ram_size: usize,
    /// The size of volatile PRG RAM, in bytes.
    pub work_ram_size: usize,
    /// The size of battery-backed PRG RAM, in bytes.
    pub save_ram_size: usize,
}

impl CartridgeImage {
    /// Reads an iNES or NES 2.0 file.
    pub fn read_ines<R: Read>(mut reader: R) -> io::Result<CartridgeImage> {
        let mut header = [0u8; 16];
        reader.read_exact(&mut header)?;
        if &header[..4] != INES_MAGIC {
            invalid_data!("not an iNES file");
        }
        let flags6 = header[6];
        let flags7 = header[7];
        let is_nes2 = (flags7 & FLAGS7_NES2_MASK) == FLAGS7_NES2;
        let battery = (flags6 & FLAGS6_BATTERY) != 0;
        let mut mapper_id = u16::from(flags6 >> 4) | u16::from(flags7 & 0xf0);

        let mut prg_units = usize::from(header[4]);
        let mut chr_units = usize::from(header[5]);
        let prg_ram_size;
        let chr_ram_size;
        if is_nes2 {
            mapper_id |= u16::from(header[8] & 0x0f) << 8;
            let prg_msb = header[9] & 0x0f;
            let chr_msb = header[9] >> 4;
            if prg_msb == 0x0f || chr_msb == 0x0f {
                invalid_data!("exponent-multiplier ROM sizes are unsupported");
            }
            prg_units |= usize::from(prg_msb) << 8;
            chr_units |= usize::from(chr_msb) << 8;
            prg_ram_size = (
                nes2_ram_size(header[10] & 0x0f),
                nes2_ram_size(header[10] >> 4),
            );
            chr_ram_size = nes2_ram_size(header[11] & 0x0f);
        } else {
            // iNES 1.0 can't express the absence of PRG RAM, so every board
            // gets at least 8KB.
            let size = usize::from(header[8].max(1)) * 0x2000;
            prg_ram_size = if battery { (0, size) } else { (size, 0) };
            chr_ram_size = if chr_units == 0 { 0x2000 } else { 0 };
        }

        if (flags6 & FLAGS6_TRAINER) != 0 {
            let mut trainer = [0u8; TRAINER_SIZE];
            reader.read_exact(&mut trainer)?;
        }
        let prg_rom = read_block(&mut reader, prg_units * 0x4000, "PRG ROM")?;
        let chr_rom = read_block(&mut reader, chr_units * 0x2000, "CHR ROM")?;
        let (work_ram_size, save_ram_size) = prg_ram_size;
        Ok(CartridgeImage {
            mapper_id,
            prg_rom,
            chr_rom,
            chr_ram_size,
            work_ram_size,
            save_ram_size,
        })
    }

    /// Converts this image into the set of backing stores it describes.
    /// RAM stores start out zero-filled.
    pub fn into_stores(self) -> Stores {
        let mut stores = Stores::new();
        stores.insert(BackingStore::new(MemoryType::PrgRom, self.prg_rom));
        stores.insert(BackingStore::new(MemoryType::ChrRom, self.chr_rom));
        stores.insert(BackingStore::zeroed(
            MemoryType::ChrRam,
            self.chr_ram_size,
        ));
        stores.insert(BackingStore::zeroed(
            MemoryType::WorkRam,
            self.work_ram_size,
        ));
        stores.insert(BackingStore::zeroed(
            MemoryType::SaveRam,
            self.save_ram_size,
        ));
        stores
    }
}

fn nes2_ram_size(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64 << shift }
}

fn read_block<R: Read>(
    reader: &mut R,
    size: usize,
    what: &str,
) -> io::Result<Box<[u8]>> {
    let mut data = vec![0u8; size];
    if let Err(error) = reader.read_exact(&mut data) {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            invalid_data!("file is too short for {} bytes of {}", size, what);
        }
        return Err(error);
    }
    Ok(data.into_boxed_slice())
}

//===========================================================================//


//===========================================================================//
