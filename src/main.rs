use cartbus::bus::{BusPeeker, SimBus};
use cartbus::cart::{Cartridge, CartridgeImage};
use cartbus::config::Settings;
use cartbus::mapper::Space;
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    /// The folder under which battery RAM and save states are kept
    /// (defaults to $HOME).
    #[clap(long, global = true)]
    home: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Describes a cartridge and its power-on bank mapping.
    Info {
        /// The iNES file to load.
        rom: PathBuf,
    },
    /// Dumps memory as currently mapped.
    Peek {
        /// The iNES file to load.
        rom: PathBuf,
        /// The first address to dump (e.g. `$8000` or `0x8000`).
        #[clap(value_parser = parse_u16)]
        addr: u16,
        /// The number of bytes to dump.
        #[clap(long, default_value_t = 64)]
        len: usize,
        /// Dump the PPU's address space rather than the CPU's.
        #[clap(long)]
        ppu: bool,
    },
    /// Performs CPU writes (e.g. to mapper registers), then prints the
    /// resulting bank mapping.
    Write {
        /// The iNES file to load.
        rom: PathBuf,
        /// Writes to perform, in order, as `ADDR=VALUE` pairs.
        #[clap(value_parser = parse_write, required = true)]
        writes: Vec<(u16, u8)>,
        /// Save the resulting state into this numbered slot.
        #[clap(long)]
        slot: Option<u8>,
    },
    /// Restores a numbered save state, then prints the bank mapping.
    Load {
        /// The iNES file to load.
        rom: PathBuf,
        /// The save state slot to restore.
        slot: u8,
    },
}

//===========================================================================//

fn parse_number(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let (digits, radix) = if let Some(hex) = text.strip_prefix('$') {
        (hex, 16)
    } else if let Some(hex) =
        text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else {
        (text, 10)
    };
    u32::from_str_radix(digits, radix)
        .map_err(|error| format!("invalid number {text:?}: {error}"))
}

fn parse_u16(text: &str) -> Result<u16, String> {
    let value = parse_number(text)?;
    u16::try_from(value).map_err(|_| format!("{text} is not a 16-bit value"))
}

fn parse_write(text: &str) -> Result<(u16, u8), String> {
    let (addr, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, found {text:?}"))?;
    let value = parse_number(value)?;
    let value = u8::try_from(value)
        .map_err(|_| format!("{value} is not an 8-bit value"))?;
    Ok((parse_u16(addr)?, value))
}

//===========================================================================//

fn invalid_data<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, error)
}

fn load_cartridge(settings: &Settings, rom: &Path) -> io::Result<Cartridge> {
    let image = {
        let file = File::open(rom)?;
        CartridgeImage::read_ines(io::BufReader::new(file))?
    };
    let mut cartridge = Cartridge::load(image).map_err(invalid_data)?;
    let battery_path = settings.battery_path(rom);
    if cartridge.battery_ram().is_some() && battery_path.exists() {
        let mut data = Vec::new();
        File::open(&battery_path)?.read_to_end(&mut data)?;
        match cartridge.load_battery_ram(&data) {
            Ok(()) => log::info!("loaded {}", battery_path.display()),
            Err(error) => log::error!("{}: {error}", battery_path.display()),
        }
    }
    Ok(cartridge)
}

fn save_battery(
    settings: &Settings,
    rom: &Path,
    cartridge: &Cartridge,
) -> io::Result<()> {
    if let Some(data) = cartridge.battery_ram() {
        let path = settings.battery_path(rom);
        fs::create_dir_all(settings.save_dir())?;
        fs::write(&path, data)?;
        log::info!("saved {}", path.display());
    }
    Ok(())
}

fn print_mappings(cartridge: &Cartridge) {
    for (name, space) in [("CPU", Space::Cpu), ("PPU", Space::Ppu)] {
        println!("{name}:");
        for (range, binding) in cartridge.mappings(space) {
            println!(
                "  {range} -> {} ${:05X}{}",
                binding.kind,
                binding.offset,
                if binding.writable { "" } else { " (read-only)" }
            );
        }
    }
}

fn dump<R: Read>(mut reader: R, start: u16, len: usize) -> io::Result<()> {
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (row, chunk) in data.chunks(16).enumerate() {
        let addr = start.wrapping_add((row * 16) as u16);
        write!(out, "{addr:04X}:")?;
        for byte in chunk {
            write!(out, " {byte:02X}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

//===========================================================================//

struct PpuView<'a>(&'a Cartridge);

impl SimBus for PpuView<'_> {
    fn description(&self) -> String {
        format!("PPU view of {}", self.0.description())
    }

    fn peek_byte(&self, addr: u16) -> u8 {
        self.0.peek(Space::Ppu, addr)
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        self.peek_byte(addr)
    }

    fn write_byte(&mut self, _addr: u16, _data: u8) {}
}

//===========================================================================//

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = match cli.home {
        Some(home) => Settings::new(home),
        None => Settings::from_env()?,
    };
    match cli.command {
        Command::Info { rom } => {
            let cartridge = load_cartridge(&settings, &rom)?;
            println!("{}", cartridge.description());
            print_mappings(&cartridge);
        }
        Command::Peek { rom, addr, len, ppu } => {
            let cartridge = load_cartridge(&settings, &rom)?;
            if ppu {
                let view = PpuView(&cartridge);
                dump(BusPeeker::new(&view, addr), addr, len)?;
            } else {
                dump(BusPeeker::new(&cartridge, addr), addr, len)?;
            }
        }
        Command::Write { rom, writes, slot } => {
            let mut cartridge = load_cartridge(&settings, &rom)?;
            for (addr, value) in writes {
                cartridge.write_byte(addr, value);
            }
            print_mappings(&cartridge);
            save_battery(&settings, &rom, &cartridge)?;
            if let Some(slot) = slot {
                let path = settings.state_path(&rom, slot);
                fs::create_dir_all(settings.save_dir())?;
                let mut file = io::BufWriter::new(File::create(&path)?);
                cartridge.save_state(&mut file)?;
                file.flush()?;
                println!("saved {}", path.display());
            }
        }
        Command::Load { rom, slot } => {
            let mut cartridge = load_cartridge(&settings, &rom)?;
            let path = settings.state_path(&rom, slot);
            let mut reader = io::BufReader::new(File::open(&path)?);
            if let Err(error) = cartridge.load_state(&mut reader) {
                log::error!("{}: {error}", path.display());
                return Err(invalid_data(error.to_string()));
            }
            print_mappings(&cartridge);
        }
    }
    Ok(())
}

//===========================================================================//
