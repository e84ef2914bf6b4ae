use super::{OPEN_BUS, SimBus};
use crate::cart::Cartridge;

//===========================================================================//

const RAM_SIZE: usize = 0x800;

//===========================================================================//

/// A simulated NES CPU memory bus.
///
/// The console's 2KB of internal RAM is mirrored through `$0000-$1FFF`.
/// The PPU and APU registers aren't simulated, and float to open bus.
/// Everything from `$4020` up is delegated to the cartridge.
pub struct NesBus {
    ram: Box<[u8; RAM_SIZE]>,
    cart: Cartridge,
}

impl NesBus {
    /// Constructs a simulated NES CPU memory bus with the given cartridge
    /// inserted.
    pub fn with_cartridge(cartridge: Cartridge) -> NesBus {
        NesBus { ram: Box::new([0u8; RAM_SIZE]), cart: cartridge }
    }

    /// Returns the inserted cartridge.
    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    /// Returns the inserted cartridge, mutably.
    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    /// Removes the cartridge from the console.
    pub fn into_cartridge(self) -> Cartridge {
        self.cart
    }
}

impl SimBus for NesBus {
    fn description(&self) -> String {
        format!("NES with {}", self.cart.description())
    }

    fn peek_byte(&self, addr: u16) -> u8 {
        // See https://www.nesdev.org/wiki/CPU_memory_map
        match addr {
            0x0000..0x2000 => self.ram[usize::from(addr) & (RAM_SIZE - 1)],
            0x2000..0x4020 => OPEN_BUS,
            0x4020.. => self.cart.peek_byte(addr),
        }
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..0x2000 => self.ram[usize::from(addr) & (RAM_SIZE - 1)],
            0x2000..0x4020 => OPEN_BUS,
            0x4020.. => self.cart.read_byte(addr),
        }
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..0x2000 => {
                self.ram[usize::from(addr) & (RAM_SIZE - 1)] = data
            }
            0x2000..0x4020 => {}
            0x4020.. => self.cart.write_byte(addr, data),
        }
    }
}

//===========================================================================//


//===========================================================================//
