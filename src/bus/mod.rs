//! Facilities for simulating a memory bus.

use std::io::{self, Read};

mod nes;

pub use nes::NesBus;

//===========================================================================//

/// The value read from an address that nothing drives.
pub const OPEN_BUS: u8 = 0;

//===========================================================================//

/// A simulated memory bus with a 16-bit address space.
pub trait SimBus {
    /// Returns a human-readable description of this simulated memory bus.
    fn description(&self) -> String;

    /// Returns the value of a single byte in memory, if the processor were to
    /// read it, but without performing any side effects that would occur if
    /// the processor actually read the byte.
    fn peek_byte(&self, addr: u16) -> u8;

    /// Reads a single byte from memory.
    ///
    /// Note that this is a `&mut self` method, since some hardware registers
    /// may have side effects when read.
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Writes a single byte to memory.
    ///
    /// Depending on the implementation, the write may be ignored (e.g. if the
    /// address maps to read-only memory), and/or have other side effects.
    fn write_byte(&mut self, addr: u16, data: u8);
}

//===========================================================================//

/// Adapts a bus into an [`io::Read`] that peeks consecutive addresses,
/// wrapping around at the top of the address space.
pub struct BusPeeker<'a> {
    bus: &'a dyn SimBus,
    addr: u16,
}

impl<'a> BusPeeker<'a> {
    /// Returns a reader that starts peeking at `start_addr`.
    pub fn new(bus: &'a dyn SimBus, start_addr: u16) -> BusPeeker<'a> {
        BusPeeker { bus, addr: start_addr }
    }
}

impl Read for BusPeeker<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for byte in buf.iter_mut() {
            *byte = self.bus.peek_byte(self.addr);
            self.addr = self.addr.wrapping_add(1);
        }
        Ok(buf.len())
    }
}

//===========================================================================//


//===========================================================================//
