// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#[cfg(feature = "std")]
mod system;

#[cfg(feature = "std")]
pub use system::{Irq, PeripheralEntry, SharedBus, SystemBus};

/// Access to the 16-bit peripheral address space.
///
/// Reads take `&mut self` because several registers (interrupt vectors,
/// conversion results) clear flags when read.
pub trait Bus {
    fn read_u8(&mut self, addr: u16) -> u8;
    fn write_u8(&mut self, addr: u16, value: u8);
    fn read_u16(&mut self, addr: u16) -> u16;
    fn write_u16(&mut self, addr: u16, value: u16);

    fn set_bits_u16(&mut self, addr: u16, mask: u16) {
        let value = self.read_u16(addr);
        self.write_u16(addr, value | mask);
    }

    fn clear_bits_u16(&mut self, addr: u16, mask: u16) {
        let value = self.read_u16(addr);
        self.write_u16(addr, value & !mask);
    }

    fn set_bits_u8(&mut self, addr: u16, mask: u8) {
        let value = self.read_u8(addr);
        self.write_u8(addr, value | mask);
    }

    fn clear_bits_u8(&mut self, addr: u16, mask: u8) {
        let value = self.read_u8(addr);
        self.write_u8(addr, value & !mask);
    }
}

/// Volatile access to the real peripheral space.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Only valid on the target device, where every address used by the
    /// drivers is a mapped peripheral register.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl Bus for Mmio {
    fn read_u8(&mut self, addr: u16) -> u8 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u16) }
    }

    fn write_u16(&mut self, addr: u16, value: u16) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u16, value) }
    }
}
