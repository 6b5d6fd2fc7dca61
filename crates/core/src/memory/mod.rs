// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// FR5739 RAM.
pub const RAM_BASE: u16 = 0x1C00;
pub const RAM_SIZE: usize = 0x0400;

/// A simple flat memory storage
#[derive(Debug, Clone)]
pub struct LinearMemory {
    pub data: Vec<u8>,
    pub base_addr: u16,
}

impl LinearMemory {
    pub fn new(size: usize, base_addr: u16) -> Self {
        Self {
            data: vec![0; size],
            base_addr,
        }
    }

    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.base_addr && ((addr - self.base_addr) as usize) < self.data.len()
    }

    pub fn read_u8(&self, addr: u16) -> Option<u8> {
        if self.contains(addr) {
            Some(self.data[(addr - self.base_addr) as usize])
        } else {
            None
        }
    }

    pub fn write_u8(&mut self, addr: u16, value: u8) -> bool {
        if self.contains(addr) {
            self.data[(addr - self.base_addr) as usize] = value;
            true
        } else {
            false
        }
    }

    // Little Endian
    pub fn read_u16(&self, addr: u16) -> Option<u16> {
        let lo = self.read_u8(addr)? as u16;
        let hi = self.read_u8(addr.wrapping_add(1))? as u16;
        Some(lo | (hi << 8))
    }

    pub fn write_u16(&mut self, addr: u16, value: u16) -> bool {
        if !self.contains(addr) || !self.contains(addr.wrapping_add(1)) {
            return false;
        }
        self.write_u8(addr, value as u8);
        self.write_u8(addr + 1, (value >> 8) as u8);
        true
    }

    /// The `len` bytes starting at `addr`, if the range is mapped.
    pub fn slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        if !self.contains(addr) {
            return None;
        }
        let start = (addr - self.base_addr) as usize;
        self.data.get(start..start + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_bounds() {
        let mut ram = LinearMemory::new(RAM_SIZE, RAM_BASE);
        assert!(ram.write_u8(RAM_BASE, 0xAB));
        assert_eq!(ram.read_u8(RAM_BASE), Some(0xAB));
        assert!(!ram.write_u8(RAM_BASE - 1, 0));
        assert_eq!(ram.read_u8(RAM_BASE + RAM_SIZE as u16), None);
    }

    #[test]
    fn test_word_access_little_endian() {
        let mut ram = LinearMemory::new(RAM_SIZE, RAM_BASE);
        assert!(ram.write_u16(RAM_BASE + 2, 0xBEEF));
        assert_eq!(ram.read_u8(RAM_BASE + 2), Some(0xEF));
        assert_eq!(ram.read_u16(RAM_BASE + 2), Some(0xBEEF));
        // Straddles the end of RAM
        assert!(!ram.write_u16(RAM_BASE + RAM_SIZE as u16 - 1, 0x1234));
    }
}
