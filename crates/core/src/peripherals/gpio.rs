// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::regs;

const PORT_IN: u16 = 0x00;
const REGISTERS: usize = 0x10;

/// Two 8-bit ports sharing one register block (P1/P2, P3/P4, PJ). The odd
/// port is the low byte of each word.
#[derive(Debug, Default)]
pub struct PortPair {
    regs: [u16; REGISTERS],
}

impl PortPair {
    pub fn new() -> Self {
        Self::default()
    }

    fn reg(&self, offset: u16) -> u16 {
        self.regs
            .get((offset / 2) as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn out(&self) -> u16 {
        self.reg(regs::PORT_OUT)
    }

    pub fn dir(&self) -> u16 {
        self.reg(regs::PORT_DIR)
    }

    pub fn sel0(&self) -> u16 {
        self.reg(regs::PORT_SEL0)
    }

    pub fn sel1(&self) -> u16 {
        self.reg(regs::PORT_SEL1)
    }

    /// Pins configured as plain digital outputs.
    pub fn outputs(&self) -> u16 {
        self.dir() & !(self.sel0() | self.sel1())
    }
}

impl crate::Peripheral for PortPair {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            // Nothing drives the inputs; outputs read back their latch.
            PORT_IN => self.out() & self.dir(),
            _ => self.reg(offset),
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        if offset == PORT_IN {
            return;
        }
        if let Some(reg) = self.regs.get_mut((offset / 2) as usize) {
            *reg = value;
        }
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "out": self.out(),
            "dir": self.dir(),
            "sel0": self.sel0(),
            "sel1": self.sel1(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    #[test]
    fn test_byte_writes_land_in_their_half() {
        let mut port = PortPair::new();
        port.write_u8(regs::PORT_DIR + 1, 0x03);
        port.write_u8(regs::PORT_DIR, 0xF0);
        assert_eq!(port.dir(), 0x03F0);
        assert_eq!(port.read_u8(regs::PORT_DIR + 1), 0x03);
    }

    #[test]
    fn test_secondary_function_is_not_an_output() {
        let mut port = PortPair::new();
        port.write(regs::PORT_DIR, 0x0300);
        port.write(regs::PORT_SEL1, 0x0300);
        assert_eq!(port.outputs(), 0);
    }

    #[test]
    fn test_input_reflects_driven_outputs() {
        let mut port = PortPair::new();
        port.write(regs::PORT_OUT, 0x00FF);
        port.write(regs::PORT_DIR, 0x000F);
        assert_eq!(port.peek(PORT_IN), 0x000F);
        port.write(PORT_IN, 0xFFFF);
        assert_eq!(port.peek(PORT_IN), 0x000F);
    }
}
