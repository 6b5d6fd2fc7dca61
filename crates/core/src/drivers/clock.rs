// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::ClockConfig;
use crate::hal::Clocks;
use crate::regs::{self, CsCtl2};

/// Clock system. Registers are write-protected by CSKEY.
#[derive(Debug, Clone)]
pub struct ClockSystem<B> {
    bus: B,
}

impl<B: Bus> ClockSystem<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Clocks for ClockSystem<B> {
    fn configure(&mut self, config: &ClockConfig) {
        self.bus.write_u8(regs::CSCTL0_H, regs::CSKEY_H);
        self.bus.write_u16(regs::CSCTL1, config.dco.ctl1());
        // MCLK, SMCLK and ACLK undivided
        self.bus.write_u16(regs::CSCTL3, 0);
        self.bus.set_bits_u16(regs::CSCTL2, CsCtl2::SELA_VLOCLK.bits());
        self.bus.write_u8(regs::CSCTL0_H, regs::CSLOCK_H);
    }
}
