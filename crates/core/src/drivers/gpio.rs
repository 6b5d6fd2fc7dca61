// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::{PinConfig, Port};
use crate::hal::Gpio;
use crate::regs;

const fn out_dir(port: Port) -> (u16, u16) {
    match port {
        Port::P2 => (regs::P2OUT, regs::P2DIR),
        Port::P3 => (regs::P3OUT, regs::P3DIR),
        Port::PJ => (regs::PJOUT, regs::PJDIR),
    }
}

/// Digital I/O ports.
#[derive(Debug, Clone)]
pub struct Ports<B> {
    bus: B,
}

impl<B: Bus> Ports<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Gpio for Ports<B> {
    fn configure(&mut self, config: &PinConfig) {
        for group in &config.outputs {
            let (out, dir) = out_dir(group.port);
            self.bus.clear_bits_u8(out, group.mask);
            self.bus.set_bits_u8(dir, group.mask);
        }

        // Secondary function (SEL1 = 1, SEL0 = 0) is eUSCI_A0 on P2.0/P2.1
        self.bus.set_bits_u8(regs::P2SEL1, config.uart_mask);
        self.bus.clear_bits_u8(regs::P2SEL0, config.uart_mask);
    }
}
