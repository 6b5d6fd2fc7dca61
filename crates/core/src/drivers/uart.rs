// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::SerialConfig;
use crate::hal::Serial;
use crate::regs::{self, UcaCtlw0};

/// eUSCI_A0 in UART mode, clocked from SMCLK.
#[derive(Debug, Clone)]
pub struct UartA0<B> {
    bus: B,
}

impl<B: Bus> UartA0<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Serial for UartA0<B> {
    fn configure(&mut self, config: &SerialConfig) {
        self.bus.set_bits_u16(regs::UCA0CTLW0, UcaCtlw0::UCSWRST.bits());
        self.bus.set_bits_u16(regs::UCA0CTLW0, UcaCtlw0::UCSSEL_SMCLK.bits());

        self.bus.write_u16(regs::UCA0BRW, config.divisor.brw);
        self.bus.write_u16(regs::UCA0MCTLW, config.divisor.mctlw());

        // Releasing reset raises UCTXIFG, which is what the transmit
        // channel triggers on.
        self.bus.clear_bits_u16(regs::UCA0CTLW0, UcaCtlw0::UCSWRST.bits());
    }
}
