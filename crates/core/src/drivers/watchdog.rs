// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::hal::Watchdog;
use crate::regs;

/// WDT_A
#[derive(Debug, Clone)]
pub struct WatchdogA<B> {
    bus: B,
}

impl<B: Bus> WatchdogA<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Watchdog for WatchdogA<B> {
    fn disable(&mut self) {
        self.bus.write_u16(regs::WDTCTL, regs::WDTPW | regs::WDTHOLD);
    }
}
