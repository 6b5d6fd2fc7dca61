// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::TimerConfig;
use crate::hal::{Timer, TimerVector};
use crate::regs::{self, TaCtl};

/// Timer_A0 in up mode from ACLK.
#[derive(Debug, Clone)]
pub struct TimerA0<B> {
    bus: B,
}

impl<B: Bus> TimerA0<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Timer for TimerA0<B> {
    fn configure(&mut self, config: &TimerConfig) {
        self.bus.write_u16(regs::TA0CCR0, config.period);
        let ctl = TaCtl::TASSEL_ACLK | TaCtl::MC_UP | TaCtl::TACLR | TaCtl::TAIE;
        self.bus.write_u16(regs::TA0CTL, ctl.bits());
    }

    fn enable_interrupt(&mut self) {
        self.bus.set_bits_u16(regs::TA0CTL, TaCtl::TAIE.bits());
    }

    fn disable_interrupt(&mut self) {
        self.bus.clear_bits_u16(regs::TA0CTL, TaCtl::TAIE.bits());
    }

    fn interrupt_enabled(&mut self) -> bool {
        TaCtl::from_bits_truncate(self.bus.read_u16(regs::TA0CTL)).contains(TaCtl::TAIE)
    }

    fn clear_overflow(&mut self) {
        self.bus.clear_bits_u16(regs::TA0CTL, TaCtl::TAIFG.bits());
    }

    fn pending(&mut self) -> TimerVector {
        TimerVector::from_iv(self.bus.read_u16(regs::TA0IV))
    }
}
