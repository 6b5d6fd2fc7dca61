// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Irq;
use crate::regs::{self, TaCctl, TaCtl};

const CTL: u16 = regs::TA0CTL - regs::TA0_BASE;
const CCTL0: u16 = regs::TA0CCTL0 - regs::TA0_BASE;
const R: u16 = regs::TA0R - regs::TA0_BASE;
const CCR0: u16 = regs::TA0CCR0 - regs::TA0_BASE;
const IV: u16 = regs::TA0IV - regs::TA0_BASE;
/// CCR0..CCR2 are modelled.
const CCRS: usize = 3;

const MODE_MASK: u16 = TaCtl::MC0.bits() | TaCtl::MC1.bits();

/// Timer_A with three capture/compare blocks.
///
/// Only up mode counts. The IV register reports the highest-priority flag
/// whose interrupt is enabled and clears it on read; CCR0 has its own vector
/// and never shows up there.
#[derive(Debug, Default)]
pub struct TimerA {
    ctl: u16,
    cctl: [u16; CCRS],
    ccr: [u16; CCRS],
    r: u16,
    prescale: u16,
    overflows: u64,
}

impl TimerA {
    pub fn new() -> Self {
        Self::default()
    }

    fn ctl(&self) -> TaCtl {
        TaCtl::from_bits_truncate(self.ctl)
    }

    pub fn counter(&self) -> u16 {
        self.r
    }

    pub fn period(&self) -> u16 {
        self.ccr[0]
    }

    /// Times the counter has wrapped to zero.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.ctl().contains(TaCtl::TAIE)
    }

    pub fn overflow_pending(&self) -> bool {
        self.ctl().contains(TaCtl::TAIFG)
    }

    pub fn is_running(&self) -> bool {
        self.ctl & MODE_MASK == TaCtl::MC_UP.bits()
    }

    /// Latch TAIFG as if the counter had wrapped.
    pub fn raise_overflow(&mut self) {
        self.ctl |= TaCtl::TAIFG.bits();
    }

    /// Latch CCIFG on block `n` (1 or 2) and enable its interrupt.
    pub fn raise_capture_compare(&mut self, n: u8) {
        if let Some(cctl) = self.cctl.get_mut(n as usize).filter(|_| n > 0) {
            *cctl |= (TaCctl::CCIFG | TaCctl::CCIE).bits();
        }
    }

    fn divider(&self) -> u16 {
        1 << ((self.ctl >> 6) & 0x3)
    }

    /// Highest-priority enabled source as (IV value, flag owner).
    fn vector(&self) -> Option<(u16, Source)> {
        for n in 1..CCRS {
            let cctl = TaCctl::from_bits_truncate(self.cctl[n]);
            if cctl.contains(TaCctl::CCIFG | TaCctl::CCIE) {
                return Some((2 * n as u16, Source::CaptureCompare(n)));
            }
        }
        let ctl = self.ctl();
        if ctl.contains(TaCtl::TAIFG | TaCtl::TAIE) {
            return Some((regs::TAIV_TAIFG, Source::Overflow));
        }
        None
    }
}

enum Source {
    CaptureCompare(usize),
    Overflow,
}

impl crate::Peripheral for TimerA {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            CTL => self.ctl,
            CCTL0..=0x06 => self.cctl[((offset - CCTL0) / 2) as usize],
            R => self.r,
            CCR0..=0x16 => self.ccr[((offset - CCR0) / 2) as usize],
            IV => self.vector().map_or(regs::TAIV_NONE, |(iv, _)| iv),
            _ => 0,
        }
    }

    fn read(&mut self, offset: u16) -> u16 {
        if offset != IV {
            return self.peek(offset);
        }
        match self.vector() {
            Some((iv, Source::CaptureCompare(n))) => {
                self.cctl[n] &= !TaCctl::CCIFG.bits();
                iv
            }
            Some((iv, Source::Overflow)) => {
                self.ctl &= !TaCtl::TAIFG.bits();
                iv
            }
            None => regs::TAIV_NONE,
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        match offset {
            CTL => {
                if value & TaCtl::TACLR.bits() != 0 {
                    self.r = 0;
                    self.prescale = 0;
                }
                self.ctl = value & !TaCtl::TACLR.bits();
            }
            CCTL0..=0x06 => self.cctl[((offset - CCTL0) / 2) as usize] = value,
            R => self.r = value,
            CCR0..=0x16 => self.ccr[((offset - CCR0) / 2) as usize] = value,
            _ => {}
        }
    }

    fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.prescale += 1;
        if self.prescale < self.divider() {
            return;
        }
        self.prescale = 0;

        if self.r >= self.ccr[0] {
            self.r = 0;
            self.ctl |= TaCtl::TAIFG.bits();
            self.overflows += 1;
        } else {
            self.r += 1;
            if self.r == self.ccr[0] {
                self.cctl[0] |= TaCctl::CCIFG.bits();
            }
        }
    }

    fn irq(&self) -> Option<Irq> {
        self.vector().map(|_| Irq::Timer0A1)
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "counter": self.r,
            "period": self.ccr[0],
            "running": self.is_running(),
            "interrupt_enabled": self.interrupt_enabled(),
            "overflow_pending": self.overflow_pending(),
            "overflows": self.overflows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    fn up_mode(period: u16) -> TimerA {
        let mut timer = TimerA::new();
        timer.write(CCR0, period);
        let ctl = TaCtl::TASSEL_ACLK | TaCtl::MC_UP | TaCtl::TACLR | TaCtl::TAIE;
        timer.write(CTL, ctl.bits());
        timer
    }

    #[test]
    fn test_up_mode_period() {
        let mut timer = up_mode(4);
        // 0 -> 4 is four ticks, wrapping to 0 is the fifth
        for _ in 0..4 {
            timer.tick();
            assert!(!timer.overflow_pending());
        }
        timer.tick();
        assert!(timer.overflow_pending());
        assert_eq!(timer.counter(), 0);
        assert_eq!(timer.irq(), Some(Irq::Timer0A1));
    }

    #[test]
    fn test_iv_read_clears_overflow() {
        let mut timer = up_mode(1);
        timer.tick();
        timer.tick();
        assert_eq!(timer.peek(IV), regs::TAIV_TAIFG);
        assert_eq!(timer.read(IV), regs::TAIV_TAIFG);
        assert_eq!(timer.read(IV), regs::TAIV_NONE);
        assert_eq!(timer.irq(), None);
    }

    #[test]
    fn test_masked_overflow_stays_latched() {
        let mut timer = up_mode(1);
        timer.write(CTL, timer.peek(CTL) & !TaCtl::TAIE.bits());
        timer.tick();
        timer.tick();
        assert!(timer.overflow_pending());
        assert_eq!(timer.irq(), None);
        assert_eq!(timer.read(IV), regs::TAIV_NONE);
        assert!(timer.overflow_pending());
    }

    #[test]
    fn test_capture_compare_outranks_overflow() {
        let mut timer = up_mode(100);
        timer.raise_overflow();
        timer.raise_capture_compare(2);
        assert_eq!(timer.read(IV), 0x04);
        assert_eq!(timer.read(IV), regs::TAIV_TAIFG);
    }

    #[test]
    fn test_input_divider() {
        let mut timer = up_mode(10);
        timer.write(CTL, timer.peek(CTL) | TaCtl::ID0.bits() | TaCtl::ID1.bits());
        for _ in 0..7 {
            timer.tick();
        }
        assert_eq!(timer.counter(), 0);
        timer.tick();
        assert_eq!(timer.counter(), 1);
    }
}
