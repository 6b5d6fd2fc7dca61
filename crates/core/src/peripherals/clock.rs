// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::config::DcoFrequency;
use crate::regs::{self, CsCtl2};

pub const VLO_HZ: u32 = 8_300;
pub const XT1_HZ: u32 = 32_768;

const CSCTL0_LOCKED: u16 = 0x9600;

const CTL0: u16 = regs::CSCTL0 - regs::CS_BASE;
const CTL1: u16 = regs::CSCTL1 - regs::CS_BASE;
const CTL2: u16 = regs::CSCTL2 - regs::CS_BASE;
const CTL3: u16 = regs::CSCTL3 - regs::CS_BASE;

/// CS. CSCTL1..3 only accept writes while CSKEY is unlocked.
#[derive(Debug)]
pub struct ClockSystem {
    unlocked: bool,
    ctl1: u16,
    ctl2: u16,
    ctl3: u16,
}

impl Default for ClockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSystem {
    pub fn new() -> Self {
        Self {
            unlocked: false,
            ctl1: 0,
            ctl2: CsCtl2::RESET.bits(),
            // MCLK and SMCLK divided by 8
            ctl3: 0x0033,
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.unlocked
    }

    pub fn dco(&self) -> DcoFrequency {
        DcoFrequency::from_ctl1(self.ctl1)
    }

    fn source_hz(&self, sel: u16) -> u32 {
        match sel {
            0 => XT1_HZ,
            1 => VLO_HZ,
            3 => self.dco().hz(),
            _ => 0,
        }
    }

    fn divided(&self, sel_shift: u16) -> u32 {
        let sel = (self.ctl2 >> sel_shift) & 0x7;
        let div = (self.ctl3 >> sel_shift) & 0x7;
        self.source_hz(sel) >> div.min(5)
    }

    pub fn mclk_hz(&self) -> u32 {
        self.divided(0)
    }

    pub fn smclk_hz(&self) -> u32 {
        self.divided(4)
    }

    pub fn aclk_hz(&self) -> u32 {
        self.divided(8)
    }
}

impl crate::Peripheral for ClockSystem {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            CTL0 if self.unlocked => (regs::CSKEY_H as u16) << 8,
            CTL0 => CSCTL0_LOCKED,
            CTL1 => self.ctl1,
            CTL2 => self.ctl2,
            CTL3 => self.ctl3,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        if offset == CTL0 {
            self.unlocked = (value >> 8) as u8 == regs::CSKEY_H;
            return;
        }
        if !self.unlocked {
            tracing::warn!("CS write at +{:#04x} while locked ignored", offset);
            return;
        }
        match offset {
            CTL1 => self.ctl1 = value,
            CTL2 => self.ctl2 = value,
            CTL3 => self.ctl3 = value,
            _ => {}
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
            "locked": self.is_locked(),
            "mclk_hz": self.mclk_hz(),
            "smclk_hz": self.smclk_hz(),
            "aclk_hz": self.aclk_hz(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    #[test]
    fn test_locked_after_reset() {
        let mut cs = ClockSystem::new();
        cs.write(0x02, DcoFrequency::Mhz20.ctl1());
        assert!(cs.is_locked());
        assert_eq!(cs.dco(), DcoFrequency::Mhz5_33);
        assert_eq!(cs.peek(0x00), 0x9600);
    }

    #[test]
    fn test_unlock_configure_lock() {
        let mut cs = ClockSystem::new();
        cs.write_u8(0x01, regs::CSKEY_H);
        assert!(!cs.is_locked());
        cs.write(0x02, DcoFrequency::Mhz20.ctl1());
        cs.write(0x06, 0);
        cs.write(0x04, (CsCtl2::RESET | CsCtl2::SELA_VLOCLK).bits());
        cs.write_u8(0x01, regs::CSLOCK_H);

        assert!(cs.is_locked());
        assert_eq!(cs.mclk_hz(), 20_000_000);
        assert_eq!(cs.smclk_hz(), 20_000_000);
        assert_eq!(cs.aclk_hz(), VLO_HZ);
    }
}
