// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::regs;
use crate::SimulationError;

const WDTCNTCL: u16 = 0x0008;
/// High byte returned when reading WDTCTL.
const WDTCTL_READBACK: u16 = 0x6900;

/// WDT_A. Runs from reset until held; a write without the password is a
/// reset condition.
#[derive(Debug)]
pub struct Watchdog {
    ctl: u8,
    counter: u64,
    timeout: u64,
    expired: bool,
    fault: Option<SimulationError>,
}

impl Watchdog {
    pub fn new(timeout: u64) -> Self {
        Self {
            ctl: 0x04,
            counter: 0,
            timeout,
            expired: false,
            fault: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.ctl as u16 & regs::WDTHOLD != 0
    }
}

impl crate::Peripheral for Watchdog {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            0x00 => WDTCTL_READBACK | self.ctl as u16,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        if offset != 0x00 {
            return;
        }
        if value & 0xFF00 != regs::WDTPW {
            self.fault = Some(SimulationError::WatchdogViolation(value));
            return;
        }
        if value & WDTCNTCL != 0 {
            self.counter = 0;
        }
        self.ctl = (value & !WDTCNTCL) as u8;
    }

    fn tick(&mut self) {
        if self.is_held() || self.expired {
            return;
        }
        self.counter += 1;
        if self.counter >= self.timeout {
            self.expired = true;
            self.fault = Some(SimulationError::WatchdogExpired(self.counter));
        }
    }

    fn take_fault(&mut self) -> Option<SimulationError> {
        self.fault.take()
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "held": self.is_held(),
            "counter": self.counter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    #[test]
    fn test_hold_stops_counter() {
        let mut wdt = Watchdog::new(4);
        wdt.write(0, regs::WDTPW | regs::WDTHOLD);
        for _ in 0..10 {
            wdt.tick();
        }
        assert!(wdt.is_held());
        assert_eq!(wdt.take_fault(), None);
        assert_eq!(wdt.peek(0), 0x6980);
    }

    #[test]
    fn test_expires_when_running() {
        let mut wdt = Watchdog::new(4);
        for _ in 0..4 {
            wdt.tick();
        }
        assert_eq!(wdt.take_fault(), Some(SimulationError::WatchdogExpired(4)));
        wdt.tick();
        assert_eq!(wdt.take_fault(), None);
    }

    #[test]
    fn test_bad_password() {
        let mut wdt = Watchdog::new(4);
        wdt.write(0, 0x1280);
        assert_eq!(
            wdt.take_fault(),
            Some(SimulationError::WatchdogViolation(0x1280))
        );
        assert!(!wdt.is_held());
    }
}
