// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::config::BaudDivisor;
use crate::regs::{self, UcaCtlw0, UcaIfg};

const CTLW0: u16 = regs::UCA0CTLW0 - regs::UCA0_BASE;
const BRW: u16 = regs::UCA0BRW - regs::UCA0_BASE;
const MCTLW: u16 = regs::UCA0MCTLW - regs::UCA0_BASE;
const STATW: u16 = regs::UCA0STATW - regs::UCA0_BASE;
const TXBUF: u16 = regs::UCA0TXBUF - regs::UCA0_BASE;
const IE: u16 = regs::UCA0IE - regs::UCA0_BASE;
const IFG: u16 = regs::UCA0IFG - regs::UCA0_BASE;

/// eUSCI_A in UART mode, transmit side only.
///
/// TXBUF feeds a shift register; TXIFG is raised as soon as TXBUF is free
/// again, so a second character can be queued while the first is shifted
/// out. Every shifted character is appended to the transmitted log.
#[derive(Debug)]
pub struct Uart {
    ctlw0: u16,
    brw: u16,
    mctlw: u16,
    ie: u16,
    ifg: u16,
    txbuf: Option<u8>,
    shifter: Option<(u8, u32)>,
    byte_ticks: u32,
    transmitted: Vec<u8>,
}

impl Uart {
    pub fn new(byte_ticks: u32) -> Self {
        Self {
            ctlw0: UcaCtlw0::UCSWRST.bits(),
            brw: 0,
            mctlw: 0,
            ie: 0,
            ifg: 0,
            txbuf: None,
            shifter: None,
            byte_ticks: byte_ticks.max(1),
            transmitted: Vec::new(),
        }
    }

    pub fn in_reset(&self) -> bool {
        self.ctlw0 & UcaCtlw0::UCSWRST.bits() != 0
    }

    pub fn is_busy(&self) -> bool {
        self.txbuf.is_some() || self.shifter.is_some()
    }

    pub fn divisor(&self) -> BaudDivisor {
        BaudDivisor::from_registers(self.brw, self.mctlw)
    }

    /// Bit rate produced by the current divisor from a `clock_hz` source.
    pub fn baud(&self, clock_hz: u32) -> u32 {
        self.divisor().effective_baud(clock_hz)
    }

    pub fn transmitted(&self) -> &[u8] {
        &self.transmitted
    }

    fn tx_ready(&self) -> bool {
        !self.in_reset() && self.ifg & UcaIfg::UCTXIFG.bits() != 0
    }
}

impl crate::Peripheral for Uart {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            CTLW0 => self.ctlw0,
            BRW => self.brw,
            MCTLW => self.mctlw,
            STATW => {
                if self.is_busy() {
                    regs::UCBUSY
                } else {
                    0
                }
            }
            TXBUF => self.txbuf.unwrap_or_default() as u16,
            IE => self.ie,
            IFG => self.ifg,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        match offset {
            CTLW0 => {
                let was_reset = self.in_reset();
                self.ctlw0 = value;
                if self.in_reset() {
                    // Reset aborts the line and clears the flags.
                    self.ifg = 0;
                    self.txbuf = None;
                    self.shifter = None;
                } else if was_reset {
                    self.ifg |= UcaIfg::UCTXIFG.bits();
                }
            }
            BRW | MCTLW if !self.in_reset() => {
                tracing::warn!("UCA0 divisor write outside UCSWRST ignored");
            }
            BRW => self.brw = value,
            MCTLW => self.mctlw = value,
            TXBUF => {
                if self.in_reset() {
                    return;
                }
                if self.txbuf.is_some() {
                    tracing::warn!("UCA0 TXBUF overwritten before it was shifted");
                }
                self.txbuf = Some(value as u8);
                self.ifg &= !UcaIfg::UCTXIFG.bits();
            }
            IE => self.ie = value,
            IFG => self.ifg = value,
            _ => {}
        }
    }

    fn tick(&mut self) {
        if self.in_reset() {
            return;
        }
        if let Some((byte, remaining)) = self.shifter.take() {
            if remaining > 1 {
                self.shifter = Some((byte, remaining - 1));
            } else {
                self.transmitted.push(byte);
            }
        }
        if self.shifter.is_none() {
            if let Some(byte) = self.txbuf.take() {
                self.shifter = Some((byte, self.byte_ticks));
                self.ifg |= UcaIfg::UCTXIFG.bits();
            }
        }
    }

    fn dma_request(&self, trigger: u8) -> bool {
        trigger == regs::DMA_TRIGGER_UCA0TX && self.tx_ready()
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "in_reset": self.in_reset(),
            "busy": self.is_busy(),
            "brw": self.brw,
            "mctlw": self.mctlw,
            "transmitted": self.transmitted,
        })
    }
}
