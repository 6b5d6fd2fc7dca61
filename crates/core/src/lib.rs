// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod macros;

pub mod buffer;
pub mod bus;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod regs;
pub mod ring;
pub mod sample;
pub mod startup;

#[cfg(feature = "std")]
pub mod machine;
#[cfg(feature = "std")]
pub mod memory;
#[cfg(feature = "std")]
pub mod metrics;
#[cfg(feature = "std")]
pub mod peripherals;
#[cfg(feature = "std")]
pub mod snapshot;


#[cfg(feature = "std")]
pub use sim::*;

#[cfg(feature = "std")]
mod sim {
    use crate::bus::Irq;
    use crate::ring::{Outcome, Stage};
    use std::any::Any;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum SimulationError {
        #[error("Bus fault: unmapped access at {0:#06x}")]
        BusFault(u16),
        #[error("Watchdog password violation (wrote {0:#06x})")]
        WatchdogViolation(u16),
        #[error("Watchdog expired after {0} ticks")]
        WatchdogExpired(u64),
        #[error("Ring stalled in stage {stage:?} after {ticks} ticks")]
        Stalled { stage: Stage, ticks: u64 },
    }

    pub type SimResult<T> = Result<T, SimulationError>;

    /// Trait for observing simulation events in a modular way.
    pub trait SimulationObserver: std::fmt::Debug + Send + Sync {
        fn on_simulation_start(&self) {}
        fn on_tick_end(&self, _tick: u64) {}
        fn on_interrupt(&self, _irq: Irq, _outcome: &Outcome) {}
        fn on_byte_transmitted(&self, _byte: u8) {}
    }

    /// A memory-mapped peripheral model.
    ///
    /// Registers are 16 bits wide. Byte accesses are folded into the
    /// containing word.
    pub trait Peripheral: std::fmt::Debug + Send {
        /// Register value without read side effects.
        fn peek(&self, offset: u16) -> u16;

        fn read(&mut self, offset: u16) -> u16 {
            self.peek(offset)
        }

        fn write(&mut self, offset: u16, value: u16);

        fn read_u8(&mut self, offset: u16) -> u8 {
            let word = self.read(offset & !1);
            (word >> (8 * (offset & 1))) as u8
        }

        fn write_u8(&mut self, offset: u16, value: u8) {
            let shift = 8 * (offset & 1);
            let word = self.peek(offset & !1);
            let merged = (word & !(0xFF << shift)) | ((value as u16) << shift);
            self.write(offset & !1, merged);
        }

        /// Advance by one simulator tick (one ACLK period).
        fn tick(&mut self) {}

        /// Interrupt line this peripheral is asserting, if any.
        fn irq(&self) -> Option<Irq> {
            None
        }

        /// Whether the DMA trigger `trigger` is asserted by this peripheral.
        fn dma_request(&self, _trigger: u8) -> bool {
            false
        }

        /// A condition that would reset the device, reported once.
        fn take_fault(&mut self) -> Option<SimulationError> {
            None
        }

        fn as_any(&self) -> Option<&dyn Any> {
            None
        }

        fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
            None
        }

        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }
}
