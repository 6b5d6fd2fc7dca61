// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Peripheral interfaces.
//!
//! Each trait exposes only what startup and the interrupt handlers use, so a
//! test harness can stand in for any of them.

use crate::config::{
    AdcConfig, ClockConfig, PinConfig, SerialConfig, TimerConfig, TransferConfig,
};
use crate::regs;

/// DMA channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(pub u8);

impl Channel {
    /// ADC results into the sample buffer.
    pub const SAMPLE: Self = Self(0);
    /// Sample buffer out through the UART.
    pub const TRANSMIT: Self = Self(1);
}

/// Decoded TA0IV value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerVector {
    None,
    CaptureCompare(u8),
    Overflow,
    Unknown(u16),
}

impl TimerVector {
    pub const fn from_iv(iv: u16) -> Self {
        match iv {
            regs::TAIV_NONE => Self::None,
            regs::TAIV_TAIFG => Self::Overflow,
            0x02..=0x0C if iv % 2 == 0 => Self::CaptureCompare((iv / 2) as u8),
            other => Self::Unknown(other),
        }
    }
}

/// Decoded DMAIV value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaVector {
    None,
    Complete(Channel),
    Unknown(u16),
}

impl DmaVector {
    pub const fn from_iv(iv: u16) -> Self {
        match iv {
            0 => Self::None,
            0x02..=0x10 if iv % 2 == 0 => Self::Complete(Channel((iv / 2 - 1) as u8)),
            other => Self::Unknown(other),
        }
    }
}

pub trait Watchdog {
    fn disable(&mut self);
}

pub trait Clocks {
    fn configure(&mut self, config: &ClockConfig);
}

pub trait Gpio {
    fn configure(&mut self, config: &PinConfig);
}

pub trait Serial {
    fn configure(&mut self, config: &SerialConfig);
}

pub trait Adc {
    /// Resolution, channel and sequence mode. Leaves the converter off.
    fn configure(&mut self, config: &AdcConfig);
    /// Power up and start a conversion sequence.
    fn start_conversion(&mut self);
    /// Stop converting and power down.
    fn disable(&mut self);
    fn is_enabled(&mut self) -> bool;
}

pub trait Timer {
    /// Period, clock and mode. Arms the overflow interrupt.
    fn configure(&mut self, config: &TimerConfig);
    fn enable_interrupt(&mut self);
    fn disable_interrupt(&mut self);
    fn interrupt_enabled(&mut self) -> bool;
    fn clear_overflow(&mut self);
    /// Read (and acknowledge) the highest-priority pending source.
    fn pending(&mut self) -> TimerVector;
}

pub trait Dma {
    /// Program a channel. The channel is left disabled.
    fn configure(&mut self, channel: Channel, config: &TransferConfig);
    fn enable(&mut self, channel: Channel);
    fn disable(&mut self, channel: Channel);
    fn is_enabled(&mut self, channel: Channel) -> bool;
    /// Read (and acknowledge) the highest-priority completed channel.
    fn pending(&mut self) -> DmaVector;
}

/// CPU-level controls.
pub trait Core {
    fn enable_interrupts(&mut self);
    /// Enter the deepest sleep that keeps the timer clock running.
    fn sleep(&mut self);
}

/// The set of peripherals the sampler drives.
pub trait Board {
    type Watchdog: Watchdog;
    type Clocks: Clocks;
    type Gpio: Gpio;
    type Serial: Serial;
    type Adc: Adc;
    type Timer: Timer;
    type Dma: Dma;

    fn watchdog(&mut self) -> &mut Self::Watchdog;
    fn clocks(&mut self) -> &mut Self::Clocks;
    fn gpio(&mut self) -> &mut Self::Gpio;
    fn serial(&mut self) -> &mut Self::Serial;
    fn adc(&mut self) -> &mut Self::Adc;
    fn timer(&mut self) -> &mut Self::Timer;
    fn dma(&mut self) -> &mut Self::Dma;
}
