// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register-level drivers for the MSP430FR5739.
//!
//! Every driver owns a handle to the same bus: the zero-sized [`Mmio`] on the
//! device, a shared simulated bus on the host.
//!
//! [`Mmio`]: crate::bus::Mmio

mod adc;
mod clock;
mod dma;
mod gpio;
mod timer;
mod uart;
mod watchdog;

pub use adc::Adc10;
pub use clock::ClockSystem;
pub use dma::DmaController;
pub use gpio::Ports;
pub use timer::TimerA0;
pub use uart::UartA0;
pub use watchdog::WatchdogA;

use crate::bus::Bus;
use crate::hal::Board;

/// The sampler's view of the microcontroller.
#[derive(Debug, Clone)]
pub struct Mcu<B> {
    watchdog: WatchdogA<B>,
    clocks: ClockSystem<B>,
    gpio: Ports<B>,
    serial: UartA0<B>,
    adc: Adc10<B>,
    timer: TimerA0<B>,
    dma: DmaController<B>,
}

impl<B: Bus + Clone> Mcu<B> {
    pub fn new(bus: B) -> Self {
        Self {
            watchdog: WatchdogA::new(bus.clone()),
            clocks: ClockSystem::new(bus.clone()),
            gpio: Ports::new(bus.clone()),
            serial: UartA0::new(bus.clone()),
            adc: Adc10::new(bus.clone()),
            timer: TimerA0::new(bus.clone()),
            dma: DmaController::new(bus),
        }
    }
}

impl<B: Bus> Board for Mcu<B> {
    type Watchdog = WatchdogA<B>;
    type Clocks = ClockSystem<B>;
    type Gpio = Ports<B>;
    type Serial = UartA0<B>;
    type Adc = Adc10<B>;
    type Timer = TimerA0<B>;
    type Dma = DmaController<B>;

    fn watchdog(&mut self) -> &mut Self::Watchdog {
        &mut self.watchdog
    }

    fn clocks(&mut self) -> &mut Self::Clocks {
        &mut self.clocks
    }

    fn gpio(&mut self) -> &mut Self::Gpio {
        &mut self.gpio
    }

    fn serial(&mut self) -> &mut Self::Serial {
        &mut self.serial
    }

    fn adc(&mut self) -> &mut Self::Adc {
        &mut self.adc
    }

    fn timer(&mut self) -> &mut Self::Timer {
        &mut self.timer
    }

    fn dma(&mut self) -> &mut Self::Dma {
        &mut self.dma
    }
}
