// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thermodma_config::SimTiming;

use crate::bus::Bus;
use crate::memory::{LinearMemory, RAM_BASE, RAM_SIZE};
use crate::peripherals::adc::{Adc10, AnalogInput};
use crate::peripherals::clock::ClockSystem;
use crate::peripherals::dma::DmaEngine;
use crate::peripherals::gpio::PortPair;
use crate::peripherals::timer::TimerA;
use crate::peripherals::uart::Uart;
use crate::peripherals::watchdog::Watchdog;
use crate::regs;
use crate::{Peripheral, SimulationError};

/// Interrupt lines the sampler uses, in ascending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Irq {
    Dma,
    Timer0A1,
}

#[derive(Debug)]
pub struct PeripheralEntry {
    pub name: String,
    pub base: u16,
    pub size: u16,
    pub dev: Box<dyn Peripheral>,
}

impl PeripheralEntry {
    fn contains(&self, addr: u16) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// RAM, the memory-mapped peripherals and the DMA engine that moves data
/// between them.
#[derive(Debug)]
pub struct SystemBus {
    pub ram: LinearMemory,
    pub peripherals: Vec<PeripheralEntry>,
    pub dma: DmaEngine,
    faults: Vec<SimulationError>,
}

const DMA_SIZE: u16 = regs::DMA_CHANNEL_STRIDE * (regs::DMA_CHANNELS as u16 + 1);

impl SystemBus {
    /// The FR5739 peripheral set with `input` wired to the ADC.
    pub fn new(timing: &SimTiming, input: Box<dyn AnalogInput>) -> Self {
        let mut bus = Self {
            ram: LinearMemory::new(RAM_SIZE, RAM_BASE),
            peripherals: Vec::new(),
            dma: DmaEngine::new(),
            faults: Vec::new(),
        };

        bus.attach(
            "wdt",
            regs::WDTCTL,
            0x02,
            Box::new(Watchdog::new(timing.watchdog_timeout_ticks as u64)),
        );
        bus.attach("cs", regs::CS_BASE, 0x10, Box::new(ClockSystem::new()));
        bus.attach("pa", regs::PA_BASE, 0x20, Box::new(PortPair::new()));
        bus.attach("pb", regs::PB_BASE, 0x20, Box::new(PortPair::new()));
        bus.attach("pj", regs::PJ_BASE, 0x20, Box::new(PortPair::new()));
        bus.attach("ta0", regs::TA0_BASE, 0x30, Box::new(TimerA::new()));
        bus.attach(
            "uca0",
            regs::UCA0_BASE,
            0x20,
            Box::new(Uart::new(timing.uart_byte_ticks)),
        );
        bus.attach(
            "adc10",
            regs::ADC10_BASE,
            0x20,
            Box::new(Adc10::new(input, timing.adc_conversion_ticks)),
        );

        bus
    }

    pub fn attach(&mut self, name: &str, base: u16, size: u16, dev: Box<dyn Peripheral>) {
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base,
            size,
            dev,
        });
    }

    /// Typed access to a peripheral model by name.
    pub fn peripheral<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any())
            .and_then(|any| any.downcast_ref::<T>())
    }

    pub fn peripheral_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.peripherals
            .iter_mut()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any_mut())
            .and_then(|any| any.downcast_mut::<T>())
    }

    /// Side-effect-free read of a register or RAM word.
    pub fn peek_u16(&self, addr: u16) -> Option<u16> {
        if self.ram.contains(addr) {
            return self.ram.read_u16(addr);
        }
        if self.is_dma(addr) {
            return Some(self.dma.peek(addr - regs::DMA_BASE));
        }
        self.peripherals
            .iter()
            .find(|p| p.contains(addr))
            .map(|p| p.dev.peek(addr - p.base))
    }

    /// Advance every peripheral by one tick, then let the DMA engine make at
    /// most one transfer.
    pub fn tick(&mut self) {
        for p in &mut self.peripherals {
            p.dev.tick();
            if let Some(fault) = p.dev.take_fault() {
                tracing::warn!("{}: {}", p.name, fault);
                self.faults.push(fault);
            }
        }
        self.service_dma();
    }

    fn service_dma(&mut self) {
        for channel in 0..regs::DMA_CHANNELS as u8 {
            let Some(trigger) = self.dma.armed_trigger(channel) else {
                continue;
            };
            let requested = self
                .peripherals
                .iter()
                .any(|p| p.dev.dma_request(trigger));
            if !self.dma.accept_request(channel, requested) {
                continue;
            }

            let transfer = self.dma.current_transfer(channel);
            let value = if transfer.source_byte {
                self.read_u8(transfer.source) as u16
            } else {
                self.read_u16(transfer.source)
            };
            if transfer.destination_byte {
                self.write_u8(transfer.destination, value as u8);
            } else {
                self.write_u16(transfer.destination, value);
            }
            tracing::trace!(
                "DMA{} {:#06x} -> {:#06x} = {:#06x}",
                channel,
                transfer.source,
                transfer.destination,
                value
            );
            self.dma.finish_transfer(channel);
            // The controller grants one transfer per tick.
            return;
        }
    }

    /// Highest-priority interrupt currently asserted.
    pub fn highest_pending_irq(&self) -> Option<Irq> {
        self.peripherals
            .iter()
            .filter_map(|p| p.dev.irq())
            .chain(self.dma.irq())
            .max()
    }

    /// Faults recorded since the last call.
    pub fn take_faults(&mut self) -> Vec<SimulationError> {
        std::mem::take(&mut self.faults)
    }

    fn is_dma(&self, addr: u16) -> bool {
        addr >= regs::DMA_BASE && addr - regs::DMA_BASE < DMA_SIZE
    }

    fn fault(&mut self, addr: u16) {
        tracing::warn!("Unmapped access at {:#06x}", addr);
        self.faults.push(SimulationError::BusFault(addr));
    }
}

impl Bus for SystemBus {
    fn read_u8(&mut self, addr: u16) -> u8 {
        if let Some(byte) = self.ram.read_u8(addr) {
            return byte;
        }
        if self.is_dma(addr) {
            return self.dma.read_u8(addr - regs::DMA_BASE);
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.contains(addr)) {
            return p.dev.read_u8(addr - p.base);
        }
        self.fault(addr);
        0
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        if self.ram.write_u8(addr, value) {
            return;
        }
        if self.is_dma(addr) {
            self.dma.write_u8(addr - regs::DMA_BASE, value);
            return;
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.contains(addr)) {
            p.dev.write_u8(addr - p.base, value);
            return;
        }
        self.fault(addr);
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        if let Some(word) = self.ram.read_u16(addr) {
            return word;
        }
        if self.is_dma(addr) {
            return self.dma.read(addr - regs::DMA_BASE);
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.contains(addr)) {
            return p.dev.read(addr - p.base);
        }
        self.fault(addr);
        0
    }

    fn write_u16(&mut self, addr: u16, value: u16) {
        if self.ram.write_u16(addr, value) {
            return;
        }
        if self.is_dma(addr) {
            self.dma.write(addr - regs::DMA_BASE, value);
            return;
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.contains(addr)) {
            p.dev.write(addr - p.base, value);
            return;
        }
        self.fault(addr);
    }
}

/// A [`SystemBus`] shared between the register drivers and the simulator
/// loop. Both run on one thread; a borrow never outlives a single access.
#[derive(Debug, Clone)]
pub struct SharedBus(Rc<RefCell<SystemBus>>);

impl SharedBus {
    pub fn new(bus: SystemBus) -> Self {
        Self(Rc::new(RefCell::new(bus)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&SystemBus) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut SystemBus) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl Bus for SharedBus {
    fn read_u8(&mut self, addr: u16) -> u8 {
        self.0.borrow_mut().read_u8(addr)
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        self.0.borrow_mut().write_u8(addr, value)
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        self.0.borrow_mut().read_u16(addr)
    }

    fn write_u16(&mut self, addr: u16, value: u16) {
        self.0.borrow_mut().write_u16(addr, value)
    }
}
