// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Host-side execution of the sampler.
//!
//! The machine runs the real register drivers and ring controller against
//! the peripheral models. One tick is one ACLK period; interrupts are taken
//! between ticks whenever the global enable is set.

use std::sync::Arc;

use thermodma_config::{AnalogInput as AnalogInputConfig, SimTiming};

use crate::bus::{Irq, SharedBus, SystemBus};
use crate::config::{SystemConfig, SAMPLE_COUNT, SYSTEM};
use crate::drivers::Mcu;
use crate::hal::{Channel, Core};
use crate::memory::RAM_BASE;
use crate::peripherals::adc::{Adc10, AnalogInput, Lm35, ScriptedCodes};
use crate::peripherals::timer::TimerA;
use crate::peripherals::uart::Uart;
use crate::ring::{Controller, Outcome, Stage};
use crate::sample::SampleFrame;
use crate::snapshot::{MachineSnapshot, RingSnapshot};
use crate::startup;
use crate::{SimResult, SimulationError, SimulationObserver};

/// Where the sample buffer lives in simulated RAM.
pub const BUFFER_ADDR: u16 = RAM_BASE;

/// Interrupts taken back to back before the machine gives up on a source
/// that never deasserts.
const MAX_DISPATCH_PER_TICK: usize = 8;

/// Build the analog front end described by a scenario.
pub fn analog_input(config: &AnalogInputConfig) -> Box<dyn AnalogInput> {
    match config {
        AnalogInputConfig::Codes(codes) => Box::new(ScriptedCodes::new(codes.clone())),
        AnalogInputConfig::Lm35 { celsius } => Box::new(Lm35 { celsius: *celsius }),
    }
}

/// Status register bits the simulator cares about.
#[derive(Debug, Default)]
pub struct SimCpu {
    interrupts_enabled: bool,
    sleeps: u64,
}

impl SimCpu {
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// Times the main loop asked to sleep.
    pub fn sleeps(&self) -> u64 {
        self.sleeps
    }
}

impl Core for SimCpu {
    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn sleep(&mut self) {
        self.sleeps += 1;
    }
}

/// A forced hardware event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    TimerOverflow,
    /// CCIFG on a Timer_A0 capture/compare block sharing the overflow vector.
    CaptureCompare(u8),
    DmaComplete(Channel),
}

/// One interrupt taken and what the ring made of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub irq: Irq,
    pub outcome: Outcome,
}

/// What one sample-and-transmit cycle produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub frame: SampleFrame,
    /// Bytes shifted out of the UART during the cycle.
    pub transmitted: Vec<u8>,
    pub ticks: u64,
}

#[derive(Debug)]
pub struct Machine {
    controller: Controller<Mcu<SharedBus>>,
    bus: SharedBus,
    cpu: SimCpu,
    config: SystemConfig,
    pub observers: Vec<Arc<dyn SimulationObserver>>,
    ticks: u64,
    reported: usize,
}

impl Machine {
    pub fn new(timing: &SimTiming, input: Box<dyn AnalogInput>) -> Self {
        let bus = SharedBus::new(SystemBus::new(timing, input));
        Self {
            controller: Controller::new(Mcu::new(bus.clone())),
            bus,
            cpu: SimCpu::default(),
            config: SYSTEM,
            observers: Vec::new(),
            ticks: 0,
            reported: 0,
        }
    }

    /// Run startup, leaving the ring idle with interrupts enabled.
    pub fn boot(&mut self) -> SimResult<()> {
        for observer in &self.observers {
            observer.on_simulation_start();
        }
        startup::boot(
            self.controller.board(),
            &mut self.cpu,
            &self.config,
            BUFFER_ADDR,
        );
        self.cpu.sleep();
        tracing::info!("Booted, ring idle");
        self.check_faults()
    }

    /// Advance one tick and take any interrupts that became pending.
    pub fn step(&mut self) -> SimResult<Vec<Dispatch>> {
        self.bus.with_mut(|bus| bus.tick());
        self.ticks += 1;
        self.report_transmitted();
        self.check_faults()?;

        let dispatched = self.service_interrupts();
        self.check_faults()?;

        for observer in &self.observers {
            observer.on_tick_end(self.ticks);
        }
        Ok(dispatched)
    }

    fn service_interrupts(&mut self) -> Vec<Dispatch> {
        let mut dispatched = Vec::new();
        if !self.cpu.interrupts_enabled() {
            return dispatched;
        }
        for _ in 0..MAX_DISPATCH_PER_TICK {
            let Some(irq) = self.bus.with(|bus| bus.highest_pending_irq()) else {
                break;
            };
            dispatched.push(self.dispatch(irq));
        }
        if dispatched.len() == MAX_DISPATCH_PER_TICK {
            tracing::warn!("Interrupt storm at tick {}", self.ticks);
        }
        if !dispatched.is_empty() {
            // Back to LPM3 on return.
            self.cpu.sleep();
        }
        dispatched
    }

    fn dispatch(&mut self, irq: Irq) -> Dispatch {
        let outcome = match irq {
            Irq::Timer0A1 => self.controller.on_timer_interrupt(),
            Irq::Dma => self.controller.on_dma_interrupt(),
        };
        tracing::debug!("tick {}: {:?} -> {:?}", self.ticks, irq, outcome);
        for observer in &self.observers {
            observer.on_interrupt(irq, &outcome);
        }
        Dispatch { irq, outcome }
    }

    /// Latch the flag behind `stimulus` and run its handler immediately,
    /// whether or not the source's interrupt enable is set.
    pub fn inject(&mut self, stimulus: Stimulus) -> SimResult<Dispatch> {
        let irq = self.bus.with_mut(|bus| match stimulus {
            Stimulus::TimerOverflow => {
                if let Some(timer) = bus.peripheral_mut::<TimerA>("ta0") {
                    timer.raise_overflow();
                }
                Irq::Timer0A1
            }
            Stimulus::CaptureCompare(n) => {
                if let Some(timer) = bus.peripheral_mut::<TimerA>("ta0") {
                    timer.raise_capture_compare(n);
                }
                Irq::Timer0A1
            }
            Stimulus::DmaComplete(channel) => {
                bus.dma.force_complete(channel.0);
                Irq::Dma
            }
        });
        tracing::debug!("Injected {:?}", stimulus);
        let dispatch = self.dispatch(irq);
        self.check_faults()?;
        Ok(dispatch)
    }

    /// Step until `done` holds, for at most `max_ticks` ticks. Returns the
    /// ticks taken.
    pub fn run_until(
        &mut self,
        max_ticks: u64,
        mut done: impl FnMut(&Machine) -> bool,
    ) -> SimResult<u64> {
        let start = self.ticks;
        while !done(self) {
            if self.ticks - start >= max_ticks {
                return Err(SimulationError::Stalled {
                    stage: self.stage(),
                    ticks: self.ticks - start,
                });
            }
            self.step()?;
        }
        Ok(self.ticks - start)
    }

    /// Run one full timer → sample → transmit cycle, until the last byte
    /// has left the shift register.
    pub fn run_cycle(&mut self, max_ticks: u64) -> SimResult<CycleReport> {
        let target = self.cycles() + 1;
        let sent_before = self.transmitted().len();
        let ticks = self.run_until(max_ticks, |m| m.cycles() >= target && !m.uart_busy())?;
        let transmitted = self.transmitted()[sent_before..].to_vec();
        Ok(CycleReport {
            frame: self.buffer(),
            transmitted,
            ticks,
        })
    }

    fn report_transmitted(&mut self) {
        let fresh: Vec<u8> = self.bus.with(|bus| {
            bus.peripheral::<Uart>("uca0")
                .map(|uart| {
                    uart.transmitted()
                        .get(self.reported..)
                        .unwrap_or_default()
                        .to_vec()
                })
                .unwrap_or_default()
        });
        self.reported += fresh.len();
        for byte in fresh {
            tracing::debug!("UART <- {:#04x}", byte);
            for observer in &self.observers {
                observer.on_byte_transmitted(byte);
            }
        }
    }

    fn check_faults(&mut self) -> SimResult<()> {
        match self.bus.with_mut(|bus| bus.take_faults()).into_iter().next() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    pub fn stage(&self) -> Stage {
        self.controller.stage()
    }

    pub fn cycles(&self) -> u32 {
        self.controller.cycles()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cpu(&self) -> &SimCpu {
        &self.cpu
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Current contents of the sample buffer.
    pub fn buffer(&self) -> SampleFrame {
        self.bus.with(|bus| {
            bus.ram
                .slice(BUFFER_ADDR, SAMPLE_COUNT)
                .and_then(SampleFrame::from_slice)
                .unwrap_or_default()
        })
    }

    /// Every byte shifted out so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.bus.with(|bus| {
            bus.peripheral::<Uart>("uca0")
                .map(|uart| uart.transmitted().to_vec())
                .unwrap_or_default()
        })
    }

    pub fn uart_busy(&self) -> bool {
        self.bus.with(|bus| {
            bus.peripheral::<Uart>("uca0")
                .is_some_and(|uart| uart.is_busy())
        })
    }

    pub fn adc_enabled(&self) -> bool {
        self.bus.with(|bus| {
            bus.peripheral::<Adc10>("adc10")
                .is_some_and(|adc| adc.is_on() || adc.is_enabled())
        })
    }

    pub fn timer_interrupt_enabled(&self) -> bool {
        self.bus.with(|bus| {
            bus.peripheral::<TimerA>("ta0")
                .is_some_and(|timer| timer.interrupt_enabled())
        })
    }

    pub fn dma_enabled(&self, channel: Channel) -> bool {
        self.bus.with(|bus| bus.dma.is_enabled(channel.0))
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        let peripherals = self.bus.with(|bus| {
            let mut map: std::collections::BTreeMap<_, _> = bus
                .peripherals
                .iter()
                .map(|p| (p.name.clone(), p.dev.snapshot()))
                .collect();
            map.insert("dma".to_string(), crate::Peripheral::snapshot(&bus.dma));
            map
        });
        MachineSnapshot {
            ticks: self.ticks,
            ring: RingSnapshot {
                stage: self.stage(),
                cycles: self.cycles(),
                interrupts_enabled: self.cpu.interrupts_enabled(),
            },
            buffer: self.buffer().0.to_vec(),
            transmitted: self.transmitted(),
            peripherals,
        }
    }
}
