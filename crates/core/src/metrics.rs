// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Irq;
use crate::ring::{Outcome, Stage};
use crate::SimulationObserver;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one simulation run.
#[derive(Debug, Default)]
pub struct RingMetrics {
    ticks: AtomicU64,
    timer_interrupts: AtomicU64,
    dma_interrupts: AtomicU64,
    ignored: AtomicU64,
    out_of_order: AtomicU64,
    cycles: AtomicU64,
    bytes_transmitted: AtomicU64,
}

/// Plain copy of [`RingMetrics`] for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsReport {
    pub ticks: u64,
    pub timer_interrupts: u64,
    pub dma_interrupts: u64,
    pub ignored: u64,
    pub out_of_order: u64,
    pub cycles: u64,
    pub bytes_transmitted: u64,
}

impl RingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.timer_interrupts,
            &self.dma_interrupts,
            &self.ignored,
            &self.out_of_order,
            &self.cycles,
            &self.bytes_transmitted,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub fn get_bytes_transmitted(&self) -> u64 {
        self.bytes_transmitted.load(Ordering::SeqCst)
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            ticks: self.ticks.load(Ordering::SeqCst),
            timer_interrupts: self.timer_interrupts.load(Ordering::SeqCst),
            dma_interrupts: self.dma_interrupts.load(Ordering::SeqCst),
            ignored: self.ignored.load(Ordering::SeqCst),
            out_of_order: self.out_of_order.load(Ordering::SeqCst),
            cycles: self.get_cycles(),
            bytes_transmitted: self.get_bytes_transmitted(),
        }
    }
}

impl SimulationObserver for RingMetrics {
    fn on_simulation_start(&self) {
        self.reset();
    }

    fn on_tick_end(&self, tick: u64) {
        self.ticks.store(tick, Ordering::SeqCst);
    }

    fn on_interrupt(&self, irq: Irq, outcome: &Outcome) {
        match irq {
            Irq::Timer0A1 => self.timer_interrupts.fetch_add(1, Ordering::SeqCst),
            Irq::Dma => self.dma_interrupts.fetch_add(1, Ordering::SeqCst),
        };
        match outcome {
            Outcome::Advanced {
                to: Stage::Idle, ..
            } => {
                self.cycles.fetch_add(1, Ordering::SeqCst);
            }
            Outcome::Advanced { .. } => {}
            Outcome::OutOfOrder { .. } => {
                self.out_of_order.fetch_add(1, Ordering::SeqCst);
            }
            Outcome::Ignored => {
                self.ignored.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn on_byte_transmitted(&self, _byte: u8) {
        self.bytes_transmitted.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Event;

    #[test]
    fn test_counts_cycles_and_rejections() {
        let metrics = RingMetrics::new();
        metrics.on_interrupt(
            Irq::Timer0A1,
            &Outcome::Advanced {
                from: Stage::Idle,
                to: Stage::Sampling,
            },
        );
        metrics.on_interrupt(
            Irq::Dma,
            &Outcome::Advanced {
                from: Stage::Transmitting,
                to: Stage::Idle,
            },
        );
        metrics.on_interrupt(
            Irq::Dma,
            &Outcome::OutOfOrder {
                stage: Stage::Idle,
                event: Event::SamplesTransmitted,
            },
        );
        metrics.on_interrupt(Irq::Timer0A1, &Outcome::Ignored);
        metrics.on_byte_transmitted(0x10);

        let report = metrics.report();
        assert_eq!(report.timer_interrupts, 2);
        assert_eq!(report.dma_interrupts, 2);
        assert_eq!(report.cycles, 1);
        assert_eq!(report.out_of_order, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.bytes_transmitted, 1);

        metrics.on_simulation_start();
        assert_eq!(metrics.report().cycles, 0);
    }
}
