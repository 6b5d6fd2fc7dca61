// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::sync::Arc;

use serde::Serialize;
use thermodma_config::{Scenario, ScenarioAssertion, StopReason};
use thermodma_core::config::SystemConfig;
use thermodma_core::machine::{self, Machine};
use thermodma_core::metrics::{MetricsReport, RingMetrics};
use thermodma_core::sample::frames;
use thermodma_core::SimulationError;

/// Ticks a single cycle may take before the ring counts as stalled: two
/// timer periods.
pub fn stall_limit(config: &SystemConfig) -> u64 {
    2 * (config.timer.period as u64 + 1)
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub codes: [u8; 3],
    pub millivolts: [u16; 3],
    /// Mean reading in tenths of a degree Celsius.
    pub decicelsius: u16,
}

#[derive(Debug, Serialize)]
pub struct AssertionResult {
    pub assertion: String,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub status: String,
    pub stop_reason: StopReason,
    pub error: Option<String>,
    pub cycles_completed: u32,
    pub ticks: u64,
    pub uart_bytes: Vec<u8>,
    pub frames: Vec<FrameReport>,
    pub assertions: Vec<AssertionResult>,
    pub metrics: MetricsReport,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.status == "pass"
    }
}

fn stop_reason(err: &SimulationError) -> StopReason {
    match err {
        SimulationError::BusFault(_) => StopReason::BusFault,
        SimulationError::WatchdogViolation(_) | SimulationError::WatchdogExpired(_) => {
            StopReason::Watchdog
        }
        SimulationError::Stalled { .. } => StopReason::Stalled,
    }
}

pub fn frame_reports(stream: &[u8], reference_mv: u16) -> Vec<FrameReport> {
    frames(stream)
        .map(|frame| {
            let mut millivolts = [0; 3];
            for (mv, sample) in millivolts.iter_mut().zip(frame.samples()) {
                *mv = sample.millivolts(reference_mv);
            }
            FrameReport {
                codes: frame.0,
                millivolts,
                decicelsius: frame.mean().lm35_decicelsius(reference_mv),
            }
        })
        .collect()
}

/// Run the machine until `cycles` complete, the tick budget runs out or the
/// simulation faults.
pub fn run_cycles(
    machine: &mut Machine,
    cycles: u32,
    max_ticks: u64,
) -> (StopReason, Option<SimulationError>) {
    if let Err(e) = machine.boot() {
        return (stop_reason(&e), Some(e));
    }
    let limit = stall_limit(machine.config());

    for cycle in 0..cycles {
        let remaining = max_ticks.saturating_sub(machine.ticks());
        if remaining == 0 {
            return (StopReason::MaxTicks, None);
        }
        let budget = limit.min(remaining);
        match machine.run_cycle(budget) {
            Ok(report) => {
                tracing::info!(
                    "Cycle {} complete after {} ticks: {:?}",
                    cycle + 1,
                    report.ticks,
                    report.transmitted
                );
            }
            Err(SimulationError::Stalled { .. }) if budget == remaining && budget < limit => {
                return (StopReason::MaxTicks, None);
            }
            Err(e) => {
                tracing::warn!("Simulation stopped: {}", e);
                return (stop_reason(&e), Some(e));
            }
        }
    }
    (StopReason::CyclesComplete, None)
}

pub fn run_scenario(scenario: &Scenario) -> RunResult {
    let mut machine = Machine::new(
        &scenario.timing,
        machine::analog_input(&scenario.inputs.analog),
    );
    let metrics = Arc::new(RingMetrics::new());
    machine.observers.push(metrics.clone());

    let (stop, error) = run_cycles(
        &mut machine,
        scenario.limits.max_cycles,
        scenario.limits.max_ticks,
    );
    let uart_bytes = machine.transmitted();
    let cycles_completed = machine.cycles();

    let mut expected_stop = None;
    let assertions: Vec<AssertionResult> = scenario
        .assertions
        .iter()
        .map(|assertion| match assertion {
            ScenarioAssertion::UartBytes(a) => AssertionResult {
                assertion: format!("uart_bytes == {:?}", a.uart_bytes),
                passed: a.uart_bytes == uart_bytes,
            },
            ScenarioAssertion::CyclesCompleted(a) => AssertionResult {
                assertion: format!("cycles_completed == {}", a.cycles_completed),
                passed: a.cycles_completed == cycles_completed,
            },
            ScenarioAssertion::ExpectedStopReason(a) => {
                expected_stop = Some(a.expected_stop_reason);
                AssertionResult {
                    assertion: format!("stop_reason == {:?}", a.expected_stop_reason),
                    passed: a.expected_stop_reason == stop,
                }
            }
        })
        .collect();

    // An early stop is a failure unless the scenario asked for it.
    let stop_ok = stop == StopReason::CyclesComplete || expected_stop == Some(stop);
    let passed = stop_ok && assertions.iter().all(|a| a.passed);

    RunResult {
        status: if passed { "pass" } else { "fail" }.to_string(),
        stop_reason: stop,
        error: error.map(|e| e.to_string()),
        cycles_completed,
        ticks: machine.ticks(),
        frames: frame_reports(&uart_bytes, machine.config().adc.reference_mv),
        uart_bytes,
        assertions,
        metrics: metrics.report(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermodma_config::{AnalogInput, ScenarioInputs, ScenarioLimits, SimTiming};
    use thermodma_core::config::SYSTEM;

    fn scenario(codes: Vec<u16>, max_cycles: u32, max_ticks: u64) -> Scenario {
        Scenario {
            schema_version: "1.0".to_string(),
            inputs: ScenarioInputs {
                analog: AnalogInput::Codes(codes),
            },
            limits: ScenarioLimits {
                max_cycles,
                max_ticks,
            },
            timing: SimTiming::default(),
            assertions: Vec::new(),
        }
    }

    #[test]
    fn test_cycles_complete() {
        let result = run_scenario(&scenario(vec![1, 2, 3], 2, 100_000));
        assert!(result.passed());
        assert_eq!(result.stop_reason, StopReason::CyclesComplete);
        assert_eq!(result.uart_bytes, vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(result.frames.len(), 2);
        assert_eq!(result.metrics.cycles, 2);
    }

    #[test]
    fn test_tick_budget_stops_run() {
        let result = run_scenario(&scenario(vec![1], 5, 30_000));
        assert!(!result.passed());
        assert_eq!(result.stop_reason, StopReason::MaxTicks);
        assert_eq!(result.cycles_completed, 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_frame_report_decodes() {
        let reports = frame_reports(&[15, 15, 15, 1], SYSTEM.adc.reference_mv);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].millivolts, [211, 211, 211]);
        assert_eq!(reports[0].decicelsius, 211);
    }

    #[test]
    fn test_stall_limit_covers_one_period() {
        assert!(stall_limit(&SYSTEM) > SYSTEM.timer.period as u64 + 1);
    }
}
