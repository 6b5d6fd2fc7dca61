// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulator timing, in ACLK ticks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SimTiming {
    pub adc_conversion_ticks: u32,
    /// Time to shift one character out of the UART.
    pub uart_byte_ticks: u32,
    /// A watchdog that is never held resets the device after this long.
    pub watchdog_timeout_ticks: u32,
}

impl Default for SimTiming {
    fn default() -> Self {
        Self {
            adc_conversion_ticks: 1,
            uart_byte_ticks: 1,
            // ~32 ms at the reset clock
            watchdog_timeout_ticks: 270,
        }
    }
}

impl SimTiming {
    pub fn validate(&self) -> Result<()> {
        if self.adc_conversion_ticks == 0 {
            anyhow::bail!("Timing 'adc_conversion_ticks' must be greater than zero");
        }
        if self.uart_byte_ticks == 0 {
            anyhow::bail!("Timing 'uart_byte_ticks' must be greater than zero");
        }
        if self.watchdog_timeout_ticks == 0 {
            anyhow::bail!("Timing 'watchdog_timeout_ticks' must be greater than zero");
        }
        Ok(())
    }
}

/// What the ADC sees on channel A0.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AnalogInput {
    /// Raw conversion results, replayed in order and repeated.
    Codes(Vec<u16>),
    /// An LM35 held at a fixed temperature.
    Lm35 { celsius: f32 },
}

impl Default for AnalogInput {
    fn default() -> Self {
        Self::Lm35 { celsius: 21.5 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioInputs {
    /// Written as a map (`codes: [..]` or `lm35: {celsius: ..}`).
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub analog: AnalogInput,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioLimits {
    /// Sample-and-transmit cycles to run.
    pub max_cycles: u32,
    /// Tick budget for the whole run.
    pub max_ticks: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    CyclesComplete,
    MaxTicks,
    Stalled,
    BusFault,
    Watchdog,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartBytesAssertion {
    pub uart_bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CyclesCompletedAssertion {
    pub cycles_completed: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ScenarioAssertion {
    UartBytes(UartBytesAssertion),
    CyclesCompleted(CyclesCompletedAssertion),
    ExpectedStopReason(StopReasonAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub schema_version: String,
    #[serde(default)]
    pub inputs: ScenarioInputs,
    pub limits: ScenarioLimits,
    #[serde(default)]
    pub timing: SimTiming,
    #[serde(default)]
    pub assertions: Vec<ScenarioAssertion>,
}

impl Scenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open scenario at {:?}", path.as_ref()))?;
        let scenario: Self =
            serde_yaml::from_reader(f).context("Failed to parse Scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.limits.max_cycles == 0 {
            anyhow::bail!("Limit 'max_cycles' must be greater than zero");
        }

        if self.limits.max_ticks == 0 {
            anyhow::bail!("Limit 'max_ticks' must be greater than zero");
        }

        match &self.inputs.analog {
            AnalogInput::Codes(codes) => {
                if codes.is_empty() {
                    anyhow::bail!("Input 'codes' cannot be empty");
                }
                if let Some(code) = codes.iter().find(|&&c| c > 0x3FF) {
                    anyhow::bail!("Input code {} exceeds the 10-bit converter range", code);
                }
            }
            AnalogInput::Lm35 { celsius } => {
                if !celsius.is_finite() || !(0.0..=150.0).contains(celsius) {
                    anyhow::bail!("Input 'celsius' must be within 0..=150, got {}", celsius);
                }
            }
        }

        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_scenario() {
        let yaml = r#"
schema_version: "1.0"
inputs:
  analog:
    codes: [10, 20, 30]
limits:
  max_cycles: 2
  max_ticks: 100000
timing:
  uart_byte_ticks: 2
assertions:
  - uart_bytes: [10, 20, 30, 10, 20, 30]
  - cycles_completed: 2
  - expected_stop_reason: cycles_complete
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.inputs.analog, AnalogInput::Codes(vec![10, 20, 30]));
        assert_eq!(scenario.limits.max_cycles, 2);
        assert_eq!(scenario.timing.uart_byte_ticks, 2);
        assert_eq!(scenario.timing.adc_conversion_ticks, 1);
        assert_eq!(scenario.assertions.len(), 3);
        assert!(matches!(
            scenario.assertions[2],
            ScenarioAssertion::ExpectedStopReason(StopReasonAssertion {
                expected_stop_reason: StopReason::CyclesComplete
            })
        ));
    }

    #[test]
    fn test_defaults_to_room_temperature_lm35() {
        let yaml = r#"
schema_version: "1.0"
limits:
  max_cycles: 1
  max_ticks: 30000
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.inputs.analog, AnalogInput::Lm35 { celsius: 21.5 });
        assert_eq!(scenario.timing, SimTiming::default());
    }

    #[test]
    fn test_analog_input_map_form() {
        let yaml = r#"
schema_version: "1.0"
inputs:
  analog:
    lm35:
      celsius: 30.0
limits:
  max_cycles: 1
  max_ticks: 30000
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.inputs.analog, AnalogInput::Lm35 { celsius: 30.0 });

        // Written back the same way it is read.
        let inputs = ScenarioInputs {
            analog: AnalogInput::Codes(vec![1, 2, 3]),
        };
        let text = serde_yaml::to_string(&inputs).unwrap();
        assert!(text.contains("codes:"), "{}", text);
        assert!(!text.contains('!'), "{}", text);
        let parsed: ScenarioInputs = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.analog, inputs.analog);
    }

    #[test]
    fn test_invalid_version() {
        let yaml = r#"
schema_version: "2.0"
limits:
  max_cycles: 1
  max_ticks: 100
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported schema_version"));
    }

    #[test]
    fn test_invalid_max_cycles() {
        let yaml = r#"
schema_version: "1.0"
limits:
  max_cycles: 0
  max_ticks: 100
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("max_cycles"));
    }

    #[test]
    fn test_empty_codes() {
        let yaml = r#"
schema_version: "1.0"
inputs:
  analog:
    codes: []
limits:
  max_cycles: 1
  max_ticks: 100
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("codes"));
    }

    #[test]
    fn test_out_of_range_temperature() {
        let yaml = r#"
schema_version: "1.0"
inputs:
  analog:
    lm35:
      celsius: 400.0
limits:
  max_cycles: 1
  max_ticks: 100
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("celsius"));
    }

    #[test]
    fn test_zero_timing_rejected() {
        let yaml = r#"
schema_version: "1.0"
limits:
  max_cycles: 1
  max_ticks: 100
timing:
  uart_byte_ticks: 0
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("uart_byte_ticks"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
schema_version: "1.0"
limits:
  max_cycles: 1
  max_ticks: 100
  wall_time_ms: 5
"#;
        assert!(serde_yaml::from_str::<Scenario>(yaml).is_err());
    }
}
