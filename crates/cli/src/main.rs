// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod runner;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thermodma_config::{AnalogInput, Scenario, SimTiming};
use thermodma_core::config::SYSTEM;
use thermodma_core::hal::Channel;
use thermodma_core::machine::{self, Machine, BUFFER_ADDR};
use thermodma_core::metrics::RingMetrics;
use thermodma_core::regs;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_SIM_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable register-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate the sampler and print each transmitted frame
    Run(RunArgs),
    /// Run a scenario script and check its assertions
    Test(TestArgs),
    /// Print the compiled-in configuration and the values derived from it
    Info,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Sample-and-transmit cycles to run
    #[arg(short, long, default_value = "3")]
    cycles: u32,

    /// LM35 temperature in degrees Celsius
    #[arg(long, default_value = "21.5", conflicts_with = "codes")]
    celsius: f32,

    /// Raw conversion results to replay instead of an LM35
    #[arg(long, value_delimiter = ',')]
    codes: Option<Vec<u16>>,

    /// Write a JSON machine snapshot here when the run ends
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TestArgs {
    /// Path to the scenario script (YAML)
    #[arg(short, long)]
    script: PathBuf,

    /// Directory for result.json
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Test(args) => test(args),
        Command::Info => info(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: RunArgs) -> anyhow::Result<u8> {
    let input = match args.codes {
        Some(codes) => AnalogInput::Codes(codes),
        None => AnalogInput::Lm35 {
            celsius: args.celsius,
        },
    };
    // Reuse the scenario checks for the command-line input.
    let scenario = Scenario {
        schema_version: "1.0".to_string(),
        inputs: thermodma_config::ScenarioInputs { analog: input },
        limits: thermodma_config::ScenarioLimits {
            max_cycles: args.cycles,
            max_ticks: u64::MAX,
        },
        timing: SimTiming::default(),
        assertions: Vec::new(),
    };
    scenario.validate()?;

    info!("Starting thermodma simulator");
    let mut machine = Machine::new(
        &scenario.timing,
        machine::analog_input(&scenario.inputs.analog),
    );
    let metrics = Arc::new(RingMetrics::new());
    machine.observers.push(metrics.clone());

    let (stop, err) = runner::run_cycles(&mut machine, args.cycles, u64::MAX);
    let reference_mv = machine.config().adc.reference_mv;
    for (i, frame) in runner::frame_reports(&machine.transmitted(), reference_mv)
        .iter()
        .enumerate()
    {
        println!(
            "cycle {}: {:?} -> {}.{} C",
            i + 1,
            frame.codes,
            frame.decicelsius / 10,
            frame.decicelsius % 10
        );
    }
    info!("Stopped: {:?} after {} ticks", stop, machine.ticks());
    info!("{:?}", metrics.report());

    if let Some(path) = args.snapshot {
        let json = serde_json::to_string_pretty(&machine.snapshot())?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
        info!("Snapshot written to {:?}", path);
    }

    Ok(match err {
        Some(e) => {
            error!("Simulation error: {}", e);
            EXIT_SIM_ERROR
        }
        None => EXIT_PASS,
    })
}

fn test(args: TestArgs) -> anyhow::Result<u8> {
    let scenario = match Scenario::from_file(&args.script) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    info!("Running scenario {:?}", args.script);

    let result = runner::run_scenario(&scenario);
    for assertion in &result.assertions {
        let mark = if assertion.passed { "ok" } else { "FAILED" };
        info!("{}: {}", assertion.assertion, mark);
    }
    info!(
        "Result: {} ({:?}, {} cycles, {} ticks)",
        result.status, result.stop_reason, result.cycles_completed, result.ticks
    );

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let path = dir.join("result.json");
        let mut json = serde_json::to_value(&result)?;
        json["config"] = serde_json::json!({
            "script": args.script,
            "timing": scenario.timing,
            "limits": scenario.limits,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Failed to write {:?}", path))?;
    }

    Ok(if result.passed() {
        EXIT_PASS
    } else {
        EXIT_ASSERT_FAIL
    })
}

fn info() -> anyhow::Result<u8> {
    let clocks = &SYSTEM.clocks;
    let serial = &SYSTEM.serial;
    let divisor = &serial.divisor;

    println!("MCLK:   {} Hz", clocks.mclk_hz());
    println!("SMCLK:  {} Hz", clocks.smclk_hz());
    println!("ACLK:   {} Hz (VLO)", clocks.aclk_hz);
    println!(
        "UART:   {} baud, UCBRx={} UCBRFx={} UCBRSx={:#04x} UCOS16={} (MCTLW={:#06x}, actual {} baud)",
        serial.baud,
        divisor.brw,
        divisor.brf,
        divisor.brs,
        divisor.oversampling as u8,
        divisor.mctlw(),
        divisor.effective_baud(clocks.smclk_hz())
    );
    println!(
        "Timer:  CCR0={} ({} ms)",
        SYSTEM.timer.period,
        SYSTEM.timer.period_ms(clocks.aclk_hz)
    );
    println!(
        "ADC:    channel A{}, {}-bit, VR+={} mV",
        SYSTEM.adc.channel,
        SYSTEM.adc.resolution.bits(),
        SYSTEM.adc.reference_mv
    );
    println!(
        "DMA{}:   trigger {} (ADC10IFG0) -> buffer",
        Channel::SAMPLE.0,
        regs::DMA_TRIGGER_ADC10
    );
    println!(
        "DMA{}:   trigger {} (UCA0TXIFG) <- buffer",
        Channel::TRANSMIT.0,
        regs::DMA_TRIGGER_UCA0TX
    );
    println!("Buffer: {:#06x} (simulated RAM)", BUFFER_ADDR);
    Ok(EXIT_PASS)
}
