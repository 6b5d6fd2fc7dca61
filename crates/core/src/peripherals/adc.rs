// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::regs::{self, Adc10Ctl0, Adc10Ctl1};

const CTL0: u16 = regs::ADC10CTL0 - regs::ADC10_BASE;
const CTL1: u16 = regs::ADC10CTL1 - regs::ADC10_BASE;
const CTL2: u16 = regs::ADC10CTL2 - regs::ADC10_BASE;
const MCTL0: u16 = regs::ADC10MCTL0 - regs::ADC10_BASE;
const MEM0: u16 = regs::ADC10MEM0 - regs::ADC10_BASE;
const IE: u16 = regs::ADC10IE - regs::ADC10_BASE;
const IFG: u16 = regs::ADC10IFG - regs::ADC10_BASE;

/// Reset value of ADC10CTL2: 10-bit resolution.
const CTL2_RESET: u16 = regs::ADC10RES;

/// The analog world behind the converter input mux.
pub trait AnalogInput: std::fmt::Debug + Send {
    /// Conversion result for `channel` at `bits` resolution, with the
    /// reference at `reference_mv`.
    fn convert(&mut self, channel: u8, bits: u8, reference_mv: u16) -> u16;
}

fn full_scale(bits: u8) -> u16 {
    ((1u32 << bits) - 1) as u16
}

/// Replays fixed conversion results in order, wrapping around. Codes above
/// the active resolution saturate.
#[derive(Debug, Clone)]
pub struct ScriptedCodes {
    codes: Vec<u16>,
    next: usize,
}

impl ScriptedCodes {
    pub fn new(codes: Vec<u16>) -> Self {
        Self { codes, next: 0 }
    }
}

impl AnalogInput for ScriptedCodes {
    fn convert(&mut self, _channel: u8, bits: u8, _reference_mv: u16) -> u16 {
        let Some(&code) = self.codes.get(self.next) else {
            return 0;
        };
        self.next = (self.next + 1) % self.codes.len();
        code.min(full_scale(bits))
    }
}

/// LM35 on every channel: 10 mV per degree Celsius.
#[derive(Debug, Clone, Copy)]
pub struct Lm35 {
    pub celsius: f32,
}

impl AnalogInput for Lm35 {
    fn convert(&mut self, _channel: u8, bits: u8, reference_mv: u16) -> u16 {
        if reference_mv == 0 {
            return full_scale(bits);
        }
        let mv = (self.celsius * 10.0).max(0.0);
        let code = (mv * full_scale(bits) as f32 / reference_mv as f32).round();
        (code as u16).min(full_scale(bits))
    }
}

/// ADC10_B with a single memory register.
///
/// Only ADC10CONSEQ single and repeat-single are modelled. In repeat mode
/// with ADC10MSC set a new conversion starts as soon as the previous one
/// finishes, for as long as ADC10ENC and ADC10ON stay set. Reading
/// ADC10MEM0 clears ADC10IFG0; a result that lands on a set flag is an
/// overrun.
#[derive(Debug)]
pub struct Adc10 {
    ctl0: u16,
    ctl1: u16,
    ctl2: u16,
    mctl0: u16,
    mem0: u16,
    ie: u16,
    ifg: u16,
    input: Box<dyn AnalogInput>,
    reference_mv: u16,
    conversion_ticks: u32,
    remaining: Option<u32>,
    conversions: u64,
    overruns: u64,
}

impl Adc10 {
    pub fn new(input: Box<dyn AnalogInput>, conversion_ticks: u32) -> Self {
        Self {
            ctl0: 0,
            ctl1: 0,
            ctl2: CTL2_RESET,
            mctl0: 0,
            mem0: 0,
            ie: 0,
            ifg: 0,
            input,
            reference_mv: crate::config::SYSTEM.adc.reference_mv,
            conversion_ticks: conversion_ticks.max(1),
            remaining: None,
            conversions: 0,
            overruns: 0,
        }
    }

    fn ctl0(&self) -> Adc10Ctl0 {
        Adc10Ctl0::from_bits_truncate(self.ctl0)
    }

    pub fn is_on(&self) -> bool {
        self.ctl0().contains(Adc10Ctl0::ADC10ON)
    }

    pub fn is_enabled(&self) -> bool {
        self.ctl0().contains(Adc10Ctl0::ADC10ENC | Adc10Ctl0::ADC10ON)
    }

    pub fn is_busy(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn resolution_bits(&self) -> u8 {
        if self.ctl2 & regs::ADC10RES != 0 {
            10
        } else {
            8
        }
    }

    pub fn channel(&self) -> u8 {
        (self.mctl0 & regs::ADC10INCH_MASK) as u8
    }

    pub fn result_pending(&self) -> bool {
        self.ifg & regs::ADC10IFG0 != 0
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Latch `code` in ADC10MEM0 as if a conversion had just finished.
    pub fn force_result(&mut self, code: u16) {
        self.mem0 = code;
        self.ifg |= regs::ADC10IFG0;
    }

    fn repeating(&self) -> bool {
        let conseq = self.ctl1 & Adc10Ctl1::CONSEQ_MASK.bits();
        conseq == Adc10Ctl1::CONSEQ_REPEAT_SINGLE.bits()
            && self.ctl0().contains(Adc10Ctl0::ADC10MSC)
            && self.is_enabled()
    }

    fn finish_conversion(&mut self) {
        let bits = self.resolution_bits();
        let code = self.input.convert(self.channel(), bits, self.reference_mv);
        if self.result_pending() {
            self.overruns += 1;
            self.ifg |= regs::ADC10OVIFG;
        }
        self.mem0 = code;
        self.ifg |= regs::ADC10IFG0;
        self.conversions += 1;
    }
}

impl crate::Peripheral for Adc10 {
    fn peek(&self, offset: u16) -> u16 {
        match offset {
            CTL0 => self.ctl0,
            CTL1 if self.is_busy() => self.ctl1 | Adc10Ctl1::ADC10BUSY.bits(),
            CTL1 => self.ctl1,
            CTL2 => self.ctl2,
            MCTL0 => self.mctl0,
            MEM0 => self.mem0,
            IE => self.ie,
            IFG => self.ifg,
            _ => 0,
        }
    }

    fn read(&mut self, offset: u16) -> u16 {
        if offset == MEM0 {
            self.ifg &= !regs::ADC10IFG0;
        }
        self.peek(offset)
    }

    fn write(&mut self, offset: u16, value: u16) {
        match offset {
            CTL0 => {
                // SC is a trigger, not state.
                self.ctl0 = value & !Adc10Ctl0::ADC10SC.bits();
                if !self.is_enabled() {
                    self.remaining = None;
                } else if value & Adc10Ctl0::ADC10SC.bits() != 0 && !self.is_busy() {
                    self.remaining = Some(self.conversion_ticks);
                }
            }
            // Configuration is locked while ADC10ENC is set.
            CTL1 | CTL2 | MCTL0 if self.ctl0().contains(Adc10Ctl0::ADC10ENC) => {
                tracing::warn!("ADC10 write at +{:#04x} with ENC set ignored", offset);
            }
            CTL1 => self.ctl1 = value & !Adc10Ctl1::ADC10BUSY.bits(),
            CTL2 => self.ctl2 = value,
            MCTL0 => self.mctl0 = value,
            IE => self.ie = value,
            IFG => self.ifg = value,
            _ => {}
        }
    }

    fn tick(&mut self) {
        let Some(remaining) = self.remaining else {
            return;
        };
        if remaining > 1 {
            self.remaining = Some(remaining - 1);
            return;
        }
        self.finish_conversion();
        self.remaining = self.repeating().then_some(self.conversion_ticks);
    }

    fn dma_request(&self, trigger: u8) -> bool {
        trigger == regs::DMA_TRIGGER_ADC10 && self.result_pending()
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "on": self.is_on(),
            "enabled": self.is_enabled(),
            "busy": self.is_busy(),
            "resolution_bits": self.resolution_bits(),
            "channel": self.channel(),
            "mem0": self.mem0,
            "conversions": self.conversions,
            "overruns": self.overruns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    fn configured(codes: Vec<u16>) -> Adc10 {
        let mut adc = Adc10::new(Box::new(ScriptedCodes::new(codes)), 2);
        let ctl1 = Adc10Ctl1::ADC10SHP | Adc10Ctl1::CONSEQ_REPEAT_SINGLE;
        adc.write(CTL1, ctl1.bits());
        adc.write(CTL2, 0);
        adc.write(CTL0, Adc10Ctl0::ADC10MSC.bits());
        adc
    }

    fn start(adc: &mut Adc10) {
        let on = adc.peek(CTL0) | Adc10Ctl0::ADC10ON.bits();
        adc.write(CTL0, on);
        let go = on | (Adc10Ctl0::ADC10ENC | Adc10Ctl0::ADC10SC).bits();
        adc.write(CTL0, go);
    }

    #[test]
    fn test_lm35_codes() {
        let mut lm35 = Lm35 { celsius: 21.5 };
        assert_eq!(lm35.convert(0, 8, 3600), 15);
        assert_eq!(lm35.convert(0, 10, 3600), 61);
        let mut hot = Lm35 { celsius: 500.0 };
        assert_eq!(hot.convert(0, 8, 3600), 255);
    }

    #[test]
    fn test_scripted_codes_wrap_and_saturate() {
        let mut input = ScriptedCodes::new(vec![1, 300]);
        assert_eq!(input.convert(0, 8, 3600), 1);
        assert_eq!(input.convert(0, 8, 3600), 255);
        assert_eq!(input.convert(0, 10, 3600), 1);
    }

    #[test]
    fn test_nothing_converts_until_started() {
        let mut adc = configured(vec![7]);
        for _ in 0..5 {
            adc.tick();
        }
        assert!(!adc.is_on());
        assert_eq!(adc.conversions(), 0);
        assert!(!adc.dma_request(regs::DMA_TRIGGER_ADC10));
    }

    #[test]
    fn test_repeat_single_channel() {
        let mut adc = configured(vec![7, 8, 9]);
        start(&mut adc);
        assert!(adc.is_busy());
        assert_eq!(adc.peek(CTL0) & Adc10Ctl0::ADC10SC.bits(), 0);

        adc.tick();
        assert!(!adc.result_pending());
        adc.tick();
        assert!(adc.dma_request(regs::DMA_TRIGGER_ADC10));
        assert_eq!(adc.read(MEM0), 7);
        assert!(!adc.result_pending());

        adc.tick();
        adc.tick();
        assert_eq!(adc.read(MEM0), 8);
        assert_eq!(adc.overruns(), 0);
    }

    #[test]
    fn test_unread_result_overruns() {
        let mut adc = configured(vec![1, 2]);
        start(&mut adc);
        for _ in 0..4 {
            adc.tick();
        }
        assert_eq!(adc.overruns(), 1);
        assert_eq!(adc.peek(IFG) & regs::ADC10OVIFG, regs::ADC10OVIFG);
        assert_eq!(adc.peek(MEM0), 2);
    }

    #[test]
    fn test_disable_stops_conversions() {
        let mut adc = configured(vec![1]);
        start(&mut adc);
        adc.tick();
        let off = adc.peek(CTL0) & !(Adc10Ctl0::ADC10ENC | Adc10Ctl0::ADC10ON).bits();
        adc.write(CTL0, off);
        assert!(!adc.is_busy());
        for _ in 0..4 {
            adc.tick();
        }
        assert_eq!(adc.conversions(), 0);
    }

    #[test]
    fn test_configuration_locked_while_enabled() {
        let mut adc = configured(vec![1]);
        start(&mut adc);
        adc.write(MCTL0, 5);
        assert_eq!(adc.channel(), 0);
    }

    #[test]
    fn test_force_result_sets_flag() {
        let mut adc = configured(vec![1]);
        adc.force_result(0x42);
        assert!(adc.dma_request(regs::DMA_TRIGGER_ADC10));
        assert_eq!(adc.peek(MEM0), 0x42);
    }
}
