// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::{AdcConfig, Resolution};
use crate::hal::Adc;
use crate::regs::{self, Adc10Ctl0, Adc10Ctl1};

/// ADC10_B
#[derive(Debug, Clone)]
pub struct Adc10<B> {
    bus: B,
}

impl<B: Bus> Adc10<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Adc for Adc10<B> {
    fn configure(&mut self, config: &AdcConfig) {
        self.bus.clear_bits_u16(regs::ADC10CTL0, Adc10Ctl0::ADC10ENC.bits());

        // Pulse sample mode, MODOSC, repeat-single-channel
        let divider = ((config.clock_divider as u16) << 5) & Adc10Ctl1::DIV_MASK.bits();
        let ctl1 = Adc10Ctl1::ADC10SHP | Adc10Ctl1::CONSEQ_REPEAT_SINGLE;
        self.bus.write_u16(regs::ADC10CTL1, ctl1.bits() | divider);

        match config.resolution {
            Resolution::Bits8 => self.bus.clear_bits_u16(regs::ADC10CTL2, regs::ADC10RES),
            Resolution::Bits10 => self.bus.set_bits_u16(regs::ADC10CTL2, regs::ADC10RES),
        }

        // SREF = 0: VR+ = AVCC, VR- = VSS
        let mctl0 = config.channel as u16 & regs::ADC10INCH_MASK;
        self.bus.write_u16(regs::ADC10MCTL0, mctl0);

        // 4 ADC10CLK sample-and-hold, multiple conversions per trigger.
        // ADC10ON stays clear until a conversion is requested.
        self.bus.write_u16(regs::ADC10CTL0, Adc10Ctl0::ADC10MSC.bits());
    }

    fn start_conversion(&mut self) {
        // A result left over from the previous cycle would fire the DMA
        // trigger immediately.
        self.bus.clear_bits_u16(regs::ADC10IFG, regs::ADC10IFG0);
        self.bus.set_bits_u16(regs::ADC10CTL0, Adc10Ctl0::ADC10ON.bits());
        self.bus.set_bits_u16(
            regs::ADC10CTL0,
            (Adc10Ctl0::ADC10ENC | Adc10Ctl0::ADC10SC).bits(),
        );
    }

    fn disable(&mut self) {
        self.bus.clear_bits_u16(
            regs::ADC10CTL0,
            (Adc10Ctl0::ADC10ENC | Adc10Ctl0::ADC10ON).bits(),
        );
        self.bus.clear_bits_u16(regs::ADC10IFG, regs::ADC10IFG0);
    }

    fn is_enabled(&mut self) -> bool {
        let ctl0 = Adc10Ctl0::from_bits_truncate(self.bus.read_u16(regs::ADC10CTL0));
        ctl0.intersects(Adc10Ctl0::ADC10ON | Adc10Ctl0::ADC10ENC)
    }
}
