// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Compiled-in system configuration.
//!
//! Everything the device does is fixed here; there is no runtime
//! configuration surface. Derived values (baud divisor, timer period) are
//! computed in `const` context so the constants and the formulas cannot
//! drift apart.

use crate::regs;

/// Samples captured and transmitted per cycle.
pub const SAMPLE_COUNT: usize = 3;

/// DCO frequency selections available on the FR57xx clock system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcoFrequency {
    Mhz5_33,
    Mhz6_67,
    Mhz8,
    Mhz16,
    Mhz20,
    Mhz24,
}

impl DcoFrequency {
    pub const fn hz(self) -> u32 {
        match self {
            Self::Mhz5_33 => 5_330_000,
            Self::Mhz6_67 => 6_670_000,
            Self::Mhz8 => 8_000_000,
            Self::Mhz16 => 16_000_000,
            Self::Mhz20 => 20_000_000,
            Self::Mhz24 => 24_000_000,
        }
    }

    /// CSCTL1 value selecting this frequency.
    pub const fn ctl1(self) -> u16 {
        let rsel = regs::CsCtl1::DCORSEL.bits();
        let fsel0 = regs::CsCtl1::DCOFSEL0.bits();
        let fsel_3 = regs::CsCtl1::DCOFSEL0.bits() | regs::CsCtl1::DCOFSEL1.bits();
        match self {
            Self::Mhz5_33 => 0,
            Self::Mhz6_67 => fsel0,
            Self::Mhz8 => fsel_3,
            Self::Mhz16 => rsel,
            Self::Mhz20 => rsel | fsel0,
            Self::Mhz24 => rsel | fsel_3,
        }
    }

    /// Decode a CSCTL1 value. DCOFSEL = 2 behaves like DCOFSEL = 1.
    pub const fn from_ctl1(ctl1: u16) -> Self {
        let high = ctl1 & regs::CsCtl1::DCORSEL.bits() != 0;
        let fsel = (ctl1 >> 1) & 0b11;
        match (high, fsel) {
            (false, 0) => Self::Mhz5_33,
            (false, 1) | (false, 2) => Self::Mhz6_67,
            (false, _) => Self::Mhz8,
            (true, 0) => Self::Mhz16,
            (true, 1) | (true, 2) => Self::Mhz20,
            (true, _) => Self::Mhz24,
        }
    }
}

/// MCLK = SMCLK = DCO, ACLK = VLOCLK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    pub dco: DcoFrequency,
    /// Nominal VLO frequency; the oscillator is uncalibrated.
    pub aclk_hz: u32,
}

impl ClockConfig {
    pub const fn mclk_hz(&self) -> u32 {
        self.dco.hz()
    }

    pub const fn smclk_hz(&self) -> u32 {
        self.dco.hz()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    P2,
    P3,
    PJ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGroup {
    pub port: Port,
    pub mask: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    /// Status LED lines, driven low and switched to output.
    pub outputs: [OutputGroup; 2],
    /// P2 pins routed to eUSCI_A0 TXD/RXD.
    pub uart_mask: u8,
}

/// eUSCI_A baud-rate generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor {
    /// UCBRx
    pub brw: u16,
    /// UCBRFx (first modulation stage, oversampling only)
    pub brf: u8,
    /// UCBRSx (second modulation stage)
    pub brs: u8,
    /// UCOS16
    pub oversampling: bool,
}

/// UCBRSx lookup keyed by the fractional part of N, in units of 1/10000.
const UCBRS_TABLE: [(u32, u8); 36] = [
    (0, 0x00),
    (529, 0x01),
    (715, 0x02),
    (835, 0x04),
    (1001, 0x08),
    (1252, 0x10),
    (1430, 0x20),
    (1670, 0x11),
    (2147, 0x21),
    (2224, 0x22),
    (2503, 0x44),
    (3000, 0x25),
    (3335, 0x49),
    (3575, 0x4A),
    (3753, 0x52),
    (4003, 0x92),
    (4286, 0x53),
    (4378, 0x55),
    (5002, 0xAA),
    (5715, 0x6B),
    (6003, 0xAD),
    (6254, 0xB5),
    (6432, 0xB6),
    (6667, 0xD6),
    (7001, 0xB7),
    (7147, 0xBB),
    (7503, 0xDD),
    (7861, 0xED),
    (8004, 0xEE),
    (8333, 0xBF),
    (8464, 0xDF),
    (8572, 0xEF),
    (8751, 0xF7),
    (9004, 0xFB),
    (9170, 0xFD),
    (9288, 0xFE),
];

impl BaudDivisor {
    /// Divisor for `baud` from a `clock_hz` BRCLK.
    ///
    /// N = f_BRCLK / baud. With N >= 16 oversampling is used:
    /// UCBRx = INT(N/16), UCBRFx = ROUND(FRAC(N/16) * 16). UCBRSx comes from
    /// the fractional part of N.
    pub const fn compute(clock_hz: u32, baud: u32) -> Self {
        let n = clock_hz as u64 * 10_000 / baud as u64;
        let brs = Self::brs_for_fraction((n % 10_000) as u32);

        if n >= 16 * 10_000 {
            let brw = n / 160_000;
            let rem = n - brw * 160_000;
            let brf = (rem * 16 + 80_000) / 160_000;
            Self {
                brw: brw as u16,
                brf: brf as u8,
                brs,
                oversampling: true,
            }
        } else {
            Self {
                brw: (n / 10_000) as u16,
                brf: 0,
                brs,
                oversampling: false,
            }
        }
    }

    const fn brs_for_fraction(fraction: u32) -> u8 {
        let mut brs = 0;
        let mut i = 0;
        while i < UCBRS_TABLE.len() {
            if UCBRS_TABLE[i].0 <= fraction {
                brs = UCBRS_TABLE[i].1;
            }
            i += 1;
        }
        brs
    }

    /// UCAxMCTLW value.
    pub const fn mctlw(&self) -> u16 {
        let os16 = if self.oversampling { regs::UCOS16 } else { 0 };
        ((self.brs as u16) << 8) | (((self.brf & 0x0F) as u16) << 4) | os16
    }

    pub const fn from_registers(brw: u16, mctlw: u16) -> Self {
        Self {
            brw,
            brf: ((mctlw >> 4) & 0x0F) as u8,
            brs: (mctlw >> 8) as u8,
            oversampling: mctlw & regs::UCOS16 != 0,
        }
    }

    /// Average bit rate produced by this divisor, counting the UCBRSx
    /// pattern's extra clocks over a character.
    pub const fn effective_baud(&self, clock_hz: u32) -> u32 {
        let base = if self.oversampling {
            16 * self.brw as u64 + self.brf as u64
        } else {
            self.brw as u64
        };
        let eighths = base * 8 + self.brs.count_ones() as u64;
        if eighths == 0 {
            return 0;
        }
        (clock_hz as u64 * 8 / eighths) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud: u32,
    pub divisor: BaudDivisor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Bits8,
    Bits10,
}

impl Resolution {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits10 => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcConfig {
    pub channel: u8,
    pub resolution: Resolution,
    /// ADC10DIVx field value (clock divides by value + 1).
    pub clock_divider: u8,
    /// VR+ in millivolts; VR- is VSS.
    pub reference_mv: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// TA0CCR0 in ACLK ticks (up mode).
    pub period: u16,
}

impl TimerConfig {
    /// Up mode counts 0..=CCR0, so one period is CCR0 + 1 ticks.
    pub const fn period_ms(&self, aclk_hz: u32) -> u32 {
        ((self.period as u64 + 1) * 1000 / aclk_hz as u64) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStep {
    Fixed,
    Increment,
}

/// One DMA channel's transfer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    pub trigger: u8,
    pub source: u16,
    pub destination: u16,
    pub size: u16,
    pub source_step: AddressStep,
    pub destination_step: AddressStep,
}

impl TransferConfig {
    /// ADC10MEM0 into the sample buffer.
    pub const fn sample(buffer: u16) -> Self {
        Self {
            trigger: regs::DMA_TRIGGER_ADC10,
            source: regs::ADC10MEM0,
            destination: buffer,
            size: SAMPLE_COUNT as u16,
            source_step: AddressStep::Fixed,
            destination_step: AddressStep::Increment,
        }
    }

    /// The sample buffer out through UCA0TXBUF.
    pub const fn transmit(buffer: u16) -> Self {
        Self {
            trigger: regs::DMA_TRIGGER_UCA0TX,
            source: buffer,
            destination: regs::UCA0TXBUF,
            size: SAMPLE_COUNT as u16,
            source_step: AddressStep::Increment,
            destination_step: AddressStep::Fixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemConfig {
    pub clocks: ClockConfig,
    pub pins: PinConfig,
    pub serial: SerialConfig,
    pub adc: AdcConfig,
    pub timer: TimerConfig,
}

const CLOCKS: ClockConfig = ClockConfig {
    dco: DcoFrequency::Mhz20,
    aclk_hz: 8_300,
};

const BAUD: u32 = 115_200;

pub const SYSTEM: SystemConfig = SystemConfig {
    clocks: CLOCKS,
    pins: PinConfig {
        outputs: [
            OutputGroup {
                port: Port::P3,
                mask: 0xF0,
            },
            OutputGroup {
                port: Port::PJ,
                mask: 0x0F,
            },
        ],
        uart_mask: 0x03,
    },
    serial: SerialConfig {
        baud: BAUD,
        divisor: BaudDivisor::compute(CLOCKS.smclk_hz(), BAUD),
    },
    adc: AdcConfig {
        channel: 0,
        resolution: Resolution::Bits8,
        clock_divider: 3,
        reference_mv: 3600,
    },
    timer: TimerConfig { period: 24_900 },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_divisor_20mhz_115200() {
        let divisor = BaudDivisor::compute(20_000_000, 115_200);
        assert_eq!(divisor.brw, 10);
        assert_eq!(divisor.brf, 14);
        assert_eq!(divisor.brs, 0xAD);
        assert!(divisor.oversampling);
        assert_eq!(divisor.mctlw(), 0xADE1);
    }

    #[test]
    fn test_baud_divisor_low_ratio_disables_oversampling() {
        // 32768 Hz / 9600 = 3.41
        let divisor = BaudDivisor::compute(32_768, 9_600);
        assert_eq!(divisor.brw, 3);
        assert!(!divisor.oversampling);
        assert_eq!(divisor.brs, 0x92);
    }

    #[test]
    fn test_effective_baud_close_to_target() {
        let baud = SYSTEM.serial.divisor.effective_baud(SYSTEM.clocks.smclk_hz());
        let error = (baud as i64 - 115_200).abs();
        assert!(error < 115_200 / 100, "baud {} off by {}", baud, error);
    }

    #[test]
    fn test_divisor_register_roundtrip() {
        let divisor = SYSTEM.serial.divisor;
        assert_eq!(
            BaudDivisor::from_registers(divisor.brw, divisor.mctlw()),
            divisor
        );
    }

    #[test]
    fn test_timer_period_about_three_seconds() {
        let ms = SYSTEM.timer.period_ms(SYSTEM.clocks.aclk_hz);
        assert!((2_950..=3_050).contains(&ms), "period {} ms", ms);
    }

    #[test]
    fn test_dco_ctl1_decodes_back() {
        for dco in [
            DcoFrequency::Mhz5_33,
            DcoFrequency::Mhz6_67,
            DcoFrequency::Mhz8,
            DcoFrequency::Mhz16,
            DcoFrequency::Mhz20,
            DcoFrequency::Mhz24,
        ] {
            assert_eq!(DcoFrequency::from_ctl1(dco.ctl1()), dco);
        }
        assert_eq!(SYSTEM.clocks.dco.ctl1(), 0x0082);
    }
}
