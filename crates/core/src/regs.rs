// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! MSP430FR5739 register map.
//!
//! Only the registers the sampler touches are listed. Addresses are byte
//! addresses in the 16-bit peripheral space; word registers are even.

use bitflags::bitflags;

// WDT_A
pub const WDTCTL: u16 = 0x015C;
pub const WDTPW: u16 = 0x5A00;
pub const WDTHOLD: u16 = 0x0080;

// Clock system
pub const CS_BASE: u16 = 0x0160;
pub const CSCTL0: u16 = 0x0160;
pub const CSCTL0_H: u16 = 0x0161;
pub const CSCTL1: u16 = 0x0162;
pub const CSCTL2: u16 = 0x0164;
pub const CSCTL3: u16 = 0x0166;
pub const CSKEY_H: u8 = 0xA5;
/// Any value other than the key written to CSCTL0_H relocks the module.
pub const CSLOCK_H: u8 = 0x01;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CsCtl1: u16 {
        const DCOFSEL0 = 0x0002;
        const DCOFSEL1 = 0x0004;
        const DCORSEL = 0x0080;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CsCtl2: u16 {
        const SELM0 = 0x0001;
        const SELM1 = 0x0002;
        const SELM2 = 0x0004;
        const SELS0 = 0x0010;
        const SELS1 = 0x0020;
        const SELS2 = 0x0040;
        const SELA0 = 0x0100;
        const SELA1 = 0x0200;
        const SELA2 = 0x0400;
    }
}

impl CsCtl2 {
    /// Reset value: ACLK = XT1, SMCLK = MCLK = DCO.
    pub const RESET: Self = Self::from_bits_truncate(0x0033);
    /// ACLK sourced from VLOCLK.
    pub const SELA_VLOCLK: Self = Self::SELA0;
}

// Digital I/O. Ports are byte registers inside 16-bit port pairs.
pub const PA_BASE: u16 = 0x0200;
pub const PB_BASE: u16 = 0x0220;
pub const PJ_BASE: u16 = 0x0320;
pub const PORT_OUT: u16 = 0x02;
pub const PORT_DIR: u16 = 0x04;
pub const PORT_SEL0: u16 = 0x0A;
pub const PORT_SEL1: u16 = 0x0C;
pub const P2OUT: u16 = PA_BASE + PORT_OUT + 1;
pub const P2DIR: u16 = PA_BASE + PORT_DIR + 1;
pub const P2SEL0: u16 = PA_BASE + PORT_SEL0 + 1;
pub const P2SEL1: u16 = PA_BASE + PORT_SEL1 + 1;
pub const P3OUT: u16 = PB_BASE + PORT_OUT;
pub const P3DIR: u16 = PB_BASE + PORT_DIR;
pub const PJOUT: u16 = PJ_BASE + PORT_OUT;
pub const PJDIR: u16 = PJ_BASE + PORT_DIR;

// Timer_A0
pub const TA0_BASE: u16 = 0x0340;
pub const TA0CTL: u16 = 0x0340;
pub const TA0CCTL0: u16 = 0x0342;
pub const TA0R: u16 = 0x0350;
pub const TA0CCR0: u16 = 0x0352;
pub const TA0IV: u16 = 0x036E;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TaCtl: u16 {
        const TAIFG = 0x0001;
        const TAIE = 0x0002;
        const TACLR = 0x0004;
        const MC0 = 0x0010;
        const MC1 = 0x0020;
        const ID0 = 0x0040;
        const ID1 = 0x0080;
        const TASSEL0 = 0x0100;
        const TASSEL1 = 0x0200;
    }
}

impl TaCtl {
    pub const TASSEL_ACLK: Self = Self::TASSEL0;
    pub const MC_UP: Self = Self::MC0;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TaCctl: u16 {
        const CCIFG = 0x0001;
        const COV = 0x0002;
        const CCIE = 0x0010;
    }
}

/// TA0IV values.
pub const TAIV_NONE: u16 = 0x00;
pub const TAIV_TAIFG: u16 = 0x0E;

// DMA
pub const DMA_BASE: u16 = 0x0500;
pub const DMACTL0: u16 = 0x0500;
pub const DMAIV: u16 = 0x050E;
pub const DMA_CHANNELS: usize = 3;
pub const DMA_CHANNEL_STRIDE: u16 = 0x10;
pub const DMA_CTL: u16 = 0x00;
pub const DMA_SA: u16 = 0x02;
pub const DMA_DA: u16 = 0x06;
pub const DMA_SZ: u16 = 0x0A;

pub const fn dma_channel_base(channel: u8) -> u16 {
    DMA_BASE + DMA_CHANNEL_STRIDE * (channel as u16 + 1)
}

/// DMA trigger: ADC10IFG0.
pub const DMA_TRIGGER_ADC10: u8 = 26;
/// DMA trigger: UCA0TXIFG.
pub const DMA_TRIGGER_UCA0TX: u8 = 15;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DmaCtl: u16 {
        const DMAREQ = 0x0001;
        const DMAABORT = 0x0002;
        const DMAIE = 0x0004;
        const DMAIFG = 0x0008;
        const DMAEN = 0x0010;
        const DMALEVEL = 0x0020;
        const DMASRCBYTE = 0x0040;
        const DMADSTBYTE = 0x0080;
        const DMASRCINCR0 = 0x0100;
        const DMASRCINCR1 = 0x0200;
        const DMADSTINCR0 = 0x0400;
        const DMADSTINCR1 = 0x0800;
        const DMADT0 = 0x1000;
        const DMADT1 = 0x2000;
        const DMADT2 = 0x4000;
    }
}

impl DmaCtl {
    pub const DMASRCINCR_3: Self = Self::DMASRCINCR0.union(Self::DMASRCINCR1);
    pub const DMADSTINCR_3: Self = Self::DMADSTINCR0.union(Self::DMADSTINCR1);
}

// eUSCI_A0
pub const UCA0_BASE: u16 = 0x05C0;
pub const UCA0CTLW0: u16 = 0x05C0;
pub const UCA0BRW: u16 = 0x05C6;
pub const UCA0MCTLW: u16 = 0x05C8;
pub const UCA0STATW: u16 = 0x05CA;
pub const UCA0TXBUF: u16 = 0x05CE;
pub const UCA0IE: u16 = 0x05DA;
pub const UCA0IFG: u16 = 0x05DC;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcaCtlw0: u16 {
        const UCSWRST = 0x0001;
        const UCSSEL0 = 0x0040;
        const UCSSEL1 = 0x0080;
    }
}

impl UcaCtlw0 {
    pub const UCSSEL_SMCLK: Self = Self::UCSSEL1;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcaIfg: u16 {
        const UCRXIFG = 0x0001;
        const UCTXIFG = 0x0002;
    }
}

pub const UCBUSY: u16 = 0x0001;
pub const UCOS16: u16 = 0x0001;

// ADC10_B
pub const ADC10_BASE: u16 = 0x0700;
pub const ADC10CTL0: u16 = 0x0700;
pub const ADC10CTL1: u16 = 0x0702;
pub const ADC10CTL2: u16 = 0x0704;
pub const ADC10MCTL0: u16 = 0x070A;
pub const ADC10MEM0: u16 = 0x0712;
pub const ADC10IE: u16 = 0x071A;
pub const ADC10IFG: u16 = 0x071C;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Adc10Ctl0: u16 {
        const ADC10SC = 0x0001;
        const ADC10ENC = 0x0002;
        const ADC10ON = 0x0010;
        const ADC10MSC = 0x0080;
        const ADC10SHT0 = 0x0100;
        const ADC10SHT1 = 0x0200;
        const ADC10SHT2 = 0x0400;
        const ADC10SHT3 = 0x0800;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Adc10Ctl1: u16 {
        const ADC10BUSY = 0x0001;
        const ADC10CONSEQ0 = 0x0002;
        const ADC10CONSEQ1 = 0x0004;
        const ADC10SSEL0 = 0x0008;
        const ADC10SSEL1 = 0x0010;
        const ADC10DIV0 = 0x0020;
        const ADC10DIV1 = 0x0040;
        const ADC10DIV2 = 0x0080;
        const ADC10ISSH = 0x0100;
        const ADC10SHP = 0x0200;
        const ADC10SHS0 = 0x0400;
        const ADC10SHS1 = 0x0800;
    }
}

impl Adc10Ctl1 {
    /// Repeat-single-channel.
    pub const CONSEQ_REPEAT_SINGLE: Self = Self::ADC10CONSEQ1;
    pub const CONSEQ_MASK: Self = Self::ADC10CONSEQ0.union(Self::ADC10CONSEQ1);
    pub const DIV_MASK: Self = Self::ADC10DIV0
        .union(Self::ADC10DIV1)
        .union(Self::ADC10DIV2);
}

/// ADC10CTL2 resolution bit: set = 10-bit, clear = 8-bit.
pub const ADC10RES: u16 = 0x0010;
pub const ADC10INCH_MASK: u16 = 0x000F;
pub const ADC10IFG0: u16 = 0x0001;
pub const ADC10OVIFG: u16 = 0x0010;
