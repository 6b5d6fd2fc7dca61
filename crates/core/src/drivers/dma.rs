// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Bus;
use crate::config::{AddressStep, TransferConfig};
use crate::hal::{Channel, Dma, DmaVector};
use crate::regs::{self, DmaCtl};

const TSEL_MASK: u16 = 0x1F;

/// DMACTLx register and bit offset holding a channel's trigger select.
const fn trigger_select(channel: Channel) -> (u16, u16) {
    let reg = regs::DMACTL0 + 2 * (channel.0 as u16 / 2);
    let shift = 8 * (channel.0 as u16 % 2);
    (reg, shift)
}

const fn ctl_addr(channel: Channel) -> u16 {
    regs::dma_channel_base(channel.0) + regs::DMA_CTL
}

/// DMA controller.
#[derive(Debug, Clone)]
pub struct DmaController<B> {
    bus: B,
}

impl<B: Bus> DmaController<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: Bus> Dma for DmaController<B> {
    fn configure(&mut self, channel: Channel, config: &TransferConfig) {
        let (tsel, shift) = trigger_select(channel);
        let current = self.bus.read_u16(tsel);
        let trigger = (config.trigger as u16 & TSEL_MASK) << shift;
        self.bus.write_u16(tsel, (current & !(TSEL_MASK << shift)) | trigger);

        let base = regs::dma_channel_base(channel.0);
        self.bus.write_u16(base + regs::DMA_SA, config.source);
        self.bus.write_u16(base + regs::DMA_DA, config.destination);
        self.bus.write_u16(base + regs::DMA_SZ, config.size);

        // Single transfer, byte to byte, level triggered
        let mut ctl = DmaCtl::DMAIE | DmaCtl::DMALEVEL | DmaCtl::DMASRCBYTE | DmaCtl::DMADSTBYTE;
        if config.source_step == AddressStep::Increment {
            ctl |= DmaCtl::DMASRCINCR_3;
        }
        if config.destination_step == AddressStep::Increment {
            ctl |= DmaCtl::DMADSTINCR_3;
        }
        self.bus.write_u16(base + regs::DMA_CTL, ctl.bits());
    }

    fn enable(&mut self, channel: Channel) {
        self.bus.set_bits_u16(ctl_addr(channel), DmaCtl::DMAEN.bits());
    }

    fn disable(&mut self, channel: Channel) {
        self.bus.clear_bits_u16(ctl_addr(channel), DmaCtl::DMAEN.bits());
    }

    fn is_enabled(&mut self, channel: Channel) -> bool {
        DmaCtl::from_bits_truncate(self.bus.read_u16(ctl_addr(channel))).contains(DmaCtl::DMAEN)
    }

    fn pending(&mut self) -> DmaVector {
        DmaVector::from_iv(self.bus.read_u16(regs::DMAIV))
    }
}
