// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::Irq;
use crate::regs::{self, DmaCtl, DMA_CHANNELS};

const DMACTL_REGS: usize = 5;
const IV: u16 = regs::DMAIV - regs::DMA_BASE;
const TSEL_MASK: u16 = 0x1F;
/// DMADT2 selects the repeated transfer modes.
const REPEATED: u16 = DmaCtl::DMADT2.bits();

/// Source and destination of the next transfer on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub source: u16,
    pub destination: u16,
    pub source_byte: bool,
    pub destination_byte: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct ChannelState {
    ctl: u16,
    sa: u16,
    da: u16,
    sz: u16,
    // Working copies, latched when DMAEN is set
    cur_sa: u16,
    cur_da: u16,
    remaining: u16,
    last_request: bool,
    soft_request: bool,
    transfers: u64,
}

impl ChannelState {
    fn flags(&self) -> DmaCtl {
        DmaCtl::from_bits_truncate(self.ctl)
    }

    fn latch(&mut self) {
        self.cur_sa = self.sa;
        self.cur_da = self.da;
        self.remaining = self.sz;
    }

    fn step(addr: u16, incr: u16, byte: bool) -> u16 {
        let size = if byte { 1 } else { 2 };
        match incr & 0x3 {
            2 => addr.wrapping_sub(size),
            3 => addr.wrapping_add(size),
            _ => addr,
        }
    }
}

/// DMA controller: single and repeated-single transfers only.
///
/// Triggers are sampled once per tick by the bus, which performs the data
/// move itself since source and destination may be anywhere on the bus.
#[derive(Debug, Default)]
pub struct DmaEngine {
    ctl: [u16; DMACTL_REGS],
    channels: [ChannelState; DMA_CHANNELS],
}

impl DmaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, channel: u8) -> Option<&ChannelState> {
        self.channels.get(channel as usize)
    }

    fn channel_mut(&mut self, channel: u8) -> Option<&mut ChannelState> {
        self.channels.get_mut(channel as usize)
    }

    /// Trigger source selected for `channel` in DMACTL0..2.
    pub fn trigger(&self, channel: u8) -> u8 {
        let reg = self.ctl[(channel / 2) as usize % DMACTL_REGS];
        ((reg >> (8 * (channel % 2) as u16)) & TSEL_MASK) as u8
    }

    pub fn is_enabled(&self, channel: u8) -> bool {
        self.channel(channel)
            .is_some_and(|ch| ch.flags().contains(DmaCtl::DMAEN))
    }

    pub fn interrupt_pending(&self, channel: u8) -> bool {
        self.channel(channel)
            .is_some_and(|ch| ch.flags().contains(DmaCtl::DMAIFG))
    }

    /// Transfers left before the block completes.
    pub fn remaining(&self, channel: u8) -> u16 {
        self.channel(channel).map_or(0, |ch| ch.remaining)
    }

    /// Transfers made since reset.
    pub fn transfers(&self, channel: u8) -> u64 {
        self.channel(channel).map_or(0, |ch| ch.transfers)
    }

    /// The trigger `channel` is waiting on, if it can transfer at all.
    pub fn armed_trigger(&self, channel: u8) -> Option<u8> {
        let ch = self.channel(channel)?;
        (ch.flags().contains(DmaCtl::DMAEN) && ch.remaining > 0).then(|| self.trigger(channel))
    }

    /// Whether the trigger level `requested` starts a transfer now. Edge
    /// mode needs a low-to-high transition; DMAREQ always counts.
    pub fn accept_request(&mut self, channel: u8, requested: bool) -> bool {
        let Some(ch) = self.channel_mut(channel) else {
            return false;
        };
        let rising = requested && !ch.last_request;
        ch.last_request = requested;
        let soft = std::mem::take(&mut ch.soft_request);
        let level = ch.flags().contains(DmaCtl::DMALEVEL);
        soft || if level { requested } else { rising }
    }

    pub fn current_transfer(&self, channel: u8) -> Transfer {
        let ch = self.channels[channel as usize % DMA_CHANNELS];
        let flags = ch.flags();
        Transfer {
            source: ch.cur_sa,
            destination: ch.cur_da,
            source_byte: flags.contains(DmaCtl::DMASRCBYTE),
            destination_byte: flags.contains(DmaCtl::DMADSTBYTE),
        }
    }

    /// Advance the working registers after one transfer. The last transfer
    /// of a block raises DMAIFG and, outside repeated mode, clears DMAEN.
    pub fn finish_transfer(&mut self, channel: u8) {
        let Some(ch) = self.channel_mut(channel) else {
            return;
        };
        let flags = ch.flags();
        ch.cur_sa = ChannelState::step(
            ch.cur_sa,
            ch.ctl >> 8,
            flags.contains(DmaCtl::DMASRCBYTE),
        );
        ch.cur_da = ChannelState::step(
            ch.cur_da,
            ch.ctl >> 10,
            flags.contains(DmaCtl::DMADSTBYTE),
        );
        ch.remaining = ch.remaining.saturating_sub(1);
        ch.transfers += 1;

        if ch.remaining == 0 {
            ch.ctl |= DmaCtl::DMAIFG.bits();
            if ch.ctl & REPEATED == 0 {
                ch.ctl &= !DmaCtl::DMAEN.bits();
            }
            ch.latch();
            tracing::debug!("DMA{} block complete", channel);
        }
    }

    /// Raise DMAIFG on `channel` without a transfer.
    pub fn force_complete(&mut self, channel: u8) {
        if let Some(ch) = self.channel_mut(channel) {
            ch.ctl |= DmaCtl::DMAIFG.bits();
        }
    }

    fn vector(&self) -> Option<u8> {
        self.channels
            .iter()
            .position(|ch| ch.flags().contains(DmaCtl::DMAIFG | DmaCtl::DMAIE))
            .map(|n| n as u8)
    }

    fn channel_register(offset: u16) -> Option<(usize, u16)> {
        let index = (offset / regs::DMA_CHANNEL_STRIDE) as usize;
        if index == 0 || index > DMA_CHANNELS {
            return None;
        }
        Some((index - 1, offset % regs::DMA_CHANNEL_STRIDE))
    }
}

impl crate::Peripheral for DmaEngine {
    fn peek(&self, offset: u16) -> u16 {
        if offset == IV {
            return self.vector().map_or(0, |n| 2 * (n as u16 + 1));
        }
        if let Some((n, reg)) = Self::channel_register(offset) {
            let ch = &self.channels[n];
            return match reg {
                regs::DMA_CTL => ch.ctl,
                regs::DMA_SA => ch.sa,
                regs::DMA_DA => ch.da,
                regs::DMA_SZ => ch.sz,
                _ => 0,
            };
        }
        self.ctl
            .get((offset / 2) as usize)
            .copied()
            .unwrap_or_default()
    }

    fn read(&mut self, offset: u16) -> u16 {
        if offset != IV {
            return self.peek(offset);
        }
        match self.vector() {
            Some(n) => {
                self.channels[n as usize].ctl &= !DmaCtl::DMAIFG.bits();
                2 * (n as u16 + 1)
            }
            None => 0,
        }
    }

    fn write(&mut self, offset: u16, value: u16) {
        if offset == IV {
            return;
        }
        let Some((n, reg)) = Self::channel_register(offset) else {
            if let Some(ctl) = self.ctl.get_mut((offset / 2) as usize) {
                *ctl = value;
            }
            return;
        };
        let ch = &mut self.channels[n];
        match reg {
            regs::DMA_CTL => {
                let was_enabled = ch.flags().contains(DmaCtl::DMAEN);
                ch.soft_request |= value & DmaCtl::DMAREQ.bits() != 0;
                ch.ctl = value & !(DmaCtl::DMAREQ | DmaCtl::DMAABORT).bits();
                if !was_enabled && ch.flags().contains(DmaCtl::DMAEN) {
                    ch.latch();
                }
            }
            regs::DMA_SA => ch.sa = value,
            regs::DMA_DA => ch.da = value,
            regs::DMA_SZ => ch.sz = value,
            _ => {}
        }
    }

    fn irq(&self) -> Option<Irq> {
        self.vector().map(|_| Irq::Dma)
    }

    fn snapshot(&self) -> serde_json::Value {
        let channels: Vec<_> = (0..DMA_CHANNELS as u8)
            .map(|n| {
                serde_json::json!({
                    "trigger": self.trigger(n),
                    "enabled": self.is_enabled(n),
                    "interrupt_pending": self.interrupt_pending(n),
                    "remaining": self.remaining(n),
                    "transfers": self.transfers(n),
                })
            })
            .collect();
        serde_json::json!({ "channels": channels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    fn ctl_offset(channel: u8) -> u16 {
        regs::dma_channel_base(channel) - regs::DMA_BASE
    }

    fn block(engine: &mut DmaEngine, channel: u8, size: u16) {
        let base = ctl_offset(channel);
        engine.write(base + regs::DMA_SA, 0x0712);
        engine.write(base + regs::DMA_DA, 0x1C00);
        engine.write(base + regs::DMA_SZ, size);
        let ctl = DmaCtl::DMAIE
            | DmaCtl::DMALEVEL
            | DmaCtl::DMASRCBYTE
            | DmaCtl::DMADSTBYTE
            | DmaCtl::DMADSTINCR_3;
        engine.write(base, ctl.bits());
    }

    #[test]
    fn test_trigger_select_layout() {
        let mut engine = DmaEngine::new();
        engine.write(
            0x00,
            (regs::DMA_TRIGGER_UCA0TX as u16) << 8 | regs::DMA_TRIGGER_ADC10 as u16,
        );
        assert_eq!(engine.trigger(0), regs::DMA_TRIGGER_ADC10);
        assert_eq!(engine.trigger(1), regs::DMA_TRIGGER_UCA0TX);
        assert_eq!(engine.trigger(2), 0);
    }

    #[test]
    fn test_disabled_channel_is_not_armed() {
        let mut engine = DmaEngine::new();
        block(&mut engine, 0, 3);
        assert_eq!(engine.armed_trigger(0), None);
        engine.write(ctl_offset(0), engine.peek(ctl_offset(0)) | DmaCtl::DMAEN.bits());
        assert_eq!(engine.armed_trigger(0), Some(0));
        assert_eq!(engine.remaining(0), 3);
    }

    #[test]
    fn test_single_block_completes_and_disables() {
        let mut engine = DmaEngine::new();
        block(&mut engine, 0, 3);
        engine.write(ctl_offset(0), engine.peek(ctl_offset(0)) | DmaCtl::DMAEN.bits());

        let mut destinations = Vec::new();
        for _ in 0..3 {
            let transfer = engine.current_transfer(0);
            assert_eq!(transfer.source, 0x0712);
            destinations.push(transfer.destination);
            engine.finish_transfer(0);
        }

        assert_eq!(destinations, vec![0x1C00, 0x1C01, 0x1C02]);
        assert!(!engine.is_enabled(0));
        assert_eq!(engine.irq(), Some(Irq::Dma));
        // Working registers reload for the next enable.
        assert_eq!(engine.current_transfer(0).destination, 0x1C00);
        assert_eq!(engine.remaining(0), 3);
    }

    #[test]
    fn test_iv_reports_lowest_channel_first() {
        let mut engine = DmaEngine::new();
        block(&mut engine, 0, 1);
        block(&mut engine, 1, 1);
        engine.force_complete(1);
        engine.force_complete(0);
        assert_eq!(engine.peek(IV), 0x02);
        assert_eq!(engine.read(IV), 0x02);
        assert_eq!(engine.read(IV), 0x04);
        assert_eq!(engine.read(IV), 0x00);
        assert_eq!(engine.irq(), None);
    }

    #[test]
    fn test_flag_without_enable_does_not_interrupt() {
        let mut engine = DmaEngine::new();
        engine.force_complete(2);
        assert!(engine.interrupt_pending(2));
        assert_eq!(engine.irq(), None);
        assert_eq!(engine.read(IV), 0);
    }

    #[test]
    fn test_edge_and_level_requests() {
        let mut engine = DmaEngine::new();
        block(&mut engine, 0, 3);
        assert!(engine.accept_request(0, true));
        assert!(engine.accept_request(0, true));

        let edge = engine.peek(ctl_offset(0)) & !DmaCtl::DMALEVEL.bits();
        engine.write(ctl_offset(0), edge);
        assert!(!engine.accept_request(0, true));
        assert!(!engine.accept_request(0, false));
        assert!(engine.accept_request(0, true));
    }
}
