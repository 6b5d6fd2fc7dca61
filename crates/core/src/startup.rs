// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::config::{SystemConfig, TransferConfig};
use crate::hal::{Adc, Board, Channel, Clocks, Core, Dma, Gpio, Serial, Timer, Watchdog};

/// Bring the peripherals up in order. The clock tree comes before anything
/// that derives timing from it.
///
/// `buffer` is the bus address of the sample buffer shared by both DMA
/// channels.
pub fn configure<B: Board>(board: &mut B, config: &SystemConfig, buffer: u16) {
    board.watchdog().disable();
    board.clocks().configure(&config.clocks);
    board.gpio().configure(&config.pins);
    board.adc().configure(&config.adc);
    board.serial().configure(&config.serial);
    board.timer().configure(&config.timer);
    board
        .dma()
        .configure(Channel::SAMPLE, &TransferConfig::sample(buffer));
    board
        .dma()
        .configure(Channel::TRANSMIT, &TransferConfig::transmit(buffer));
    log_debug!("peripherals configured, buffer at {:#06x}", buffer);
}

/// [`configure`], then open the global interrupt gate. The caller's main
/// loop is expected to do nothing but [`Core::sleep`].
pub fn boot<B: Board, C: Core>(
    board: &mut B,
    core: &mut C,
    config: &SystemConfig,
    buffer: u16,
) {
    configure(board, config, buffer);
    core.enable_interrupts();
}
