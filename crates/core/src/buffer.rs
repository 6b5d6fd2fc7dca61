// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use core::cell::UnsafeCell;

use crate::config::SAMPLE_COUNT;
use crate::sample::SampleFrame;

/// The three-byte buffer shared by the two DMA channels.
///
/// The CPU never writes it. The sample channel fills it while sampling and
/// the transmit channel drains it while transmitting; the ring guarantees the
/// two never overlap.
#[repr(transparent)]
pub struct SampleBuffer(UnsafeCell<[u8; SAMPLE_COUNT]>);

// Only DMA hardware touches the contents.
unsafe impl Sync for SampleBuffer {}

impl SampleBuffer {
    pub const fn new() -> Self {
        Self(UnsafeCell::new([0; SAMPLE_COUNT]))
    }

    /// Bus address for the DMA source/destination registers.
    pub fn address(&self) -> u16 {
        self.0.get() as usize as u16
    }

    /// Volatile copy of the contents. Consistent only while the ring is idle.
    pub fn read(&self) -> SampleFrame {
        SampleFrame(unsafe { core::ptr::read_volatile(self.0.get()) })
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
