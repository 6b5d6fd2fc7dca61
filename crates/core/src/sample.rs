// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Decoding of the raw bytes on the serial line.
//!
//! With VR+ = AVCC and VR- = VSS an 8-bit conversion is
//! `N = 255 * V_IN / VR+`. The LM35 outputs 10 mV per degree Celsius.

use crate::config::SAMPLE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sample(pub u8);

impl Sample {
    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn millivolts(self, reference_mv: u16) -> u16 {
        (self.0 as u32 * reference_mv as u32 / 255) as u16
    }

    /// Tenths of a degree Celsius for an LM35 (1 mV per 0.1 degree).
    pub const fn lm35_decicelsius(self, reference_mv: u16) -> u16 {
        self.millivolts(reference_mv)
    }

    /// Nearest code for an input voltage, saturating at full scale.
    pub const fn from_millivolts(mv: u16, reference_mv: u16) -> Self {
        if reference_mv == 0 || mv >= reference_mv {
            return Self(u8::MAX);
        }
        let code = (mv as u32 * 255 + reference_mv as u32 / 2) / reference_mv as u32;
        Self(code as u8)
    }
}

/// The bytes sent in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleFrame(pub [u8; SAMPLE_COUNT]);

impl SampleFrame {
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.0.iter().copied().map(Sample)
    }

    /// Rounded mean code of the frame.
    pub fn mean(&self) -> Sample {
        let sum: u32 = self.0.iter().map(|&b| b as u32).sum();
        let n = SAMPLE_COUNT as u32;
        Sample(((sum + n / 2) / n) as u8)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let frame: [u8; SAMPLE_COUNT] = bytes.try_into().ok()?;
        Some(Self(frame))
    }
}

impl From<[u8; SAMPLE_COUNT]> for SampleFrame {
    fn from(bytes: [u8; SAMPLE_COUNT]) -> Self {
        Self(bytes)
    }
}

/// Split a captured serial stream into frames. A trailing partial frame is
/// dropped; the line has no framing to resynchronise on.
pub fn frames(stream: &[u8]) -> impl Iterator<Item = SampleFrame> + '_ {
    stream
        .chunks_exact(SAMPLE_COUNT)
        .filter_map(SampleFrame::from_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millivolts_full_scale() {
        assert_eq!(Sample(0).millivolts(3600), 0);
        assert_eq!(Sample(255).millivolts(3600), 3600);
        // 3.6 V / 255 = 14.1 mV per code
        assert_eq!(Sample(17).millivolts(3600), 240);
    }

    #[test]
    fn test_lm35_room_temperature() {
        // 21.5 C -> 215 mV -> code 15 -> 211 mV
        let sample = Sample::from_millivolts(215, 3600);
        assert_eq!(sample, Sample(15));
        assert_eq!(sample.lm35_decicelsius(3600), 211);
    }

    #[test]
    fn test_from_millivolts_saturates() {
        assert_eq!(Sample::from_millivolts(4000, 3600), Sample(255));
        assert_eq!(Sample::from_millivolts(10, 0), Sample(255));
    }

    #[test]
    fn test_frame_mean_rounds() {
        let frame = SampleFrame([10, 11, 11]);
        assert_eq!(frame.mean(), Sample(11));
        assert_eq!(frame.samples().count(), SAMPLE_COUNT);
    }

    #[test]
    fn test_frames_drop_partial_tail() {
        let stream = [1, 2, 3, 4, 5, 6, 7];
        let frames: Vec<_> = frames(&stream).collect();
        assert_eq!(frames, vec![SampleFrame([1, 2, 3]), SampleFrame([4, 5, 6])]);
    }
}
