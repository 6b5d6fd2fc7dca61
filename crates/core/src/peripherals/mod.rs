// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register-level models of the FR5739 peripherals the sampler touches.
//!
//! Offsets passed to the models are relative to each module's base address.

pub mod adc;
pub mod clock;
pub mod dma;
pub mod gpio;
pub mod timer;
pub mod uart;
pub mod watchdog;
