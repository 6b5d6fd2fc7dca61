// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::ring::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    pub ticks: u64,
    pub ring: RingSnapshot,
    /// Contents of the sample buffer in RAM.
    pub buffer: Vec<u8>,
    pub transmitted: Vec<u8>,
    pub peripherals: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingSnapshot {
    pub stage: Stage,
    pub cycles: u32,
    pub interrupts_enabled: bool,
}
