// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Interrupt vector table, 0xFF80..=0xFFFD. The reset vector is emitted by
//! msp430-rt.

extern "msp430-interrupt" {
    fn DMA();
    fn TIMER0_A1();
    fn DefaultHandler();
}

#[derive(Clone, Copy)]
pub union Vector {
    handler: unsafe extern "msp430-interrupt" fn(),
    reserved: u16,
}

const VECTORS: usize = 63;
const DMA_VECTOR: usize = 50;
const TIMER0_A1_VECTOR: usize = 52;

#[link_section = ".vector_table.interrupts"]
#[no_mangle]
#[used]
pub static __INTERRUPTS: [Vector; VECTORS] = {
    let mut table = [Vector {
        handler: DefaultHandler,
    }; VECTORS];
    table[DMA_VECTOR] = Vector { handler: DMA };
    table[TIMER0_A1_VECTOR] = Vector {
        handler: TIMER0_A1,
    };
    table
};
