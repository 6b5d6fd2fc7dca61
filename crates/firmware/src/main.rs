// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! MSP430FR5739 image.
//!
//! Every three seconds the timer starts the ADC, DMA0 copies three samples
//! into RAM, DMA1 pushes them out of UCA0, and the timer is re-armed. The
//! CPU only runs the two interrupt handlers; otherwise it sits in LPM3.

#![no_main]
#![no_std]
#![feature(abi_msp430_interrupt, asm_experimental_arch)]

mod vectors;

use core::cell::RefCell;

use critical_section::Mutex;
use msp430_rt::entry;
use panic_msp430 as _;
use thermodma_core::buffer::SampleBuffer;
use thermodma_core::bus::Mmio;
use thermodma_core::config::SYSTEM;
use thermodma_core::drivers::Mcu;
use thermodma_core::hal::Core;
use thermodma_core::ring::Controller;
use thermodma_core::startup;

type Ring = Controller<Mcu<Mmio>>;

static BUFFER: SampleBuffer = SampleBuffer::new();
static RING: Mutex<RefCell<Option<Ring>>> = Mutex::new(RefCell::new(None));

/// SR bits for LPM3 with interrupts enabled: SCG1 | SCG0 | CPUOFF | GIE.
const LPM3_GIE: u16 = 0x00D8;

struct Cpu;

impl Core for Cpu {
    fn enable_interrupts(&mut self) {
        unsafe { msp430::interrupt::enable() };
    }

    fn sleep(&mut self) {
        unsafe {
            core::arch::asm!("bis.w #{bits}, r2", bits = const LPM3_GIE, options(nomem, nostack));
        }
    }
}

#[entry]
fn main() -> ! {
    // SAFETY: the drivers are the only code touching the peripheral space.
    let mut board = Mcu::new(unsafe { Mmio::steal() });
    let mut cpu = Cpu;

    startup::configure(&mut board, &SYSTEM, BUFFER.address());
    // The handlers must find the controller before GIE is set.
    critical_section::with(|cs| *RING.borrow_ref_mut(cs) = Some(Controller::new(board)));
    cpu.enable_interrupts();

    loop {
        cpu.sleep();
    }
}

#[no_mangle]
extern "msp430-interrupt" fn TIMER0_A1() {
    critical_section::with(|cs| {
        if let Some(ring) = RING.borrow_ref_mut(cs).as_mut() {
            ring.on_timer_interrupt();
        }
    });
}

#[no_mangle]
extern "msp430-interrupt" fn DMA() {
    critical_section::with(|cs| {
        if let Some(ring) = RING.borrow_ref_mut(cs).as_mut() {
            ring.on_dma_interrupt();
        }
    });
}

// Debug builds emit calls to abort(), which the target does not provide.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
