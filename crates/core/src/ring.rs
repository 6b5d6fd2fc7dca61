// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The sample-and-transmit ring.
//!
//! ```text
//!        TimerExpired            SamplesCaptured
//!   Idle ------------> Sampling ----------------> Transmitting
//!    ^                                                  |
//!    +--------------------------------------------------+
//!                      SamplesTransmitted
//! ```
//!
//! Exactly one stage owns the hardware at a time: the timer interrupt while
//! idle, the ADC and the sample channel while sampling, the transmit channel
//! while transmitting. Events that do not match the current stage are
//! acknowledged and otherwise ignored.

use crate::hal::{Adc, Board, Channel, Dma, DmaVector, Timer, TimerVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum Stage {
    Idle,
    Sampling,
    Transmitting,
}

impl Stage {
    pub const fn next(self, event: Event) -> Option<Stage> {
        match (self, event) {
            (Stage::Idle, Event::TimerExpired) => Some(Stage::Sampling),
            (Stage::Sampling, Event::SamplesCaptured) => Some(Stage::Transmitting),
            (Stage::Transmitting, Event::SamplesTransmitted) => Some(Stage::Idle),
            _ => None,
        }
    }
}

/// Hardware events that move the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    TimerExpired,
    SamplesCaptured,
    SamplesTransmitted,
}

impl Event {
    /// Only the overflow vector matters; capture/compare causes share the
    /// vector and are dropped.
    pub const fn from_timer(vector: TimerVector) -> Option<Self> {
        match vector {
            TimerVector::Overflow => Some(Event::TimerExpired),
            _ => None,
        }
    }

    pub const fn from_dma(vector: DmaVector) -> Option<Self> {
        match vector {
            DmaVector::Complete(Channel::SAMPLE) => Some(Event::SamplesCaptured),
            DmaVector::Complete(Channel::TRANSMIT) => Some(Event::SamplesTransmitted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Advanced { from: Stage, to: Stage },
    /// A ring event arrived in the wrong stage.
    OutOfOrder { stage: Stage, event: Event },
    /// The interrupt cause is not part of the ring.
    Ignored,
}

/// Drives the ring from the two interrupt handlers.
#[derive(Debug)]
pub struct Controller<B> {
    board: B,
    stage: Stage,
    cycles: u32,
}

impl<B: Board> Controller<B> {
    /// Takes over a board that has already been through startup.
    pub fn new(board: B) -> Self {
        Self {
            board,
            stage: Stage::Idle,
            cycles: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Completed sample-and-transmit cycles.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn board(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    /// Timer_A0 TA0IFG/CCR1..6 vector.
    pub fn on_timer_interrupt(&mut self) -> Outcome {
        let vector = self.board.timer().pending();
        match Event::from_timer(vector) {
            Some(event) => self.handle(event),
            None => {
                log_debug!("timer vector {:?} ignored", vector);
                Outcome::Ignored
            }
        }
    }

    /// DMA vector.
    pub fn on_dma_interrupt(&mut self) -> Outcome {
        let vector = self.board.dma().pending();
        match Event::from_dma(vector) {
            Some(event) => self.handle(event),
            None => {
                log_debug!("dma vector {:?} ignored", vector);
                Outcome::Ignored
            }
        }
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        let from = self.stage;
        let Some(to) = from.next(event) else {
            self.reject(event);
            return Outcome::OutOfOrder { stage: from, event };
        };

        match event {
            Event::TimerExpired => {
                // Stays off until the transmit stage completes.
                self.board.timer().disable_interrupt();
                self.board.timer().clear_overflow();
                // The trigger is level-sensitive, so a conversion finishing
                // before the channel is armed is not lost.
                self.board.adc().start_conversion();
                self.board.dma().enable(Channel::SAMPLE);
            }
            Event::SamplesCaptured => {
                self.board.adc().disable();
                self.board.dma().disable(Channel::SAMPLE);
                self.board.dma().enable(Channel::TRANSMIT);
            }
            Event::SamplesTransmitted => {
                self.board.dma().disable(Channel::TRANSMIT);
                // An overflow latched while the ring was busy is stale.
                self.board.timer().clear_overflow();
                self.board.timer().enable_interrupt();
                self.cycles = self.cycles.wrapping_add(1);
            }
        }

        self.stage = to;
        log_debug!("ring {:?} -> {:?}", from, to);
        Outcome::Advanced { from, to }
    }

    fn reject(&mut self, event: Event) {
        log_warn!("{:?} ignored in stage {:?}", event, self.stage);
        // A stray overflow must not retrigger; enable bits stay as they are.
        if event == Event::TimerExpired {
            self.board.timer().clear_overflow();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table_is_a_ring() {
        let mut stage = Stage::Idle;
        for event in [
            Event::TimerExpired,
            Event::SamplesCaptured,
            Event::SamplesTransmitted,
        ] {
            stage = stage.next(event).unwrap();
        }
        assert_eq!(stage, Stage::Idle);
    }

    #[test]
    fn test_transition_table_rejects_out_of_order() {
        assert_eq!(Stage::Idle.next(Event::SamplesCaptured), None);
        assert_eq!(Stage::Idle.next(Event::SamplesTransmitted), None);
        assert_eq!(Stage::Sampling.next(Event::TimerExpired), None);
        assert_eq!(Stage::Sampling.next(Event::SamplesTransmitted), None);
        assert_eq!(Stage::Transmitting.next(Event::TimerExpired), None);
        assert_eq!(Stage::Transmitting.next(Event::SamplesCaptured), None);
    }

    #[test]
    fn test_events_from_vectors() {
        assert_eq!(
            Event::from_timer(TimerVector::Overflow),
            Some(Event::TimerExpired)
        );
        assert_eq!(Event::from_timer(TimerVector::CaptureCompare(1)), None);
        assert_eq!(Event::from_timer(TimerVector::None), None);
        assert_eq!(
            Event::from_dma(DmaVector::Complete(Channel::SAMPLE)),
            Some(Event::SamplesCaptured)
        );
        assert_eq!(
            Event::from_dma(DmaVector::Complete(Channel::TRANSMIT)),
            Some(Event::SamplesTransmitted)
        );
        assert_eq!(Event::from_dma(DmaVector::Complete(Channel(2))), None);
        assert_eq!(Event::from_dma(DmaVector::Unknown(0x13)), None);
    }
}
