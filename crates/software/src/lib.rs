//! This crate contains the architecture-agnostic core of a MIDI to [CV/gate](https://en.wikipedia.org/wiki/CV/gate)
//! interface for a monophonic synthesizer. It tracks which keys are held (honoring a sustain pedal), arbitrates
//! between them with low-note priority or a clocked arpeggiator, and answers the two questions an output driver
//! asks on every poll: which key should the control voltage represent, and should the gate be high?
//!
//! Nothing in here owns a timer or touches hardware. The arpeggiator clock arrives as edges fed in by the host,
//! which keeps every transition deterministic and testable off-target.

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

/// Bitset-backed tracking of held keys.
pub mod key_set;

pub mod configuration;

pub mod midi;

pub mod voice;

/// Number of addressable keys; MIDI note numbers span `0..KEY_SPACE`.
pub const KEY_SPACE: usize = 128;
