use num_derive::{FromPrimitive, ToPrimitive};

/// Determines how long the gate stays high while keys are held.
///
/// Articulation is independent of [`Mode`](super::Mode): a single held key can be played staccato, and an arpeggio
/// can be played legato.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Articulation {
    /// The gate is held high for as long as any key is held.
    #[default]
    Legato,
    /// The gate follows the arpeggiator clock, dropping on each falling edge, so notes are clipped to half a clock
    /// period.
    Staccato,
}

impl super::CycleConfig for Articulation {}
