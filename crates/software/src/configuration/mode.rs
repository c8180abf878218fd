use num_derive::{FromPrimitive, ToPrimitive};

/// Determines how a chord of held keys is voiced on a monophonic instrument.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Sounds the lowest held key (low-note priority) for as long as the chord is held.
    #[default]
    Normal,
    /// Steps upward through the held keys on each rising edge of the arpeggiator clock, wrapping from the top of the
    /// key space back to the bottom.
    ArpUp,
    /// Steps downward through the held keys on each rising edge of the arpeggiator clock, wrapping from the bottom of
    /// the key space back to the top.
    ArpDown,
}

impl Mode {
    /// Direction of travel through the key space, in keys per clock step. `None` when not arpeggiating.
    pub fn step(&self) -> Option<i8> {
        match self {
            Self::Normal => None,
            Self::ArpUp => Some(1),
            Self::ArpDown => Some(-1),
        }
    }

    /// Returns `true` for either arpeggiator direction.
    pub fn is_arpeggiating(&self) -> bool {
        self.step().is_some()
    }
}

impl super::CycleConfig for Mode {}
