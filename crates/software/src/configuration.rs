//! This module contains performer-selectable settings (implemented as enums) and a trait to make them easier to work
//! with from a pushbutton user interface.

mod articulation;
pub use articulation::*;

mod mode;
pub use mode::*;

use num_traits::{FromPrimitive, ToPrimitive};

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let index = self
            .to_u8()
            .expect("enum variants should be castable to u8");
        match <Self as FromPrimitive>::from_u8(index + 1) {
            Some(new_selection) => new_selection,
            None => FromPrimitive::from_u8(0).expect("enum should not be empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycles_through_arpeggiator_directions() {
        let config = Mode::Normal.cycle();
        assert_eq!(
            Mode::ArpUp,
            config,
            "Should advance to next variant; expected left but got right"
        );

        let config = config.cycle();
        assert_eq!(
            Mode::ArpDown,
            config,
            "Should advance to next variant; expected left but got right"
        );

        let config = config.cycle();
        assert_eq!(
            Mode::Normal,
            config,
            "Should wrap around to first variant; expected left but got right"
        );
    }

    #[test]
    fn articulation_toggles() {
        let config = Articulation::Legato.cycle();
        assert_eq!(
            Articulation::Staccato,
            config,
            "Should advance to next variant; expected left but got right"
        );
        assert_eq!(
            Articulation::Legato,
            config.cycle(),
            "Should wrap around to first variant; expected left but got right"
        );
    }
}
