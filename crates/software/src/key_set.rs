//! Provides [`KeySet`], a fixed-size record of which keys are held. "Held" here is purely a matter of bookkeeping; on a
//! monophonic instrument many keys can be held while only one sounds.

use crate::KEY_SPACE;
use wmidi::{Note, U7};

/// Membership of the full MIDI key space, one bit per key.
///
/// A cached count is kept alongside the bits. Setting a key that is already held, or clearing one that isn't, leaves
/// both untouched, so duplicate or dropped MIDI events can't skew the count away from the true population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeySet {
    /// Bit `n` is set while key `n` is held.
    bits: u128,
    count: u8,
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeySet {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "KeySet {{ count: {}, bits: [", self.count);
        for (i, &byte) in self.bits.to_le_bytes().iter().enumerate() {
            if i == 0 {
                defmt::write!(fmt, "{=u8:x}", byte);
            } else {
                defmt::write!(fmt, " {=u8:x}", byte);
            }
        }
        defmt::write!(fmt, "] }}");
    }
}

fn mask(key: Note) -> u128 {
    1_u128 << u8::from(key)
}

impl KeySet {
    /// Construct an empty `KeySet`.
    pub const fn new() -> Self {
        Self { bits: 0, count: 0 }
    }

    /// Mark `key` as held. Usually corresponds to a NoteOn.
    pub fn set_bit(&mut self, key: Note) {
        if !self.is_set(key) {
            self.bits |= mask(key);
            self.count += 1;
        }
    }

    /// Mark `key` as released. Usually corresponds to a NoteOff.
    pub fn clear_bit(&mut self, key: Note) {
        if self.is_set(key) {
            self.bits &= !mask(key);
            self.count -= 1;
        }
    }

    /// Release every key at once.
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Returns `true` if `key` is held.
    pub fn is_set(&self, key: Note) -> bool {
        self.bits & mask(key) != 0
    }

    /// Number of held keys.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Returns `true` if no key is held.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the lowest held key, or `None` if nothing is held.
    pub fn first(&self) -> Option<Note> {
        if self.bits == 0 {
            None
        } else {
            Some(to_note(self.bits.trailing_zeros() as u8))
        }
    }

    /// Returns the lowest held key, falling back to key 0 ([`Note::CMinus1`]) when nothing is held.
    ///
    /// The fallback is indistinguishable from a held key 0, so check [`count`](Self::count) first or use
    /// [`first`](Self::first) instead.
    pub fn lowest(&self) -> Note {
        self.first().unwrap_or(Note::CMinus1)
    }

    /// Returns an [`Iterator`] over the held keys, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        (0..KEY_SPACE as u8)
            .map(to_note)
            .filter(|&key| self.is_set(key))
    }
}

/// Key numbers come from `0..KEY_SPACE`, so the lossy conversion never actually loses anything.
pub(crate) fn to_note(key: u8) -> Note {
    Note::from(U7::from_u8_lossy(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord() -> KeySet {
        let mut keys = KeySet::new();
        keys.set_bit(Note::E4);
        keys.set_bit(Note::C4);
        keys.set_bit(Note::G4);
        keys
    }

    #[test]
    fn new_is_empty() {
        let keys = KeySet::new();
        assert_eq!(0, keys.count(), "Expected left but got right");
        assert!(keys.is_empty());
        assert_eq!(None, keys.first());
        assert_eq!(KeySet::default(), keys, "Expected left but got right");
    }

    #[test]
    fn set_bit() {
        let keys = chord();
        assert_eq!(3, keys.count(), "Expected left but got right");
        assert!(keys.is_set(Note::C4));
        assert!(keys.is_set(Note::E4));
        assert!(keys.is_set(Note::G4));
        assert!(!keys.is_set(Note::D4));
    }

    #[test]
    fn clear_bit() {
        let mut keys = chord();
        keys.clear_bit(Note::E4);
        assert_eq!(2, keys.count(), "Expected left but got right");
        assert!(!keys.is_set(Note::E4));
        assert!(keys.is_set(Note::C4));
    }

    #[test]
    fn duplicate_set_does_not_skew_count() {
        let mut keys = chord();
        keys.set_bit(Note::C4);
        keys.set_bit(Note::C4);
        assert_eq!(3, keys.count(), "Expected left but got right");
        assert_eq!(keys.iter().count(), keys.count() as usize);
    }

    #[test]
    fn clearing_unheld_key_does_not_skew_count() {
        let mut keys = chord();
        keys.clear_bit(Note::D4);
        assert_eq!(3, keys.count(), "Expected left but got right");

        let mut empty = KeySet::new();
        empty.clear_bit(Note::C4);
        assert_eq!(0, empty.count(), "Count should not underflow");
    }

    #[test]
    fn lowest() {
        assert_eq!(Note::C4, chord().lowest(), "Expected left but got right");
        assert_eq!(Some(Note::C4), chord().first(), "Expected left but got right");
    }

    #[test]
    fn lowest_of_empty_set_is_key_zero() {
        assert_eq!(Note::CMinus1, KeySet::new().lowest(), "Expected left but got right");
    }

    #[test]
    fn lowest_at_both_ends_of_key_space() {
        let mut keys = KeySet::new();
        keys.set_bit(Note::G9);
        assert_eq!(Note::G9, keys.lowest(), "Expected left but got right");
        keys.set_bit(Note::CMinus1);
        assert_eq!(Note::CMinus1, keys.lowest(), "Expected left but got right");
        assert_eq!(2, keys.count(), "Expected left but got right");
    }

    #[test]
    fn clear_all() {
        let mut keys = chord();
        keys.clear_all();
        assert_eq!(0, keys.count(), "Expected left but got right");
        assert_eq!(Note::CMinus1, keys.lowest(), "Expected left but got right");

        // idempotent
        keys.clear_all();
        assert_eq!(KeySet::new(), keys, "Expected left but got right");
    }

    #[test]
    fn iter_is_ascending() {
        let chord = chord();
        let mut iter = chord.iter();
        assert_eq!(Some(Note::C4), iter.next());
        assert_eq!(Some(Note::E4), iter.next());
        assert_eq!(Some(Note::G4), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn copies_are_independent() {
        let original = chord();
        let mut snapshot = original;
        snapshot.clear_bit(Note::C4);
        assert!(original.is_set(Note::C4), "Copy should not alias the original");
    }

    #[test]
    fn count_tracks_population_through_mixed_sequence() {
        let mut keys = KeySet::new();
        let sequence: [(u8, bool); 10] = [
            (60, true),
            (64, true),
            (60, true),
            (67, true),
            (64, false),
            (64, false),
            (0, true),
            (127, true),
            (60, false),
            (0, false),
        ];
        for (key, on) in sequence {
            let note = to_note(key);
            if on {
                keys.set_bit(note);
            } else {
                keys.clear_bit(note);
            }
            assert_eq!(keys.iter().count(), keys.count() as usize);
            assert_eq!(keys.iter().next().unwrap_or(Note::CMinus1), keys.lowest());
        }
        assert_eq!(2, keys.count(), "Expected left but got right");
        assert_eq!(Note::G4, keys.lowest(), "Expected left but got right");
    }
}
