//! Provides [`VoiceResolver`], which decides what a monophonic voice should be doing given the keys that are held, the
//! sustain pedal, and the arpeggiator clock.
//!
//! Input and expression are kept apart. Events such as [`note_on`](VoiceResolver::note_on) and
//! [`tick_arp`](VoiceResolver::tick_arp) only update state; the output driver asks [`which_key`](VoiceResolver::which_key)
//! and [`gate`](VoiceResolver::gate) on its own schedule.

use crate::{
    KEY_SPACE,
    configuration::{Articulation, Mode},
    key_set::{KeySet, to_note},
};
use wmidi::Note;

/// Names which [`KeySet`] the resolver currently reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ActiveSet {
    /// Keys that are physically held.
    Live,
    /// Keys held when the sustain pedal went down, plus any struck since.
    Sustained,
}

/// Tracks held keys for a single voice and resolves them into a key to play and a gate.
///
/// Two [`KeySet`]s are maintained. The live set always mirrors the keys that are physically held. While the sustain
/// pedal is down, a second set accumulates every key struck (including those already held when the pedal went down)
/// and is only purged when the pedal is released; the resolver reads from that set instead for the duration.
///
/// The struct is [`Copy`], so a host sharing it between tasks can publish the whole state after each event rather than
/// risk a reader observing the active set and last key out of step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceResolver {
    mode: Mode,
    articulation: Articulation,
    /// Level of the arpeggiator clock as of the last edge.
    clock_high: bool,
    live: KeySet,
    sustained: KeySet,
    active: ActiveSet,
    /// The most recently resolved key. Retained after release so the oscillator can hold its pitch while the envelope
    /// decays.
    last_key: Note,
}

impl Default for VoiceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VoiceResolver {
    fn format(&self, fmt: defmt::Formatter) {
        let VoiceResolver {
            mode,
            articulation,
            clock_high,
            live,
            sustained,
            active,
            last_key,
        } = *self;
        defmt::write!(
            fmt,
            "VoiceResolver {{ mode: {}, articulation: {}, clock_high: {}, live: {}, sustained: {}, active: {}, last_key: {} }}",
            mode,
            articulation,
            clock_high,
            live,
            sustained,
            active,
            u8::from(last_key)
        );
    }
}

impl VoiceResolver {
    /// Construct a `VoiceResolver` with nothing held, the pedal up, low-note priority, and legato articulation.
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            articulation: Articulation::Legato,
            clock_high: false,
            live: KeySet::new(),
            sustained: KeySet::new(),
            active: ActiveSet::Live,
            last_key: Note::CMinus1,
        }
    }

    /// Accept a NoteOn. While sustaining, the key also joins the sustained chord immediately.
    pub fn note_on(&mut self, key: Note) {
        self.live.set_bit(key);

        if self.sustaining() {
            self.sustained.set_bit(key);
        }
    }

    /// Accept a NoteOff. Only the live set is touched; a sustained key keeps sounding until the pedal is released.
    pub fn note_off(&mut self, key: Note) {
        self.live.clear_bit(key);
    }

    /// Release every key, live and sustained alike, without changing the state of the pedal.
    pub fn release_all(&mut self) {
        self.live.clear_all();
        self.sustained.clear_all();
    }

    /// Press (`true`) or release (`false`) the sustain pedal.
    ///
    /// Pressing snapshots the live set into the sustained set and reads from the latter until release. Releasing purges
    /// the sustained set and hands control back to the live set, so whatever is still physically held becomes the chord.
    ///
    /// Every press takes a fresh snapshot, so pressing again while already sustaining drops keys released in the
    /// meantime. Callers fed by a continuous pedal should only forward changes of state.
    pub fn set_sustain(&mut self, on: bool) {
        if on {
            self.sustained = self.live;
            self.active = ActiveSet::Sustained;
        } else {
            self.sustained.clear_all();
            self.active = ActiveSet::Live;
        }
        debug!("Sustain {}", on);
    }

    /// Returns `true` while the sustain pedal is down.
    pub fn sustaining(&self) -> bool {
        self.active == ActiveSet::Sustained
    }

    /// Setter.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Getter.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Setter.
    pub fn set_articulation(&mut self, articulation: Articulation) {
        self.articulation = articulation;
    }

    /// Getter.
    pub fn articulation(&self) -> Articulation {
        self.articulation
    }

    /// Switch between staccato (`true`) and legato (`false`) articulation.
    pub fn set_staccato(&mut self, on: bool) {
        self.articulation = if on {
            Articulation::Staccato
        } else {
            Articulation::Legato
        };
    }

    /// Returns `true` when articulation is staccato.
    pub fn staccato(&self) -> bool {
        self.articulation == Articulation::Staccato
    }

    /// The set currently used to resolve the voice.
    fn active(&self) -> &KeySet {
        match self.active {
            ActiveSet::Live => &self.live,
            ActiveSet::Sustained => &self.sustained,
        }
    }

    /// Hunts through the active set in the direction of the arpeggiator, starting just past `start` and wrapping
    /// around the key space, for the next held key other than `start`.
    ///
    /// Returns `start` when no other key is held or when the mode doesn't arpeggiate.
    pub fn next(&self, start: Note) -> Note {
        let Some(step) = self.mode.step() else {
            return start;
        };

        let origin = i16::from(u8::from(start));
        (1..KEY_SPACE as i16)
            .map(|offset| {
                let key = (origin + offset * i16::from(step)).rem_euclid(KEY_SPACE as i16);
                to_note(key as u8)
            })
            .find(|&key| self.active().is_set(key))
            .unwrap_or(start)
    }

    /// Accept an edge from the arpeggiator clock, `true` for rising and `false` for falling.
    ///
    /// The clock is expected to run at twice the note rate. Rising edges advance the arpeggio (when there is more than
    /// one key to choose between); falling edges only lower the clock, cutting the gate in staccato mode.
    pub fn tick_arp(&mut self, rising: bool) {
        self.clock_high = rising;

        if rising && self.active().count() > 1 {
            self.last_key = self.next(self.last_key);
            trace!("Arpeggiator advanced to {}", u8::from(self.last_key));
        }
    }

    /// Returns the key the control voltage should represent.
    ///
    /// - With nothing held, the previous key is returned so the pitch holds while the note decays.
    /// - A single held key is voiced immediately in every mode, without waiting on the arpeggiator clock.
    /// - Otherwise, [`Mode::Normal`] voices the lowest held key, while the arpeggiator modes voice whichever key the
    ///   clock last stepped to.
    ///
    /// The result is latched so subsequent calls (and the arpeggiator) pick up from it.
    pub fn which_key(&mut self) -> Note {
        let active = *self.active();

        match active.first() {
            Some(lowest) if active.count() == 1 || !self.mode.is_arpeggiating() => {
                self.last_key = lowest;
            }
            // nothing held, or a chord the arpeggiator clock is stepping through
            _ => {}
        }

        self.last_key
    }

    /// Returns `true` if the gate should be high.
    ///
    /// In legato mode the gate is high whenever any key is held or sustained. In staccato mode it is additionally
    /// clipped by the arpeggiator clock, whether or not the arpeggiator is stepping.
    pub fn gate(&self) -> bool {
        let held = !self.active().is_empty();

        match self.articulation {
            Articulation::Legato => held,
            Articulation::Staccato => held && self.clock_high,
        }
    }
}
