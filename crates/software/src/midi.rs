//! Translation of MIDI messages into [`VoiceResolver`] events, for either decoded [`MidiMessage`]s or raw USB-MIDI
//! Event Packets.

use crate::voice::VoiceResolver;
use bitmask_enum::bitmask;
use wmidi::{ControlFunction, MidiMessage};

/// Lowest CC 64 value interpreted as the damper pedal being down.
const DAMPER_PEDAL_THRESHOLD: u8 = 64;

/// Kinds of state change that may result from processing MIDI input.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Indicates a key was pressed or released during the last update.
    NoteChange,
    /// Indicates the sustain pedal changed during the last update.
    SustainChange,
}

impl VoiceResolver {
    /// Updates the voice given a single MIDI message. Returns the type of [`Operation`] performed.
    ///
    /// Messages are accepted on every channel. A NoteOn with zero velocity is treated as a NoteOff, as the MIDI
    /// specification requires.
    pub fn receive(&mut self, msg: &MidiMessage) -> Operation {
        match *msg {
            MidiMessage::NoteOn(channel, note, velocity) if u8::from(velocity) > 0 => {
                self.note_on(note);
                info!(
                    "Received NoteOn: channel {}, note {}, velocity: {}",
                    channel.number(),
                    note.to_str(),
                    u8::from(velocity)
                );
                Operation::NoteChange
            }
            MidiMessage::NoteOn(channel, note, _) | MidiMessage::NoteOff(channel, note, _) => {
                self.note_off(note);
                info!(
                    "Received NoteOff: channel {}, note {}",
                    channel.number(),
                    note.to_str()
                );
                Operation::NoteChange
            }
            MidiMessage::ControlChange(channel, control_function, control_value) => {
                match control_function {
                    ControlFunction::DAMPER_PEDAL => {
                        let down = u8::from(control_value) >= DAMPER_PEDAL_THRESHOLD;
                        info!(
                            "Received Damper Pedal Control Change: channel {}, value: {}",
                            channel.number(),
                            u8::from(control_value)
                        );
                        if down == self.sustaining() {
                            Operation::none()
                        } else {
                            self.set_sustain(down);
                            Operation::SustainChange
                        }
                    }
                    ControlFunction::ALL_NOTES_OFF | ControlFunction::ALL_SOUND_OFF => {
                        self.release_all();
                        info!(
                            "Received {} on channel {}, releasing all keys",
                            u8::from(control_function),
                            channel.number()
                        );
                        Operation::NoteChange
                    }
                    _ => {
                        info!(
                            "Received unsupported Control Change {} on channel {}",
                            u8::from(control_function),
                            channel.number()
                        );
                        Operation::none()
                    }
                }
            }
            _ => {
                let mut data = [0_u8; 3];
                if msg.copy_to_slice(&mut data).is_ok() {
                    info!("Received unsupported MIDI message: {}", data);
                } else {
                    info!("Received unsupported MIDI message");
                }
                Operation::none()
            }
        }
    }

    /// Updates the voice given a slice of data. Returns every type of [`Operation`] performed.
    ///
    /// Data may contain one or more USB-MIDI Event Packets. Packets which are truncated or which don't hold a valid MIDI
    /// message are logged and skipped.
    pub fn update(&mut self, data: &[u8]) -> Operation {
        data.chunks(4)
            .filter_map(|potential_packet| {
                if potential_packet.len() != 4 {
                    error!("USB-MIDI Event Packets must always be 32 bits long");
                    None
                } else {
                    // the zeroth byte is intentionally ignored because the Packet Header is not of interest;
                    // the remaining three bytes contain the actual MIDI event
                    MidiMessage::from_bytes(&potential_packet[1..])
                        .inspect_err(|_| error!("Could not decode USB-MIDI Event Packet"))
                        .ok()
                }
            })
            .fold(Operation::none(), |operation, msg| {
                operation | self.receive(&msg)
            })
    }
}
