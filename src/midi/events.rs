//! Owned MIDI track events
//!
//! Events are stored with their delta-time exactly as they appear in a track
//! chunk. Absolute tick positions are derived on demand. Conversion to and
//! from `midly` keeps every payload byte so a parse/serialize cycle does not
//! alter musical content.

use midly::num::{u14, u24, u28, u4, u7};
use midly::{Fps, MetaMessage, MidiMessage, PitchBend, TrackEvent, TrackEventKind};

use super::error::{MidiError, MidiResult};

/// Largest delta-time a track chunk can encode (28-bit variable length quantity)
pub const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// Largest Set Tempo payload (24-bit)
pub const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Note on event
    NoteOn {
        /// MIDI channel (0-15)
        channel: u8,
        /// MIDI note number (0-127)
        key: u8,
        /// Velocity (0-127), 0 acts as a note off
        velocity: u8,
    },
    /// Note off event
    NoteOff {
        /// MIDI channel (0-15)
        channel: u8,
        /// MIDI note number (0-127)
        key: u8,
        /// Release velocity (0-127)
        velocity: u8,
    },
    /// Polyphonic key pressure
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    /// Control change (CC) event
    ControlChange {
        /// MIDI channel (0-15)
        channel: u8,
        /// Controller number (0-127)
        controller: u8,
        /// Controller value (0-127)
        value: u8,
    },
    /// Program change
    ProgramChange { channel: u8, program: u8 },
    /// Channel pressure
    ChannelAftertouch { channel: u8, pressure: u8 },
    /// Pitch bend event
    PitchBend {
        /// MIDI channel (0-15)
        channel: u8,
        /// 14-bit pitch bend value (0-16383, center at 8192)
        value: u16,
    },
    /// Set Tempo meta event (0xFF 0x51)
    ///
    /// Kept as `f64` so repeated scaling composes without rounding drift.
    /// Rounded to an integer only when the track is encoded.
    Tempo { micros_per_quarter: f64 },
    /// Key Signature meta event (0xFF 0x59)
    KeySignature {
        /// Negative for flats, positive for sharps
        sharps: i8,
        minor: bool,
    },
    /// Time Signature meta event (0xFF 0x58)
    TimeSignature {
        numerator: u8,
        /// Denominator as a power of two (2 = quarter note)
        denominator_pow2: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    },
    /// Any other meta event, kept as its type byte and raw payload
    Meta { meta_type: u8, data: Vec<u8> },
    /// System exclusive message (payload after the 0xF0 status byte)
    SysEx(Vec<u8>),
    /// Escape sequence (payload after the 0xF7 status byte)
    Escape(Vec<u8>),
    /// End of Track meta event (0xFF 0x2F)
    EndOfTrack,
}

/// An event with the delta-time that precedes it in its track
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Ticks since the previous event in the same track
    pub delta: u32,
    pub kind: EventKind,
}

impl TimedEvent {
    #[inline]
    pub fn new(delta: u32, kind: EventKind) -> Self {
        Self { delta, kind }
    }

    /// Convert from a parsed `midly` event
    pub fn from_midly(event: &TrackEvent<'_>) -> Self {
        Self {
            delta: event.delta.as_int(),
            kind: EventKind::from_midly(&event.kind),
        }
    }

    /// Borrowing conversion to a `midly` event for encoding
    ///
    /// Fails on a delta-time or tempo value the file format cannot hold.
    pub fn to_midly(&self) -> MidiResult<TrackEvent<'_>> {
        if self.delta > MAX_DELTA {
            return Err(MidiError::Internal(format!(
                "delta-time {} does not fit in a variable length quantity",
                self.delta
            )));
        }
        Ok(TrackEvent {
            delta: u28::from(self.delta),
            kind: self.kind.to_midly()?,
        })
    }
}

impl EventKind {
    /// True for a note on with non-zero velocity
    pub fn is_note_start(&self) -> bool {
        matches!(self, EventKind::NoteOn { velocity, .. } if *velocity > 0)
    }

    /// Channel of a channel voice message
    pub fn channel(&self) -> Option<u8> {
        match *self {
            EventKind::NoteOn { channel, .. }
            | EventKind::NoteOff { channel, .. }
            | EventKind::PolyAftertouch { channel, .. }
            | EventKind::ControlChange { channel, .. }
            | EventKind::ProgramChange { channel, .. }
            | EventKind::ChannelAftertouch { channel, .. }
            | EventKind::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }

    pub fn from_midly(kind: &TrackEventKind<'_>) -> Self {
        match *kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
                        channel,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::NoteOff { key, vel } => EventKind::NoteOff {
                        channel,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::Aftertouch { key, vel } => EventKind::PolyAftertouch {
                        channel,
                        key: key.as_int(),
                        pressure: vel.as_int(),
                    },
                    MidiMessage::Controller { controller, value } => EventKind::ControlChange {
                        channel,
                        controller: controller.as_int(),
                        value: value.as_int(),
                    },
                    MidiMessage::ProgramChange { program } => EventKind::ProgramChange {
                        channel,
                        program: program.as_int(),
                    },
                    MidiMessage::ChannelAftertouch { vel } => EventKind::ChannelAftertouch {
                        channel,
                        pressure: vel.as_int(),
                    },
                    MidiMessage::PitchBend { bend } => EventKind::PitchBend {
                        channel,
                        value: bend.0.as_int(),
                    },
                }
            }
            TrackEventKind::SysEx(data) => EventKind::SysEx(data.to_vec()),
            TrackEventKind::Escape(data) => EventKind::Escape(data.to_vec()),
            TrackEventKind::Meta(meta) => match meta {
                MetaMessage::Tempo(us) => EventKind::Tempo {
                    micros_per_quarter: us.as_int() as f64,
                },
                MetaMessage::KeySignature(sharps, minor) => EventKind::KeySignature { sharps, minor },
                MetaMessage::TimeSignature(numerator, denominator_pow2, clocks_per_click, thirty_seconds_per_quarter) => {
                    EventKind::TimeSignature {
                        numerator,
                        denominator_pow2,
                        clocks_per_click,
                        thirty_seconds_per_quarter,
                    }
                }
                MetaMessage::EndOfTrack => EventKind::EndOfTrack,
                other => {
                    let (meta_type, data) = raw_meta(&other);
                    EventKind::Meta { meta_type, data }
                }
            },
        }
    }

    pub fn to_midly(&self) -> MidiResult<TrackEventKind<'_>> {
        let midi = |channel: u8, message: MidiMessage| TrackEventKind::Midi {
            channel: u4::from(channel),
            message,
        };

        let kind = match self {
            EventKind::NoteOn { channel, key, velocity } => midi(
                *channel,
                MidiMessage::NoteOn { key: u7::from(*key), vel: u7::from(*velocity) },
            ),
            EventKind::NoteOff { channel, key, velocity } => midi(
                *channel,
                MidiMessage::NoteOff { key: u7::from(*key), vel: u7::from(*velocity) },
            ),
            EventKind::PolyAftertouch { channel, key, pressure } => midi(
                *channel,
                MidiMessage::Aftertouch { key: u7::from(*key), vel: u7::from(*pressure) },
            ),
            EventKind::ControlChange { channel, controller, value } => midi(
                *channel,
                MidiMessage::Controller {
                    controller: u7::from(*controller),
                    value: u7::from(*value),
                },
            ),
            EventKind::ProgramChange { channel, program } => {
                midi(*channel, MidiMessage::ProgramChange { program: u7::from(*program) })
            }
            EventKind::ChannelAftertouch { channel, pressure } => {
                midi(*channel, MidiMessage::ChannelAftertouch { vel: u7::from(*pressure) })
            }
            EventKind::PitchBend { channel, value } => midi(
                *channel,
                MidiMessage::PitchBend { bend: PitchBend(u14::from(*value)) },
            ),
            EventKind::Tempo { micros_per_quarter } => {
                let micros = encode_tempo(*micros_per_quarter).ok_or_else(|| {
                    MidiError::Internal(format!(
                        "tempo {} µs per quarter note does not fit in a Set Tempo event",
                        micros_per_quarter
                    ))
                })?;
                TrackEventKind::Meta(MetaMessage::Tempo(u24::from(micros)))
            }
            EventKind::KeySignature { sharps, minor } => {
                TrackEventKind::Meta(MetaMessage::KeySignature(*sharps, *minor))
            }
            EventKind::TimeSignature {
                numerator,
                denominator_pow2,
                clocks_per_click,
                thirty_seconds_per_quarter,
            } => TrackEventKind::Meta(MetaMessage::TimeSignature(
                *numerator,
                *denominator_pow2,
                *clocks_per_click,
                *thirty_seconds_per_quarter,
            )),
            EventKind::Meta { meta_type, data } => TrackEventKind::Meta(MetaMessage::Unknown(*meta_type, data)),
            EventKind::SysEx(data) => TrackEventKind::SysEx(data),
            EventKind::Escape(data) => TrackEventKind::Escape(data),
            EventKind::EndOfTrack => TrackEventKind::Meta(MetaMessage::EndOfTrack),
        };
        Ok(kind)
    }
}

/// Round a tempo to the integer a Set Tempo event holds
///
/// `None` when the rounded value is outside `1..=MAX_TEMPO_MICROS`.
pub fn encode_tempo(micros_per_quarter: f64) -> Option<u32> {
    let rounded = micros_per_quarter.round();
    (rounded >= 1.0 && rounded <= MAX_TEMPO_MICROS as f64).then_some(rounded as u32)
}

/// Type byte and payload of a meta message that has no dedicated variant
fn raw_meta(meta: &MetaMessage<'_>) -> (u8, Vec<u8>) {
    match *meta {
        MetaMessage::TrackNumber(number) => (0x00, number.map(|n| n.to_be_bytes().to_vec()).unwrap_or_default()),
        MetaMessage::Text(data) => (0x01, data.to_vec()),
        MetaMessage::Copyright(data) => (0x02, data.to_vec()),
        MetaMessage::TrackName(data) => (0x03, data.to_vec()),
        MetaMessage::InstrumentName(data) => (0x04, data.to_vec()),
        MetaMessage::Lyric(data) => (0x05, data.to_vec()),
        MetaMessage::Marker(data) => (0x06, data.to_vec()),
        MetaMessage::CuePoint(data) => (0x07, data.to_vec()),
        MetaMessage::ProgramName(data) => (0x08, data.to_vec()),
        MetaMessage::DeviceName(data) => (0x09, data.to_vec()),
        MetaMessage::MidiChannel(channel) => (0x20, vec![channel.as_int()]),
        MetaMessage::MidiPort(port) => (0x21, vec![port.as_int()]),
        MetaMessage::EndOfTrack => (0x2F, Vec::new()),
        MetaMessage::Tempo(us) => (0x51, us.as_int().to_be_bytes()[1..].to_vec()),
        MetaMessage::SmpteOffset(time) => {
            let rate = match time.fps() {
                Fps::Fps24 => 0u8,
                Fps::Fps25 => 1,
                Fps::Fps29 => 2,
                Fps::Fps30 => 3,
            };
            (
                0x54,
                vec![
                    (rate << 5) | time.hour(),
                    time.minute(),
                    time.second(),
                    time.frame(),
                    time.subframe(),
                ],
            )
        }
        MetaMessage::TimeSignature(n, d, c, b) => (0x58, vec![n, d, c, b]),
        MetaMessage::KeySignature(sharps, minor) => (0x59, vec![sharps as u8, minor as u8]),
        MetaMessage::SequencerSpecific(data) => (0x7F, data.to_vec()),
        MetaMessage::Unknown(meta_type, data) => (meta_type, data.to_vec()),
    }
}
