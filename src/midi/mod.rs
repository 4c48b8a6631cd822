//! MIDI tempo-map core
//!
//! Provides the SMF document model, tempo map view, speed scaler and
//! summary statistics.

mod error;
mod events;
mod file;
mod scaler;
mod summary;
mod tempo;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ErrorKind, MidiError, MidiResult};
pub use events::{encode_tempo, EventKind, TimedEvent, MAX_DELTA, MAX_TEMPO_MICROS};
pub use file::{MidiDocument, SmfFormat, Track};
pub use scaler::{SpeedChange, SpeedLimits, TempoScaler, MAX_SPEED, MIN_SPEED};
pub use summary::FileSummary;
pub use tempo::{TempoEntry, TempoMap, DEFAULT_MICROS_PER_QUARTER};
