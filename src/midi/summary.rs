//! Summary statistics shown to the user after loading or scaling

use super::file::{MidiDocument, SmfFormat};

/// Information returned to the presentation layer about a loaded MIDI file
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Real time until the last event, under the current tempo map
    pub duration_seconds: f64,
    pub format: SmfFormat,
    /// Header resolution
    pub ticks_per_quarter: u16,
    pub num_tracks: usize,
    /// Distinct (track, channel, program) groups that play notes
    pub num_instruments: usize,
    /// Note on events with non-zero velocity
    pub num_notes: usize,
    /// Entries in the tempo map
    pub num_tempo_changes: usize,
    pub num_key_signature_changes: usize,
    /// Tempo at tick 0 (120 when the file sets none)
    pub initial_bpm: f64,
}

impl FileSummary {
    pub fn from_document(doc: &MidiDocument) -> Self {
        let tempo_map = doc.tempo_map();

        Self {
            duration_seconds: tempo_map.tick_to_seconds(doc.end_tick(), doc.ticks_per_quarter()),
            format: doc.format(),
            ticks_per_quarter: doc.ticks_per_quarter(),
            num_tracks: doc.num_tracks(),
            num_instruments: doc.instrument_count(),
            num_notes: doc.note_count(),
            num_tempo_changes: tempo_map.len(),
            num_key_signature_changes: doc.key_signature_count(),
            initial_bpm: tempo_map.initial_bpm(),
        }
    }
}
