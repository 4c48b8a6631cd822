//! MIDI file parsing and encoding
//!
//! Loads standard MIDI files (.mid) into an owned, editable document and
//! writes them back. Byte-level decoding is done by `midly`; this module adds
//! chunk validation, track normalisation and the document model.

use std::collections::HashSet;
use std::path::Path;

use midly::num::u15;
use midly::{Format, Header, Smf, Timing, TrackEvent};

use super::error::{MidiError, MidiResult};
use super::events::{EventKind, TimedEvent};
use super::tempo::TempoMap;

/// SMF format type from the header chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SmfFormat {
    /// Type 0: one multi-channel track
    SingleTrack,
    /// Type 1: simultaneous tracks sharing one tempo map
    Parallel,
    /// Type 2: independent sequential patterns
    Sequential,
}

impl SmfFormat {
    pub fn type_number(self) -> u16 {
        match self {
            SmfFormat::SingleTrack => 0,
            SmfFormat::Parallel => 1,
            SmfFormat::Sequential => 2,
        }
    }

    fn from_midly(format: Format) -> Self {
        match format {
            Format::SingleTrack => SmfFormat::SingleTrack,
            Format::Parallel => SmfFormat::Parallel,
            Format::Sequential => SmfFormat::Sequential,
        }
    }

    fn to_midly(self) -> Format {
        match self {
            SmfFormat::SingleTrack => Format::SingleTrack,
            SmfFormat::Parallel => Format::Parallel,
            SmfFormat::Sequential => Format::Sequential,
        }
    }
}

/// One track chunk: events in stored order, always closed by a single EndOfTrack
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    events: Vec<TimedEvent>,
}

impl Track {
    /// Build a track, enforcing exactly one trailing EndOfTrack
    ///
    /// EndOfTrack events found before the end are dropped and their delta is
    /// carried into the following event, so absolute ticks are unchanged.
    pub fn new(events: Vec<TimedEvent>) -> Self {
        let mut normalised: Vec<TimedEvent> = Vec::with_capacity(events.len() + 1);
        let mut carried: u64 = 0;

        for event in events {
            if event.kind == EventKind::EndOfTrack {
                carried += event.delta as u64;
                continue;
            }
            let delta = (carried + event.delta as u64).min(u32::MAX as u64) as u32;
            carried = 0;
            normalised.push(TimedEvent::new(delta, event.kind));
        }

        let end_delta = carried.min(u32::MAX as u64) as u32;
        normalised.push(TimedEvent::new(end_delta, EventKind::EndOfTrack));

        Self { events: normalised }
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Events paired with their absolute tick position
    pub fn iter_absolute(&self) -> impl Iterator<Item = (u64, &TimedEvent)> + '_ {
        self.events.iter().scan(0u64, |tick, event| {
            *tick += event.delta as u64;
            Some((*tick, event))
        })
    }

    /// Absolute tick of the closing EndOfTrack
    pub fn end_tick(&self) -> u64 {
        self.events.iter().map(|e| e.delta as u64).sum()
    }

    fn to_midly(&self) -> MidiResult<Vec<TrackEvent<'_>>> {
        self.events.iter().map(TimedEvent::to_midly).collect()
    }
}

/// A parsed Standard MIDI File
#[derive(Debug, Clone, PartialEq)]
pub struct MidiDocument {
    format: SmfFormat,
    /// Header resolution (ticks per quarter note), never 0
    ticks_per_quarter: u16,
    tracks: Vec<Track>,
}

impl MidiDocument {
    /// Assemble a document from its parts
    pub fn new(format: SmfFormat, ticks_per_quarter: u16, tracks: Vec<Track>) -> MidiResult<Self> {
        if ticks_per_quarter == 0 || ticks_per_quarter > 0x7FFF {
            return Err(MidiError::Format(format!(
                "ticks per quarter note must be in 1..=32767, got {}",
                ticks_per_quarter
            )));
        }
        if format == SmfFormat::SingleTrack && tracks.len() != 1 {
            return Err(MidiError::Format(format!(
                "format 0 file must contain exactly one track, found {}",
                tracks.len()
            )));
        }
        Ok(Self {
            format,
            ticks_per_quarter,
            tracks,
        })
    }

    /// Parse raw SMF bytes
    pub fn parse(data: &[u8]) -> MidiResult<Self> {
        validate_chunks(data)?;

        let smf = Smf::parse(data).map_err(|e| MidiError::Format(e.to_string()))?;

        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int(),
            Timing::Timecode(..) => {
                return Err(MidiError::Format(
                    "SMPTE time-code division is not supported".to_string(),
                ))
            }
        };

        let tracks: Vec<Track> = smf
            .tracks
            .iter()
            .map(|track| Track::new(track.iter().map(TimedEvent::from_midly).collect()))
            .collect();

        log::debug!(
            "Parsed SMF: format={:?}, tpq={}, tracks={}",
            smf.header.format,
            ticks_per_quarter,
            tracks.len()
        );

        Self::new(SmfFormat::from_midly(smf.header.format), ticks_per_quarter, tracks)
    }

    /// Read and parse a file
    ///
    /// A missing file is reported as [`MidiError::NotFound`], never as a
    /// format error.
    pub fn open(path: &Path) -> MidiResult<Self> {
        let data = std::fs::read(path).map_err(|e| MidiError::from_io(path, e))?;
        Self::parse(&data)
    }

    /// Encode the document as SMF bytes
    pub fn serialize(&self) -> MidiResult<Vec<u8>> {
        let header = Header::new(
            self.format.to_midly(),
            Timing::Metrical(u15::from(self.ticks_per_quarter)),
        );
        let tracks = self
            .tracks
            .iter()
            .map(Track::to_midly)
            .collect::<MidiResult<Vec<_>>>()?;

        let smf = Smf { header, tracks };
        let mut out = Vec::new();
        smf.write_std(&mut out)
            .map_err(|e| MidiError::Internal(format!("failed to encode MIDI data: {}", e)))?;
        Ok(out)
    }

    pub fn format(&self) -> SmfFormat {
        self.format
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Current tempo map derived from the Set Tempo events of all tracks
    pub fn tempo_map(&self) -> TempoMap {
        TempoMap::from_tracks(self.tracks.iter().map(|t| t.events()))
    }

    /// Every Set Tempo value, in track then event order
    pub fn tempo_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.tracks
            .iter()
            .flat_map(|track| track.events.iter())
            .filter_map(|event| match event.kind {
                EventKind::Tempo { micros_per_quarter } => Some(micros_per_quarter),
                _ => None,
            })
    }

    /// Mutable access to every Set Tempo value, leaving all other events untouched
    pub fn tempo_values_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.tracks
            .iter_mut()
            .flat_map(|track| track.events.iter_mut())
            .filter_map(|event| match &mut event.kind {
                EventKind::Tempo { micros_per_quarter } => Some(micros_per_quarter),
                _ => None,
            })
    }

    /// Tick of the last event across all tracks
    pub fn end_tick(&self) -> u64 {
        self.tracks.iter().map(Track::end_tick).max().unwrap_or(0)
    }

    /// Real-time length of the document under the current tempo map
    pub fn duration_seconds(&self) -> f64 {
        self.tempo_map().tick_to_seconds(self.end_tick(), self.ticks_per_quarter)
    }

    /// Number of sounding notes (note on with velocity > 0)
    pub fn note_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.events())
            .filter(|e| e.kind.is_note_start())
            .count()
    }

    /// Number of distinct (track, channel, program) groups that play notes
    pub fn instrument_count(&self) -> usize {
        let mut instruments: HashSet<(usize, u8, u8)> = HashSet::new();

        for (track_idx, track) in self.tracks.iter().enumerate() {
            let mut programs = [0u8; 16];
            for event in track.events() {
                match event.kind {
                    EventKind::ProgramChange { channel, program } => {
                        programs[(channel & 0x0F) as usize] = program;
                    }
                    EventKind::NoteOn { channel, velocity, .. } if velocity > 0 => {
                        instruments.insert((track_idx, channel, programs[(channel & 0x0F) as usize]));
                    }
                    _ => {}
                }
            }
        }

        instruments.len()
    }

    pub fn key_signature_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.events())
            .filter(|e| matches!(e.kind, EventKind::KeySignature { .. }))
            .count()
    }
}

/// Walk the chunk structure before handing the buffer to `midly`
///
/// Rejects a missing or short `MThd`, unsupported format types, SMPTE or zero
/// division, and any chunk whose declared length runs past the buffer.
fn validate_chunks(data: &[u8]) -> MidiResult<()> {
    if data.len() < 14 || &data[0..4] != b"MThd" {
        return Err(MidiError::Format("missing MThd header chunk".to_string()));
    }

    let header_len = read_u32(data, 4) as usize;
    if header_len < 6 {
        return Err(MidiError::Format(format!("header chunk too short ({} bytes)", header_len)));
    }
    if header_len > data.len() - 8 {
        return Err(MidiError::Format("header chunk overruns the file".to_string()));
    }

    let format = read_u16(data, 8);
    if format > 2 {
        return Err(MidiError::Format(format!("unsupported SMF format type {}", format)));
    }

    let division = read_u16(data, 12);
    if division & 0x8000 != 0 {
        return Err(MidiError::Format(
            "SMPTE time-code division is not supported".to_string(),
        ));
    }
    if division == 0 {
        return Err(MidiError::Format("ticks per quarter note is 0".to_string()));
    }

    let declared_tracks = read_u16(data, 10) as usize;
    let mut found_tracks = 0usize;
    let mut pos = 8 + header_len;

    while pos < data.len() {
        let remaining = data.len() - pos;
        if remaining < 8 {
            log::warn!("Ignoring {} trailing bytes after last chunk", remaining);
            break;
        }

        let id = &data[pos..pos + 4];
        let len = read_u32(data, pos + 4) as usize;
        if len > remaining - 8 {
            return Err(MidiError::Format(format!(
                "chunk '{}' at offset {} declares {} bytes but only {} remain",
                String::from_utf8_lossy(id),
                pos,
                len,
                remaining - 8
            )));
        }

        if id == b"MTrk" {
            found_tracks += 1;
        }
        pos += 8 + len;
    }

    if found_tracks < declared_tracks {
        return Err(MidiError::Format(format!(
            "header declares {} tracks but only {} track chunks present",
            declared_tracks, found_tracks
        )));
    }

    Ok(())
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::test_support::{smf_bytes, TrackBytes};

    fn sample_file() -> Vec<u8> {
        let conductor = TrackBytes::new()
            .meta(0, 0x03, b"Conductor")
            .tempo(0, 500_000)
            .time_signature(0, 4, 2)
            .key_signature(0, -2, false)
            .tempo(960, 400_000)
            .end(0);
        let piano = TrackBytes::new()
            .program(0, 0, 5)
            .note_on(0, 0, 60, 100)
            .control(120, 0, 64, 127)
            .note_off(360, 0, 60, 0)
            .note_on(0, 0, 64, 90)
            .note_on(480, 0, 64, 0)
            .pitch_bend(0, 0, 8192)
            .end(0);
        smf_bytes(1, 480, &[conductor, piano])
    }

    #[test]
    fn test_parse_header_and_tracks() {
        let doc = MidiDocument::parse(&sample_file()).unwrap();
        assert_eq!(doc.format(), SmfFormat::Parallel);
        assert_eq!(doc.ticks_per_quarter(), 480);
        assert_eq!(doc.num_tracks(), 2);
        assert_eq!(doc.note_count(), 2);
        assert_eq!(doc.key_signature_count(), 1);
        assert_eq!(doc.instrument_count(), 1);
        assert_eq!(doc.end_tick(), 960);
    }

    #[test]
    fn test_serialize_then_parse_is_identical() {
        let doc = MidiDocument::parse(&sample_file()).unwrap();
        let bytes = doc.serialize().unwrap();
        let reparsed = MidiDocument::parse(&bytes).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn test_tempo_map_from_document() {
        let doc = MidiDocument::parse(&sample_file()).unwrap();
        let map = doc.tempo_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.entries()[1].tick, 960);
        // 960 ticks at 120 BPM, 480 tpq
        assert!((doc.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_end_of_track_is_appended() {
        let track = Track::new(vec![TimedEvent::new(
            10,
            EventKind::NoteOn { channel: 0, key: 60, velocity: 1 },
        )]);
        assert_eq!(track.events().len(), 2);
        assert_eq!(track.events()[1], TimedEvent::new(0, EventKind::EndOfTrack));
    }

    #[test]
    fn test_inner_end_of_track_carries_delta() {
        let track = Track::new(vec![
            TimedEvent::new(10, EventKind::EndOfTrack),
            TimedEvent::new(5, EventKind::NoteOn { channel: 0, key: 60, velocity: 1 }),
            TimedEvent::new(7, EventKind::EndOfTrack),
        ]);
        let ticks: Vec<u64> = track.iter_absolute().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![15, 22]);
        assert_eq!(
            track.events().iter().filter(|e| e.kind == EventKind::EndOfTrack).count(),
            1
        );
    }

    #[test]
    fn test_rejects_missing_header() {
        let err = MidiDocument::parse(b"RIFF0000000000000000").unwrap_err();
        assert!(matches!(err, MidiError::Format(_)));
    }

    #[test]
    fn test_rejects_unsupported_format_type() {
        let mut bytes = sample_file();
        bytes[9] = 3;
        let err = MidiDocument::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("format type 3"));
    }

    #[test]
    fn test_rejects_smpte_division() {
        let mut bytes = sample_file();
        bytes[12] = 0xE7;
        bytes[13] = 40;
        assert!(matches!(MidiDocument::parse(&bytes), Err(MidiError::Format(_))));
    }

    #[test]
    fn test_rejects_track_length_overrun() {
        let mut bytes = smf_bytes(0, 96, &[TrackBytes::new().note_on(0, 0, 60, 100).end(96)]);
        // MTrk length field starts right after the 14-byte header
        bytes[21] = bytes[21].wrapping_add(10);
        let err = MidiDocument::parse(&bytes).unwrap_err();
        assert!(matches!(err, MidiError::Format(_)));
        assert!(err.to_string().contains("MTrk"));
    }

    #[test]
    fn test_rejects_missing_track_chunks() {
        let mut bytes = smf_bytes(1, 96, &[TrackBytes::new().end(0)]);
        bytes[11] = 2;
        assert!(matches!(MidiDocument::parse(&bytes), Err(MidiError::Format(_))));
    }

    #[test]
    fn test_new_rejects_zero_resolution() {
        let err = MidiDocument::new(SmfFormat::Parallel, 0, vec![]).unwrap_err();
        assert!(matches!(err, MidiError::Format(_)));
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let err = MidiDocument::open(Path::new("/nonexistent/path.mid")).unwrap_err();
        assert!(matches!(err, MidiError::NotFound { .. }));
    }
}
