//! Tempo map: the ordered (tick, microseconds-per-quarter) sequence
//!
//! The map is a view derived from the Set Tempo events of a document. It is
//! kept separate from the header resolution: ticks-per-quarter fixes how long
//! a tick is in notated time, the map fixes how long a quarter is in real time.

use super::events::{EventKind, TimedEvent};

/// MIDI default tempo when no Set Tempo event precedes a tick (120 BPM)
pub const DEFAULT_MICROS_PER_QUARTER: f64 = 500_000.0;

/// A tempo change at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoEntry {
    pub tick: u64,
    pub micros_per_quarter: f64,
}

impl TempoEntry {
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.micros_per_quarter
    }
}

/// Tempo changes sorted by tick, one entry per tick
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct TempoMap {
    entries: Vec<TempoEntry>,
}

impl TempoMap {
    /// Collect the Set Tempo events of all tracks
    ///
    /// Tracks are visited in order; when several events share a tick the one
    /// seen last wins.
    pub fn from_tracks<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a [TimedEvent]>,
    {
        let mut raw: Vec<TempoEntry> = Vec::new();
        for events in tracks {
            let mut tick: u64 = 0;
            for event in events {
                tick += event.delta as u64;
                if let EventKind::Tempo { micros_per_quarter } = event.kind {
                    raw.push(TempoEntry { tick, micros_per_quarter });
                }
            }
        }
        Self::from_entries(raw)
    }

    /// Build a map from unordered entries (stable sort, last write wins)
    pub fn from_entries(mut raw: Vec<TempoEntry>) -> Self {
        raw.sort_by_key(|e| e.tick);

        let mut entries: Vec<TempoEntry> = Vec::with_capacity(raw.len());
        for entry in raw {
            match entries.last_mut() {
                Some(last) if last.tick == entry.tick => *last = entry,
                _ => entries.push(entry),
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[TempoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tempo in effect at `tick`
    pub fn micros_at(&self, tick: u64) -> f64 {
        self.entries
            .iter()
            .rev()
            .find(|e| e.tick <= tick)
            .map(|e| e.micros_per_quarter)
            .unwrap_or(DEFAULT_MICROS_PER_QUARTER)
    }

    /// Tempo at tick 0 in beats per minute
    pub fn initial_bpm(&self) -> f64 {
        60_000_000.0 / self.micros_at(0)
    }

    /// Real time at which `tick` is reached
    ///
    /// Ticks before the first entry run at [`DEFAULT_MICROS_PER_QUARTER`].
    pub fn tick_to_seconds(&self, tick: u64, ticks_per_quarter: u16) -> f64 {
        if ticks_per_quarter == 0 {
            return 0.0;
        }

        let mut elapsed_micros_ticks = 0.0f64;
        let mut segment_start: u64 = 0;
        let mut current = DEFAULT_MICROS_PER_QUARTER;

        for entry in &self.entries {
            if entry.tick >= tick {
                break;
            }
            elapsed_micros_ticks += (entry.tick - segment_start) as f64 * current;
            segment_start = entry.tick;
            current = entry.micros_per_quarter;
        }
        elapsed_micros_ticks += (tick - segment_start) as f64 * current;

        elapsed_micros_ticks / ticks_per_quarter as f64 / 1_000_000.0
    }
}
