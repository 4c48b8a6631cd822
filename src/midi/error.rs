//! Error taxonomy for MIDI loading, tempo scaling and saving
//!
//! Every failure the core can produce is a distinct variant so the
//! presentation layer can branch on [`ErrorKind`] instead of parsing text.

use std::path::PathBuf;

/// Errors produced by the MIDI core
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    /// Input path does not exist
    #[error("file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Bytes are not a valid (or supported) Standard MIDI File
    #[error("cannot parse MIDI data: {0}")]
    Format(String),

    /// Operation needs a loaded document and none is active
    #[error("no MIDI file loaded")]
    NotLoaded,

    /// Speed factor outside the accepted bounds
    #[error("speed factor {value} must be between {min} and {max}")]
    Range { value: f64, min: f64, max: f64 },

    /// Speed factor within bounds, but a scaled tempo would not fit in a
    /// Set Tempo event (1..=0xFFFFFF µs per quarter note)
    #[error(
        "speed factor {factor} would set a tempo of {micros_per_quarter:.0} µs per quarter note, \
         outside the Set Tempo range 1..=16777215"
    )]
    TempoOverflow { factor: f64, micros_per_quarter: f64 },

    /// Read/write failure not covered by `NotFound`
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected condition inside the core
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`MidiError`], for callers that only need the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    Format,
    NotLoaded,
    Range,
    Io,
    Internal,
}

impl MidiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MidiError::NotFound { .. } => ErrorKind::NotFound,
            MidiError::Format(_) => ErrorKind::Format,
            MidiError::NotLoaded => ErrorKind::NotLoaded,
            MidiError::Range { .. } | MidiError::TempoOverflow { .. } => ErrorKind::Range,
            MidiError::Io { .. } => ErrorKind::Io,
            MidiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Classify an I/O error raised while opening or reading `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MidiError::NotFound { path }
        } else {
            MidiError::Io { path, source }
        }
    }
}

/// Result alias for MIDI core operations
pub type MidiResult<T> = std::result::Result<T, MidiError>;
