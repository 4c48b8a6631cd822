//! The core session: owner of the currently loaded MIDI document
//!
//! At most one document is open. Loading a file replaces it wholesale;
//! scaling mutates it in place; saving encodes it without changing it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::midi::{FileSummary, MidiDocument, MidiError, MidiResult, SpeedLimits, TempoScaler};

/// A document together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub document: MidiDocument,
    /// Set after a successful scale, cleared by the next load
    pub processed: bool,
}

#[derive(Debug, Default)]
pub struct MidiSession {
    active: Option<LoadedFile>,
    scaler: TempoScaler,
}

impl MidiSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SpeedLimits) -> Self {
        Self {
            active: None,
            scaler: TempoScaler::new(limits),
        }
    }

    pub fn limits(&self) -> SpeedLimits {
        self.scaler.limits()
    }

    /// Load a MIDI file, replacing any open document
    ///
    /// A missing file leaves the current document in place. A file that
    /// exists but cannot be read or parsed closes it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> MidiResult<FileSummary> {
        let path = path.as_ref();
        log::info!("Loading MIDI file: {}", path.display());

        if !path.exists() {
            return Err(MidiError::NotFound { path: path.to_path_buf() });
        }

        match MidiDocument::open(path) {
            Ok(document) => {
                let summary = FileSummary::from_document(&document);
                self.active = Some(LoadedFile {
                    path: path.to_path_buf(),
                    document,
                    processed: false,
                });
                log::info!(
                    "Loaded {}: {} tracks, {} notes, {:.2}s",
                    path.display(),
                    summary.num_tracks,
                    summary.num_notes,
                    summary.duration_seconds
                );
                Ok(summary)
            }
            Err(e) => {
                self.active = None;
                log::warn!("Failed to load {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Scale playback speed of the open document
    pub fn scale(&mut self, factor: f64) -> MidiResult<()> {
        let loaded = self.active.as_mut().ok_or(MidiError::NotLoaded)?;
        self.scaler.scale(&mut loaded.document, factor)?;
        loaded.processed = true;
        log::info!("Applied speed factor {}x to {}", factor, loaded.path.display());
        Ok(())
    }

    /// Encode the open document and write it to `path`
    ///
    /// Bytes go to a temporary sibling first and are renamed into place, so a
    /// failed write never leaves a partial file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> MidiResult<()> {
        let path = path.as_ref();
        let loaded = self.active.as_ref().ok_or(MidiError::NotLoaded)?;
        let bytes = loaded.document.serialize()?;

        let tmp_path = temp_sibling(path);
        if let Err(e) = write_file(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(MidiError::Io { path: path.to_path_buf(), source: e });
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(MidiError::Io { path: path.to_path_buf(), source: e });
        }

        log::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn summary(&self) -> MidiResult<FileSummary> {
        self.active
            .as_ref()
            .map(|loaded| FileSummary::from_document(&loaded.document))
            .ok_or(MidiError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_processed(&self) -> bool {
        self.active.as_ref().map(|l| l.processed).unwrap_or(false)
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.active.as_ref().map(|l| l.path.as_path())
    }

    pub fn document(&self) -> Option<&MidiDocument> {
        self.active.as_ref().map(|l| &l.document)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.mid".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
