//! Commands for the presentation layer
//!
//! Each command locks the shared session, runs one core operation and turns a
//! typed [`MidiError`] into the message shown to the user.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::files::validate_input;
use super::logging::log_message;
use crate::midi::{FileSummary, MidiError, SpeedChange, SpeedLimits};
use crate::session::MidiSession;

/// Map an error to the message a user sees
pub fn user_message(err: &MidiError) -> String {
    match err {
        MidiError::NotFound { path } => format!("File does not exist: {}", path.display()),
        MidiError::Format(msg) => format!("Cannot parse MIDI file: {}", msg),
        MidiError::Range { .. } | MidiError::TempoOverflow { .. } => format!("Invalid parameter: {}", err),
        MidiError::NotLoaded => "Processing failed: please load a MIDI file first".to_string(),
        MidiError::Io { .. } => format!("File operation failed: {}", err),
        MidiError::Internal(_) => format!("Processing failed: {}", err),
    }
}

/// Handle to the single active session, shared by all front-end actions
#[derive(Clone, Default)]
pub struct MidiCommands {
    session: Arc<Mutex<MidiSession>>,
}

impl MidiCommands {
    pub fn new(limits: SpeedLimits) -> Self {
        Self {
            session: Arc::new(Mutex::new(MidiSession::with_limits(limits))),
        }
    }

    fn fail(&self, action: &str, err: MidiError) -> String {
        log_message(
            log::Level::Error,
            "commands",
            &format!("{} failed ({:?}): {}", action, err.kind(), err),
        );
        user_message(&err)
    }

    /// Load a MIDI file and return its summary
    pub fn load_midi(&self, path: &Path) -> Result<FileSummary, String> {
        let path = validate_input(path).map_err(|e| self.fail("load", e))?;
        let summary = self
            .session
            .lock()
            .load(&path)
            .map_err(|e| self.fail("load", e))?;
        log_message(log::Level::Info, "commands", &format!("Loaded {}", path.display()));
        Ok(summary)
    }

    /// Apply a speed factor and return the success message
    pub fn adjust_speed(&self, speed: f64) -> Result<String, String> {
        log_message(log::Level::Debug, "commands", &format!("Adjusting speed: {}x", speed));
        self.session
            .lock()
            .scale(speed)
            .map_err(|e| self.fail("adjust speed", e))?;

        let change = SpeedChange::from_factor(speed);
        let message = format!("MIDI file {} successfully. Speed: {}x", change.label(), speed);
        log_message(log::Level::Info, "commands", &message);
        Ok(message)
    }

    /// Save the current document
    pub fn save_midi(&self, path: &Path) -> Result<(), String> {
        self.session
            .lock()
            .save(path)
            .map_err(|e| self.fail("save", e))?;
        log_message(log::Level::Info, "commands", &format!("Saved {}", path.display()));
        Ok(())
    }

    /// Summary of the current document
    pub fn get_midi_info(&self) -> Result<FileSummary, String> {
        self.session.lock().summary().map_err(|e| self.fail("info", e))
    }

    pub fn is_loaded(&self) -> bool {
        self.session.lock().is_loaded()
    }

    pub fn is_processed(&self) -> bool {
        self.session.lock().is_processed()
    }

    pub fn speed_limits(&self) -> SpeedLimits {
        self.session.lock().limits()
    }
}
