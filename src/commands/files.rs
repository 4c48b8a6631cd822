use std::path::{Path, PathBuf};

use crate::midi::MidiError;

const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

/// Validate an input path before loading
///
/// The path must exist and be a regular file. Unusual extensions are only
/// logged; the parser decides whether the content is MIDI.
pub fn validate_input(path: &Path) -> Result<PathBuf, MidiError> {
    if !path.exists() {
        return Err(MidiError::NotFound { path: path.to_path_buf() });
    }
    if !path.is_file() {
        return Err(MidiError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    if !has_midi_extension(path) {
        log::warn!("{} does not have a .mid/.midi extension", path.display());
    }
    Ok(path.to_path_buf())
}

pub fn has_midi_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MIDI_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Default output path beside the input: `<stem>_<factor>x.mid`
pub fn suggest_output_path(input: &Path, factor: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|f| f.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output");
    input.with_file_name(format!("{}_{}x.mid", stem, format_factor(factor)))
}

/// Factor with at most two decimals and no trailing zeros (1.50 -> "1.5")
pub fn format_factor(factor: f64) -> String {
    let text = format!("{:.2}", factor);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
