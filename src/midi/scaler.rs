//! Uniform playback speed scaling
//!
//! Speed is changed by rewriting Set Tempo values only. Tick positions stay
//! the canonical time unit, so notes, controllers and track layout are left
//! exactly as they were.

use serde::{Deserialize, Serialize};

use super::error::{MidiError, MidiResult};
use super::events::encode_tempo;
use super::file::MidiDocument;

/// Slowest factor ever accepted
pub const MIN_SPEED: f64 = 0.1;
/// Fastest factor ever accepted
pub const MAX_SPEED: f64 = 3.0;

/// Accepted speed factor range (inclusive) and the default factor
///
/// Configured limits may only narrow `MIN_SPEED..=MAX_SPEED`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedLimits {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: MIN_SPEED,
            max: MAX_SPEED,
            default: 1.0,
        }
    }
}

impl SpeedLimits {
    /// Lower bound in effect, never below `MIN_SPEED`
    pub fn effective_min(&self) -> f64 {
        self.min.max(MIN_SPEED)
    }

    /// Upper bound in effect, never above `MAX_SPEED`
    pub fn effective_max(&self) -> f64 {
        self.max.min(MAX_SPEED)
    }

    pub fn contains(&self, factor: f64) -> bool {
        factor.is_finite() && factor >= self.effective_min() && factor <= self.effective_max()
    }

    /// Check a factor against the bounds
    pub fn validate(&self, factor: f64) -> MidiResult<f64> {
        if self.contains(factor) {
            Ok(factor)
        } else {
            Err(MidiError::Range {
                value: factor,
                min: self.effective_min(),
                max: self.effective_max(),
            })
        }
    }

    /// Reject limits that could never accept a factor or that reach outside
    /// `MIN_SPEED..=MAX_SPEED`
    pub fn check_consistent(&self) -> Result<(), String> {
        if !(self.min.is_finite() && self.max.is_finite() && self.default.is_finite()) {
            return Err("speed limits must be finite numbers".to_string());
        }
        if self.min < MIN_SPEED {
            return Err(format!("minimum speed {} is below {}", self.min, MIN_SPEED));
        }
        if self.max > MAX_SPEED {
            return Err(format!("maximum speed {} is above {}", self.max, MAX_SPEED));
        }
        if self.min > self.max {
            return Err(format!("minimum speed {} exceeds maximum {}", self.min, self.max));
        }
        if !self.contains(self.default) {
            return Err(format!(
                "default speed {} outside [{}, {}]",
                self.default, self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Direction of a speed change, for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpeedChange {
    Faster,
    Slower,
    Original,
}

impl SpeedChange {
    pub fn from_factor(factor: f64) -> Self {
        if factor > 1.0 {
            SpeedChange::Faster
        } else if factor < 1.0 {
            SpeedChange::Slower
        } else {
            SpeedChange::Original
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedChange::Faster => "sped up",
            SpeedChange::Slower => "slowed down",
            SpeedChange::Original => "kept at original speed",
        }
    }
}

/// Rewrites a document's tempo map by a speed factor
#[derive(Debug, Clone, Copy, Default)]
pub struct TempoScaler {
    limits: SpeedLimits,
}

impl TempoScaler {
    pub fn new(limits: SpeedLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SpeedLimits {
        self.limits
    }

    /// Divide every tempo value by `factor`
    ///
    /// `factor > 1` plays faster (fewer microseconds per quarter). A document
    /// without tempo events is left unchanged. Returns the number of tempo
    /// events rewritten.
    ///
    /// Nothing is changed if any scaled tempo would fall outside what a Set
    /// Tempo event can store.
    pub fn scale(&self, doc: &mut MidiDocument, factor: f64) -> MidiResult<usize> {
        let factor = self.limits.validate(factor)?;

        if let Some(micros_per_quarter) = doc
            .tempo_values()
            .map(|micros| micros / factor)
            .find(|scaled| encode_tempo(*scaled).is_none())
        {
            log::warn!(
                "Speed factor {} rejected: tempo would become {} µs per quarter note",
                factor,
                micros_per_quarter
            );
            return Err(MidiError::TempoOverflow {
                factor,
                micros_per_quarter,
            });
        }

        let mut rewritten = 0usize;
        for micros_per_quarter in doc.tempo_values_mut() {
            *micros_per_quarter /= factor;
            rewritten += 1;
        }

        if rewritten == 0 {
            log::info!("No tempo events to scale, document left unchanged");
        } else {
            log::debug!("Scaled {} tempo events by {}", rewritten, factor);
        }
        Ok(rewritten)
    }
}
