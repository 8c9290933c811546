//! Single-tap feed-forward echo.

use serde::{Deserialize, Serialize};

use crate::core::types::Waveform;
use crate::error::{PitchError, Result};

/// Default echo delay in milliseconds.
pub const DEFAULT_ECHO_DELAY_MS: f64 = 100.0;
/// Default echo gain.
pub const DEFAULT_ECHO_GAIN: f64 = 0.7;

/// Parameters of the echo stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoParams {
    /// Delay of the echoed copy in milliseconds (> 0).
    pub delay_ms: f64,
    /// Gain of the echoed copy (0.0 to 1.0).
    pub gain: f64,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_ECHO_DELAY_MS,
            gain: DEFAULT_ECHO_GAIN,
        }
    }
}

impl EchoParams {
    pub fn new(delay_ms: f64, gain: f64) -> Result<Self> {
        let params = Self { delay_ms, gain };
        params.validate()?;
        Ok(params)
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.delay_ms.is_finite() || self.delay_ms <= 0.0 {
            return Err(PitchError::invalid(format!(
                "echo delay must be positive, got {} ms",
                self.delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.gain) {
            return Err(PitchError::invalid(format!(
                "echo gain must be within [0, 1], got {}",
                self.gain
            )));
        }
        Ok(())
    }

    /// Delay in whole samples at `sample_rate`.
    pub fn delay_samples(&self, sample_rate: u32) -> usize {
        (self.delay_ms / 1000.0 * sample_rate as f64).round() as usize
    }

    /// Applies the echo described by these parameters.
    pub fn apply(&self, input: &Waveform) -> Result<Waveform> {
        echo(input, self.delay_ms, self.gain)
    }
}

/// Adds a copy of `input` delayed by `delay_ms` and attenuated by `gain`,
/// clipping the result to [-1, 1].
///
/// A delay at least as long as the waveform leaves it unchanged.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `delay_ms` is not positive or
/// `gain` is outside [0, 1].
pub fn echo(input: &Waveform, delay_ms: f64, gain: f64) -> Result<Waveform> {
    let params = EchoParams::new(delay_ms, gain)?;
    let delay = params.delay_samples(input.sample_rate());
    if delay >= input.len() {
        tracing::debug!(delay, len = input.len(), "echo delay exceeds waveform, passing through");
        return Ok(input.clone());
    }

    let samples = input.samples();
    let gain = gain as f32;
    let output = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let delayed = if i >= delay { gain * samples[i - delay] } else { 0.0 };
            (s + delayed).clamp(-1.0, 1.0)
        })
        .collect();

    tracing::debug!(delay, gain, "applied echo");
    Ok(Waveform::from_stage(output, input.sample_rate()))
}
