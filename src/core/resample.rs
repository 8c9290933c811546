//! Sample-count conversion via linear interpolation.
//!
//! Resampling by a factor `s` plays the waveform back `s` times faster when the
//! output is interpreted at the original rate, which shifts pitch by `s` and
//! scales duration by `1/s`.

use crate::core::types::{Sample, ScaleFactor, Waveform};
use crate::error::Result;

/// Resamples a waveform by `scale`, keeping its sample rate.
///
/// The output has `floor(len / scale)` samples. A scale of exactly 1.0
/// returns an unchanged copy.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `scale` is not positive and finite.
pub fn resample(input: &Waveform, scale: f64) -> Result<Waveform> {
    let scale = ScaleFactor::new(scale)?;
    if scale.is_identity() {
        return Ok(input.clone());
    }

    let output = resample_linear(input.samples(), scale.value());
    tracing::debug!(
        input_len = input.len(),
        output_len = output.len(),
        scale = scale.value(),
        "resampled"
    );
    Ok(Waveform::from_stage(output, input.sample_rate()))
}

/// Linear interpolation resampling of a raw sample slice.
///
/// Output sample `i` reads the input at fractional position `i * scale`.
/// Positions whose right neighbour lies past the end take the last
/// available sample instead of extrapolating. `scale` must be positive.
pub fn resample_linear(input: &[Sample], scale: f64) -> Vec<Sample> {
    debug_assert!(scale > 0.0);
    if input.is_empty() {
        return vec![];
    }

    let output_len = (input.len() as f64 / scale).floor() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let pos = i as f64 * scale;
        let idx = (pos as usize).min(input.len() - 1);
        let frac = (pos - idx as f64) as f32;

        if idx + 1 < input.len() {
            output.push(input[idx] + frac * (input[idx + 1] - input[idx]));
        } else {
            output.push(input[idx]);
        }
    }

    output
}
