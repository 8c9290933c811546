//! Fixed-hop time scaling without blending.
//!
//! Frames are read from the input every `hop` samples and written back to
//! back in the output. Nothing is cross-faded, so seams between frames click;
//! [`crate::stretch::ola`] smooths them with windowed overlap-add.

use crate::core::types::{Frame, ScaleFactor, Waveform};
use crate::error::Result;
use crate::stretch::ola::warn_if_degenerate;
use crate::stretch::params::{FrameLayout, SynthesisConfig};

/// Rescales the duration of `input` by `scale` by tiling unmodified frames.
///
/// Returns an empty waveform when the input is shorter than one frame.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `scale` is not positive and finite
/// or `config` is invalid.
pub fn stretch_fixed(input: &Waveform, scale: f64, config: &SynthesisConfig) -> Result<Waveform> {
    let scale = ScaleFactor::new(scale)?;
    config.validate()?;

    let layout = FrameLayout::fixed(input.len(), input.sample_rate(), scale, config);
    tracing::debug!(?layout, input_len = input.len(), "fixed-hop synthesis");
    warn_if_degenerate(input, &layout);

    let mut output = vec![0.0f32; layout.output_len];
    for k in 0..layout.num_frames {
        let source = input.frame(Frame::new(layout.nominal_offset(k), layout.frame_len));
        let start = layout.output_offset(k);
        let end = (start + source.len()).min(output.len());
        output[start..end].copy_from_slice(&source[..end - start]);
    }

    Ok(Waveform::from_stage(output, input.sample_rate()))
}
