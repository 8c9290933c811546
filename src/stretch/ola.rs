//! Windowed overlap-add (OLA) time scaling.
//!
//! Like fixed-hop tiling, but each frame is tapered with Hann edges and the
//! frames overlap in the output by `overlap` samples. Contributions are summed,
//! and because the overlaid edges add up to roughly unit gain the seams fade
//! instead of clicking.

use crate::core::types::{Frame, Sample, ScaleFactor, Waveform};
use crate::core::window::{hann_edges, Window};
use crate::error::Result;
use crate::stretch::params::{FrameLayout, SynthesisConfig};

/// Rescales the duration of `input` by `scale` with windowed overlap-add.
///
/// Returns an empty waveform when the input is shorter than one frame.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `scale` is not positive and finite
/// or `config` is invalid.
pub fn stretch_windowed(
    input: &Waveform,
    scale: f64,
    config: &SynthesisConfig,
) -> Result<Waveform> {
    let scale = ScaleFactor::new(scale)?;
    config.validate()?;

    let layout = FrameLayout::overlapped(input.len(), input.sample_rate(), scale, config);
    tracing::debug!(?layout, input_len = input.len(), "windowed overlap-add synthesis");
    if layout.num_frames == 0 {
        warn_if_degenerate(input, &layout);
        return Ok(Waveform::from_stage(Vec::new(), input.sample_rate()));
    }

    let window = hann_edges(layout.frame_len, layout.overlap)?;
    let mut output = vec![0.0f32; layout.output_len];
    let mut scratch = Vec::with_capacity(layout.frame_len);

    for k in 0..layout.num_frames {
        let source = input.frame(Frame::new(layout.nominal_offset(k), layout.frame_len));
        overlap_add(&mut output, source, &window, layout.output_offset(k), &mut scratch);
    }

    Ok(Waveform::from_stage(output, input.sample_rate()))
}

/// Windows `source` and adds it into `output` starting at `out_pos`.
///
/// Samples that would land past the end of `output` are dropped. `scratch`
/// is reused between calls to avoid a per-frame allocation.
pub(crate) fn overlap_add(
    output: &mut [Sample],
    source: &[Sample],
    window: &Window,
    out_pos: usize,
    scratch: &mut Vec<Sample>,
) {
    scratch.clear();
    scratch.extend_from_slice(source);
    window.apply(scratch);

    if out_pos >= output.len() {
        return;
    }
    for (out, &s) in output[out_pos..].iter_mut().zip(scratch.iter()) {
        *out += s;
    }
}

pub(crate) fn warn_if_degenerate(input: &Waveform, layout: &FrameLayout) {
    if layout.num_frames == 0 && !input.is_empty() {
        tracing::warn!(
            input_len = input.len(),
            frame_len = layout.frame_len,
            "input shorter than one frame, producing empty output"
        );
    }
}
