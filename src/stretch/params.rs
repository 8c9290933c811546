use serde::{Deserialize, Serialize};

use crate::core::types::ScaleFactor;
use crate::error::{PitchError, Result};

/// Default frame duration (100 ms).
pub const DEFAULT_FRAME_MS: f64 = 100.0;
/// Default overlap as a fraction of the frame length.
pub const DEFAULT_OVERLAP_FRACTION: f64 = 0.25;
/// Default seek window as a fraction of the overlap length.
pub const DEFAULT_SEEK_FRACTION: f64 = 0.75;

/// User-facing synthesis parameters, shared by all three synthesizers.
///
/// Sizes are expressed relative to the sample rate and frame length so one
/// configuration works for any input rate.
///
/// Synthesizers only emit whole frames. With the default 100 ms frames a clip
/// needs to be several hundred milliseconds long before the output length
/// tracks the input length; shorter clips are truncated or emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Base frame duration in milliseconds, before scaling.
    pub frame_ms: f64,
    /// Overlap length as a fraction of the frame length (0.0 to 0.5).
    pub overlap_fraction: f64,
    /// Seek window as a fraction of the overlap length (0.0 to 1.0).
    pub seek_fraction: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            frame_ms: DEFAULT_FRAME_MS,
            overlap_fraction: DEFAULT_OVERLAP_FRACTION,
            seek_fraction: DEFAULT_SEEK_FRACTION,
        }
    }
}

impl SynthesisConfig {
    /// Set the base frame duration.
    pub fn with_frame_ms(mut self, frame_ms: f64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    /// Set the overlap fraction.
    pub fn with_overlap_fraction(mut self, fraction: f64) -> Self {
        self.overlap_fraction = fraction;
        self
    }

    /// Set the seek fraction.
    pub fn with_seek_fraction(mut self, fraction: f64) -> Self {
        self.seek_fraction = fraction;
        self
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_ms.is_finite() || self.frame_ms <= 0.0 {
            return Err(PitchError::invalid(format!(
                "frame duration must be positive, got {} ms",
                self.frame_ms
            )));
        }
        if !(0.0..=0.5).contains(&self.overlap_fraction) {
            return Err(PitchError::invalid(format!(
                "overlap fraction must be within [0, 0.5], got {}",
                self.overlap_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.seek_fraction) {
            return Err(PitchError::invalid(format!(
                "seek fraction must be within [0, 1], got {}",
                self.seek_fraction
            )));
        }
        Ok(())
    }

    /// Frame length in samples at `sample_rate`, before scaling.
    pub fn base_frame_len(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.frame_ms / 1000.0).round() as usize
    }
}

/// Frame arithmetic derived once per synthesizer invocation.
///
/// `hop` is the distance between successive frame starts in the input,
/// `stride` the distance between them in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub frame_len: usize,
    pub hop: usize,
    pub stride: usize,
    pub overlap: usize,
    pub seek_window: usize,
    pub num_frames: usize,
    pub output_len: usize,
}

impl FrameLayout {
    /// Layout for back-to-back tiling: frames are written with no overlap.
    pub fn fixed(
        input_len: usize,
        sample_rate: u32,
        scale: ScaleFactor,
        config: &SynthesisConfig,
    ) -> Self {
        let frame_len = scaled_frame_len(config, sample_rate, scale);
        let hop = scaled_hop(frame_len, scale);
        let num_frames = count_frames(input_len, frame_len, hop);
        Self {
            frame_len,
            hop,
            stride: frame_len,
            overlap: 0,
            seek_window: 0,
            num_frames,
            output_len: num_frames * frame_len,
        }
    }

    /// Layout for overlap-add: frames overlap by `overlap` samples in the output
    /// and the input hop is the output stride scaled by `scale`.
    pub fn overlapped(
        input_len: usize,
        sample_rate: u32,
        scale: ScaleFactor,
        config: &SynthesisConfig,
    ) -> Self {
        let frame_len = scaled_frame_len(config, sample_rate, scale);
        let overlap = ((frame_len as f64 * config.overlap_fraction).floor() as usize)
            .min(frame_len / 2);
        let stride = frame_len - overlap;
        let hop = scaled_hop(stride, scale);
        let seek_window = (overlap as f64 * config.seek_fraction).floor() as usize;
        let num_frames = count_frames(input_len, frame_len, hop);
        let output_len = match num_frames {
            0 => 0,
            n => (n - 1) * stride + frame_len,
        };
        Self {
            frame_len,
            hop,
            stride,
            overlap,
            seek_window,
            num_frames,
            output_len,
        }
    }

    /// Nominal input offset of frame `k`.
    #[inline]
    pub fn nominal_offset(&self, k: usize) -> usize {
        k * self.hop
    }

    /// Output position of frame `k`.
    #[inline]
    pub fn output_offset(&self, k: usize) -> usize {
        k * self.stride
    }
}

fn scaled_frame_len(config: &SynthesisConfig, sample_rate: u32, scale: ScaleFactor) -> usize {
    (config.base_frame_len(sample_rate) as f64 * scale.value()).round() as usize
}

fn scaled_hop(len: usize, scale: ScaleFactor) -> usize {
    ((len as f64 * scale.value()).round() as usize).max(1)
}

/// Number of whole frames that fit in the input; 0 when the input is shorter
/// than one frame.
fn count_frames(input_len: usize, frame_len: usize, hop: usize) -> usize {
    if frame_len == 0 || input_len < frame_len {
        return 0;
    }
    (input_len - frame_len) / hop + 1
}
