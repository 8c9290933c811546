//! Hann-edged synthesis windows for overlap-add.
//!
//! A synthesis window is flat (gain 1.0) in the middle of a frame and fades in
//! and out over `overlap` samples with raised-cosine edges. When the falling
//! edge of one frame is overlaid on the rising edge of the next, the gains sum
//! to approximately 1.0, so cross-fades keep the signal level.

use std::f64::consts::PI;

use crate::core::types::Sample;
use crate::error::{PitchError, Result};

/// Gain coefficients for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    coeffs: Vec<f32>,
    overlap: usize,
}

impl Window {
    #[inline]
    pub fn coeffs(&self) -> &[f32] {
        &self.coeffs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Length of each tapered edge.
    #[inline]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Multiplies `frame` by the window in place. Extra samples on either side
    /// are left untouched.
    #[inline]
    pub fn apply(&self, frame: &mut [Sample]) {
        apply_window(frame, &self.coeffs);
    }
}

/// Generates a window of `frame_len` samples with Hann edges of `overlap`
/// samples on each side.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `overlap > frame_len / 2`.
pub fn hann_edges(frame_len: usize, overlap: usize) -> Result<Window> {
    if overlap > frame_len / 2 {
        return Err(PitchError::invalid(format!(
            "window overlap {} exceeds half the frame length {}",
            overlap, frame_len
        )));
    }

    let coeffs = (0..frame_len)
        .map(|i| {
            if i < overlap {
                edge_gain(i, overlap)
            } else if i >= frame_len - overlap {
                edge_gain(frame_len - i - 1, overlap)
            } else {
                1.0
            }
        })
        .collect();

    Ok(Window { coeffs, overlap })
}

/// Rising raised-cosine gain at position `i` of an edge of length `overlap`.
#[inline]
fn edge_gain(i: usize, overlap: usize) -> f32 {
    (0.5 * (1.0 - (PI * i as f64 / overlap as f64).cos())) as f32
}

/// Applies a window function to a slice in-place.
#[inline]
pub fn apply_window(data: &mut [Sample], window: &[f32]) {
    for (sample, &w) in data.iter_mut().zip(window.iter()) {
        *sample *= w;
    }
}
