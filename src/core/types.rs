use std::ops::Range;

use crate::error::{PitchError, Result};

/// A single audio sample (32-bit float, nominal range -1.0 to 1.0).
pub type Sample = f32;

/// An immutable mono waveform: samples plus the rate they were captured at.
///
/// Every processing stage takes a `&Waveform` and returns a new one, so a
/// waveform is never mutated once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<Sample>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a new waveform.
    ///
    /// # Errors
    /// Returns `PitchError::InvalidArgument` if `sample_rate` is 0 or any
    /// sample is NaN or infinite.
    pub fn new(samples: Vec<Sample>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(PitchError::invalid("sample rate must be greater than 0"));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(PitchError::invalid(format!(
                "non-finite sample at index {}",
                pos
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Builds a waveform from samples produced by a stage of this crate.
    ///
    /// Stages only produce finite samples from finite input and always pass a
    /// rate taken from an existing waveform, so validation is skipped.
    pub(crate) fn from_stage(samples: Vec<Sample>, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0);
        Self {
            samples,
            sample_rate,
        }
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value, 0.0 for an empty waveform.
    pub fn peak(&self) -> Sample {
        self.samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    /// Borrows the samples covered by `frame`, truncated to the waveform end.
    pub fn frame(&self, frame: Frame) -> &[Sample] {
        let len = self.samples.len();
        let range = frame.range();
        &self.samples[range.start.min(len)..range.end.min(len)]
    }
}

/// Ratio applied to a waveform's effective sample rate.
///
/// Values above 1.0 raise the pitch (and shorten the waveform when
/// resampling); the inverse is used by the synthesizers to restore duration.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// # Errors
    /// Returns `PitchError::InvalidArgument` if `value` is not positive and finite.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PitchError::invalid(format!(
                "scale factor must be positive and finite, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The reciprocal factor, used to undo a duration change.
    #[inline]
    pub fn inverse(self) -> Self {
        Self(1.0 / self.0)
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

/// A contiguous sub-range of a waveform. Frames are computed on demand and
/// never own samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub start: usize,
    pub len: usize,
}

impl Frame {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last sample index.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}
