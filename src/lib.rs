#![forbid(unsafe_code)]
//! Pure Rust pitch shifting by resampling and time-domain overlap-add.
//!
//! `repitch` changes the pitch of a mono waveform without changing its
//! duration. It resamples the signal by a scale factor (shifting pitch and
//! duration together), then restores the original duration with one of three
//! synthesizers:
//!
//! - [`SynthesisMode::Fixed`]: frames tiled back to back (audible seams)
//! - [`SynthesisMode::Windowed`]: Hann-edged overlap-add
//! - [`SynthesisMode::Aligned`]: WSOLA, overlap-add with cross-correlation
//!   alignment of each frame
//!
//! An optional echo stage can be appended to the chain.
//!
//! # Quick Start
//!
//! ```
//! use repitch::{SynthesisMode, Waveform};
//!
//! // 1 second of 440 Hz sine at 44.1 kHz
//! let samples: Vec<f32> = (0..44100)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! let input = Waveform::new(samples, 44100).unwrap();
//!
//! // Up a fifth, roughly the same length
//! let output = repitch::pitch_shift(&input, 1.5, SynthesisMode::Aligned).unwrap();
//! assert!((output.len() as f64 / input.len() as f64 - 1.0).abs() < 0.15);
//! ```
//!
//! # Configuration
//!
//! Frame, overlap and seek sizes live in [`SynthesisConfig`]; the echo stage
//! is configured by [`EchoParams`]. Both are grouped in [`PipelineConfig`],
//! which can be loaded from JSON:
//!
//! ```
//! use repitch::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_json_str(
//!     r#"{ "synthesis": { "frame_ms": 50.0 }, "echo": { "delay_ms": 120.0, "gain": 0.4 } }"#,
//! ).unwrap();
//! let pipeline = Pipeline::new(config).unwrap();
//! assert_eq!(pipeline.config().synthesis.overlap_fraction, 0.25);
//! ```

pub mod core;
pub mod effects;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod stretch;

use std::path::Path;

pub use crate::core::resample::resample;
pub use crate::core::types::{Frame, Sample, ScaleFactor, Waveform};
pub use crate::core::window::{hann_edges, Window};
pub use effects::echo::{echo, EchoParams};
pub use error::{PitchError, Result};
pub use io::wav::WavFormat;
pub use pipeline::{Pipeline, PipelineConfig, StageOutputs, SynthesisMode};
pub use stretch::{
    stretch_aligned, stretch_fixed, stretch_windowed, AlignmentCandidate, FrameLayout,
    SynthesisConfig, Wsola,
};

/// Shifts the pitch of `input` by `scale` while keeping its duration.
///
/// Uses the default [`SynthesisConfig`] (100 ms frames) and no echo. Output
/// is made of whole frames, so clips of only a few frames come back shorter
/// than the input: a clip shorter than one scaled frame produces an empty
/// waveform, and one shorter than a frame plus a hop produces a single frame.
/// Use a [`Pipeline`] with a smaller `frame_ms` for short clips.
///
/// # Errors
///
/// Returns [`PitchError::InvalidArgument`] if `scale` is not positive and finite.
pub fn pitch_shift(input: &Waveform, scale: f64, mode: SynthesisMode) -> Result<Waveform> {
    Pipeline::default().process(input, scale, mode)
}

/// Reads a WAV file, shifts its pitch with `config`, and writes the result.
///
/// Multi-channel input is mixed down to mono.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or if any
/// parameter is invalid.
pub fn pitch_shift_wav_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    scale: f64,
    mode: SynthesisMode,
    config: &PipelineConfig,
    format: WavFormat,
) -> Result<Waveform> {
    let pipeline = Pipeline::new(config.clone())?;
    let input = io::wav::read_wav_file(input_path)?;
    let output = pipeline.process(&input, scale, mode)?;
    io::wav::write_wav_file(output_path, &output, format)?;
    Ok(output)
}
