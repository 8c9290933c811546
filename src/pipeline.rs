//! Pitch-shift pipeline: resample, restore duration, optionally add echo.
//!
//! Resampling by `scale` shifts pitch and scales duration by `1/scale`; the
//! chosen synthesizer then stretches by `1/scale`, which restores the duration
//! while keeping the new pitch.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::resample::resample;
use crate::core::types::{ScaleFactor, Waveform};
use crate::effects::echo::EchoParams;
use crate::error::{PitchError, Result};
use crate::stretch::{stretch_aligned, stretch_fixed, stretch_windowed, SynthesisConfig};

/// Which synthesizer restores the duration after resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Back-to-back frames, no blending.
    Fixed,
    /// Hann-windowed overlap-add at fixed offsets.
    Windowed,
    /// Overlap-add with cross-correlation alignment (WSOLA).
    #[default]
    Aligned,
}

impl SynthesisMode {
    pub const ALL: [SynthesisMode; 3] = [
        SynthesisMode::Fixed,
        SynthesisMode::Windowed,
        SynthesisMode::Aligned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SynthesisMode::Fixed => "fixed",
            SynthesisMode::Windowed => "windowed",
            SynthesisMode::Aligned => "aligned",
        }
    }

    /// Runs the synthesizer for this mode.
    pub fn stretch(self, input: &Waveform, scale: f64, config: &SynthesisConfig) -> Result<Waveform> {
        match self {
            SynthesisMode::Fixed => stretch_fixed(input, scale, config),
            SynthesisMode::Windowed => stretch_windowed(input, scale, config),
            SynthesisMode::Aligned => stretch_aligned(input, scale, config),
        }
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthesisMode {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "simple" => Ok(SynthesisMode::Fixed),
            "windowed" | "ola" => Ok(SynthesisMode::Windowed),
            "aligned" | "wsola" => Ok(SynthesisMode::Aligned),
            other => Err(PitchError::invalid(format!(
                "unknown synthesis mode '{}' (expected fixed, windowed or aligned)",
                other
            ))),
        }
    }
}

/// Complete pipeline configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub synthesis: SynthesisConfig,
    /// Echo applied after synthesis; `None` disables the stage.
    pub echo: Option<EchoParams>,
}

impl PipelineConfig {
    /// Set the synthesis parameters.
    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// Enable the echo stage.
    pub fn with_echo(mut self, echo: EchoParams) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Disable the echo stage.
    pub fn without_echo(mut self) -> Self {
        self.echo = None;
        self
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<()> {
        self.synthesis.validate()?;
        if let Some(echo) = &self.echo {
            echo.validate()?;
        }
        Ok(())
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Every intermediate result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub resampled: Waveform,
    pub fixed: Waveform,
    pub windowed: Waveform,
    pub aligned: Waveform,
    /// The aligned output with echo, when echo is configured.
    pub echoed: Option<Waveform>,
}

/// Composes resampling, synthesis and echo.
///
/// The pipeline does no numeric work itself. It validates parameters up front,
/// then threads the forward and inverse scale factors through the stages.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// # Errors
    /// Returns `PitchError::InvalidArgument` if `config` is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shifts the pitch of `input` by `scale`, restoring its duration with
    /// `mode`, then applies the configured echo.
    ///
    /// # Errors
    /// Returns `PitchError::InvalidArgument` if `scale` is not positive and
    /// finite. Nothing is computed in that case.
    pub fn process(&self, input: &Waveform, scale: f64, mode: SynthesisMode) -> Result<Waveform> {
        let scale = ScaleFactor::new(scale)?;
        let span = tracing::debug_span!("pipeline", scale = scale.value(), %mode);
        let _enter = span.enter();

        let resampled = resample(input, scale.value())?;
        let stretched = mode.stretch(&resampled, scale.inverse().value(), &self.config.synthesis)?;
        let output = match &self.config.echo {
            Some(echo) => echo.apply(&stretched)?,
            None => stretched,
        };

        tracing::debug!(
            input_len = input.len(),
            resampled_len = resampled.len(),
            output_len = output.len(),
            "pipeline complete"
        );
        Ok(output)
    }

    /// Runs every stage on `input`: the resampled waveform, each of the three
    /// synthesizers, and the aligned result with echo.
    pub fn process_stages(&self, input: &Waveform, scale: f64) -> Result<StageOutputs> {
        let scale = ScaleFactor::new(scale)?;
        let inverse = scale.inverse().value();
        let synthesis = &self.config.synthesis;

        let resampled = resample(input, scale.value())?;
        let fixed = stretch_fixed(&resampled, inverse, synthesis)?;
        let windowed = stretch_windowed(&resampled, inverse, synthesis)?;
        let aligned = stretch_aligned(&resampled, inverse, synthesis)?;
        let echoed = self
            .config
            .echo
            .map(|echo| echo.apply(&aligned))
            .transpose()?;

        Ok(StageOutputs {
            resampled,
            fixed,
            windowed,
            aligned,
            echoed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn config() -> PipelineConfig {
        PipelineConfig::default().with_synthesis(SynthesisConfig::default().with_frame_ms(10.0))
    }

    fn sine(freq: f32, sample_rate: u32, n: usize) -> Waveform {
        let data = (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        Waveform::new(data, sample_rate).unwrap()
    }

    #[test]
    fn test_synthesis_mode_parse() {
        assert_eq!("fixed".parse::<SynthesisMode>().unwrap(), SynthesisMode::Fixed);
        assert_eq!("OLA".parse::<SynthesisMode>().unwrap(), SynthesisMode::Windowed);
        assert_eq!("wsola".parse::<SynthesisMode>().unwrap(), SynthesisMode::Aligned);
        assert!("spectral".parse::<SynthesisMode>().is_err());
        for mode in SynthesisMode::ALL {
            assert_eq!(mode.to_string().parse::<SynthesisMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_pipeline_rejects_bad_scale_before_work() {
        let pipeline = Pipeline::new(config()).unwrap();
        let input = sine(440.0, 8000, 800);
        for &scale in &[0.0, -1.0, f64::NAN] {
            assert!(matches!(
                pipeline.process(&input, scale, SynthesisMode::Aligned),
                Err(PitchError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_pipeline_rejects_bad_echo_config() {
        let bad = config().with_echo(EchoParams {
            delay_ms: 0.0,
            gain: 0.5,
        });
        assert!(Pipeline::new(bad).is_err());
    }

    #[test]
    fn test_pipeline_matches_manual_composition() {
        let input = sine(440.0, 8000, 4000);
        let cfg = config().with_echo(EchoParams::new(20.0, 0.3).unwrap());
        let pipeline = Pipeline::new(cfg.clone()).unwrap();

        for mode in SynthesisMode::ALL {
            let output = pipeline.process(&input, 1.5, mode).unwrap();
            let resampled = resample(&input, 1.5).unwrap();
            let stretched = mode
                .stretch(&resampled, 1.0 / 1.5, &cfg.synthesis)
                .unwrap();
            let expected = crate::effects::echo(&stretched, 20.0, 0.3).unwrap();
            assert_eq!(output, expected, "mode {}", mode);
        }
    }

    #[test]
    fn test_pipeline_restores_duration() {
        let input = sine(440.0, 8000, 8000);
        let pipeline = Pipeline::new(config()).unwrap();
        for mode in SynthesisMode::ALL {
            for &scale in &[0.75, 1.25, 2.0] {
                let output = pipeline.process(&input, scale, mode).unwrap();
                let ratio = output.len() as f64 / input.len() as f64;
                assert!(
                    (ratio - 1.0).abs() < 0.1,
                    "mode {} scale {}: length ratio {}",
                    mode,
                    scale,
                    ratio
                );
            }
        }
    }

    #[test]
    fn test_process_stages() {
        let input = sine(440.0, 8000, 4000);
        let pipeline = Pipeline::new(config().with_echo(EchoParams::default())).unwrap();
        let stages = pipeline.process_stages(&input, 2.0).unwrap();
        assert_eq!(stages.resampled.len(), 2000);
        assert_eq!(stages.windowed.len(), stages.aligned.len());
        let echoed = stages.echoed.expect("echo configured");
        assert_eq!(echoed.len(), stages.aligned.len());

        let without = Pipeline::new(config()).unwrap();
        assert!(without.process_stages(&input, 2.0).unwrap().echoed.is_none());
    }

    #[test]
    fn test_pipeline_config_json_roundtrip() {
        let cfg = config().with_echo(EchoParams::new(80.0, 0.4).unwrap());
        let json = cfg.to_json_string().unwrap();
        let parsed = PipelineConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_pipeline_config_json_defaults() {
        let parsed = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(parsed, PipelineConfig::default());
        assert!(parsed.echo.is_none());

        let parsed =
            PipelineConfig::from_json_str(r#"{"synthesis": {"frame_ms": 40.0}, "echo": {}}"#)
                .unwrap();
        assert_eq!(parsed.synthesis.frame_ms, 40.0);
        assert_eq!(parsed.synthesis.overlap_fraction, 0.25);
        assert_eq!(parsed.echo, Some(EchoParams::default()));
    }

    #[test]
    fn test_pipeline_config_json_rejects_invalid() {
        assert!(matches!(
            PipelineConfig::from_json_str("{not json"),
            Err(PitchError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"echo": {"gain": 2.0}}"#),
            Err(PitchError::InvalidArgument(_))
        ));
    }
}
