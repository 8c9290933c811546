mod common;

use common::sine_waveform;
use repitch::{
    echo, hann_edges, resample, stretch_aligned, stretch_fixed, stretch_windowed, Pipeline,
    PipelineConfig, PitchError, SynthesisConfig, SynthesisMode, Waveform,
};

fn short_frames() -> SynthesisConfig {
    SynthesisConfig::default().with_frame_ms(10.0)
}

fn short_pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default().with_synthesis(short_frames())).unwrap()
}

#[test]
fn test_empty_input() {
    let input = Waveform::new(vec![], 44100).unwrap();
    assert!(resample(&input, 1.5).unwrap().is_empty());
    for mode in SynthesisMode::ALL {
        let output = short_pipeline().process(&input, 1.5, mode).unwrap();
        assert!(output.is_empty(), "mode {} on empty input", mode);
    }
}

#[test]
fn test_input_shorter_than_frame() {
    // 10 ms frames at 44.1 kHz are hundreds of samples long
    let input = sine_waveform(440.0, 44100, 100, 0.5);
    let config = short_frames();
    assert!(stretch_fixed(&input, 0.8, &config).unwrap().is_empty());
    assert!(stretch_windowed(&input, 0.8, &config).unwrap().is_empty());
    assert!(stretch_aligned(&input, 0.8, &config).unwrap().is_empty());
}

#[test]
fn test_invalid_scale_rejected_everywhere() {
    let input = sine_waveform(440.0, 8000, 800, 0.5);
    let config = short_frames();
    for &scale in &[0.0, -0.5, f64::INFINITY, f64::NAN] {
        assert!(matches!(resample(&input, scale), Err(PitchError::InvalidArgument(_))));
        assert!(stretch_fixed(&input, scale, &config).is_err());
        assert!(stretch_windowed(&input, scale, &config).is_err());
        assert!(stretch_aligned(&input, scale, &config).is_err());
        assert!(repitch::pitch_shift(&input, scale, SynthesisMode::Fixed).is_err());
    }
}

#[test]
fn test_invalid_waveforms_rejected() {
    assert!(matches!(
        Waveform::new(vec![0.0; 10], 0),
        Err(PitchError::InvalidArgument(_))
    ));
    assert!(Waveform::new(vec![0.0, f32::NAN], 44100).is_err());
    assert!(Waveform::new(vec![f32::INFINITY], 44100).is_err());
}

#[test]
fn test_invalid_window_rejected() {
    assert!(hann_edges(100, 51).is_err(), "overlap beyond half the frame");
    assert!(hann_edges(100, 50).is_ok());
}

#[test]
fn test_identity_scale_is_exact_for_resample() {
    let input = sine_waveform(440.0, 44100, 4410, 0.5);
    assert_eq!(resample(&input, 1.0).unwrap(), input);
}

#[test]
fn test_identity_scale_fixed_is_prefix() {
    let input = sine_waveform(440.0, 8000, 8000, 0.5);
    let output = stretch_fixed(&input, 1.0, &short_frames()).unwrap();
    assert_eq!(output.len(), 8000);
    assert_eq!(output.samples(), input.samples());
}

#[test]
fn test_extreme_scales_stay_bounded() {
    let input = sine_waveform(440.0, 44100, 44100, 0.5);
    let pipeline = short_pipeline();
    for &scale in &[0.25, 0.5, 2.0, 4.0] {
        for mode in SynthesisMode::ALL {
            let output = pipeline.process(&input, scale, mode).unwrap();
            assert!(!output.is_empty(), "mode {} scale {}", mode, scale);
            assert!(
                output.samples().iter().all(|s| s.is_finite()),
                "mode {} scale {} produced non-finite samples",
                mode,
                scale
            );
            assert!(
                output.peak() <= 1.0,
                "mode {} scale {} peak {}",
                mode,
                scale,
                output.peak()
            );
        }
    }
}

#[test]
fn test_processing_is_deterministic() {
    let input = sine_waveform(330.0, 44100, 22050, 0.4);
    let pipeline = short_pipeline();
    for mode in SynthesisMode::ALL {
        let a = pipeline.process(&input, 1.3, mode).unwrap();
        let b = pipeline.process(&input, 1.3, mode).unwrap();
        assert_eq!(a, b, "mode {} is not deterministic", mode);
    }
}

#[test]
fn test_windowed_and_aligned_lengths_agree() {
    let input = sine_waveform(220.0, 16000, 16000, 0.5);
    let config = short_frames();
    for &scale in &[0.6, 0.9, 1.1, 1.7] {
        let windowed = stretch_windowed(&input, scale, &config).unwrap();
        let aligned = stretch_aligned(&input, scale, &config).unwrap();
        assert_eq!(windowed.len(), aligned.len(), "scale {}", scale);
    }
}

#[test]
fn test_echo_gain_zero_idempotent() {
    let input = sine_waveform(440.0, 8000, 2000, 0.9);
    let once = echo(&input, 25.0, 0.0).unwrap();
    let twice = echo(&once, 25.0, 0.0).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_echo_output_clipped() {
    let input = sine_waveform(100.0, 8000, 8000, 1.0);
    let output = echo(&input, 5.0, 1.0).unwrap();
    assert!(output.samples().iter().all(|&s| (-1.0..=1.0).contains(&s)));
}

#[test]
fn test_zero_overlap_windowed_matches_fixed_tiling() {
    let input = sine_waveform(440.0, 8000, 8000, 0.5);
    let config = short_frames().with_overlap_fraction(0.0);
    let windowed = stretch_windowed(&input, 1.0, &config).unwrap();
    let fixed = stretch_fixed(&input, 1.0, &config).unwrap();
    assert_eq!(windowed.len(), fixed.len());
    for (i, (w, f)) in windowed.samples().iter().zip(fixed.samples()).enumerate() {
        assert!((w - f).abs() < 1e-6, "sample {}: {} vs {}", i, w, f);
    }
}
