//! WSOLA (Waveform Similarity Overlap-Add) time scaling.
//!
//! Fixed-hop overlap-add assumes the signal is periodic at exactly the hop
//! distance. When it is not, the overlapping edges of neighbouring frames
//! partially cancel. WSOLA lets the *source* offset of each frame drift within
//! a bounded seek window, picking the offset whose leading edge best matches
//! what has already been written at the seam. The output timeline still
//! advances by a fixed stride, so duration stays on target.

use std::ops::RangeInclusive;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::core::types::{Sample, ScaleFactor, Waveform};
use crate::core::window::{hann_edges, Window};
use crate::error::Result;
use crate::stretch::ola::{overlap_add, warn_if_degenerate};
use crate::stretch::params::{FrameLayout, SynthesisConfig};

/// Minimum energy below which a segment is treated as silence.
const ENERGY_EPSILON: f64 = 1e-12;
/// Scores closer than this are considered tied.
const TIE_EPSILON: f64 = 1e-9;
/// Minimum number of candidates to justify FFT-based correlation over direct computation.
const FFT_CANDIDATE_THRESHOLD: usize = 64;
/// Minimum overlap length for FFT-based correlation to be worthwhile.
const FFT_OVERLAP_THRESHOLD: usize = 32;

/// Rescales the duration of `input` by `scale` with similarity-aligned
/// overlap-add.
///
/// Uses the same frame layout as [`crate::stretch::ola::stretch_windowed`], so
/// both produce the same number of samples.
///
/// # Errors
/// Returns `PitchError::InvalidArgument` if `scale` is not positive and finite
/// or `config` is invalid.
pub fn stretch_aligned(input: &Waveform, scale: f64, config: &SynthesisConfig) -> Result<Waveform> {
    let scale = ScaleFactor::new(scale)?;
    config.validate()?;

    let layout = FrameLayout::overlapped(input.len(), input.sample_rate(), scale, config);
    tracing::debug!(?layout, input_len = input.len(), "aligned overlap-add synthesis");
    if layout.num_frames == 0 {
        warn_if_degenerate(input, &layout);
        return Ok(Waveform::from_stage(Vec::new(), input.sample_rate()));
    }

    let mut wsola = Wsola::new(layout)?;
    let output = wsola.process(input.samples());
    Ok(Waveform::from_stage(output, input.sample_rate()))
}

/// A source offset evaluated during the alignment search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentCandidate {
    pub offset: usize,
    /// Normalized cross-correlation in [-1, 1]; 0.0 when either side is silent.
    pub score: f64,
}

/// WSOLA synthesizer for one frame layout.
///
/// Holds the synthesis window and an FFT planner so repeated searches reuse
/// their plans.
pub struct Wsola {
    layout: FrameLayout,
    window: Window,
    planner: FftPlanner<f64>,
}

impl Wsola {
    /// Creates a WSOLA synthesizer.
    ///
    /// # Errors
    /// Returns `PitchError::InvalidArgument` if the layout's overlap exceeds
    /// half its frame length.
    pub fn new(layout: FrameLayout) -> Result<Self> {
        let window = hann_edges(layout.frame_len, layout.overlap)?;
        Ok(Self {
            layout,
            window,
            planner: FftPlanner::new(),
        })
    }

    #[inline]
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Synthesizes the full output for `input`.
    ///
    /// Frame 0 is taken from its nominal offset; every later frame is taken from
    /// the best-matching offset around its nominal position.
    pub fn process(&mut self, input: &[Sample]) -> Vec<Sample> {
        let layout = self.layout;
        let mut output = vec![0.0f32; layout.output_len];
        let mut scratch = Vec::with_capacity(layout.frame_len);

        for k in 0..layout.num_frames {
            let nominal = layout.nominal_offset(k);
            let seam = layout.output_offset(k);
            let offset = if k == 0 {
                nominal
            } else {
                let best = self.find_best_offset(input, &output, nominal, seam);
                tracing::trace!(
                    frame = k,
                    nominal,
                    offset = best.offset,
                    score = best.score,
                    "aligned frame"
                );
                best.offset
            };

            let end = (offset + layout.frame_len).min(input.len());
            overlap_add(&mut output, &input[offset..end], &self.window, seam, &mut scratch);
        }

        output
    }

    /// Candidate source offsets for a frame nominally at `nominal`: the seek
    /// window around it, clamped so a whole frame can be read from the input.
    pub fn search_range(&self, input_len: usize, nominal: usize) -> RangeInclusive<usize> {
        let max_start = input_len.saturating_sub(self.layout.frame_len);
        let nominal = nominal.min(max_start);
        let hi = (nominal + self.layout.seek_window).min(max_start);
        let lo = nominal.saturating_sub(self.layout.seek_window);
        lo..=hi
    }

    /// Finds the source offset whose leading `overlap` samples best match the
    /// output already written at `seam`.
    ///
    /// Ties are resolved in favour of the candidate closest to `nominal`. When
    /// the search window has zero width, or there is nothing to compare
    /// against, the nominal offset is returned.
    pub fn find_best_offset(
        &mut self,
        input: &[Sample],
        output: &[Sample],
        nominal: usize,
        seam: usize,
    ) -> AlignmentCandidate {
        let range = self.search_range(input.len(), nominal);
        let (search_start, search_end) = (*range.start(), *range.end());
        let nominal = nominal.min(search_end);

        let overlap_len = self.layout.overlap.min(output.len().saturating_sub(seam));
        let overlap_len = overlap_len.min(input.len().saturating_sub(search_end));
        if overlap_len == 0 {
            return AlignmentCandidate {
                offset: nominal,
                score: 0.0,
            };
        }

        let reference = &output[seam..seam + overlap_len];
        if search_start >= search_end {
            return AlignmentCandidate {
                offset: nominal,
                score: normalized_cross_correlation(
                    reference,
                    &input[nominal..nominal + overlap_len],
                ),
            };
        }

        let num_candidates = search_end - search_start + 1;
        let region = &input[search_start..search_end + overlap_len];
        let scores = if num_candidates > FFT_CANDIDATE_THRESHOLD
            && overlap_len >= FFT_OVERLAP_THRESHOLD
        {
            self.scores_fft(reference, region, num_candidates)
        } else {
            scores_direct(reference, region, num_candidates)
        };

        select_best(&scores, search_start, nominal)
    }

    /// FFT-accelerated scoring of every candidate lag in `region`.
    fn scores_fft(&mut self, reference: &[Sample], region: &[Sample], num_candidates: usize) -> Vec<f64> {
        let overlap_len = reference.len();
        let ref_energy = energy(reference);
        if ref_energy < ENERGY_EPSILON {
            return vec![0.0; num_candidates];
        }

        let corr = self.fft_cross_correlate(reference, region);
        let norm = 1.0 / corr.len() as f64;

        // Running energy of each candidate window via prefix sums
        let mut prefix_sq = vec![0.0f64; region.len() + 1];
        for (i, &s) in region.iter().enumerate() {
            prefix_sq[i + 1] = prefix_sq[i] + (s as f64) * (s as f64);
        }

        (0..num_candidates)
            .map(|k| {
                let window_energy = prefix_sq[k + overlap_len] - prefix_sq[k];
                if window_energy < ENERGY_EPSILON {
                    return 0.0;
                }
                corr[k].re * norm / (ref_energy * window_energy).sqrt()
            })
            .collect()
    }

    /// Raw cross-correlation `c[k] = Σ reference[i] · region[i + k]` via FFT.
    ///
    /// The result is unnormalized; divide by its length.
    fn fft_cross_correlate(&mut self, reference: &[Sample], region: &[Sample]) -> Vec<Complex<f64>> {
        let conv_len = region.len() + reference.len() - 1;
        let fft_size = conv_len.next_power_of_two();

        let fft_fwd = self.planner.plan_fft_forward(fft_size);
        let fft_inv = self.planner.plan_fft_inverse(fft_size);

        let mut ref_buf = vec![Complex::new(0.0f64, 0.0); fft_size];
        for (slot, &s) in ref_buf.iter_mut().zip(reference.iter()) {
            *slot = Complex::new(s as f64, 0.0);
        }
        let mut region_buf = vec![Complex::new(0.0f64, 0.0); fft_size];
        for (slot, &s) in region_buf.iter_mut().zip(region.iter()) {
            *slot = Complex::new(s as f64, 0.0);
        }

        // conj(Ref) * Region in the frequency domain is correlation in time
        fft_fwd.process(&mut ref_buf);
        fft_fwd.process(&mut region_buf);
        for (r, s) in ref_buf.iter_mut().zip(region_buf.iter()) {
            *r = r.conj() * *s;
        }
        fft_inv.process(&mut ref_buf);
        ref_buf
    }
}

/// Scores each of `num_candidates` lags in `region` against `reference`.
fn scores_direct(reference: &[Sample], region: &[Sample], num_candidates: usize) -> Vec<f64> {
    let overlap_len = reference.len();
    (0..num_candidates)
        .map(|k| normalized_cross_correlation(reference, &region[k..k + overlap_len]))
        .collect()
}

/// Picks the highest score. Scores within `TIE_EPSILON` tie, and ties go to
/// the offset nearest `nominal`.
fn select_best(scores: &[f64], search_start: usize, nominal: usize) -> AlignmentCandidate {
    let mut best = AlignmentCandidate {
        offset: nominal,
        score: f64::NEG_INFINITY,
    };

    for (k, &score) in scores.iter().enumerate() {
        let offset = search_start + k;
        let closer = offset.abs_diff(nominal) < best.offset.abs_diff(nominal);
        if score > best.score + TIE_EPSILON
            || ((score - best.score).abs() <= TIE_EPSILON && closer)
        {
            best = AlignmentCandidate { offset, score };
        }
    }

    best
}

#[inline]
fn energy(signal: &[Sample]) -> f64 {
    signal.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

/// Normalized cross-correlation between two signals.
///
/// Returns 0.0 if either signal is (near) silent.
#[inline]
fn normalized_cross_correlation(a: &[Sample], b: &[Sample]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }

    let mut sum_ab = 0.0f64;
    let mut sum_a2 = 0.0f64;
    let mut sum_b2 = 0.0f64;

    for i in 0..len {
        let va = a[i] as f64;
        let vb = b[i] as f64;
        sum_ab += va * vb;
        sum_a2 += va * va;
        sum_b2 += vb * vb;
    }

    if sum_a2 < ENERGY_EPSILON || sum_b2 < ENERGY_EPSILON {
        return 0.0;
    }

    sum_ab / (sum_a2 * sum_b2).sqrt()
}
