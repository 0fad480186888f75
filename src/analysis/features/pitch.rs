use crate::analysis::{AnalysisError, Result};

use super::spectrogram::WINDOW_SIZE;

const FREQ_MIN: f64 = 150.0;
const FREQ_MAX: f64 = 4000.0;
const PEAK_THRESHOLD: f64 = 0.1;

/// Pitch candidate refined from a spectral peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PitchCandidate {
    pub frequency: f64,
    pub magnitude: f64,
}

/// Collects parabolic-refined spectral peaks for every frame.
pub(crate) fn track_pitches(magnitude: &[Vec<f64>], sample_rate: u32) -> Vec<PitchCandidate> {
    let bin_hz = sample_rate as f64 / WINDOW_SIZE as f64;
    let mut candidates = Vec::new();
    for frame in magnitude {
        let frame_max = frame.iter().copied().fold(0.0, f64::max);
        if frame_max <= 0.0 {
            continue;
        }
        let threshold = PEAK_THRESHOLD * frame_max;
        for bin in 1..frame.len().saturating_sub(1) {
            let freq = bin as f64 * bin_hz;
            if !(FREQ_MIN..FREQ_MAX).contains(&freq) {
                continue;
            }
            let (prev, current, next) = (frame[bin - 1], frame[bin], frame[bin + 1]);
            if current > prev && current >= next && current > threshold {
                candidates.push(refine_peak(bin, prev, current, next, bin_hz));
            }
        }
    }
    candidates
}

fn refine_peak(bin: usize, prev: f64, current: f64, next: f64, bin_hz: f64) -> PitchCandidate {
    let avg = 0.5 * (next - prev);
    let curvature = 2.0 * current - next - prev;
    let shift = if curvature.abs() < f64::MIN_POSITIVE {
        0.0
    } else {
        avg / curvature
    };
    PitchCandidate {
        frequency: (bin as f64 + shift) * bin_hz,
        magnitude: current + 0.5 * avg * shift,
    }
}

/// Mean frequency of candidates louder than half the loudest one in the recording.
pub(crate) fn gated_pitch_mean(candidates: &[PitchCandidate]) -> Result<f64> {
    let loudest = candidates
        .iter()
        .map(|c| c.magnitude)
        .fold(0.0, f64::max);
    let gate = loudest / 2.0;
    let (sum, count) = candidates
        .iter()
        .filter(|c| c.magnitude > gate)
        .fold((0.0, 0usize), |(sum, count), c| (sum + c.frequency, count + 1));
    if count == 0 {
        return Err(AnalysisError::PitchEstimation);
    }
    let mean = sum / count as f64;
    if mean.is_finite() {
        Ok(mean)
    } else {
        Err(AnalysisError::PitchEstimation)
    }
}
