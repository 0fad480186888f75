use ndarray::{Array1, Array2};

use super::spectrogram::{HOP_SIZE, WINDOW_SIZE};

pub const MFCC_COUNT: usize = 13;
const ROLLOFF_FRACTION: f64 = 0.85;
const POWER_FLOOR: f64 = 1e-10;
const TOP_DB: f64 = 80.0;

/// Sample range of frame `index`, clipped to the signal.
fn frame_bounds(index: usize, len: usize) -> (usize, usize) {
    let start = (index * HOP_SIZE).min(len);
    let end = (start + WINDOW_SIZE).min(len);
    (start, end)
}

pub(crate) fn rms_energy(samples: &[f64], frame_count: usize) -> Array1<f64> {
    Array1::from_iter((0..frame_count).map(|index| {
        let (start, end) = frame_bounds(index, samples.len());
        let frame = &samples[start..end];
        if frame.is_empty() {
            return 0.0;
        }
        (frame.iter().map(|s| s * s).sum::<f64>() / frame.len() as f64).sqrt()
    }))
}

pub(crate) fn zero_crossing_rate(samples: &[f64], frame_count: usize) -> Array1<f64> {
    Array1::from_iter((0..frame_count).map(|index| {
        let (start, end) = frame_bounds(index, samples.len());
        let frame = &samples[start..end];
        if frame.len() < 2 {
            return 0.0;
        }
        let crossings = frame
            .windows(2)
            .filter(|pair| pair[0].is_sign_negative() != pair[1].is_sign_negative())
            .count();
        crossings as f64 / frame.len() as f64
    }))
}

pub(crate) struct SpectralShape {
    pub centroid: Array1<f64>,
    pub bandwidth: Array1<f64>,
    pub rolloff: Array1<f64>,
}

pub(crate) fn spectral_shape(magnitude: &[Vec<f64>], freqs: &[f64]) -> SpectralShape {
    let frames = magnitude.len();
    let mut centroid = Array1::zeros(frames);
    let mut bandwidth = Array1::zeros(frames);
    let mut rolloff = Array1::zeros(frames);

    for (idx, frame) in magnitude.iter().enumerate() {
        let total: f64 = frame.iter().sum();
        if total <= 0.0 {
            continue;
        }
        let center = frame
            .iter()
            .zip(freqs.iter())
            .map(|(m, f)| m * f)
            .sum::<f64>()
            / total;
        let spread = frame
            .iter()
            .zip(freqs.iter())
            .map(|(m, f)| m * (f - center).powi(2))
            .sum::<f64>()
            / total;

        let target = ROLLOFF_FRACTION * total;
        let mut cumulative = 0.0;
        let mut edge = freqs.last().copied().unwrap_or(0.0);
        for (m, f) in frame.iter().zip(freqs.iter()) {
            cumulative += m;
            if cumulative >= target {
                edge = *f;
                break;
            }
        }

        centroid[idx] = center;
        bandwidth[idx] = spread.sqrt();
        rolloff[idx] = edge;
    }

    SpectralShape {
        centroid,
        bandwidth,
        rolloff,
    }
}

/// Wiener entropy of each power frame, in [0, 1].
pub(crate) fn spectral_flatness(power: &[Vec<f64>]) -> Array1<f64> {
    Array1::from_iter(power.iter().map(|frame| {
        if frame.is_empty() {
            return 0.0;
        }
        let count = frame.len() as f64;
        let log_mean = frame
            .iter()
            .map(|p| p.max(POWER_FLOOR).ln())
            .sum::<f64>()
            / count;
        let arithmetic = frame.iter().map(|p| p.max(POWER_FLOOR)).sum::<f64>() / count;
        (log_mean.exp() / arithmetic).clamp(0.0, 1.0)
    }))
}

/// Cepstral coefficients as a `MFCC_COUNT x frames` matrix.
pub(crate) fn mfcc(mel: &[Vec<f64>]) -> Array2<f64> {
    let frames = mel.len();
    let mut output = Array2::zeros((MFCC_COUNT, frames));
    if frames == 0 {
        return output;
    }

    let log_mel: Vec<Vec<f64>> = mel
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|v| 10.0 * v.max(POWER_FLOOR).log10())
                .collect()
        })
        .collect();
    let peak = log_mel
        .iter()
        .flat_map(|frame| frame.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let floor = peak - TOP_DB;

    for (t, frame) in log_mel.iter().enumerate() {
        let bands = frame.len();
        if bands == 0 {
            continue;
        }
        let clamped: Vec<f64> = frame.iter().map(|v| v.max(floor)).collect();
        for k in 0..MFCC_COUNT {
            let scale = if k == 0 {
                (1.0 / bands as f64).sqrt()
            } else {
                (2.0 / bands as f64).sqrt()
            };
            let sum: f64 = clamped
                .iter()
                .enumerate()
                .map(|(n, v)| {
                    v * (std::f64::consts::PI * k as f64 * (2 * n + 1) as f64
                        / (2 * bands) as f64)
                        .cos()
                })
                .sum();
            output[[k, t]] = scale * sum;
        }
    }
    output
}

/// Mean absolute frame-to-frame phase change over every bin.
pub(crate) fn phase_coherence(phase: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for pair in phase.windows(2) {
        for (prev, next) in pair[0].iter().zip(pair[1].iter()) {
            total += (next - prev).abs();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
