use super::spectrogram::{welch_psd, WINDOW_SIZE};

const SEGMENT_SIZE: usize = WINDOW_SIZE;
const WELCH_WINDOW: usize = 256;
const WELCH_OVERLAP: usize = 128;
const PEAK_HEIGHT_FRACTION: f64 = 0.1;
const FORMANT_COUNT: usize = 3;

/// Mean of the three lowest resonance peaks over all full segments.
///
/// Segments with fewer than three peaks contribute nothing; when no segment qualifies
/// the result is a zero vector.
pub(crate) fn estimate_formants(samples: &[f64], sample_rate: u32) -> [f64; 3] {
    let mut sums = [0.0; FORMANT_COUNT];
    let mut segments = 0usize;

    for segment in samples.chunks_exact(SEGMENT_SIZE) {
        let (freqs, psd) = welch_psd(segment, sample_rate, WELCH_WINDOW, WELCH_OVERLAP);
        let peak_power = psd.iter().copied().fold(0.0, f64::max);
        if peak_power <= 0.0 {
            continue;
        }
        let peaks = find_peaks(&psd, PEAK_HEIGHT_FRACTION * peak_power);
        if peaks.len() < FORMANT_COUNT {
            continue;
        }
        for (sum, &bin) in sums.iter_mut().zip(peaks.iter()) {
            *sum += freqs[bin];
        }
        segments += 1;
    }

    if segments == 0 {
        return [0.0; FORMANT_COUNT];
    }
    sums.map(|sum| sum / segments as f64)
}

/// Indices of interior local maxima at least `height` tall, in ascending order.
///
/// Flat-topped peaks report their middle sample.
pub(crate) fn find_peaks(values: &[f64], height: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }
    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                if values[i] >= height {
                    peaks.push((i + ahead - 1) / 2);
                }
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}
