use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;

use crate::analysis::Signal;

pub const WINDOW_SIZE: usize = 1024;
pub const HOP_SIZE: usize = 256;
pub const MEL_BANDS: usize = 40;
const MIN_FREQ: f64 = 20.0;

/// Short-time spectra of one recording, laid out frame-major.
pub(crate) struct SpectrogramBundle {
    pub samples: Vec<f64>,
    pub magnitude: Vec<Vec<f64>>,
    pub phase: Vec<Vec<f64>>,
    pub power: Vec<Vec<f64>>,
    pub mel: Vec<Vec<f64>>,
    pub freqs: Vec<f64>,
}

impl SpectrogramBundle {
    pub fn frame_count(&self) -> usize {
        self.magnitude.len()
    }
}

pub(crate) fn compute_spectrograms(signal: &Signal) -> SpectrogramBundle {
    let audio_f64: Vec<f64> = signal.samples.iter().map(|&s| s as f64).collect();

    let stft = spectrum::rstft(&audio_f64, WINDOW_SIZE, HOP_SIZE, WindowType::Hanning);
    let (magnitude, phase) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let freqs = spectrum::rfftfreq(WINDOW_SIZE, signal.sample_rate);
    let filterbank = MelFilterbank::new(
        MIN_FREQ,
        (signal.sample_rate as f64) / 2.0,
        MEL_BANDS,
        &freqs,
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);

    SpectrogramBundle {
        samples: audio_f64,
        magnitude,
        phase,
        power,
        mel,
        freqs,
    }
}

/// Averaged periodogram over overlapping Hann sub-windows (Welch's method).
///
/// Returns `(frequencies, power)`; the scale is relative, which is all peak picking needs.
pub(crate) fn welch_psd(
    segment: &[f64],
    sample_rate: u32,
    sub_window: usize,
    overlap: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mean = segment.iter().sum::<f64>() / segment.len().max(1) as f64;
    let detrended: Vec<f64> = segment.iter().map(|s| s - mean).collect();

    let hop = sub_window.saturating_sub(overlap).max(1);
    let stft = spectrum::rstft(&detrended, sub_window, hop, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let freqs = spectrum::rfftfreq(sub_window, sample_rate);

    let mut psd = vec![0.0; freqs.len()];
    let mut frames = 0usize;
    for frame in &magnitude {
        for (acc, value) in psd.iter_mut().zip(frame.iter()) {
            *acc += value * value;
        }
        frames += 1;
    }
    if frames > 0 {
        psd.iter_mut().for_each(|v| *v /= frames as f64);
    }
    (freqs, psd)
}
