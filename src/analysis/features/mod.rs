mod formants;
mod frames;
mod pitch;
mod spectrogram;

use spectrogram::compute_spectrograms;
use tracing::debug;

use crate::analysis::{AnalysisError, FeatureBundle, Result, Signal};

pub use frames::MFCC_COUNT;
pub use spectrogram::{HOP_SIZE, MEL_BANDS, WINDOW_SIZE};

/// Computes the acoustic descriptor bundle of a single recording.
#[derive(Debug, Default)]
pub struct FeatureExtractor {}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, signal: &Signal) -> Result<FeatureBundle> {
        if signal.sample_rate == 0 || signal.len() < WINDOW_SIZE {
            return Err(AnalysisError::InsufficientSignal {
                samples: signal.len(),
                required: WINDOW_SIZE,
            });
        }

        let spectrograms = compute_spectrograms(signal);
        let frame_count = spectrograms.frame_count();

        let shape = frames::spectral_shape(&spectrograms.magnitude, &spectrograms.freqs);
        let candidates = pitch::track_pitches(&spectrograms.magnitude, signal.sample_rate);
        let pitch_mean = pitch::gated_pitch_mean(&candidates)?;
        let phase_coherence = frames::phase_coherence(&spectrograms.phase);
        let formants = formants::estimate_formants(&spectrograms.samples, signal.sample_rate);

        debug!(
            frames = frame_count,
            pitch_candidates = candidates.len(),
            pitch_mean,
            phase_coherence,
            ?formants,
            "extracted recording features"
        );

        Ok(FeatureBundle {
            duration: signal.duration.as_secs_f64(),
            frame_count,
            rms_energy: frames::rms_energy(&spectrograms.samples, frame_count),
            spectral_centroid: shape.centroid,
            spectral_bandwidth: shape.bandwidth,
            spectral_rolloff: shape.rolloff,
            zero_crossing_rate: frames::zero_crossing_rate(&spectrograms.samples, frame_count),
            mfcc: frames::mfcc(&spectrograms.mel),
            pitch_mean,
            spectral_flatness: frames::spectral_flatness(&spectrograms.power),
            phase_coherence,
            formants,
        })
    }
}
