pub mod comparison;
pub mod features;

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use ndarray::{Array1, Array2};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::AudioData;

/// Convenient alias for results returned by the analysis engine.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Identifies which recording of a pair an error or value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Original,
    New,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Original => write!(f, "original recording"),
            Side::New => write!(f, "new recording"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("signal too short for analysis: {samples} samples, at least {required} required")]
    InsufficientSignal { samples: usize, required: usize },

    #[error("pitch estimation failed: no pitch candidate passed the confidence gate")]
    PitchEstimation,

    #[error("feature extraction failed for the {side}: {source}")]
    ExtractionFailed {
        side: Side,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    pub(crate) fn on_side(self, side: Side) -> Self {
        AnalysisError::ExtractionFailed {
            side,
            source: Box::new(self),
        }
    }

    /// Recording that caused a wrapped extraction failure, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            AnalysisError::ExtractionFailed { side, .. } => Some(*side),
            _ => None,
        }
    }
}

/// Decoded mono recording at a fixed sample rate.
#[derive(Debug, Clone)]
pub struct Signal {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    pub duration: Duration,
}

impl Signal {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        };
        Self {
            samples: Arc::from(samples),
            sample_rate,
            duration,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<AudioData> for Signal {
    fn from(audio: AudioData) -> Self {
        Signal::from_samples(audio.samples, audio.sample_rate)
    }
}

/// Acoustic descriptors computed for a single recording.
///
/// Every per-frame sequence has `frame_count` entries and `mfcc` is laid out as
/// coefficients x frames.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureBundle {
    pub duration: f64,
    pub frame_count: usize,
    pub rms_energy: Array1<f64>,
    pub spectral_centroid: Array1<f64>,
    pub spectral_bandwidth: Array1<f64>,
    pub spectral_rolloff: Array1<f64>,
    pub zero_crossing_rate: Array1<f64>,
    pub mfcc: Array2<f64>,
    pub pitch_mean: f64,
    pub spectral_flatness: Array1<f64>,
    pub phase_coherence: f64,
    pub formants: [f64; 3],
}

impl FeatureBundle {
    pub fn mean_flatness(&self) -> f64 {
        self.spectral_flatness.mean().unwrap_or(0.0)
    }
}

/// Cosine similarity that keeps the zero-vector case distinct from a real score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    Defined(f64),
    Undefined,
}

impl Similarity {
    pub fn value(self) -> Option<f64> {
        match self {
            Similarity::Defined(value) => Some(value),
            Similarity::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Similarity::Defined(_))
    }
}

impl Display for Similarity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Similarity::Defined(value) => write!(f, "{:.4}", value),
            Similarity::Undefined => write!(f, "undefined"),
        }
    }
}

impl Serialize for Similarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Pairwise metrics between the original and the new recording.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub mfcc_similarity: Similarity,
    pub formant_similarity: Similarity,
    pub phase_difference: f64,
    pub flatness_difference: f64,
    pub pitch_difference: f64,
    pub spectral_smoothness_diff: f64,
    pub formant_stability_diff: f64,
    pub original: FeatureBundle,
    pub new: FeatureBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_error_names_the_side() {
        let err = AnalysisError::PitchEstimation.on_side(Side::New);
        assert_eq!(err.side(), Some(Side::New));
        let message = err.to_string();
        assert!(message.contains("new recording"), "{message}");
        assert!(message.contains("pitch estimation"), "{message}");
    }

    #[test]
    fn similarity_serializes_undefined_as_null() {
        let json = serde_json::to_string(&[Similarity::Defined(0.5), Similarity::Undefined])
            .unwrap();
        assert_eq!(json, "[0.5,null]");
        assert_eq!(Similarity::Undefined.to_string(), "undefined");
    }

    #[test]
    fn signal_duration_follows_sample_rate() {
        let signal = Signal::from_samples(vec![0.0; 8_000], 16_000);
        assert_eq!(signal.duration, Duration::from_millis(500));
        assert_eq!(signal.len(), 8_000);
    }
}
