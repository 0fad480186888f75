use std::thread;

use ndarray::{Array1, Axis};
use tracing::info;

use crate::analysis::features::FeatureExtractor;
use crate::analysis::{ComparisonResult, FeatureBundle, Result, Side, Signal, Similarity};

/// Runs feature extraction on both recordings and reduces the pair to metrics.
#[derive(Debug, Default)]
pub struct ComparisonEngine {
    extractor: FeatureExtractor,
    parallel: bool,
}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract both recordings on separate threads. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn compare(&self, original: &Signal, new: &Signal) -> Result<ComparisonResult> {
        let (original_features, new_features) = if self.parallel {
            self.extract_parallel(original, new)
        } else {
            (self.extract_side(original, Side::Original), self.extract_side(new, Side::New))
        };
        let result = compare_bundles(original_features?, new_features?);
        info!(
            mfcc_similarity = %result.mfcc_similarity,
            formant_similarity = %result.formant_similarity,
            pitch_difference = result.pitch_difference,
            phase_difference = result.phase_difference,
            "comparison complete"
        );
        Ok(result)
    }

    fn extract_side(&self, signal: &Signal, side: Side) -> Result<FeatureBundle> {
        self.extractor
            .extract(signal)
            .map_err(|err| err.on_side(side))
    }

    fn extract_parallel(
        &self,
        original: &Signal,
        new: &Signal,
    ) -> (Result<FeatureBundle>, Result<FeatureBundle>) {
        thread::scope(|scope| {
            let worker = scope.spawn(|| self.extract_side(new, Side::New));
            let original_features = self.extract_side(original, Side::Original);
            let new_features = match worker.join() {
                Ok(features) => features,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            (original_features, new_features)
        })
    }
}

/// Reduces two descriptor bundles to pairwise metrics.
pub fn compare_bundles(original: FeatureBundle, new: FeatureBundle) -> ComparisonResult {
    let mfcc_similarity = cosine_similarity(&mean_mfcc(&original), &mean_mfcc(&new));
    let formant_similarity = cosine_similarity(&original.formants, &new.formants);
    let phase_difference = (original.phase_coherence - new.phase_coherence).abs();
    let flatness_difference = (original.mean_flatness() - new.mean_flatness()).abs();
    let pitch_difference = (original.pitch_mean - new.pitch_mean).abs();
    let spectral_smoothness_diff =
        (centroid_drift(&original.spectral_centroid) - centroid_drift(&new.spectral_centroid))
            .abs();
    let formant_stability_diff =
        (population_std(&original.formants) - population_std(&new.formants)).abs();

    ComparisonResult {
        mfcc_similarity,
        formant_similarity,
        phase_difference,
        flatness_difference,
        pitch_difference,
        spectral_smoothness_diff,
        formant_stability_diff,
        original,
        new,
    }
}

/// Cosine of the angle between `lhs` and `rhs`; undefined when either has no magnitude.
pub fn cosine_similarity(lhs: &[f64], rhs: &[f64]) -> Similarity {
    let dot: f64 = lhs.iter().zip(rhs.iter()).map(|(a, b)| a * b).sum();
    let lhs_norm = lhs.iter().map(|v| v * v).sum::<f64>().sqrt();
    let rhs_norm = rhs.iter().map(|v| v * v).sum::<f64>().sqrt();
    let denom = lhs_norm * rhs_norm;
    if denom == 0.0 || !denom.is_finite() {
        return Similarity::Undefined;
    }
    Similarity::Defined(dot / denom)
}

/// Per-coefficient mean of the MFCC matrix over time.
fn mean_mfcc(features: &FeatureBundle) -> Vec<f64> {
    features
        .mfcc
        .mean_axis(Axis(1))
        .map(|means| means.to_vec())
        .unwrap_or_else(|| vec![0.0; features.mfcc.nrows()])
}

/// Mean first difference of the centroid track.
fn centroid_drift(centroid: &Array1<f64>) -> f64 {
    if centroid.len() < 2 {
        return 0.0;
    }
    let steps = centroid.len() - 1;
    let total: f64 = centroid
        .iter()
        .zip(centroid.iter().skip(1))
        .map(|(prev, next)| next - prev)
        .sum();
    total / steps as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count).sqrt()
}
