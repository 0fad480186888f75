use std::f32::consts::PI;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vocalcompare::analysis::features::{FeatureExtractor, MFCC_COUNT, WINDOW_SIZE};
use vocalcompare::analysis::{AnalysisError, FeatureBundle, Signal};

const SAMPLE_RATE: u32 = 16_000;

#[test]
fn per_frame_sequences_share_one_frame_count() {
    let features = extract(&sine_wave(440.0, 1.0, 0.5));

    assert!(features.frame_count > 0);
    assert_eq!(features.rms_energy.len(), features.frame_count);
    assert_eq!(features.spectral_centroid.len(), features.frame_count);
    assert_eq!(features.spectral_bandwidth.len(), features.frame_count);
    assert_eq!(features.spectral_rolloff.len(), features.frame_count);
    assert_eq!(features.zero_crossing_rate.len(), features.frame_count);
    assert_eq!(features.spectral_flatness.len(), features.frame_count);
    assert_eq!(features.mfcc.dim(), (MFCC_COUNT, features.frame_count));
    assert_abs_diff_eq!(features.duration, 1.0, epsilon = 1e-9);
}

#[test]
fn extraction_is_deterministic() {
    let signal = noisy(sine_wave(440.0, 1.0, 0.5), 0.01, 11);
    let first = extract(&signal);
    let second = extract(&signal);

    assert_eq!(first.frame_count, second.frame_count);
    assert_eq!(first.rms_energy, second.rms_energy);
    assert_eq!(first.spectral_centroid, second.spectral_centroid);
    assert_eq!(first.spectral_flatness, second.spectral_flatness);
    assert_eq!(first.mfcc, second.mfcc);
    assert_eq!(first.pitch_mean.to_bits(), second.pitch_mean.to_bits());
    assert_eq!(first.phase_coherence.to_bits(), second.phase_coherence.to_bits());
    assert_eq!(first.formants, second.formants);
}

#[test]
fn signal_shorter_than_one_window_is_rejected() {
    let signal = Signal::from_samples(vec![0.1; WINDOW_SIZE - 1], SAMPLE_RATE);
    let err = FeatureExtractor::new()
        .extract(&signal)
        .expect_err("short signal must fail");
    assert!(matches!(
        err,
        AnalysisError::InsufficientSignal { samples, required }
            if samples == WINDOW_SIZE - 1 && required == WINDOW_SIZE
    ));
}

#[test]
fn silence_fails_the_pitch_gate() {
    let signal = Signal::from_samples(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE);
    let err = FeatureExtractor::new()
        .extract(&signal)
        .expect_err("silence has no pitch");
    assert!(matches!(err, AnalysisError::PitchEstimation));
}

#[test]
fn pure_tone_pitch_matches_its_frequency() {
    let features = extract(&sine_wave(440.0, 1.0, 0.5));
    assert!(
        (features.pitch_mean - 440.0).abs() < 8.0,
        "pitch mean {}",
        features.pitch_mean
    );
}

#[test]
fn drift_free_tone_has_near_zero_phase_change() {
    // 500 Hz repeats every 32 samples, so every hop starts on the same phase.
    let tone = extract(&periodic_tone(500.0, 2.0));
    let noise = extract(&white_noise(2.0, 0.3, 5));

    assert!(
        tone.phase_coherence < 0.25,
        "tone phase coherence {}",
        tone.phase_coherence
    );
    assert!(
        tone.phase_coherence * 5.0 < noise.phase_coherence,
        "tone {} vs noise {}",
        tone.phase_coherence,
        noise.phase_coherence
    );
    assert!(
        (tone.pitch_mean - 500.0).abs() < 2.0,
        "pitch mean {}",
        tone.pitch_mean
    );
}

#[test]
fn noise_is_flatter_than_a_tone() {
    let tone = extract(&sine_wave(440.0, 1.0, 0.5));
    let noise = extract(&white_noise(1.0, 0.3, 9));

    assert!(tone.mean_flatness() < noise.mean_flatness());
    assert!(noise
        .spectral_flatness
        .iter()
        .all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn three_partials_are_reported_as_formants() {
    let features = extract(&vowel_like(1.0));
    assert_abs_diff_eq!(features.formants[0], 500.0, epsilon = 1.0);
    assert_abs_diff_eq!(features.formants[1], 1500.0, epsilon = 1.0);
    assert_abs_diff_eq!(features.formants[2], 2500.0, epsilon = 1.0);
}

#[test]
fn single_tone_has_no_formant_triplet() {
    let features = extract(&sine_wave(440.0, 1.0, 0.5));
    assert_eq!(features.formants, [0.0; 3]);
}

#[test]
fn centroid_tracks_tone_frequency() {
    let low = extract(&sine_wave(300.0, 0.5, 0.5));
    let high = extract(&sine_wave(3000.0, 0.5, 0.5));
    let low_mean = low.spectral_centroid.mean().unwrap();
    let high_mean = high.spectral_centroid.mean().unwrap();
    assert!(low_mean < high_mean, "{low_mean} vs {high_mean}");
}

fn extract(signal: &Signal) -> FeatureBundle {
    FeatureExtractor::new()
        .extract(signal)
        .expect("feature extraction succeeds")
}

fn sine_wave(frequency: f32, duration_secs: f32, amplitude: f32) -> Signal {
    let total_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let samples = (0..total_samples)
        .map(|index| {
            let t = index as f64 / SAMPLE_RATE as f64;
            ((2.0 * std::f64::consts::PI * frequency as f64 * t).sin() * amplitude as f64) as f32
        })
        .collect();
    Signal::from_samples(samples, SAMPLE_RATE)
}

/// Tone whose samples repeat bit-for-bit every period.
fn periodic_tone(frequency: f32, duration_secs: f32) -> Signal {
    let period = (SAMPLE_RATE as f32 / frequency).round() as usize;
    let total_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let samples = (0..total_samples)
        .map(|index| (2.0 * PI * (index % period) as f32 / period as f32).sin() * 0.5)
        .collect();
    Signal::from_samples(samples, SAMPLE_RATE)
}

fn vowel_like(duration_secs: f32) -> Signal {
    let total_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let samples = (0..total_samples)
        .map(|index| {
            let t = index as f32 / SAMPLE_RATE as f32;
            [500.0_f32, 1500.0, 2500.0]
                .iter()
                .map(|f| (2.0 * PI * f * t).sin() * 0.3)
                .sum()
        })
        .collect();
    Signal::from_samples(samples, SAMPLE_RATE)
}

fn white_noise(duration_secs: f32, amplitude: f32, seed: u64) -> Signal {
    let total_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = (0..total_samples)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect();
    Signal::from_samples(samples, SAMPLE_RATE)
}

fn noisy(signal: Signal, amplitude: f32, seed: u64) -> Signal {
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = signal
        .samples
        .iter()
        .map(|s| s + rng.gen_range(-amplitude..amplitude))
        .collect();
    Signal::from_samples(samples, signal.sample_rate)
}
