//! Turns a comparison into prose for the people reading it.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::analysis::{ComparisonResult, FeatureBundle, Similarity};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary generation failed: {0}")]
    Generation(String),
}

/// Everything a summarizer may read: the metrics plus where they came from.
#[derive(Debug, Clone, Serialize)]
pub struct ReportInput {
    pub original_name: String,
    pub new_name: String,
    pub generated_at: DateTime<Utc>,
    pub result: ComparisonResult,
}

impl ReportInput {
    pub fn new(
        original_name: impl Into<String>,
        new_name: impl Into<String>,
        result: ComparisonResult,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            new_name: new_name.into(),
            generated_at: Utc::now(),
            result,
        }
    }

    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

pub trait Summarizer {
    fn summarize(&self, input: &ReportInput) -> Result<String, SummaryError>;
}

/// Deterministic markdown report built from a fixed template.
#[derive(Debug, Default)]
pub struct MarkdownSummarizer {}

impl MarkdownSummarizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Summarizer for MarkdownSummarizer {
    fn summarize(&self, input: &ReportInput) -> Result<String, SummaryError> {
        render_markdown(input).map_err(|err| SummaryError::Generation(err.to_string()))
    }
}

/// Plain metrics block, the same figures the report quotes.
pub fn metrics_block(result: &ComparisonResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_metrics(&mut out, result);
    let _ = writeln!(out);
    let _ = write_characteristics(&mut out, "Original Voice Characteristics", &result.original);
    let _ = writeln!(out);
    let _ = write_characteristics(&mut out, "New Voice Characteristics", &result.new);
    out
}

fn write_metrics(out: &mut String, result: &ComparisonResult) -> std::fmt::Result {
    writeln!(out, "AI Voice Synthesis Analysis Results:")?;
    writeln!(out, "-----------------------------------")?;
    writeln!(out, "MFCC Similarity: {}", result.mfcc_similarity)?;
    writeln!(out, "Formant Similarity: {}", result.formant_similarity)?;
    writeln!(out, "Phase Coherence Difference: {:.4}", result.phase_difference)?;
    writeln!(out, "Spectral Flatness Difference: {:.4}", result.flatness_difference)?;
    writeln!(out, "Pitch Difference: {:.2} Hz", result.pitch_difference)?;
    writeln!(
        out,
        "Spectral Smoothness Difference: {:.4}",
        result.spectral_smoothness_diff
    )?;
    writeln!(
        out,
        "Formant Stability Difference: {:.4}",
        result.formant_stability_diff
    )
}

fn write_characteristics(
    out: &mut String,
    title: &str,
    features: &FeatureBundle,
) -> std::fmt::Result {
    writeln!(out, "{title}:")?;
    writeln!(out, "Duration: {:.2} seconds", features.duration)?;
    writeln!(out, "Average Pitch: {:.2} Hz", features.pitch_mean)?;
    writeln!(out, "Phase Coherence: {:.4}", features.phase_coherence)?;
    writeln!(
        out,
        "Average Spectral Flatness: {:.4}",
        features.mean_flatness()
    )
}

fn render_markdown(input: &ReportInput) -> Result<String, std::fmt::Error> {
    let result = &input.result;
    let mut out = String::new();

    writeln!(out, "# Voice Comparison Report")?;
    writeln!(out)?;
    writeln!(
        out,
        "- Analysis date: {}",
        input.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "- Original recording: {}", input.original_name)?;
    writeln!(out, "- New recording: {}", input.new_name)?;
    writeln!(out)?;

    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    writeln!(out, "{}", executive_summary(result))?;
    writeln!(
        out,
        "These figures are indicators for further review, not a determination of origin."
    )?;
    writeln!(out)?;

    writeln!(out, "## Analysis Methodology")?;
    writeln!(out)?;
    writeln!(
        out,
        "Both recordings were analysed independently with identical short-time spectral \
         settings. Timbre was summarised with 13 mel-frequency cepstral coefficients, pitch \
         with a peak-tracking estimator gated at half of the strongest candidate, phase \
         behaviour with the mean frame-to-frame phase change, and vocal-tract resonances \
         with Welch power spectra over fixed segments."
    )?;
    writeln!(out)?;

    writeln!(out, "## Detailed Findings")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| MFCC similarity | {} |", result.mfcc_similarity)?;
    writeln!(out, "| Formant similarity | {} |", result.formant_similarity)?;
    writeln!(
        out,
        "| Phase coherence difference | {:.4} |",
        result.phase_difference
    )?;
    writeln!(
        out,
        "| Spectral flatness difference | {:.4} |",
        result.flatness_difference
    )?;
    writeln!(out, "| Pitch difference | {:.2} Hz |", result.pitch_difference)?;
    writeln!(
        out,
        "| Spectral smoothness difference | {:.4} |",
        result.spectral_smoothness_diff
    )?;
    writeln!(
        out,
        "| Formant stability difference | {:.4} |",
        result.formant_stability_diff
    )?;
    writeln!(out)?;
    for note in undefined_notes(result) {
        writeln!(out, "> {note}")?;
        writeln!(out)?;
    }

    writeln!(out, "## Technical Analysis")?;
    writeln!(out)?;
    writeln!(out, "| Characteristic | Original | New |")?;
    writeln!(out, "|---|---|---|")?;
    writeln!(
        out,
        "| Duration | {:.2} s | {:.2} s |",
        result.original.duration, result.new.duration
    )?;
    writeln!(
        out,
        "| Average pitch | {:.2} Hz | {:.2} Hz |",
        result.original.pitch_mean, result.new.pitch_mean
    )?;
    writeln!(
        out,
        "| Phase coherence | {:.4} | {:.4} |",
        result.original.phase_coherence, result.new.phase_coherence
    )?;
    writeln!(
        out,
        "| Average spectral flatness | {:.4} | {:.4} |",
        result.original.mean_flatness(),
        result.new.mean_flatness()
    )?;
    writeln!(
        out,
        "| Formants (F1/F2/F3) | {} | {} |",
        format_formants(&result.original.formants),
        format_formants(&result.new.formants)
    )?;
    writeln!(out)?;
    if result.new.phase_coherence < result.original.phase_coherence {
        writeln!(
            out,
            "The new recording shows smaller frame-to-frame phase changes than the original, \
             which is consistent with an artificially stable phase track."
        )?;
    } else {
        writeln!(
            out,
            "The new recording does not show more stable phase behaviour than the original."
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Conclusion")?;
    writeln!(out)?;
    writeln!(out, "{}", conclusion(result))?;
    writeln!(out)?;

    writeln!(out, "## Recommendations")?;
    writeln!(out)?;
    writeln!(
        out,
        "- Compare additional takes from the same session to establish a natural baseline."
    )?;
    writeln!(
        out,
        "- Review sections with the largest pitch and phase deviations by ear."
    )?;
    writeln!(
        out,
        "- Treat these metrics as indicative; they do not certify the origin of a recording."
    )?;

    Ok(out)
}

fn executive_summary(result: &ComparisonResult) -> String {
    match result.mfcc_similarity {
        Similarity::Defined(value) if value >= 0.95 => format!(
            "The two recordings have closely matching timbre (MFCC similarity {value:.4}) and \
             differ in average pitch by {:.2} Hz.",
            result.pitch_difference
        ),
        Similarity::Defined(value) => format!(
            "The two recordings differ noticeably in timbre (MFCC similarity {value:.4}) and \
             in average pitch by {:.2} Hz.",
            result.pitch_difference
        ),
        Similarity::Undefined => format!(
            "Timbre similarity could not be computed because one recording produced an empty \
             cepstral profile; average pitch differs by {:.2} Hz.",
            result.pitch_difference
        ),
    }
}

fn undefined_notes(result: &ComparisonResult) -> Vec<&'static str> {
    let mut notes = Vec::new();
    if !result.mfcc_similarity.is_defined() {
        notes.push("MFCC similarity is undefined: a time-averaged MFCC vector was all zero.");
    }
    if !result.formant_similarity.is_defined() {
        notes.push(
            "Formant similarity is undefined: fewer than three resonance peaks were found \
             in every segment of at least one recording.",
        );
    }
    notes
}

fn conclusion(result: &ComparisonResult) -> String {
    let stabler_phase = result.new.phase_coherence < result.original.phase_coherence;
    let flatter = result.new.mean_flatness() < result.original.mean_flatness();
    match (stabler_phase, flatter) {
        (true, true) => "The new recording is more phase-stable and more tonal than the \
                         original. Both traits are associated with synthesized voices and \
                         warrant closer review."
            .to_string(),
        (true, false) | (false, true) => "The new recording shows one trait associated with \
                                          synthesized voices. The evidence is mixed."
            .to_string(),
        (false, false) => "The new recording shows none of the phase or flatness traits \
                           associated with synthesized voices."
            .to_string(),
    }
}

fn format_formants(formants: &[f64; 3]) -> String {
    if formants.iter().all(|f| *f == 0.0) {
        return "not detected".to_string();
    }
    format!(
        "{:.0} / {:.0} / {:.0} Hz",
        formants[0], formants[1], formants[2]
    )
}
