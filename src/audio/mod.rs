pub mod decoder;
pub mod resample;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::analysis::Signal;

/// Decode `path` and bring it to `target_rate`, ready for analysis.
pub fn load_signal<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<Signal> {
    let path = path.as_ref();
    let audio = decoder::decode_audio(path)?;
    debug!(
        path = %path.display(),
        samples = audio.samples.len(),
        sample_rate = audio.sample_rate,
        "decoded recording"
    );
    let samples = resample::linear_resample(&audio.samples, audio.sample_rate, target_rate)
        .with_context(|| {
            format!(
                "failed to resample {} from {} Hz to {} Hz",
                path.display(),
                audio.sample_rate,
                target_rate
            )
        })?;
    Ok(Signal::from_samples(samples, target_rate))
}
