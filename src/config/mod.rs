use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};
use clap::ValueEnum;

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Metrics block followed by per-recording characteristics.
    Text,
    /// The full comparison record as JSON.
    Json,
    /// A markdown report from the built-in summarizer.
    Markdown,
}

/// Validated settings for one comparison run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub original: PathBuf,
    pub new: PathBuf,
    pub target_sample_rate: u32,
    pub format: OutputFormat,
    pub parallel: bool,
}

impl CompareConfig {
    pub fn new(original: PathBuf, new: PathBuf) -> Result<Self> {
        Ok(Self {
            original: resolve_input(&original)?,
            new: resolve_input(&new)?,
            target_sample_rate: DEFAULT_SAMPLE_RATE,
            format: OutputFormat::Text,
            parallel: false,
        })
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Result<Self> {
        ensure!(sample_rate > 0, "sample rate must be positive");
        self.target_sample_rate = sample_rate;
        Ok(self)
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// File name used to identify a recording in output.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn resolve_input(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("audio file not found: {:?}", path))?;
    if canonical.is_file() {
        Ok(canonical)
    } else {
        Err(anyhow!("audio path {:?} is not a file", canonical))
    }
}
