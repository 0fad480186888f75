use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{CompareConfig, OutputFormat, DEFAULT_SAMPLE_RATE};

#[derive(Parser, Debug)]
#[command(
    name = "vocalcompare",
    version,
    about = "Compare two takes of a performance for signs of voice synthesis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare an original recording against a new take.
    Compare(CompareArgs),
    /// Print the acoustic characteristics of a single recording.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Sample rate both recordings are resampled to before analysis.
    #[arg(long = "sample-rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Path to the original recording.
    #[arg(value_name = "ORIGINAL")]
    pub original: PathBuf,
    /// Path to the new recording under review.
    #[arg(value_name = "NEW")]
    pub new: PathBuf,
    #[command(flatten)]
    pub decode: DecodeArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Analyse both recordings concurrently.
    #[arg(long)]
    pub parallel: bool,
}

impl CompareArgs {
    pub fn to_config(&self) -> Result<CompareConfig> {
        Ok(CompareConfig::new(self.original.clone(), self.new.clone())?
            .with_sample_rate(self.decode.sample_rate)?
            .with_format(self.format)
            .with_parallel(self.parallel))
    }
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the recording.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
    #[command(flatten)]
    pub decode: DecodeArgs,
    /// Output format (markdown is treated as text).
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::config::OutputFormat;
    use clap::Parser;

    #[test]
    fn compare_defaults() {
        let cli = Cli::try_parse_from(["vocalcompare", "compare", "a.wav", "b.wav"]).unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(args.original.to_str(), Some("a.wav"));
        assert_eq!(args.new.to_str(), Some("b.wav"));
        assert_eq!(args.decode.sample_rate, 16_000);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.parallel);
    }

    #[test]
    fn compare_accepts_format_and_rate() {
        let cli = Cli::try_parse_from([
            "vocalcompare",
            "compare",
            "a.wav",
            "b.wav",
            "--format",
            "json",
            "--sample-rate",
            "22050",
            "--parallel",
        ])
        .unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.decode.sample_rate, 22_050);
        assert!(args.parallel);
    }

    #[test]
    fn compare_requires_two_inputs() {
        assert!(Cli::try_parse_from(["vocalcompare", "compare", "a.wav"]).is_err());
    }

    #[test]
    fn inspect_parses_single_input() {
        let cli = Cli::try_parse_from(["vocalcompare", "inspect", "take.flac"]).unwrap();
        let Command::Inspect(args) = cli.command else {
            panic!("expected inspect command");
        };
        assert_eq!(args.input.to_str(), Some("take.flac"));
    }
}
