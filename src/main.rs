use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vocalcompare::analysis::comparison::ComparisonEngine;
use vocalcompare::analysis::features::FeatureExtractor;
use vocalcompare::analysis::Signal;
use vocalcompare::audio;
use vocalcompare::cli::{Cli, Command, CompareArgs, InspectArgs};
use vocalcompare::config::{display_name, CompareConfig, OutputFormat};
use vocalcompare::report::{metrics_block, MarkdownSummarizer, ReportInput, Summarizer};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Compare(args) => handle_compare(&args),
        Command::Inspect(args) => handle_inspect(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_compare(args: &CompareArgs) -> Result<()> {
    let config = args
        .to_config()
        .context("Failed to validate command-line arguments")?;
    run_compare(&config)
}

fn run_compare(config: &CompareConfig) -> Result<()> {
    info!(
        original = %config.original.display(),
        new = %config.new.display(),
        sample_rate = config.target_sample_rate,
        "loading recordings"
    );
    let original = load(&config.original, config.target_sample_rate, "original")?;
    let new = load(&config.new, config.target_sample_rate, "new")?;

    let engine = ComparisonEngine::new().with_parallel(config.parallel);
    let result = engine
        .compare(&original, &new)
        .context("Voice comparison failed")?;

    match config.format {
        OutputFormat::Text => print!("{}", metrics_block(&result)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&result).context("Failed to serialize results")?;
            println!("{json}");
        }
        OutputFormat::Markdown => {
            let input = ReportInput::new(
                display_name(&config.original),
                display_name(&config.new),
                result,
            );
            let report = MarkdownSummarizer::new()
                .summarize(&input)
                .context("Failed to generate report")?;
            print!("{report}");
        }
    }
    Ok(())
}

fn handle_inspect(args: &InspectArgs) -> Result<()> {
    let signal = load(&args.input, args.decode.sample_rate, "input")?;
    let features = FeatureExtractor::new()
        .extract(&signal)
        .with_context(|| format!("Feature extraction failed for {:?}", args.input))?;

    match args.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&features).context("Failed to serialize features")?;
            println!("{json}");
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            println!("Recording: {}", display_name(&args.input));
            println!("Duration: {:.2} seconds", features.duration);
            println!("Frames: {}", features.frame_count);
            println!("Average Pitch: {:.2} Hz", features.pitch_mean);
            println!("Phase Coherence: {:.4}", features.phase_coherence);
            println!("Average Spectral Flatness: {:.4}", features.mean_flatness());
            println!(
                "Formants: {:.0} / {:.0} / {:.0} Hz",
                features.formants[0], features.formants[1], features.formants[2]
            );
        }
    }
    Ok(())
}

fn load(path: &Path, sample_rate: u32, label: &str) -> Result<Signal> {
    audio::load_signal(path, sample_rate)
        .with_context(|| format!("Failed to load {label} recording {:?}", path))
}
