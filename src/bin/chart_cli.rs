use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use rhythm_chart::chart::{generate_chart, GenerationReport, NoteChart};
use rhythm_chart::config::{AppConfig, Difficulty};
use rhythm_chart::engine::{replay, AutoPlayer};
use rhythm_chart::fixtures::{load_wav, write_wav, ClickTrack};
use rhythm_chart::judgement::SessionStats;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "chart_cli",
    about = "Generate rhythm-game charts from audio and replay them through the judgement engine"
)]
struct Cli {
    /// JSON configuration file (missing or invalid files fall back to defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a chart from a WAV file
    Generate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = Difficulty::Normal)]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Write the chart here; without it the chart is printed to stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a synthetic click track to a WAV file
    Synth {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 120.0)]
        bpm: f64,
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Play a chart with a scripted player and report the session stats
    Replay {
        #[arg(long)]
        chart: PathBuf,
        /// Timing offset applied to every input, in milliseconds
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_ms: f64,
        /// Skip every n-th note (0 plays all)
        #[arg(long, default_value_t = 0)]
        skip_every: usize,
        #[arg(long, default_value_t = 60)]
        tick_hz: u32,
        /// Exit with code 2 when accuracy falls below this ratio
        #[arg(long)]
        min_accuracy: Option<f64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            input,
            difficulty,
            seed,
            output,
        } => run_generate(&config, &input, difficulty, seed, output),
        Commands::Synth {
            output,
            bpm,
            seconds,
            seed,
        } => run_synth(&output, bpm, seconds, seed),
        Commands::Replay {
            chart,
            offset_ms,
            skip_every,
            tick_hz,
            min_accuracy,
        } => run_replay(
            &config,
            &chart,
            offset_ms,
            skip_every,
            tick_hz,
            min_accuracy,
        ),
    }
}

fn run_generate(
    config: &AppConfig,
    input: &Path,
    difficulty: Difficulty,
    seed: u64,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let audio = load_wav(input).with_context(|| format!("loading {}", input.display()))?;
    let generated = generate_chart(
        &audio,
        &difficulty.profile(),
        config,
        StdRng::seed_from_u64(seed),
    )
    .with_context(|| format!("generating chart for {}", input.display()))?;

    let chart_json = generated.chart.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(&path, chart_json).with_context(|| format!("writing {}", path.display()))?;
            let payload = GeneratePayload {
                input: input.display().to_string(),
                difficulty: difficulty.to_string(),
                seed,
                duration_seconds: audio.duration(),
                report: generated.report,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        None => println!("{chart_json}"),
    }

    Ok(ExitCode::from(0))
}

fn run_synth(output: &Path, bpm: f64, seconds: f64, seed: u64) -> Result<ExitCode> {
    let track = ClickTrack {
        bpm,
        duration_seconds: seconds,
        seed,
        ..ClickTrack::default()
    };
    let audio = track.render().context("rendering click track")?;
    write_wav(&audio, output).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&SynthPayload {
            output: output.display().to_string(),
            clicks: track.click_times().len(),
            sample_rate: audio.sample_rate(),
            duration_seconds: audio.duration(),
        })?
    );
    Ok(ExitCode::from(0))
}

fn run_replay(
    config: &AppConfig,
    chart_path: &Path,
    offset_ms: f64,
    skip_every: usize,
    tick_hz: u32,
    min_accuracy: Option<f64>,
) -> Result<ExitCode> {
    let json = fs::read_to_string(chart_path)
        .with_context(|| format!("reading {}", chart_path.display()))?;
    let chart = NoteChart::from_json(&json)
        .with_context(|| format!("parsing chart {}", chart_path.display()))?;

    let player = AutoPlayer {
        offset_seconds: offset_ms / 1000.0,
        skip_every,
    };
    let stats = replay(Arc::new(chart), config.judgement, &player, 48_000, tick_hz);
    let accuracy = stats.accuracy();

    println!(
        "{}",
        serde_json::to_string_pretty(&ReplayPayload {
            chart: chart_path.display().to_string(),
            accuracy,
            stats,
        })?
    );

    match min_accuracy {
        Some(min) if accuracy < min => {
            eprintln!("accuracy {accuracy:.3} below required {min:.3}");
            Ok(ExitCode::from(2))
        }
        _ => Ok(ExitCode::from(0)),
    }
}

#[derive(Serialize)]
struct GeneratePayload {
    input: String,
    difficulty: String,
    seed: u64,
    duration_seconds: f64,
    report: GenerationReport,
}

#[derive(Serialize)]
struct SynthPayload {
    output: String,
    clicks: usize,
    sample_rate: u32,
    duration_seconds: f64,
}

#[derive(Serialize)]
struct ReplayPayload {
    chart: String,
    accuracy: f64,
    stats: SessionStats,
}
