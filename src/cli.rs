use clap::{Parser, Subcommand, ValueEnum};
use clipboard::{ClipboardContext, ClipboardProvider};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spectral_mix::audio::{self, AnalysisCache, AnalysisConfig, AudioError, MixSelection};
use spectral_mix::config::{self, Config};

/// Spectral decomposition and sine remixing tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the strongest sine components of a WAV file
    Analyze(AnalyzeArgs),

    /// Rebuild audio from selected sine components of a WAV file
    Mix(MixArgs),

    /// Write a test tone to a WAV file
    Generate(GenerateArgs),
}

/// List the strongest sine components of a WAV file
#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: String,

    /// Number of components to extract (defaults to config.toml)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,

    /// Copy the equations to the clipboard instead of printing them
    #[arg(short, long)]
    copy: bool,
}

/// Rebuild audio from selected sine components of a WAV file
#[derive(Parser)]
struct MixArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: String,

    /// Component indices to mix, as listed by `analyze`
    #[arg(short, long, value_delimiter = ',', num_args = 1.., required = true)]
    select: Vec<usize>,

    /// Length of the mix in seconds (defaults to config.toml)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Number of components to extract (defaults to config.toml)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Output WAV path (defaults to <output_dir>/mix_<input>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ToneKind {
    /// Single sine with a smooth envelope
    Beep,
    /// C major triad
    Chord,
    /// Fundamental with six overtones
    Complex,
}

/// Write a test tone to a WAV file
#[derive(Parser)]
struct GenerateArgs {
    /// Kind of tone to generate
    #[arg(value_enum)]
    kind: ToneKind,

    /// Frequency of the beep or fundamental (Hz)
    #[arg(long, default_value_t = 440.0)]
    frequency: f64,

    /// Length of the tone in seconds
    #[arg(long, default_value_t = 0.5)]
    duration: f64,

    /// Sample rate of the output (Hz)
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Output WAV path (defaults to <output_dir>/<kind>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// Row of the JSON analysis output
#[derive(Serialize)]
struct ComponentReport {
    index: usize,
    frequency: f64,
    magnitude: f64,
    phase: f64,
    equation: String,
}

// JSON analysis output
#[derive(Serialize)]
struct AnalysisReport {
    sample_rate: u32,
    bin_resolution: f64,
    components: Vec<ComponentReport>,
}

fn read_input(path: &str, config: &Config) -> Result<Vec<u8>, AudioError> {
    let wav_path = Path::new(path);
    if !wav_path.exists() {
        return Err(AudioError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("WAV file not found: {}", path),
        )));
    }

    config.limits.check_file_size(wav_path.metadata()?.len())?;
    Ok(std::fs::read(wav_path)?)
}

fn analysis_config(top_k: Option<usize>, config: &Config) -> Result<AnalysisConfig, AudioError> {
    let top_k = top_k.unwrap_or(config.common.top_k);
    config.limits.check_top_k(top_k)?;
    Ok(AnalysisConfig { top_k })
}

fn default_output(config: &Config, file_name: String) -> Result<PathBuf, AudioError> {
    Ok(config::ensure_output_dir(config)?.join(file_name))
}

fn run_analyze_command(args: &AnalyzeArgs, config: &Config) -> Result<(), AudioError> {
    let bytes = read_input(&args.wav_file, config)?;
    let analysis_config = analysis_config(args.top_k, config)?;
    let cache = AnalysisCache::new();
    let result = cache.analyze(&bytes, &analysis_config)?;

    let output = if args.json {
        let report = AnalysisReport {
            sample_rate: result.sample_rate,
            bin_resolution: result.bin_resolution(),
            components: result
                .components
                .iter()
                .enumerate()
                .map(|(index, c)| ComponentReport {
                    index,
                    frequency: c.frequency,
                    magnitude: c.magnitude,
                    phase: c.phase,
                    equation: c.equation(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report).map_err(|e| AudioError::Processing(e.to_string()))?
    } else if args.copy {
        result
            .components
            .iter()
            .map(|c| c.equation())
            .collect::<Vec<String>>()
            .join("\n")
    } else {
        let mut table = format!(
            "{:>5} {:>12} {:>14} {:>8}  {}\n",
            "#", "freq (Hz)", "magnitude", "phase", "equation"
        );
        for (index, c) in result.components.iter().enumerate() {
            table.push_str(&format!(
                "{:>5} {:>12.2} {:>14.2} {:>8.3}  {}\n",
                index, c.frequency, c.magnitude, c.phase, c
            ));
        }
        table
    };

    if args.copy {
        // Copy to clipboard
        ClipboardContext::new()
            .map_err(|e| AudioError::Processing(e.to_string()))?
            .set_contents(output)
            .map_err(|e| AudioError::Processing(e.to_string()))?;
        println!("Successfully copied {} equations to clipboard!", result.len());
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }

    Ok(())
}

fn run_mix_command(args: &MixArgs, config: &Config) -> Result<(), AudioError> {
    let bytes = read_input(&args.wav_file, config)?;
    let analysis_config = analysis_config(args.top_k, config)?;
    let duration = args.duration.unwrap_or(config.common.mix_duration);
    config.limits.check_mix_duration(duration)?;

    let cache = AnalysisCache::new();
    cache.analyze(&bytes, &analysis_config)?;

    let selection: MixSelection = args.select.iter().copied().collect();
    let waveform = cache.synthesize(&selection, duration)?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let stem = Path::new(&args.wav_file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audio".to_string());
            default_output(config, format!("mix_{}.wav", stem))?
        }
    };

    audio::write_wav_file(&output, &waveform)?;
    tracing::info!(
        components = selection.len(),
        seconds = waveform.duration(),
        "Wrote {}",
        output.display()
    );
    println!("{}", output.display());

    Ok(())
}

fn run_generate_command(args: &GenerateArgs, config: &Config) -> Result<(), AudioError> {
    let (signal, name) = match args.kind {
        ToneKind::Beep => (
            audio::tones::beep(args.frequency, args.duration, args.sample_rate)?,
            "beep",
        ),
        ToneKind::Chord => (
            audio::tones::chord(&[261.63, 329.63, 392.00], args.duration, args.sample_rate)?,
            "chord",
        ),
        ToneKind::Complex => (
            audio::tones::harmonic_stack(args.frequency, 7, args.duration, args.sample_rate)?,
            "complex",
        ),
    };

    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(config, format!("{}.wav", name))?,
    };

    std::fs::write(&output, audio::encode_signal(&signal)?)?;
    println!("{}", output.display());

    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load_config()?;

    match &cli.command {
        Commands::Analyze(args) => run_analyze_command(args, &config)?,
        Commands::Mix(args) => run_mix_command(args, &config)?,
        Commands::Generate(args) => run_generate_command(args, &config)?,
    }

    Ok(())
}

fn main() {
    // Initialize tracing on stderr so stdout stays clean for output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spectral_mix=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(_) => {}
        Err(err) => {
            eprintln!("\nERROR: {}\n", err);
            match err.downcast_ref::<AudioError>() {
                Some(AudioError::Io(ref io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                    eprintln!("Please check that:");
                    eprintln!("1. The file path is correct");
                    eprintln!("2. The file exists");
                    eprintln!("3. You have permission to read the file");
                }
                Some(AudioError::IndexOutOfRange { len, .. }) => {
                    eprintln!("Run `analyze` to list the {} available components.", len);
                }
                Some(AudioError::Format(_)) => {
                    eprintln!("Only PCM WAV files are supported.");
                }
                _ => {}
            }
            process::exit(1);
        }
    }
}
