use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "lipsync",
    version,
    about = "Generate a lip-synced video from a voice recording and mouth sprites",
    after_help = "Background colors: white, black, red, green, blue, yellow, cyan, magenta, \
                  purple, orange, pink, brown, gold, silver, navy, teal, olive, maroon, \
                  gray/grey, lime, or hexadecimal (00FF00 / #00FF00)."
)]
struct Cli {
    /// Assets folder holding `mouth_images/`, `audio.wav` and optionally `transcript.txt`.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// JSON config file; replaces the assets-folder layout when given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Video format (mp4 for a colored background, mov for transparency).
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Background color for MP4 (e.g. 'green', '00FF00'). Ignored for MOV.
    #[arg(long)]
    background: Option<String>,

    /// Whisper model to use when no transcript is present.
    #[arg(long, value_enum)]
    model: Option<ModelChoice>,

    /// Force Whisper execution on CPU.
    #[arg(long)]
    cpu: bool,

    /// Keep the work directory (frames, sync table, concat script).
    #[arg(long)]
    keep_tmp: bool,

    /// Composite mouth sprites in parallel.
    #[arg(long)]
    parallel: bool,

    /// Rhubarb executable.
    #[arg(long)]
    rhubarb: Option<PathBuf>,

    /// Output video path. Defaults to `lipsync.<format>`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Mp4,
    Mov,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelChoice {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = build_config(&cli)?;

    let whisper = lipsync::WhisperCli {
        model: config.whisper_model,
        force_cpu: config.force_cpu,
        ..lipsync::WhisperCli::default()
    };
    let rhubarb = lipsync::Rhubarb::new(config.rhubarb.clone());
    let encoder = lipsync::FfmpegEncoder::default();
    let tools = lipsync::Collaborators {
        transcriber: &whisper,
        aligner: &rhubarb,
        probe: &lipsync::Ffprobe,
        encoder: &encoder,
    };

    let report = lipsync::run(&config, &tools)?;
    if let Some(dir) = &report.kept_work_dir {
        eprintln!("kept work directory {}", dir.display());
    }
    eprintln!(
        "wrote {} ({} segments, {}, {:.2}s)",
        report.output.display(),
        report.segments,
        report.canvas,
        report.audio_duration
    );
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<lipsync::LipsyncConfig> {
    let mut config = match &cli.config {
        Some(path) => lipsync::LipsyncConfig::from_path(path)?,
        None => lipsync::LipsyncConfig::from_assets_dir(&cli.assets),
    };

    if let Some(format) = cli.format {
        config.format = match format {
            FormatChoice::Mp4 => lipsync::OutputFormat::Mp4,
            FormatChoice::Mov => lipsync::OutputFormat::Mov,
        };
    }
    if let Some(background) = &cli.background {
        config.background = background.clone();
    }
    if let Some(model) = cli.model {
        config.whisper_model = match model {
            ModelChoice::Tiny => lipsync::WhisperModel::Tiny,
            ModelChoice::Base => lipsync::WhisperModel::Base,
            ModelChoice::Small => lipsync::WhisperModel::Small,
            ModelChoice::Medium => lipsync::WhisperModel::Medium,
            ModelChoice::Large => lipsync::WhisperModel::Large,
        };
    }
    if let Some(rhubarb) = &cli.rhubarb {
        config.rhubarb = rhubarb.clone();
    }
    config.force_cpu |= cli.cpu;
    config.keep_tmp |= cli.keep_tmp;
    config.parallel |= cli.parallel;

    if let Some(out) = &cli.out {
        config.output = Some(out.clone());
    }
    Ok(config)
}
