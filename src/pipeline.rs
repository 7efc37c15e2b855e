use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::color::resolve_background;
use crate::assets::sprites::SpriteSet;
use crate::assets::store::{DirFrameStore, DirSpriteSource};
use crate::compose::compositor::{CompositeThreading, Compositor, OutputMode};
use crate::encode::concat::ScheduleSerializer;
use crate::encode::ffmpeg::{DurationProbe, EncodeJob, Encoder, OutputFormat};
use crate::encode::tools::{AlignerRunner, Transcriber, TranscriptFile, WhisperModel};
use crate::foundation::core::Resolution;
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::timeline::builder::{Substitution, TimelineBuilder};
use crate::timeline::events::parse_aligner_tsv;

/// Everything one run needs, passed explicitly instead of read from fixed locations.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LipsyncConfig {
    /// Directory holding `mouth_<CODE>.png` sprites.
    pub sprite_dir: PathBuf,
    /// Voice recording.
    pub audio: PathBuf,
    /// Existing transcript; when absent the transcriber collaborator produces one.
    pub transcript: Option<PathBuf>,
    /// Final video path. `None` writes `lipsync.<ext>` for the configured format.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Background color name or hex, used for [`OutputFormat::Mp4`] only.
    pub background: String,
    pub whisper_model: WhisperModel,
    pub force_cpu: bool,
    /// Keep the work directory (frames, aligner table, concat script) after the run.
    pub keep_tmp: bool,
    /// Composite sprites in parallel.
    pub parallel: bool,
    /// Parent directory for the per-run work directory. `None` uses the system temp dir.
    pub work_root: Option<PathBuf>,
    /// Rhubarb executable.
    pub rhubarb: PathBuf,
}

impl Default for LipsyncConfig {
    fn default() -> Self {
        Self {
            sprite_dir: PathBuf::from("assets/mouth_images"),
            audio: PathBuf::from("assets/audio.wav"),
            transcript: None,
            output: None,
            format: OutputFormat::Mp4,
            background: "white".to_owned(),
            whisper_model: WhisperModel::default(),
            force_cpu: false,
            keep_tmp: false,
            parallel: false,
            work_root: None,
            rhubarb: PathBuf::from("rhubarb"),
        }
    }
}

impl LipsyncConfig {
    /// Conventional layout: `<assets>/mouth_images`, `<assets>/audio.wav` and, when present,
    /// `<assets>/transcript.txt`.
    pub fn from_assets_dir(assets: impl AsRef<Path>) -> Self {
        let assets = assets.as_ref();
        let transcript = assets.join("transcript.txt");
        Self {
            sprite_dir: assets.join("mouth_images"),
            audio: assets.join("audio.wav"),
            transcript: transcript.is_file().then_some(transcript),
            ..Self::default()
        }
    }

    /// Load a JSON config. Relative paths are kept as written.
    pub fn from_path(path: &Path) -> LipsyncResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            LipsyncError::configuration(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Check that the static inputs exist before any work starts.
    pub fn validate(&self) -> LipsyncResult<()> {
        if !self.sprite_dir.is_dir() {
            return Err(LipsyncError::configuration(format!(
                "sprite directory '{}' does not exist",
                self.sprite_dir.display()
            )));
        }
        if !self.audio.is_file() {
            return Err(LipsyncError::configuration(format!(
                "audio file '{}' does not exist",
                self.audio.display()
            )));
        }
        if let Some(transcript) = &self.transcript
            && !transcript.is_file()
        {
            return Err(LipsyncError::configuration(format!(
                "transcript '{}' does not exist",
                transcript.display()
            )));
        }
        Ok(())
    }

    /// Where the video is written: the explicit `output`, else `lipsync.<ext>` matching
    /// `format`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("lipsync.{}", self.format.extension())))
    }

    /// How sprites are turned into frames for the configured format.
    pub fn output_mode(&self) -> OutputMode {
        match self.format {
            OutputFormat::Mov => OutputMode::Transparent,
            OutputFormat::Mp4 => OutputMode::Opaque {
                background: resolve_background(&self.background).rgb,
            },
        }
    }
}

/// External collaborators used by [`run`].
pub struct Collaborators<'a> {
    pub transcriber: &'a dyn Transcriber,
    pub aligner: &'a dyn AlignerRunner,
    pub probe: &'a dyn DurationProbe,
    pub encoder: &'a dyn Encoder,
}

/// Summary of a finished run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub canvas: Resolution,
    pub audio_duration: f64,
    pub segments: usize,
    pub substitutions: Vec<Substitution>,
    /// Work directory, when it was retained.
    pub kept_work_dir: Option<PathBuf>,
}

/// Private per-run directory, removed on drop unless retained.
#[derive(Debug)]
pub struct WorkDir {
    dir: tempfile::TempDir,
    keep: bool,
}

impl WorkDir {
    pub fn create(root: Option<&Path>, keep: bool) -> LipsyncResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("lipsync_");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)
                    .with_context(|| format!("create work root '{}'", root.display()))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .context("create work directory")?;
        Ok(Self { dir, keep })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Finish the run: delete the directory, or hand back its path when retained.
    pub fn finish(self) -> LipsyncResult<Option<PathBuf>> {
        if self.keep {
            let path = self.dir.keep();
            tracing::info!(path = %path.display(), "keeping work directory");
            Ok(Some(path))
        } else {
            let path = self.dir.path().to_path_buf();
            self.dir
                .close()
                .with_context(|| format!("remove work directory '{}'", path.display()))?;
            Ok(None)
        }
    }
}

/// Run the whole pipeline.
#[tracing::instrument(skip_all, fields(format = ?config.format))]
pub fn run(config: &LipsyncConfig, tools: &Collaborators<'_>) -> LipsyncResult<RunReport> {
    config.validate()?;

    let sources = DirSpriteSource::new(&config.sprite_dir)?;
    let sprites = SpriteSet::load(&sources)?;

    let work = WorkDir::create(config.work_root.as_deref(), config.keep_tmp)?;
    let report = run_in(config, tools, &sources, &sprites, work.path());
    let kept = work.finish();

    let mut report = report?;
    report.kept_work_dir = kept?;
    Ok(report)
}

fn run_in(
    config: &LipsyncConfig,
    tools: &Collaborators<'_>,
    sources: &DirSpriteSource,
    sprites: &SpriteSet,
    work: &Path,
) -> LipsyncResult<RunReport> {
    let mode = config.output_mode();
    if let OutputMode::Opaque { background } = mode {
        tracing::info!(
            background = %background.to_hex(),
            "composing mouths on colored background"
        );
    } else {
        tracing::info!("transparent output, keeping sprite alpha");
    }
    let store = DirFrameStore::create(work.join("frames"))?;
    let frames = Compositor::new(mode)
        .with_threading(CompositeThreading {
            parallel: config.parallel,
            threads: None,
        })
        .materialize(sprites, sources, &store)?;

    let transcript = match &config.transcript {
        Some(path) => TranscriptFile(path.clone()).transcribe(&config.audio, work)?,
        None => tools.transcriber.transcribe(&config.audio, work)?,
    };

    let tsv = tools
        .aligner
        .align(&config.audio, &transcript, &work.join("sync.tsv"))?;
    let events = parse_aligner_tsv(&tsv)?;
    let audio_duration = tools.probe.duration_secs(&config.audio)?;

    let schedule = TimelineBuilder::new(audio_duration).build(&events)?;
    let resolved = schedule.resolve(&frames)?;

    let concat_script = work.join("concat.txt");
    ScheduleSerializer::default().write_to(&resolved, &concat_script)?;
    tracing::info!(
        segments = resolved.len(),
        substitutions = resolved.substitutions().len(),
        "concatenation file prepared"
    );

    let output = config.output_path();
    tools.encoder.encode(&EncodeJob {
        concat_script,
        audio: config.audio.clone(),
        output: output.clone(),
        format: config.format,
    })?;

    Ok(RunReport {
        output,
        canvas: sprites.canvas(),
        audio_duration,
        segments: resolved.len(),
        substitutions: resolved.substitutions().to_vec(),
        kept_work_dir: None,
    })
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
