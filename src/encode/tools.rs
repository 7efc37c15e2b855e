use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;

use crate::encode::ffmpeg::run_tool;
use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Produces a plain-text transcript of the audio for the aligner.
pub trait Transcriber {
    /// Write a transcript of `audio` somewhere under `work_dir` and return its path.
    fn transcribe(&self, audio: &Path, work_dir: &Path) -> LipsyncResult<PathBuf>;
}

/// Runs the phoneme/viseme aligner and returns its tab-separated output.
pub trait AlignerRunner {
    fn align(&self, audio: &Path, transcript: &Path, out_tsv: &Path) -> LipsyncResult<String>;
}

/// Whisper model sizes accepted by the `whisper` CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    #[default]
    Large,
}

impl WhisperModel {
    pub fn as_str(self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
        }
    }
}

/// Speech-to-text through the `whisper` command-line tool.
#[derive(Clone, Debug)]
pub struct WhisperCli {
    pub executable: PathBuf,
    pub model: WhisperModel,
    /// Force CPU inference instead of letting whisper pick CUDA when available.
    pub force_cpu: bool,
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("whisper"),
            model: WhisperModel::default(),
            force_cpu: false,
        }
    }
}

impl WhisperCli {
    pub fn args(&self, audio: &Path, out_dir: &Path) -> Vec<std::ffi::OsString> {
        let mut args = vec![
            audio.as_os_str().to_owned(),
            "--model".into(),
            self.model.as_str().into(),
            "--output_format".into(),
            "txt".into(),
            "--output_dir".into(),
            out_dir.as_os_str().to_owned(),
        ];
        if self.force_cpu {
            args.extend(["--device", "cpu", "--fp16", "False"].map(std::ffi::OsString::from));
        }
        args
    }
}

impl Transcriber for WhisperCli {
    #[tracing::instrument(skip(self), fields(model = self.model.as_str()))]
    fn transcribe(&self, audio: &Path, work_dir: &Path) -> LipsyncResult<PathBuf> {
        let out_dir = work_dir.join("transcript");
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("create transcript directory '{}'", out_dir.display()))?;

        let device = if self.force_cpu { "cpu" } else { "auto" };
        tracing::info!(device, "transcribing with whisper");
        run_tool(
            "whisper",
            Command::new(&self.executable).args(self.args(audio, &out_dir)),
        )?;

        let stem = audio.file_stem().ok_or_else(|| {
            LipsyncError::configuration(format!(
                "audio path '{}' has no file name",
                audio.display()
            ))
        })?;
        let transcript = out_dir.join(format!("{}.txt", stem.to_string_lossy()));
        if !transcript.is_file() {
            return Err(LipsyncError::external_tool(
                "whisper",
                format!(
                    "expected transcript '{}' was not written",
                    transcript.display()
                ),
            ));
        }
        Ok(transcript)
    }
}

/// A transcript that already exists on disk.
#[derive(Clone, Debug)]
pub struct TranscriptFile(pub PathBuf);

impl Transcriber for TranscriptFile {
    fn transcribe(&self, _audio: &Path, _work_dir: &Path) -> LipsyncResult<PathBuf> {
        if !self.0.is_file() {
            return Err(LipsyncError::configuration(format!(
                "transcript '{}' does not exist",
                self.0.display()
            )));
        }
        Ok(self.0.clone())
    }
}

/// The Rhubarb Lip Sync aligner.
#[derive(Clone, Debug)]
pub struct Rhubarb {
    pub executable: PathBuf,
}

impl Rhubarb {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl AlignerRunner for Rhubarb {
    #[tracing::instrument(skip(self))]
    fn align(&self, audio: &Path, transcript: &Path, out_tsv: &Path) -> LipsyncResult<String> {
        // Bare names are looked up on PATH by the OS.
        if self.executable.components().count() > 1 && !self.executable.is_file() {
            return Err(LipsyncError::configuration(format!(
                "rhubarb executable '{}' not found",
                self.executable.display()
            )));
        }

        run_tool(
            "rhubarb",
            Command::new(&self.executable)
                .args(["-f", "tsv", "-o"])
                .arg(out_tsv)
                .arg("-d")
                .arg(transcript)
                .arg(audio),
        )?;
        let tsv = std::fs::read_to_string(out_tsv)
            .with_context(|| format!("read aligner output '{}'", out_tsv.display()))?;
        tracing::info!(rows = tsv.lines().count(), "synchronization table generated");
        Ok(tsv)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/tools.rs"]
mod tests;
