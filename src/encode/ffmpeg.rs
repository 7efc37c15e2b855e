use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Container/codec family of the final video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 in MP4, opaque frames composited over the background.
    #[default]
    Mp4,
    /// ProRes 4444 in MOV, frames keep their alpha channel.
    Mov,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mov => "mov",
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, OutputFormat::Mov)
    }
}

/// Everything the encoder needs for one run.
#[derive(Clone, Debug)]
pub struct EncodeJob {
    pub concat_script: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
}

/// Turns a concat script plus audio into the final video.
pub trait Encoder {
    fn encode(&self, job: &EncodeJob) -> LipsyncResult<()>;
}

/// Reports the authoritative audio duration in seconds.
pub trait DurationProbe {
    fn duration_secs(&self, audio: &Path) -> LipsyncResult<f64>;
}

/// Hardware decode acceleration policy for ffmpeg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HwAccel {
    /// Use CUDA when `ffmpeg -hwaccels` lists it.
    #[default]
    Auto,
    Cuda,
    None,
}

/// System `ffmpeg` driven through the concat demuxer.
#[derive(Clone, Debug, Default)]
pub struct FfmpegEncoder {
    pub hwaccel: HwAccel,
}

impl FfmpegEncoder {
    pub fn new(hwaccel: HwAccel) -> Self {
        Self { hwaccel }
    }

    fn use_cuda(&self) -> LipsyncResult<bool> {
        match self.hwaccel {
            HwAccel::Cuda => Ok(true),
            HwAccel::None => Ok(false),
            HwAccel::Auto => {
                let out = run_tool(
                    "ffmpeg",
                    Command::new("ffmpeg").args(["-hide_banner", "-hwaccels"]),
                )?;
                let cuda = String::from_utf8_lossy(&out.stdout)
                    .to_ascii_lowercase()
                    .contains("cuda");
                if cuda {
                    tracing::info!("ffmpeg supports CUDA, enabling hardware acceleration");
                } else {
                    tracing::info!("ffmpeg does not support CUDA, encoding without acceleration");
                }
                Ok(cuda)
            }
        }
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(skip(self), fields(format = ?job.format))]
    fn encode(&self, job: &EncodeJob) -> LipsyncResult<()> {
        if let Some(parent) = job.output.parent()
            && !parent.as_os_str().is_empty()
        {
            use anyhow::Context as _;
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }

        let args = encode_args(job, self.use_cuda()?);
        run_tool("ffmpeg", Command::new("ffmpeg").args(&args))?;
        tracing::info!(output = %job.output.display(), "video encoded");
        Ok(())
    }
}

/// ffmpeg arguments for `job`: concat demuxer input, audio, then a per-format codec setup.
pub fn encode_args(job: &EncodeJob, cuda: bool) -> Vec<OsString> {
    let mut args = Vec::<OsString>::new();
    if cuda {
        args.extend(["-hwaccel", "cuda"].map(OsString::from));
    }
    args.extend(
        ["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"].map(OsString::from),
    );
    args.push(job.concat_script.clone().into_os_string());
    args.push("-i".into());
    args.push(job.audio.clone().into_os_string());
    args.extend(["-vsync", "vfr"].map(OsString::from));

    let video: [&str; 6] = match job.format {
        OutputFormat::Mov => [
            "-pix_fmt",
            "yuva444p10le",
            "-c:v",
            "prores_ks",
            "-profile:v",
            "4444",
        ],
        OutputFormat::Mp4 => [
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
            "-profile:v",
            "high",
        ],
    };
    args.extend(video.map(OsString::from));
    args.extend(["-c:a", "aac", "-shortest"].map(OsString::from));
    args.push(job.output.clone().into_os_string());
    args
}

/// Audio duration via `ffprobe -show_entries format=duration`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ffprobe;

impl DurationProbe for Ffprobe {
    fn duration_secs(&self, audio: &Path) -> LipsyncResult<f64> {
        let out = run_tool(
            "ffprobe",
            Command::new("ffprobe")
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ])
                .arg(audio),
        )?;
        parse_probe_duration(&String::from_utf8_lossy(&out.stdout))
    }
}

pub(crate) fn parse_probe_duration(stdout: &str) -> LipsyncResult<f64> {
    let raw = stdout.trim();
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(LipsyncError::external_tool(
            "ffprobe",
            format!("unparseable audio duration \"{raw}\""),
        )),
    }
}

/// Run `cmd` to completion, capturing output.
///
/// A missing binary or a non-zero exit becomes [`LipsyncError::ExternalTool`] carrying the exit
/// status and trimmed stderr.
pub(crate) fn run_tool(tool: &str, cmd: &mut Command) -> LipsyncResult<Output> {
    tracing::debug!(tool, command = ?cmd, "running external tool");
    let out = cmd.stdin(Stdio::null()).output().map_err(|e| {
        LipsyncError::external_tool(
            tool,
            format!("failed to run (is it installed and on PATH?): {e}"),
        )
    })?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(LipsyncError::external_tool(
            tool,
            format!("exited with {}: {}", out.status, stderr.trim()),
        ));
    }
    Ok(out)
}

/// Return `true` when `tool -version` can be invoked from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
