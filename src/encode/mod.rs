//! Boundary with the outside world: the concat script and the external tools around it.

/// ffmpeg concat demuxer script writer.
pub mod concat;
/// `ffmpeg` / `ffprobe` collaborators.
pub mod ffmpeg;
/// Transcription and alignment collaborators.
pub mod tools;
