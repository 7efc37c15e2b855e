//! Lip-sync video assembly.
//!
//! The heart of the crate is the viseme timeline compiler:
//!
//! - Validate the mouth sprites ([`SpriteSet`]) and turn them into frames ([`Compositor`])
//! - Compile aligner events into a gapless [`FrameSchedule`] ([`TimelineBuilder`])
//! - Write the schedule as an ffmpeg concat script ([`ScheduleSerializer`])
//!
//! Transcription, alignment, probing and encoding are external tools behind small traits
//! ([`Transcriber`], [`AlignerRunner`], [`DurationProbe`], [`Encoder`]); [`run`] wires them up.
#![forbid(unsafe_code)]

mod assets;
mod compose;
mod encode;
mod foundation;
mod pipeline;
mod timeline;

pub use crate::foundation::core::{MouthShape, Resolution, Rgb8};
pub use crate::foundation::error::{LipsyncError, LipsyncResult};

pub use crate::assets::color::{ColorResolution, color_names, parse_color, resolve_background};
pub use crate::assets::sprites::SpriteSet;
pub use crate::assets::store::{
    DirFrameStore, DirSpriteSource, FrameStore, InMemoryFrameStore, InMemorySpriteSource,
    SpriteSource,
};
pub use crate::compose::compositor::{
    CompositeThreading, Compositor, FrameSet, OutputMode, composite_centered,
};
pub use crate::encode::concat::ScheduleSerializer;
pub use crate::encode::ffmpeg::{
    DurationProbe, EncodeJob, Encoder, FfmpegEncoder, Ffprobe, HwAccel, OutputFormat,
    encode_args, is_tool_on_path,
};
pub use crate::encode::tools::{
    AlignerRunner, Rhubarb, Transcriber, TranscriptFile, WhisperCli, WhisperModel,
};
pub use crate::pipeline::{Collaborators, LipsyncConfig, RunReport, WorkDir, run};
pub use crate::timeline::builder::{
    FrameSchedule, ResolvedSchedule, ScheduleEntry, Segment, Substitution, TimelineBuilder,
};
pub use crate::timeline::events::{VisemeEvent, parse_aligner_tsv};
