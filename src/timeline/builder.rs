use std::path::PathBuf;

use crate::compose::compositor::FrameSet;
use crate::foundation::core::MouthShape;
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::timeline::events::VisemeEvent;

/// Half-open display interval `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub shape: MouthShape,
}

impl Segment {
    pub fn new(start: f64, end: f64, shape: MouthShape) -> Self {
        Self { start, end, shape }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, gapless segments covering `[0, audio_duration)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSchedule {
    segments: Vec<Segment>,
    audio_duration: f64,
}

/// Builds a [`FrameSchedule`] from end-timestamped viseme events.
#[derive(Clone, Copy, Debug)]
pub struct TimelineBuilder {
    audio_duration: f64,
}

impl TimelineBuilder {
    pub fn new(audio_duration: f64) -> Self {
        Self { audio_duration }
    }

    /// Convert events into a schedule.
    ///
    /// Each event's timestamp ends its interval; the largest earlier timestamp (or 0) starts it.
    /// A trailing segment holding the last shape is appended when the events stop short of the
    /// audio, ends are clamped to the audio duration, and intervals of zero or negative length
    /// are dropped. A schedule left with no segments is malformed.
    #[tracing::instrument(skip(events), fields(event_count = events.len()))]
    pub fn build(&self, events: &[VisemeEvent]) -> LipsyncResult<FrameSchedule> {
        let duration = self.audio_duration;
        if !duration.is_finite() || duration < 0.0 {
            return Err(LipsyncError::malformed_timeline(format!(
                "audio duration must be finite and >= 0, got {duration}"
            )));
        }
        let Some(last) = events.last() else {
            return Err(LipsyncError::malformed_timeline(
                "aligner produced no viseme events",
            ));
        };

        // Starts follow the running maximum so a timestamp that steps backwards cannot
        // reopen time already covered.
        let mut raw = Vec::with_capacity(events.len() + 1);
        let mut start = 0.0_f64;
        for event in events {
            raw.push(Segment::new(start, event.timestamp, event.shape));
            start = start.max(event.timestamp);
        }
        if start < duration {
            tracing::debug!(
                from = start,
                to = duration,
                shape = %last.shape,
                "holding last shape through unaligned tail"
            );
            raw.push(Segment::new(start, duration, last.shape));
        }

        let mut segments = Vec::with_capacity(raw.len());
        for seg in raw {
            let seg = Segment {
                end: seg.end.min(duration),
                ..seg
            };
            if seg.duration() <= 0.0 {
                tracing::debug!(
                    start = seg.start,
                    end = seg.end,
                    shape = %seg.shape,
                    "dropping degenerate segment"
                );
                continue;
            }
            segments.push(seg);
        }
        if segments.is_empty() {
            return Err(LipsyncError::malformed_timeline(format!(
                "no displayable segments for {} events over {duration}s of audio",
                events.len()
            )));
        }

        Ok(FrameSchedule {
            segments,
            audio_duration: duration,
        })
    }
}

impl FrameSchedule {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn audio_duration(&self) -> f64 {
        self.audio_duration
    }

    /// Sum of segment durations.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Attach a frame path to every segment.
    ///
    /// Shapes without a frame are replaced by the rest shape; each replacement is logged and
    /// recorded. Fails if a replacement is needed and the rest shape has no frame either.
    pub fn resolve(&self, frames: &FrameSet) -> LipsyncResult<ResolvedSchedule> {
        let mut entries = Vec::with_capacity(self.segments.len());
        let mut substitutions = Vec::new();
        for (index, seg) in self.segments.iter().enumerate() {
            let (shape, path) = match frames.get(seg.shape) {
                Some(path) => (seg.shape, path),
                None => {
                    let fallback = frames.get(MouthShape::REST).ok_or_else(|| {
                        LipsyncError::configuration(format!(
                            "no frame for shape {} and no rest frame ({}) to fall back to",
                            seg.shape,
                            MouthShape::REST.file_name()
                        ))
                    })?;
                    tracing::warn!(
                        index,
                        requested = %seg.shape,
                        start = seg.start,
                        end = seg.end,
                        "no frame for shape, substituting rest shape"
                    );
                    substitutions.push(Substitution {
                        index,
                        requested: seg.shape,
                        used: MouthShape::REST,
                    });
                    (MouthShape::REST, fallback)
                }
            };
            entries.push(ScheduleEntry {
                frame: path.to_path_buf(),
                shape,
                start: seg.start,
                end: seg.end,
            });
        }
        Ok(ResolvedSchedule {
            entries,
            substitutions,
        })
    }
}

/// A segment that had to be displayed with a different shape's frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Substitution {
    /// Position of the segment in the schedule.
    pub index: usize,
    pub requested: MouthShape,
    pub used: MouthShape,
}

/// One displayable schedule entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub frame: PathBuf,
    pub shape: MouthShape,
    pub start: f64,
    pub end: f64,
}

impl ScheduleEntry {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Schedule whose entries all point at existing frames.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ResolvedSchedule {
    entries: Vec<ScheduleEntry>,
    substitutions: Vec<Substitution>,
}

impl ResolvedSchedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
