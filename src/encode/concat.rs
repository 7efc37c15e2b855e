use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::timeline::builder::ResolvedSchedule;

/// Writes a resolved schedule as an ffmpeg concat demuxer script.
///
/// ```text
/// file '/abs/frames/mouth_A.png'
/// duration 1.000000
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ScheduleSerializer {
    precision: usize,
}

impl Default for ScheduleSerializer {
    fn default() -> Self {
        Self { precision: 6 }
    }
}

impl ScheduleSerializer {
    /// Serializer writing durations with `precision` decimal places (at least 2).
    pub fn with_precision(precision: usize) -> LipsyncResult<Self> {
        if precision < 2 {
            return Err(LipsyncError::configuration(
                "schedule duration precision must be >= 2 decimal places",
            ));
        }
        Ok(Self { precision })
    }

    /// Render the script text. Fails on a frame path that is not valid UTF-8, since the
    /// script could not name it faithfully.
    pub fn render(&self, schedule: &ResolvedSchedule) -> LipsyncResult<String> {
        let mut out = String::new();
        for entry in schedule.entries() {
            // Durations are already filtered upstream; keep the format total anyway.
            if entry.duration() <= 0.0 {
                continue;
            }
            let _ = writeln!(out, "file {}", quote_path(&entry.frame)?);
            let _ = writeln!(out, "duration {:.*}", self.precision, entry.duration());
        }
        Ok(out)
    }

    pub fn write_to(&self, schedule: &ResolvedSchedule, path: &Path) -> LipsyncResult<()> {
        std::fs::write(path, self.render(schedule)?)
            .with_context(|| format!("write concat script '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), entries = schedule.len(), "concat script written");
        Ok(())
    }
}

/// Single-quote a path for the concat demuxer; an embedded `'` becomes `'\''`.
fn quote_path(path: &Path) -> LipsyncResult<String> {
    let raw = path.to_str().ok_or_else(|| {
        LipsyncError::configuration(format!(
            "frame path '{}' is not valid UTF-8 and cannot be written to a concat script",
            path.display()
        ))
    })?;
    Ok(format!("'{}'", raw.replace('\'', r"'\''")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/concat.rs"]
mod tests;
