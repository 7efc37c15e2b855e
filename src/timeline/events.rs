use crate::foundation::core::MouthShape;
use crate::foundation::error::{LipsyncError, LipsyncResult};

/// One aligner row: `shape` is displayed until `timestamp` (seconds).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisemeEvent {
    pub timestamp: f64,
    pub shape: MouthShape,
}

impl VisemeEvent {
    pub fn new(timestamp: f64, shape: MouthShape) -> Self {
        Self { timestamp, shape }
    }
}

/// Parse the aligner's tab-separated `<timestamp>\t<code>` table.
///
/// Blank lines are skipped. Any other unusable row fails with its 1-based line number.
pub fn parse_aligner_tsv(text: &str) -> LipsyncResult<Vec<VisemeEvent>> {
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split('\t');
        let (Some(ts), Some(code)) = (fields.next(), fields.next()) else {
            return Err(LipsyncError::malformed_timeline(format!(
                "line {line_no}: expected '<timestamp>\\t<viseme>', got \"{line}\""
            )));
        };

        let timestamp = ts.trim().parse::<f64>().map_err(|_| {
            LipsyncError::malformed_timeline(format!(
                "line {line_no}: invalid timestamp \"{}\"",
                ts.trim()
            ))
        })?;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(LipsyncError::malformed_timeline(format!(
                "line {line_no}: timestamp must be finite and >= 0, got {timestamp}"
            )));
        }

        let shape = code.parse::<MouthShape>().map_err(|_| {
            LipsyncError::malformed_timeline(format!(
                "line {line_no}: unknown mouth shape code \"{}\"",
                code.trim()
            ))
        })?;
        events.push(VisemeEvent { timestamp, shape });
    }
    Ok(events)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/events.rs"]
mod tests;
