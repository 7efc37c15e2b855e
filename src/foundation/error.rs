pub type LipsyncResult<T> = Result<T, LipsyncError>;

#[derive(thiserror::Error, Debug)]
pub enum LipsyncError {
    /// Missing or inconsistent static inputs (sprite directory, sprite resolutions, audio file).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Empty or unusable viseme event data from the aligner.
    #[error("malformed timeline: {0}")]
    MalformedTimeline(String),

    /// A collaborator subprocess was not found or exited unsuccessfully.
    #[error("external tool '{tool}' failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LipsyncError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn malformed_timeline(msg: impl Into<String>) -> Self {
        Self::MalformedTimeline(msg.into())
    }

    pub fn external_tool(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
