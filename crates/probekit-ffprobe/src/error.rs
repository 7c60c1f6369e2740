//! Error types for probekit-ffprobe.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the probing tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tool binary could not be located.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The tool failed to spawn, exited unsuccessfully or timed out.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// The tool's output could not be turned into a report.
    #[error(transparent)]
    Model(#[from] probekit_model::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution error.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
