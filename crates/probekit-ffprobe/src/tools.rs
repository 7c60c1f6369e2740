//! External tool detection.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::command::ToolCommand;
use crate::{Error, Result};

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the tool's version banner.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn unavailable(name: &str, path: Option<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            available: false,
            version: None,
            path,
        }
    }
}

/// Check whether `program` runs and report its version.
///
/// `program` may be a bare name (resolved on `PATH`) or a path.
pub async fn check_tool(program: &Path) -> ToolInfo {
    check_tool_with_arg(program, "-version").await
}

/// Like [`check_tool`], using a custom version argument.
pub async fn check_tool_with_arg(program: &Path, version_arg: &str) -> ToolInfo {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    let path = match resolve_tool(program) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(tool = %name, error = %e, "tool not available");
            return ToolInfo::unavailable(&name, None);
        }
    };

    match ToolCommand::new(path.clone())
        .arg(version_arg)
        .timeout(std::time::Duration::from_secs(10))
        .execute()
        .await
    {
        Ok(output) => ToolInfo {
            name,
            available: true,
            version: output.stdout.lines().next().map(|s| s.trim().to_string()),
            path: Some(path),
        },
        Err(e) => {
            tracing::debug!(tool = %name, error = %e, "version check failed");
            ToolInfo::unavailable(&name, Some(path))
        }
    }
}

/// Check the tools probekit can drive.
pub async fn check_tools(ffprobe: &Path) -> Vec<ToolInfo> {
    vec![check_tool(ffprobe).await]
}

/// Resolve a tool to an executable path.
///
/// Paths with more than one component must exist as given; bare names are
/// looked up on `PATH`.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the tool cannot be found.
pub fn resolve_tool(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        return if program.is_file() {
            Ok(program.to_path_buf())
        } else {
            Err(Error::tool_not_found(program.display().to_string()))
        };
    }
    which::which(program).map_err(|_| Error::tool_not_found(program.display().to_string()))
}
