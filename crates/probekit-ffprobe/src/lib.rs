//! # probekit-ffprobe
//!
//! Runs `ffprobe` as a child process and parses its JSON report into a
//! [`probekit_model::ProbeData`].
//!
//! This crate provides:
//!
//! - **Probing** ([`Ffprobe`]) -- probe a path, a URL, or bytes streamed
//!   through stdin, with caller-supplied extra arguments.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; the child is killed when the timeout expires.
//! - **Tool discovery** ([`check_tool`], [`resolve_tool`]).

pub mod command;
mod error;
pub mod prober;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use prober::Ffprobe;
pub use tools::{check_tool, check_tool_with_arg, check_tools, resolve_tool, ToolInfo};
