//! probekit command-line support: configuration and report rendering.
//!
//! The data model lives in `probekit-model` and tool invocation in
//! `probekit-ffprobe`; both are re-exported here.

pub mod config;
pub mod report;

pub use probekit_ffprobe as ffprobe;
pub use probekit_model as model;
