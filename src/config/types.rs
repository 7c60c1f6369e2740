use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ffprobe: FfprobeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FfprobeConfig {
    /// Explicit ffprobe binary; looked up on PATH when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Seconds before a probe run is killed (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Arguments added to every run, before the input
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for FfprobeConfig {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: default_timeout_secs(),
            extra_args: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl FfprobeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a prober from this section.
    pub fn prober(&self) -> probekit_ffprobe::Result<probekit_ffprobe::Ffprobe> {
        let ffprobe = match &self.path {
            Some(path) => probekit_ffprobe::Ffprobe::new(path),
            None => probekit_ffprobe::Ffprobe::from_path()?,
        };
        Ok(ffprobe
            .with_timeout(self.timeout())
            .with_extra_args(self.extra_args.iter().cloned()))
    }
}
