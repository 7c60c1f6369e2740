//! Run ffprobe and parse its JSON report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use probekit_model::ProbeData;
use serde_json::Value;
use tokio::io::AsyncRead;

use crate::command::{ToolCommand, ToolOutput, DEFAULT_TIMEOUT};
use crate::tools::resolve_tool;
use crate::{Error, Result};

/// Arguments placed before any caller-supplied ones.
const BASE_ARGS: [&str; 7] = [
    "-loglevel",
    "fatal",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
    "-show_chapters",
];

/// Input argument that makes ffprobe read from stdin.
const STDIN_INPUT: &str = "-";

/// An ffprobe invocation template.
///
/// # Example
///
/// ```no_run
/// use probekit_ffprobe::Ffprobe;
/// use std::time::Duration;
///
/// # async fn example() -> probekit_ffprobe::Result<()> {
/// let ffprobe = Ffprobe::from_path()?.with_timeout(Duration::from_secs(3));
/// let data = ffprobe.probe_path("/path/to/video.mp4").await?;
/// println!("{} streams", data.streams.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ffprobe {
    path: PathBuf,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl Ffprobe {
    /// Use the ffprobe binary at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
            extra_args: Vec::new(),
        }
    }

    /// Find ffprobe on `PATH`.
    pub fn from_path() -> Result<Self> {
        Ok(Self::new(resolve_tool(Path::new("ffprobe"))?))
    }

    /// Bound each run; the process is killed when this expires.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments passed on every run, after the defaults and before the input.
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a local file.
    pub async fn probe_path(&self, input: impl AsRef<Path>) -> Result<ProbeData> {
        let input = input.as_ref().to_string_lossy();
        self.probe_url(&input).await
    }

    /// Probe anything ffprobe accepts as an input: a path, an `http://` URL
    /// or another protocol URL.
    pub async fn probe_url(&self, url: &str) -> Result<ProbeData> {
        self.probe_url_with_args(url, &[]).await
    }

    /// Like [`Ffprobe::probe_url`], with arguments for this run only.
    pub async fn probe_url_with_args(&self, url: &str, args: &[String]) -> Result<ProbeData> {
        tracing::info!(input = %url, "probing");
        let output = self.command(url, args).execute().await?;
        self.parse_output(&output)
    }

    /// Probe media read from `reader`, piped to ffprobe's stdin.
    ///
    /// Containers that keep their index at the end of the file (`moov` atom
    /// after `mdat`) may not probe fully from a pipe.
    pub async fn probe_reader<R>(&self, reader: R) -> Result<ProbeData>
    where
        R: AsyncRead + Unpin,
    {
        self.probe_reader_with_args(reader, &[]).await
    }

    /// Like [`Ffprobe::probe_reader`], with arguments for this run only.
    pub async fn probe_reader_with_args<R>(&self, reader: R, args: &[String]) -> Result<ProbeData>
    where
        R: AsyncRead + Unpin,
    {
        tracing::info!("probing from stdin");
        let output = self
            .command(STDIN_INPUT, args)
            .execute_with_input(reader)
            .await?;
        self.parse_output(&output)
    }

    fn command(&self, input: &str, args: &[String]) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.path.clone());
        cmd.args(BASE_ARGS)
            .args(self.extra_args.iter().cloned())
            .args(args.iter().cloned())
            .arg(input)
            .timeout(self.timeout);
        cmd
    }

    fn parse_output(&self, output: &ToolOutput) -> Result<ProbeData> {
        let value: Value = serde_json::from_str(&output.stdout)
            .map_err(|e| Error::Model(probekit_model::Error::Json(e)))?;

        // A run that found nothing still exits 0 on some inputs.
        if !value.get("format").is_some_and(Value::is_object) {
            let stderr = output.stderr.trim();
            return Err(Error::tool(
                "ffprobe",
                if stderr.is_empty() {
                    "no format data in output, check the input".to_string()
                } else {
                    format!("no format data in output: {stderr}")
                },
            ));
        }

        let data = ProbeData::from_value(value)?;
        tracing::debug!(
            streams = data.streams.len(),
            chapters = data.chapters.len(),
            "probe complete"
        );
        Ok(data)
    }
}
