//! Builder for running external tools with a timeout.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::process::Command;

use crate::{Error, Result};

/// Default command timeout: 5 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use probekit_ffprobe::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> probekit_ffprobe::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-version")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    stdin_data: Option<Vec<u8>>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            stdin_data: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Provide data to be written to the process's stdin.
    pub fn stdin(&mut self, data: Vec<u8>) -> &mut Self {
        self.stdin_data = Some(data);
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if spawning fails, if the process exits with a
    /// non-zero status (message includes stderr) or if the timeout expires.
    pub async fn execute(&self) -> Result<ToolOutput> {
        self.run(self.stdin_data.as_deref()).await
    }

    /// Execute the command, streaming `input` into the process's stdin.
    pub async fn execute_with_input<R>(&self, input: R) -> Result<ToolOutput>
    where
        R: AsyncRead + Unpin,
    {
        self.run(Some(input)).await
    }

    async fn run<R>(&self, input: Option<R>) -> Result<ToolOutput>
    where
        R: AsyncRead + Unpin,
    {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(tool = %program_name, args = ?self.args, "spawning tool");

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::tool_not_found(program_name.clone())
            } else {
                Error::tool(&program_name, format!("failed to spawn: {e}"))
            }
        })?;

        let stdin = child.stdin.take();
        let feed = async move {
            let (Some(mut reader), Some(mut stdin)) = (input, stdin) else {
                return Ok(0);
            };
            // Dropping stdin closes the pipe so the child sees EOF.
            tokio::io::copy(&mut reader, &mut stdin).await
        };

        let run = async { tokio::join!(feed, child.wait_with_output()) };

        // On timeout the child is dropped with the future and killed.
        let (fed, waited) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                Error::tool(&program_name, format!("timed out after {:?}", self.timeout))
            })?;

        match fed {
            Ok(bytes) if bytes > 0 => tracing::trace!(bytes, "wrote stdin"),
            Ok(_) => {}
            // The tool may stop reading once it has seen enough of the input.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!(tool = %program_name, "tool closed stdin early");
            }
            Err(e) => {
                return Err(Error::tool(&program_name, format!("failed to write stdin: {e}")));
            }
        }

        let output = waited.map_err(|e| {
            Error::tool(&program_name, format!("I/O error waiting for process: {e}"))
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool(
                program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}
