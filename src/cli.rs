use clap::{Parser, Subcommand};
use probekit_model::StreamType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "probekit")]
#[command(author, version, about = "Inspect media files through ffprobe's JSON report")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a file or URL and display its format, streams and chapters
    Probe {
        /// File path or URL to probe; `-` reads from stdin
        #[arg(required = true)]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Seconds before ffprobe is killed (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Extra ffprobe arguments, after `--`
        #[arg(last = true)]
        extra_args: Vec<String>,
    },

    /// List the streams of a file or URL, optionally filtered by type
    Streams {
        /// File path or URL to probe; `-` reads from stdin
        #[arg(required = true)]
        input: String,

        /// Stream type: video, audio, subtitle, data, attachment or any
        #[arg(short = 't', long = "type", default_value = "any")]
        stream_type: StreamType,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a saved ffprobe JSON document without running ffprobe
    Parse {
        /// JSON document; `-` reads from stdin
        #[arg(required = true)]
        document: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffprobe is available
    CheckTools,
}
