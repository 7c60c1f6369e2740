mod cli;

use probekit::{config, report};
use probekit_ffprobe::Ffprobe;
use probekit_model::{ProbeData, StreamType};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "probekit=trace,probekit_ffprobe=trace,probekit_model=trace".to_string()
        } else {
            "probekit=warn,probekit_ffprobe=warn,probekit_model=warn".to_string()
        }
    });

    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe {
            input,
            json,
            timeout,
            extra_args,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let mut ffprobe = config.ffprobe.prober()?;
            if let Some(secs) = timeout {
                if secs == 0 {
                    anyhow::bail!("--timeout must be greater than 0");
                }
                ffprobe = ffprobe.with_timeout(Duration::from_secs(secs));
            }
            let data = run_probe(&ffprobe, &input, &extra_args)?;
            print_report(&data, json)
        }
        Commands::Streams {
            input,
            stream_type,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let ffprobe = config.ffprobe.prober()?;
            let data = run_probe(&ffprobe, &input, &[])?;
            print_streams(&data, stream_type, json)
        }
        Commands::Parse { document, json } => {
            let data = parse_document(&document)?;
            print_report(&data, json)
        }
        Commands::CheckTools => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            check_tools(&config)
        }
    }
}

fn run_probe(ffprobe: &Ffprobe, input: &str, extra_args: &[String]) -> Result<ProbeData> {
    let rt = tokio::runtime::Runtime::new()?;
    let data = rt.block_on(async {
        if input == "-" {
            ffprobe
                .probe_reader_with_args(tokio::io::stdin(), extra_args)
                .await
        } else {
            ffprobe.probe_url_with_args(input, extra_args).await
        }
    });
    data.with_context(|| format!("Failed to probe {}", input))
}

fn parse_document(document: &Path) -> Result<ProbeData> {
    let bytes = if document == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read document from stdin")?;
        buf
    } else {
        std::fs::read(document)
            .with_context(|| format!("Failed to read document: {:?}", document))?
    };

    ProbeData::from_slice(&bytes)
        .with_context(|| format!("Failed to parse document: {:?}", document))
}

fn print_report(data: &ProbeData, json: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, data)?;
        writeln!(out)?;
    } else {
        report::write_summary(&mut out, data)?;
    }
    Ok(())
}

fn print_streams(data: &ProbeData, stream_type: StreamType, json: bool) -> Result<()> {
    let streams = data.stream_type(stream_type);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &streams)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Streams ({}): {}", stream_type, streams.len())?;
        report::write_streams(&mut out, streams)?;
    }
    Ok(())
}

fn check_tools(config: &config::Config) -> Result<()> {
    println!("Checking external tools...\n");

    let program = config
        .ffprobe
        .path
        .clone()
        .unwrap_or_else(|| "ffprobe".into());

    let rt = tokio::runtime::Runtime::new()?;
    let tools = rt.block_on(probekit_ffprobe::check_tools(&program));
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable probing.");
    }

    Ok(())
}
