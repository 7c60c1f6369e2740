//! Plain-text rendering of probe reports.

use std::io::{self, Write};
use std::time::Duration;

use probekit_model::{CodecType, ProbeData, Stream};

/// Format a duration as `HH:MM:SS.mmm`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        d.subsec_millis()
    )
}

/// One-line description of a stream.
pub fn stream_line(stream: &Stream) -> String {
    let mut line = format!("[{}] {}", stream.index, stream.codec_type);
    if !stream.codec_name.is_empty() {
        line.push_str(&format!(" {}", stream.codec_name));
    }

    match stream.codec_type {
        CodecType::Video => {
            if stream.width > 0 && stream.height > 0 {
                line.push_str(&format!(" {}x{}", stream.width, stream.height));
            }
            if let Some(fps) = stream.avg_frame_rate().or_else(|| stream.frame_rate()) {
                line.push_str(&format!(" {:.3} fps", fps));
            }
            let rotation = stream.rotation();
            if rotation != 0 {
                line.push_str(&format!(" rotated {}°", rotation));
            }
        }
        CodecType::Audio => {
            if stream.channels > 0 {
                line.push_str(&format!(" {}ch", stream.channels));
            }
            if let Ok(rate) = stream.sample_rate() {
                line.push_str(&format!(" {} Hz", rate));
            }
        }
        _ => {}
    }

    let tags = stream.tags();
    if let Some(lang) = tags.language {
        line.push_str(&format!(" ({})", lang));
    }
    if let Some(title) = tags.title {
        line.push_str(&format!(" \"{}\"", title));
    }
    if stream.disposition.is_default() {
        line.push_str(" [default]");
    }
    if stream.disposition.is_forced() {
        line.push_str(" [forced]");
    }
    line
}

/// Write a human-readable summary of the whole report.
pub fn write_summary<W: Write>(out: &mut W, data: &ProbeData) -> io::Result<()> {
    let format = &data.format;

    if !format.filename.is_empty() {
        writeln!(out, "Input: {}", format.filename)?;
    }
    if format.format_long_name.is_empty() {
        writeln!(out, "Format: {}", format.format_name)?;
    } else {
        writeln!(out, "Format: {} ({})", format.format_name, format.format_long_name)?;
    }
    writeln!(out, "Duration: {}", format_duration(format.duration()))?;
    if let Ok(size) = format.size() {
        writeln!(out, "Size: {} bytes", size)?;
    }
    if let Ok(bit_rate) = format.bit_rate() {
        writeln!(out, "Bit rate: {} b/s", bit_rate)?;
    }

    if !format.tag_list.is_empty() {
        writeln!(out, "Tags:")?;
        for (key, value) in format.tag_list.iter() {
            writeln!(out, "  {}: {}", key, value)?;
        }
    }

    let counts = data.stream_counts();
    writeln!(
        out,
        "\nStreams: {} (video {}, audio {}, subtitle {}, data {}, attachment {})",
        counts.total(),
        counts.video,
        counts.audio,
        counts.subtitle,
        counts.data,
        counts.attachment
    )?;
    write_streams(out, data.streams.iter())?;

    if !data.chapters.is_empty() {
        writeln!(out, "\nChapters: {}", data.chapters.len())?;
        for chapter in &data.chapters {
            writeln!(
                out,
                "  [{}] {} - {} {}",
                chapter.id,
                probekit_model::time::format_seconds(chapter.start_seconds()),
                probekit_model::time::format_seconds(chapter.end_seconds()),
                chapter.title()
            )?;
        }
    }

    Ok(())
}

/// Write one line per stream.
pub fn write_streams<'a, W, I>(out: &mut W, streams: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Stream>,
{
    for stream in streams {
        writeln!(out, "  {}", stream_line(stream))?;
    }
    Ok(())
}
