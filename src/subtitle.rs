use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubgenError};

/// One numbered block of an SRT file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    /// 1-based sequence number
    pub index: usize,
    pub time_range: String,
    pub text: String,
}

impl SubtitleEntry {
    /// Number `(time_range, text)` pairs from 1 in the order given
    pub fn from_pairs<I>(pairs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (time_range, text))| Self {
                index: i + 1,
                time_range,
                text,
            })
            .collect()
    }
}

/// Render entries to SRT text
pub fn render_srt(entries: &[SubtitleEntry]) -> String {
    let mut srt_content = String::new();

    for entry in entries {
        srt_content.push_str(&format!(
            "{}\n{}\n{}\n\n",
            entry.index, entry.time_range, entry.text
        ));
    }

    srt_content
}

/// Write entries to an SRT file, replacing any existing file
pub async fn write_srt<P: AsRef<Path>>(output_path: P, entries: &[SubtitleEntry]) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(output_path, render_srt(entries)).await
        .map_err(SubgenError::Io)?;

    info!("SRT file generated successfully ({} entries)", entries.len());
    Ok(())
}

/// Format a segment's start and end as `HH:MM:SS,mmm --> HH:MM:SS,mmm`
pub fn format_time_range(start: f64, end: f64) -> Result<String> {
    Ok(format!("{} --> {}", format_srt_time(start)?, format_srt_time(end)?))
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> Result<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SubgenError::InvalidTimestamp(seconds));
    }

    // Snap to whole microseconds before truncating so 2.3 doesn't become 2.299
    let total_micros = (seconds * 1_000_000.0).round() as u64;
    let total_milliseconds = total_micros / 1_000;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}
