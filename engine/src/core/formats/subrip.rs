//! SubRip Format
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! First subtitle
//!
//! 2
//! 00:00:05,500 --> 00:00:08,000
//! Second subtitle
//! with two lines
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::{FormatError, FormatInfo, Reader, SubtitleFormatIO, Writer};
use crate::core::{document::Document, model::SubtitleData, time::SubtitleTime, CoreResult};

static TIMESTAMP_LINE: OnceLock<Option<Regex>> = OnceLock::new();

/// `H:MM:SS,mmm --> H:MM:SS,mmm`, also accepting `.` before milliseconds
/// and trailing position hints
fn timestamp_line() -> Option<&'static Regex> {
    TIMESTAMP_LINE
        .get_or_init(|| {
            Regex::new(
                r"^\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})",
            )
            .ok()
        })
        .as_ref()
}

fn parse_timestamp_line(line: &str) -> Option<(SubtitleTime, SubtitleTime)> {
    let caps = timestamp_line()?.captures(line)?;
    let number = |i: usize| -> Option<i64> { caps.get(i)?.as_str().parse().ok() };
    let millis = |i: usize| -> Option<i64> {
        // "5" means 500 ms, as in "00:00:01,5"
        let digits = caps.get(i)?.as_str();
        let value: i64 = digits.parse().ok()?;
        Some(value * 10_i64.pow(3 - digits.len() as u32))
    };
    let start = SubtitleTime::checked_from_hms(number(1)?, number(2)?, number(3)?, millis(4)?)?;
    let end = SubtitleTime::checked_from_hms(number(5)?, number(6)?, number(7)?, millis(8)?)?;
    Some((start, end))
}

fn format_timestamp(time: SubtitleTime) -> String {
    let time = if time.totalmsecs() < 0 {
        SubtitleTime::ZERO
    } else {
        time
    };
    format!(
        "{:02}:{:02}:{:02},{:03}",
        time.hours(),
        time.minutes(),
        time.seconds(),
        time.mseconds()
    )
}

#[derive(Debug, Default)]
pub struct SubRip;

impl SubtitleFormatIO for SubRip {
    fn info(&self) -> FormatInfo {
        FormatInfo::new("SubRip", "srt")
    }

    fn recognize(&self, data: &str) -> bool {
        let mut lines = data
            .trim_start_matches('\u{feff}')
            .lines()
            .map(str::trim)
            .skip_while(|line| line.is_empty());
        let counter = lines.next().is_some_and(|line| line.parse::<u64>().is_ok());
        counter && lines.next().is_some_and(|line| parse_timestamp_line(line).is_some())
    }

    fn open(&self, reader: &mut Reader, document: &mut Document) -> CoreResult<()> {
        let lines = reader.lines();
        let mut lines = lines.iter().enumerate().peekable();

        loop {
            while lines.peek().is_some_and(|(_, l)| l.trim().is_empty()) {
                lines.next();
            }
            let Some((counter_index, counter)) = lines.next() else {
                break;
            };

            // The counter is informative only; documents are renumbered anyway
            let (index, timestamps) = match parse_timestamp_line(counter) {
                Some(times) => (counter_index, times),
                None => {
                    let (index, line) = lines.next().ok_or_else(|| FormatError::Malformed {
                        line: counter_index + 1,
                        reason: "missing timestamp line".to_string(),
                    })?;
                    let times =
                        parse_timestamp_line(line).ok_or_else(|| FormatError::Malformed {
                            line: index + 1,
                            reason: format!("invalid timestamp line: {}", line.trim()),
                        })?;
                    (index, times)
                }
            };

            let mut text_lines = Vec::new();
            while let Some((_, line)) = lines.next_if(|(_, l)| !l.trim().is_empty()) {
                text_lines.push(*line);
            }

            let data = SubtitleData {
                start: timestamps.0,
                end: timestamps.1,
                text: text_lines.join("\n"),
                ..SubtitleData::default()
            };
            document.subtitles_mut().append_with(&data)?;
            tracing::trace!(line = index + 1, "SubRip subtitle read");
        }

        Ok(())
    }

    fn save(&self, document: &Document, writer: &mut Writer) -> CoreResult<()> {
        for subtitle in document.subtitles().iter() {
            writer.write_line(&subtitle.num().to_string());
            writer.write_line(&format!(
                "{} --> {}",
                format_timestamp(subtitle.start()),
                format_timestamp(subtitle.end())
            ));
            writer.write_line(subtitle.text());
            writer.write_line("");
        }
        Ok(())
    }
}
