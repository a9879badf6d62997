//! Plain Text Format
//!
//! One subtitle per non-empty line, without timing. Used as the fallback
//! when no other format recognizes the data.

use super::{FormatInfo, Reader, SubtitleFormatIO, Writer};
use crate::core::{document::Document, model::SubtitleData, CoreResult};

#[derive(Debug, Default)]
pub struct PlainText;

impl SubtitleFormatIO for PlainText {
    fn info(&self) -> FormatInfo {
        FormatInfo::new("Plain Text", "txt")
    }

    /// Never claims data; reached only as the explicit fallback
    fn recognize(&self, _data: &str) -> bool {
        false
    }

    fn open(&self, reader: &mut Reader, document: &mut Document) -> CoreResult<()> {
        for line in reader.lines().into_iter().filter(|l| !l.trim().is_empty()) {
            let data = SubtitleData {
                text: line.to_string(),
                ..SubtitleData::default()
            };
            document.subtitles_mut().append_with(&data)?;
        }
        Ok(())
    }

    fn save(&self, document: &Document, writer: &mut Writer) -> CoreResult<()> {
        for subtitle in document.subtitles().iter() {
            writer.write_line(subtitle.text());
        }
        Ok(())
    }
}
