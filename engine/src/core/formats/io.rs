//! Format Reader and Writer
//!
//! Byte-level plumbing shared by every format: charset decoding, newline
//! detection and line splitting on the way in, newline and charset
//! encoding on the way out.

use crate::core::Newline;

use super::FormatError;

/// Only charset the codecs read and write
pub const UTF8: &str = "UTF-8";

const BOM: char = '\u{feff}';

/// Accepts the usual spellings of UTF-8
pub fn is_utf8(charset: &str) -> bool {
    matches!(
        charset.to_ascii_lowercase().replace(['-', '_'], "").as_str(),
        "utf8"
    )
}

fn check_charset(charset: &str) -> Result<(), FormatError> {
    if is_utf8(charset) {
        Ok(())
    } else {
        Err(FormatError::Encoding {
            charset: charset.to_string(),
            reason: "unsupported charset".to_string(),
        })
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Decoded file contents handed to a format's `open`
#[derive(Debug, Clone)]
pub struct Reader {
    data: String,
    newline: Newline,
}

impl Reader {
    /// Decodes `bytes` as `charset` (UTF-8 when `None`), dropping a BOM
    pub fn from_bytes(bytes: &[u8], charset: Option<&str>) -> Result<Self, FormatError> {
        let charset = charset.unwrap_or(UTF8);
        check_charset(charset)?;
        let data = std::str::from_utf8(bytes).map_err(|e| FormatError::Encoding {
            charset: charset.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_text(data))
    }

    pub fn from_text(data: &str) -> Self {
        let data = data.strip_prefix(BOM).unwrap_or(data);
        Self {
            newline: Newline::detect(data).unwrap_or_default(),
            data: data.to_string(),
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Newline convention found in the data
    pub fn newline(&self) -> Newline {
        self.newline
    }

    /// Lines without their terminators, whatever the convention
    pub fn lines(&self) -> Vec<&str> {
        let mut lines = Vec::new();
        let mut rest = self.data.as_str();
        while let Some(pos) = rest.find(['\r', '\n']) {
            lines.push(&rest[..pos]);
            let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
            rest = &rest[pos + skip..];
        }
        if !rest.is_empty() {
            lines.push(rest);
        }
        lines
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Text buffer a format's `save` fills; lines end in `\n` until encoded
#[derive(Debug, Clone)]
pub struct Writer {
    buffer: String,
    newline: Newline,
}

impl Writer {
    pub fn new(newline: Newline) -> Self {
        Self {
            buffer: String::new(),
            newline,
        }
    }

    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    /// Text with the target newline convention applied
    pub fn text(&self) -> String {
        match self.newline {
            Newline::Unix => self.buffer.clone(),
            other => self.buffer.replace('\n', other.as_str()),
        }
    }

    pub fn encode(&self, charset: &str) -> Result<Vec<u8>, FormatError> {
        check_charset(charset)?;
        Ok(self.text().into_bytes())
    }
}
