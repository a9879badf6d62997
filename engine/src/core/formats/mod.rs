//! Subtitle Formats
//!
//! The contract format implementations fulfil, the reader/writer they work
//! through and the registry that picks a format for a file.
//!
//! Loading always builds a fresh document and only hands it back once the
//! format has read everything, so a failed load never leaves a half-filled
//! document behind.

mod io;
mod plain_text;
mod subrip;

pub use io::*;
pub use plain_text::PlainText;
pub use subrip::SubRip;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{
    document::Document, fs::atomic_write_bytes, settings::AppSettings, CoreResult,
};

// =============================================================================
// Errors
// =============================================================================

/// Load and save failures
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("No format recognizes this data")]
    UnrecognizedFormat,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Cannot convert {charset}: {reason}")]
    Encoding { charset: String, reason: String },

    #[error("Malformed data at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Format Contract
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Display name, also stored as the document's format
    pub name: String,
    /// File extension without the dot
    pub extension: String,
}

impl FormatInfo {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
        }
    }
}

/// A subtitle file format
pub trait SubtitleFormatIO: Send + Sync {
    fn info(&self) -> FormatInfo;

    /// Returns true if `data` looks like this format
    fn recognize(&self, data: &str) -> bool;

    /// Fills an empty document from the reader
    fn open(&self, reader: &mut Reader, document: &mut Document) -> CoreResult<()>;

    /// Writes the document's subtitles to the writer
    fn save(&self, document: &Document, writer: &mut Writer) -> CoreResult<()>;
}

// =============================================================================
// Registry
// =============================================================================

/// Known formats, tried in registration order
pub struct FormatRegistry {
    formats: Vec<Box<dyn SubtitleFormatIO>>,
    fallback: PlainText,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FormatRegistry {
    /// Registry without any format besides the plain text fallback
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
            fallback: PlainText,
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(SubRip));
        registry
    }

    pub fn register(&mut self, format: Box<dyn SubtitleFormatIO>) {
        debug!(format = %format.info().name, "Format registered");
        self.formats.push(format);
    }

    /// Infos of every format, fallback last
    pub fn formats(&self) -> Vec<FormatInfo> {
        self.formats
            .iter()
            .map(|f| f.info())
            .chain(std::iter::once(self.fallback.info()))
            .collect()
    }

    /// Looks a format up by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&dyn SubtitleFormatIO> {
        self.formats
            .iter()
            .map(|f| f.as_ref())
            .chain(std::iter::once(&self.fallback as &dyn SubtitleFormatIO))
            .find(|f| f.info().name.eq_ignore_ascii_case(name))
    }

    /// First registered format that recognizes `data`
    pub fn recognize(&self, data: &str) -> Option<&dyn SubtitleFormatIO> {
        self.formats
            .iter()
            .map(|f| f.as_ref())
            .find(|f| f.recognize(data))
    }

    fn load(
        format: &dyn SubtitleFormatIO,
        reader: &Reader,
        settings: &AppSettings,
    ) -> CoreResult<Document> {
        let mut document = Document::with_settings(settings);
        let mut reader = reader.clone();
        format.open(&mut reader, &mut document)?;
        document.set_format(format.info().name);
        document.set_newline(reader.newline());
        document.set_changed(false);
        Ok(document)
    }

    /// Builds a document from text, e.g. a clipboard paste.
    ///
    /// Every format recognizing the data is tried in order; when all of
    /// them fail or none recognizes it, the text is read as plain text.
    pub fn open_from_data(&self, data: &str, settings: &AppSettings) -> CoreResult<Document> {
        let reader = Reader::from_text(data);
        for format in self.formats.iter().filter(|f| f.recognize(reader.data())) {
            match Self::load(format.as_ref(), &reader, settings) {
                Ok(document) => return Ok(document),
                Err(e) => debug!(
                    format = %format.info().name,
                    error = %e,
                    "Recognized format failed to open data, trying next"
                ),
            }
        }
        Self::load(&self.fallback, &reader, settings)
    }

    /// Opens a file with the first format recognizing its contents
    pub fn open(&self, path: &Path, settings: &AppSettings) -> CoreResult<Document> {
        let charset = settings.document.default_charset.as_str();
        let bytes = std::fs::read(path).map_err(FormatError::from)?;
        let reader = Reader::from_bytes(&bytes, Some(charset))?;
        let format = self.recognize(reader.data()).ok_or_else(|| {
            warn!(path = %path.display(), "No format recognizes file");
            FormatError::UnrecognizedFormat
        })?;

        let mut document = Self::load(format, &reader, settings)?;
        document.set_filename(path);
        if let Some(stem) = path.file_stem() {
            document.set_name(stem.to_string_lossy());
        }
        document.set_charset(charset);
        document.set_changed(false);
        info!(
            path = %path.display(),
            format = %document.format(),
            subtitles = document.subtitles().size(),
            "Document opened"
        );
        Ok(document)
    }

    /// Writes `document` with the format named by `document.format()`
    pub fn save(&self, document: &Document, path: &Path) -> CoreResult<()> {
        let format = self
            .find(document.format())
            .ok_or_else(|| FormatError::UnknownFormat(document.format().to_string()))?;
        let mut writer = Writer::new(document.newline());
        format.save(document, &mut writer)?;
        let bytes = writer.encode(document.charset())?;
        atomic_write_bytes(path, &bytes)
    }
}
