//! Structured error types for the Vitae renderer.
//!
//! Each stage owns its error enum; [`VitaeError`] unifies them for callers
//! that drive the whole pipeline. Validation problems are deliberately not
//! here: they are data (see [`crate::validate::ValidationErrors`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateId;

/// The unified error type returned by the top-level Vitae API.
#[derive(Debug, Error)]
pub enum VitaeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Preference(#[from] PreferenceError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// JSON input failed to parse as a resume document.
#[derive(Debug, Error)]
#[error("Failed to parse resume document: {source}{}", hint_suffix(.hint))]
pub struct ParseError {
    #[source]
    pub source: serde_json::Error,
    pub hint: String,
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the resume schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ParseError { source: e, hint }
    }
}

/// Persisted local state could not be read or written.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}' at {path}: {source}")]
    Io {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("value for key '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("form section index {0} is out of range")]
    SectionOutOfRange(usize),
}

/// A style preference was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum PreferenceError {
    #[error("'{color}' is not an accent swatch of the {template} template")]
    UnknownSwatch { template: TemplateId, color: String },
    #[error("unknown font '{0}'")]
    UnknownFont(String),
    #[error("unknown text color scheme '{0}'")]
    UnknownTextColor(String),
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

/// A font face could not be loaded.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a usable TrueType/OpenType face: {0}")]
    Parse(String),
}

/// A profile photo could not be loaded for rasterization.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("remote image '{0}' cannot be embedded without cross-origin clearance")]
    CrossOrigin(String),
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("failed to read image file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image data too short")]
    TooShort,
    #[error("unsupported image format (expected JPEG, PNG or WebP)")]
    UnsupportedFormat,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Rasterizing the laid-out page failed.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("raster scale {0} is below the 2x print minimum")]
    ScaleTooLow(u32),
    #[error("profile photo could not be drawn: {0}")]
    Photo(#[from] ImageError),
    #[error("failed to encode raster: {0}")]
    Encode(#[from] image::ImageError),
}

/// Assembling the PDF from a raster failed.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
    #[error("expected {expected} RGB sample bytes, got {actual}")]
    SampleCount { expected: usize, actual: usize },
}

/// The export pipeline failed. No file is produced when this is returned.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] PdfError),
    #[error("failed to save '{filename}': {source}")]
    Delivery {
        filename: String,
        #[source]
        source: std::io::Error,
    },
    #[error("export task was cancelled or panicked: {0}")]
    Join(String),
}
