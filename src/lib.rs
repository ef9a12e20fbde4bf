//! # Vitae
//!
//! A print-faithful resume renderer.
//!
//! One structured resume, many templates. Every template lays the same data
//! out on a single US Letter page, and the PDF is a bitmap of exactly that
//! page: what the preview shows is what prints. Nothing leaves the machine.
//!
//! ## Architecture
//!
//! ```text
//! ResumeDocument (JSON)
//!       ↓
//!   [store]     - Single owner of the document; named updates
//!       ↓
//!   [customize] - Font, text colors, per-template accent → RenderStyle
//!       ↓
//!   [layout]    - Template layout onto an 816×1056 px page
//!       ↓
//!   [raster]    - Paint the page at 2x or more
//!       ↓
//!   [pdf]       - One Letter page, bitmap edge to edge
//!       ↓
//!   [export]    - Single-flight download, filename, delivery
//! ```
//!
//! [`storage`] keeps the builder session across runs, and [`validate`] gates
//! the form steps.

pub mod config;
pub mod content;
pub mod customize;
pub mod error;
pub mod export;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod raster;
pub mod routes;
pub mod storage;
pub mod store;
pub mod style;
pub mod template;
pub mod text;
pub mod validate;

#[cfg(feature = "wasm")]
pub mod wasm;

use customize::{RenderStyle, StylePreferences};
use error::VitaeError;
use export::{ExportOptions, ExportSnapshot, ExportedPdf, Exporter};
use font::FontBook;
use layout::{LayoutPage, LayoutRenderer, RenderMode};
use model::ResumeDocument;
use template::TemplateId;

/// Lay a document out as the live preview shows it, placeholders included.
pub fn preview(
    document: &ResumeDocument,
    template: TemplateId,
    prefs: &StylePreferences,
    fonts: &FontBook,
) -> LayoutPage {
    let style = RenderStyle::resolve(template, prefs);
    LayoutRenderer::new(fonts).render(document, template, &style, RenderMode::Preview)
}

/// Render a document to PDF with default export options.
pub fn render(
    document: &ResumeDocument,
    template: TemplateId,
    prefs: &StylePreferences,
    fonts: FontBook,
) -> Result<ExportedPdf, VitaeError> {
    let snapshot = ExportSnapshot {
        document: document.clone(),
        template,
        style: RenderStyle::resolve(template, prefs),
    };
    let exporter = Exporter::new(std::sync::Arc::new(fonts), ExportOptions::default());
    Ok(exporter.export(&snapshot)?)
}

/// Render a resume described as JSON to PDF bytes, using default style
/// preferences and the bundled faces.
pub fn render_json(json: &str, template: TemplateId) -> Result<Vec<u8>, VitaeError> {
    let mut document = ResumeDocument::from_json(json)?;
    document.backfill_empty_sections();
    let pdf = render(&document, template, &StylePreferences::default(), FontBook::new())?;
    Ok(pdf.bytes)
}
