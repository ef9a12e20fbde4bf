//! # Export Pipeline
//!
//! Snapshot → layout → rasterize → embed → name → deliver.
//!
//! At most one export runs at a time. The [`Exporter`] claims an in-flight
//! flag before doing any work and an RAII [`InFlight`] token releases it on
//! every exit path, including panics inside the blocking task. A failed
//! export produces no file: delivery only happens after the PDF bytes exist,
//! and [`FileDelivery`] writes through a temp file.
//!
//! The CPU-bound stages run on `tokio::task::spawn_blocking` in
//! [`Exporter::export_async`] so the caller's executor stays responsive.

mod delivery;

pub use delivery::{Delivery, DeliveryReceipt, FileDelivery, LogNotifier, Notifier};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::customize::{RenderStyle, StylePreferences};
use crate::error::ExportError;
use crate::font::FontBook;
use crate::layout::{LayoutRenderer, RenderMode, PAGE_HEIGHT_PX, PAGE_WIDTH_PX};
use crate::model::ResumeDocument;
use crate::pdf::{PdfMetadata, PdfWriter, LETTER_HEIGHT_PT, LETTER_WIDTH_PT};
use crate::raster::{Rasterizer, MIN_SCALE};
use crate::store::DocumentStore;
use crate::template::TemplateId;

/// Shown to the user when an export fails.
pub const EXPORT_FAILED_ALERT: &str = "Failed to generate PDF. Please try again.";

const FILENAME_SUFFIX: &str = "-resume.pdf";
const FALLBACK_STEM: &str = "resume";

/// Output filename for a resume owner: `<sanitized-name>-resume.pdf`, or
/// `resume-resume.pdf` when the name has nothing usable.
pub fn export_filename(full_name: &str) -> String {
    let mut stem = String::with_capacity(full_name.len());
    for ch in full_name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            stem.push(ch);
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{stem}{FILENAME_SUFFIX}")
}

/// Everything an export reads, captured at one point in time. Edits made
/// after capture do not reach the PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSnapshot {
    pub document: ResumeDocument,
    pub template: TemplateId,
    pub style: RenderStyle,
}

impl ExportSnapshot {
    pub fn capture(store: &DocumentStore, template: TemplateId, prefs: &StylePreferences) -> Self {
        Self {
            document: store.snapshot(),
            template,
            style: RenderStyle::resolve(template, prefs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Raster scale factor; at least [`MIN_SCALE`].
    pub scale: u32,
    /// Keep preview placeholders for empty sections in the PDF.
    pub placeholders: bool,
    /// Stamped into the PDF Info dictionary. `None` keeps output
    /// byte-identical across runs.
    pub creation_date: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            placeholders: false,
            creation_date: None,
        }
    }
}

/// A finished PDF, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Page size in PDF points.
    pub page_size_pt: (f64, f64),
    /// Raster size in device pixels.
    pub raster_size_px: (u32, u32),
    /// Content ran past the page bottom and was clipped.
    pub clipped: bool,
}

/// Claim on the single export slot, released on drop.
#[derive(Debug)]
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    fn claim(flag: &Arc<AtomicBool>) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs the export pipeline. Cheap to clone; clones share the in-flight
/// guard.
#[derive(Debug, Clone)]
pub struct Exporter {
    fonts: Arc<FontBook>,
    options: ExportOptions,
    in_flight: Arc<AtomicBool>,
}

impl Exporter {
    pub fn new(fonts: Arc<FontBook>, options: ExportOptions) -> Self {
        Self {
            fonts,
            options,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Export on the current thread.
    pub fn export(&self, snapshot: &ExportSnapshot) -> Result<ExportedPdf, ExportError> {
        let _guard = InFlight::claim(&self.in_flight)?;
        run_pipeline(&self.fonts, &self.options, snapshot)
    }

    /// Export on the blocking pool. The slot is claimed before the task is
    /// spawned, so a second call fails fast with [`ExportError::Busy`].
    pub async fn export_async(&self, snapshot: ExportSnapshot) -> Result<ExportedPdf, ExportError> {
        let guard = InFlight::claim(&self.in_flight)?;
        let fonts = Arc::clone(&self.fonts);
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            run_pipeline(&fonts, &options, &snapshot)
        })
        .await
        .map_err(|e| ExportError::Join(e.to_string()))?
    }
}

fn run_pipeline(
    fonts: &FontBook,
    options: &ExportOptions,
    snapshot: &ExportSnapshot,
) -> Result<ExportedPdf, ExportError> {
    let mode = if options.placeholders {
        RenderMode::Preview
    } else {
        RenderMode::Final
    };
    let page = LayoutRenderer::new(fonts).render(&snapshot.document, snapshot.template, &snapshot.style, mode);
    debug_assert_eq!((page.width, page.height), (PAGE_WIDTH_PX, PAGE_HEIGHT_PX));
    if page.overflows() {
        tracing::warn!(
            template = %snapshot.template,
            content_bottom = page.content_bottom,
            "resume runs past one page; the overflow is clipped"
        );
    }

    let raster = Rasterizer::new(fonts, options.scale)?.rasterize(&page)?;

    let full_name = snapshot.document.personal.full_name.trim();
    let metadata = PdfMetadata {
        title: Some(if full_name.is_empty() {
            "Resume".to_string()
        } else {
            format!("{full_name} - Resume")
        }),
        author: (!full_name.is_empty()).then(|| full_name.to_string()),
        subject: None,
        creation_date: options.creation_date,
    };
    let bytes = PdfWriter::new().write_raster(&raster, &metadata)?;

    let pdf = ExportedPdf {
        filename: export_filename(full_name),
        bytes,
        page_size_pt: (LETTER_WIDTH_PT, LETTER_HEIGHT_PT),
        raster_size_px: (raster.width(), raster.height()),
        clipped: page.overflows(),
    };
    tracing::info!(
        filename = %pdf.filename,
        template = %snapshot.template,
        bytes = pdf.bytes.len(),
        "exported resume PDF"
    );
    Ok(pdf)
}

/// Clears the loading flag on drop.
struct Loading<'a>(&'a AtomicBool);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The download action: export, deliver, and report failure to the user.
pub struct ExportController<D, N> {
    exporter: Exporter,
    delivery: D,
    notifier: N,
    loading: AtomicBool,
}

impl<D: Delivery, N: Notifier> ExportController<D, N> {
    pub fn new(exporter: Exporter, delivery: D, notifier: N) -> Self {
        Self {
            exporter,
            delivery,
            notifier,
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a download is running. Drives the disabled/spinner state.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Export `snapshot` and hand the file to the delivery target.
    ///
    /// Returns the receipt on success. On failure the error is logged, one
    /// alert is raised and `None` is returned; nothing is retried. A call
    /// made while another download is running is ignored. Loading is
    /// cleared on every path.
    pub async fn download(&self, snapshot: ExportSnapshot) -> Option<DeliveryReceipt> {
        if self.loading.swap(true, Ordering::AcqRel) {
            tracing::debug!("download ignored; an export is already running");
            return None;
        }
        let _loading = Loading(&self.loading);

        let result = match self.exporter.export_async(snapshot).await {
            Ok(pdf) => self.delivery.deliver(&pdf),
            Err(e) => Err(e),
        };
        match result {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                tracing::error!(error = %e, "PDF export failed");
                self.notifier.alert(EXPORT_FAILED_ALERT);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExperienceEntry;
    use std::sync::Mutex;

    fn snapshot(name: &str) -> ExportSnapshot {
        let mut store = DocumentStore::new(ResumeDocument::new());
        store.update_personal(|p| p.full_name = name.to_string());
        let id = store.entries::<ExperienceEntry>()[0].id.clone();
        store.update::<ExperienceEntry>(&id, |e| {
            e.company = "Acme".to_string();
            e.position = "Engineer".to_string();
        });
        ExportSnapshot::capture(&store, TemplateId::Classic, &StylePreferences::default())
    }

    fn exporter() -> Exporter {
        Exporter::new(Arc::new(FontBook::new()), ExportOptions::default())
    }

    #[derive(Default)]
    struct Recorder {
        delivered: Mutex<Vec<String>>,
        alerts: Mutex<Vec<String>>,
    }

    impl Delivery for &Recorder {
        fn deliver(&self, pdf: &ExportedPdf) -> Result<DeliveryReceipt, ExportError> {
            self.delivered.lock().unwrap().push(pdf.filename.clone());
            Ok(DeliveryReceipt {
                location: pdf.filename.clone(),
                bytes: pdf.bytes.len(),
            })
        }
    }

    impl Notifier for &Recorder {
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Jane Doe"), "jane-doe-resume.pdf");
        assert_eq!(export_filename("  Jean-Luc  O'Neil "), "jean-luc-o-neil-resume.pdf");
        assert_eq!(export_filename("Zoë Ångström"), "zoë-ångström-resume.pdf");
        assert_eq!(export_filename(""), "resume-resume.pdf");
        assert_eq!(export_filename("   "), "resume-resume.pdf");
        assert_eq!(export_filename("../../"), "resume-resume.pdf");
    }

    #[test]
    fn test_export_produces_letter_pdf() {
        let pdf = exporter().export(&snapshot("Jane Doe")).unwrap();
        assert_eq!(pdf.filename, "jane-doe-resume.pdf");
        assert_eq!(pdf.page_size_pt, (612.0, 792.0));
        assert_eq!(pdf.raster_size_px, (1632, 2112));
        assert!(pdf.bytes.starts_with(b"%PDF-1.7"));
        assert!(!pdf.clipped);
    }

    #[test]
    fn test_export_is_idempotent() {
        let exporter = exporter();
        let snap = snapshot("Jane Doe");
        let a = exporter.export(&snap).unwrap();
        let b = exporter.export(&snap).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_guard_rejects_concurrent_export_and_releases() {
        let exporter = exporter();
        let held = InFlight::claim(&exporter.in_flight).unwrap();
        assert!(exporter.is_busy());
        assert!(matches!(exporter.export(&snapshot("A")), Err(ExportError::Busy)));
        drop(held);
        assert!(!exporter.is_busy());
        assert!(exporter.export(&snapshot("A")).is_ok());
        assert!(!exporter.is_busy());
    }

    #[test]
    fn test_guard_released_after_failure() {
        let exporter = exporter();
        let mut snap = snapshot("A");
        snap.document.personal.photo = Some("https://example.com/me.png".to_string());
        assert!(matches!(exporter.export(&snap), Err(ExportError::Raster(_))));
        assert!(!exporter.is_busy());
    }

    #[test]
    fn test_scale_below_minimum_fails() {
        let exporter = Exporter::new(
            Arc::new(FontBook::new()),
            ExportOptions {
                scale: 1,
                ..ExportOptions::default()
            },
        );
        assert!(matches!(exporter.export(&snapshot("A")), Err(ExportError::Raster(_))));
    }

    #[tokio::test]
    async fn test_export_async_matches_sync() {
        let exporter = exporter();
        let snap = snapshot("Jane Doe");
        let sync = exporter.export(&snap).unwrap();
        let async_pdf = exporter.export_async(snap).await.unwrap();
        assert_eq!(sync, async_pdf);
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_controller_success_and_failure() {
        let recorder = Recorder::default();
        let controller = ExportController::new(exporter(), &recorder, &recorder);

        let receipt = controller.download(snapshot("Jane Doe")).await.unwrap();
        assert_eq!(receipt.location, "jane-doe-resume.pdf");
        assert!(!controller.is_loading());
        assert!(recorder.alerts.lock().unwrap().is_empty());

        let mut bad = snapshot("Jane Doe");
        bad.document.personal.photo = Some("http://cdn.example.com/p.jpg".to_string());
        assert!(controller.download(bad).await.is_none());
        assert!(!controller.is_loading());
        assert_eq!(*recorder.alerts.lock().unwrap(), vec![EXPORT_FAILED_ALERT.to_string()]);
        assert_eq!(recorder.delivered.lock().unwrap().len(), 1);
    }
}
