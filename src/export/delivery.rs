//! Where finished PDFs go, and how failures reach the user.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ExportError;

use super::ExportedPdf;

/// Where a delivered file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub location: String,
    pub bytes: usize,
}

/// Hands a finished PDF to the user.
pub trait Delivery {
    fn deliver(&self, pdf: &ExportedPdf) -> Result<DeliveryReceipt, ExportError>;
}

/// Surfaces a blocking, user-visible message.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Raises alerts as `warn` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "user alert");
    }
}

/// Saves PDFs into a directory. Each file is written to a temp file in the
/// same directory and renamed into place, so a failed write never leaves a
/// partial PDF behind.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Delivery for FileDelivery {
    fn deliver(&self, pdf: &ExportedPdf) -> Result<DeliveryReceipt, ExportError> {
        let fail = |source: std::io::Error| ExportError::Delivery {
            filename: pdf.filename.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(fail)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(fail)?;
        tmp.write_all(&pdf.bytes).map_err(fail)?;
        tmp.as_file().sync_all().map_err(fail)?;

        let target = self.dir.join(&pdf.filename);
        tmp.persist(&target).map_err(|e| fail(e.error))?;

        tracing::info!(path = %target.display(), bytes = pdf.bytes.len(), "saved PDF");
        Ok(DeliveryReceipt {
            location: target.display().to_string(),
            bytes: pdf.bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> ExportedPdf {
        ExportedPdf {
            filename: name.to_string(),
            bytes: b"%PDF-1.7\n%%EOF\n".to_vec(),
            page_size_pt: (612.0, 792.0),
            raster_size_px: (1632, 2112),
            clipped: false,
        }
    }

    #[test]
    fn test_file_delivery_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let receipt = FileDelivery::new(&out).deliver(&pdf("jane-doe-resume.pdf")).unwrap();

        let written = std::fs::read(out.join("jane-doe-resume.pdf")).unwrap();
        assert_eq!(written, pdf("x").bytes);
        assert_eq!(receipt.bytes, written.len());
        // Only the final file remains.
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_file_delivery_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = FileDelivery::new(dir.path());
        delivery.deliver(&pdf("a.pdf")).unwrap();
        delivery.deliver(&pdf("a.pdf")).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_dir_is_delivery_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let err = FileDelivery::new(&file).deliver(&pdf("a.pdf")).unwrap_err();
        assert!(matches!(err, ExportError::Delivery { ref filename, .. } if filename == "a.pdf"));
    }
}
