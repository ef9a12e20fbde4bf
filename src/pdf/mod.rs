//! # PDF Writer
//!
//! Wraps a page bitmap in a one-page PDF 1.7 file. The bitmap becomes a
//! FlateDecode RGB image XObject painted over the whole US Letter MediaBox,
//! so the document prints exactly what was rasterized.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj Catalog
//! 2 0 obj Pages
//! 3 0 obj Page        <- MediaBox [0 0 612 792]
//! 4 0 obj Contents    <- q 612 0 0 792 0 0 cm /Im0 Do Q
//! 5 0 obj Image       <- the raster
//! 6 0 obj Info
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use chrono::{DateTime, Utc};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::PdfError;
use crate::raster::Raster;

/// US Letter width in points.
pub const LETTER_WIDTH_PT: f64 = 612.0;
/// US Letter height in points.
pub const LETTER_HEIGHT_PT: f64 = 792.0;

const PRODUCER: &str = concat!("Vitae ", env!("CARGO_PKG_VERSION"));

/// Document information written to the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct PdfWriter {
    compression_level: u8,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    /// Reserve an object id; index 0 is the free-list head.
    fn new() -> Self {
        Self {
            objects: vec![Vec::new()],
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict_entries, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            compression_level: 6,
        }
    }

    /// Write `raster` as a single full-bleed Letter page.
    pub fn write_raster(&self, raster: &Raster, metadata: &PdfMetadata) -> Result<Vec<u8>, PdfError> {
        self.write_rgb(raster.width(), raster.height(), &raster.to_rgb_bytes(), metadata)
    }

    /// Write packed 8-bit RGB samples as a single full-bleed Letter page.
    pub fn write_rgb(
        &self,
        width: u32,
        height: u32,
        rgb: &[u8],
        metadata: &PdfMetadata,
    ) -> Result<Vec<u8>, PdfError> {
        if width == 0 || height == 0 {
            return Err(PdfError::EmptyRaster { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(PdfError::SampleCount {
                expected,
                actual: rgb.len(),
            });
        }

        let mut builder = PdfBuilder::new();
        let catalog_id = builder.push(Vec::new());
        let pages_id = builder.push(Vec::new());
        let page_id = builder.push(Vec::new());

        let content = format!(
            "q {w:.2} 0 0 {h:.2} 0 0 cm /Im0 Do Q",
            w = LETTER_WIDTH_PT,
            h = LETTER_HEIGHT_PT
        );
        let compressed = compress_to_vec_zlib(content.as_bytes(), self.compression_level);
        let content_id = builder.push_stream("/Filter /FlateDecode", &compressed);

        let compressed_rgb = compress_to_vec_zlib(rgb, self.compression_level);
        let image_id = builder.push_stream(
            &format!(
                "/Type /XObject /Subtype /Image /Width {width} /Height {height} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Interpolate true /Filter /FlateDecode"
            ),
            &compressed_rgb,
        );

        builder.objects[catalog_id] = format!("<< /Type /Catalog /Pages {pages_id} 0 R >>").into_bytes();
        builder.objects[pages_id] = format!("<< /Type /Pages /Kids [{page_id} 0 R] /Count 1 >>").into_bytes();
        builder.objects[page_id] = format!(
            "<< /Type /Page /Parent {pages_id} 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {content_id} 0 R /Resources << /XObject << /Im0 {image_id} 0 R >> >> >>",
            LETTER_WIDTH_PT, LETTER_HEIGHT_PT
        )
        .into_bytes();

        let info_id = builder.push(Self::info_dict(metadata).into_bytes());

        tracing::debug!(width, height, image_bytes = compressed_rgb.len(), "assembled PDF");
        Ok(self.serialize(&builder, catalog_id, info_id))
    }

    fn info_dict(metadata: &PdfMetadata) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title {} ", Self::text_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author {} ", Self::text_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject {} ", Self::text_string(subject));
        }
        if let Some(date) = metadata.creation_date {
            let _ = write!(info, "/CreationDate ({}) ", date.format("D:%Y%m%d%H%M%SZ"));
        }
        let _ = write!(info, "/Producer ({PRODUCER}) /Creator (Vitae) >>");
        info
    }

    /// A PDF text string: literal when printable ASCII, UTF-16BE hex otherwise.
    fn text_string(s: &str) -> String {
        if s.chars().all(|c| (' '..='~').contains(&c)) {
            format!("({})", Self::escape_pdf_string(s))
        } else {
            let mut hex = String::from("<FEFF");
            for unit in s.encode_utf16() {
                let _ = write!(hex, "{unit:04X}");
            }
            hex.push('>');
            hex
        }
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, root_id: usize, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            root_id,
            info_id,
            xref_offset
        );

        output
    }
}
