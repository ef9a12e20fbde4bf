//! # Photo Loading
//!
//! Loads the profile photo from a data URI, a file path or raw base64 and
//! decodes it to RGBA pixels for the rasterizer.
//!
//! Remote URLs are refused. Export never touches the network, so a photo
//! that lives on another origin is the equivalent of an image drawn into a
//! canvas without CORS clearance: the raster cannot include it.

use std::io::Cursor;

use image::RgbaImage;

use crate::error::ImageError;

/// Load and decode an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` : data URI
/// - File path (absolute or explicitly relative) : reads from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<RgbaImage, ImageError> {
    let raw_bytes = read_source_bytes(src.trim())?;
    decode_image_bytes(&raw_bytes)
}

/// Whether `src` points at another origin.
pub fn is_remote(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, ImageError> {
    if is_remote(src) {
        return Err(ImageError::CrossOrigin(src.to_string()));
    }

    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:") {
        if !src.starts_with("data:image/") {
            return Err(ImageError::InvalidDataUri("not an image media type".to_string()));
        }
        let comma_pos = src
            .find(',')
            .ok_or_else(|| ImageError::InvalidDataUri("missing comma".to_string()))?;
        if !src[..comma_pos].ends_with(";base64") {
            return Err(ImageError::InvalidDataUri("only base64 payloads are supported".to_string()));
        }
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 can contain '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") || src.starts_with("file://") {
        let path = src.trim_start_matches("file://");
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(path).map_err(|source| ImageError::Io {
                path: path.to_string(),
                source,
            });
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(ImageError::Io {
                path: path.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "file paths are not available in WASM; use a data URI",
                ),
            });
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ImageError> {
    use base64::Engine;
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(cleaned)?)
}

/// Detect the format from magic bytes and decode to RGBA.
fn decode_image_bytes(data: &[u8]) -> Result<RgbaImage, ImageError> {
    if data.len() < 4 {
        return Err(ImageError::TooShort);
    }
    let format = if is_jpeg(data) {
        image::ImageFormat::Jpeg
    } else if is_png(data) {
        image::ImageFormat::Png
    } else if is_webp(data) {
        image::ImageFormat::WebP
    } else {
        return Err(ImageError::UnsupportedFormat);
    };

    let img = image::load(Cursor::new(data), format)?;
    Ok(img.to_rgba8())
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(pixel: [u8; 4]) -> Vec<u8> {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(pixel));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ExtendedColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_webp(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(!is_webp(b"RIFF\0\0\0\0WAVE"));
    }

    #[test]
    fn test_remote_sources_are_refused() {
        for src in ["https://cdn.example.com/me.png", "HTTP://x/y.jpg", "//cdn/me.png"] {
            assert!(matches!(load_image(src), Err(ImageError::CrossOrigin(_))), "{src}");
        }
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(matches!(
            load_image("data:image/png;base64"),
            Err(ImageError::InvalidDataUri(_))
        ));
        assert!(matches!(
            load_image("data:text/plain;base64,aGk="),
            Err(ImageError::InvalidDataUri(_))
        ));
    }

    #[test]
    fn test_too_short_and_unsupported() {
        assert!(matches!(decode_image_bytes(&[0x00, 0x01]), Err(ImageError::TooShort)));
        assert!(matches!(
            decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_decode_png_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255]));
        let img = load_image(&format!("data:image/png;base64,{b64}")).unwrap();
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_decode_jpeg_from_file() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ExtendedColorType::Rgb8)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, &buf).unwrap();

        let loaded = load_image(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.dimensions(), (2, 2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_image("/definitely/not/here.png"),
            Err(ImageError::Io { .. })
        ));
    }
}
