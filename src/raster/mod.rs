//! # Rasterizer
//!
//! Paints a [`LayoutPage`] onto an RGBA bitmap at an integer multiple of
//! CSS pixel density. Print needs at least 2x: a Letter page at 2x is
//! 1632×2112 px, roughly 192 DPI.
//!
//! The canvas starts solid white and is always opaque, so the PDF stage
//! can drop the alpha channel. Anything drawn past the page edge is
//! clipped. Output depends only on the page and the fonts, so
//! the same inputs always produce the same pixels.

mod glyph;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;

use crate::error::RasterError;
use crate::font::FontBook;
use crate::image_loader;
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::Color;

/// The lowest scale that still prints sharply.
pub const MIN_SCALE: u32 = 2;

/// A rendered page bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pixels: RgbaImage,
    scale: u32,
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Packed 8-bit RGB samples, row-major, alpha dropped.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect()
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.pixels.write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

pub struct Rasterizer<'a> {
    fonts: &'a FontBook,
    scale: u32,
}

impl<'a> Rasterizer<'a> {
    pub fn new(fonts: &'a FontBook, scale: u32) -> Result<Self, RasterError> {
        if scale < MIN_SCALE {
            return Err(RasterError::ScaleTooLow(scale));
        }
        Ok(Self { fonts, scale })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Paint every element of `page` in order.
    ///
    /// Fails if the profile photo cannot be loaded: a page that silently
    /// drops the photo is not what the user sees in the preview.
    pub fn rasterize(&self, page: &LayoutPage) -> Result<Raster, RasterError> {
        let s = self.scale as f64;
        let width = (page.width * s).round() as u32;
        let height = (page.height * s).round() as u32;
        let mut canvas = Blend(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])));

        for element in &page.elements {
            self.draw(&mut canvas, element)?;
        }

        tracing::debug!(width, height, elements = page.elements.len(), "rasterized page");
        Ok(Raster {
            pixels: canvas.0,
            scale: self.scale,
        })
    }

    fn draw(&self, canvas: &mut Blend<RgbaImage>, el: &LayoutElement) -> Result<(), RasterError> {
        let s = self.scale as f64;
        match &el.draw {
            DrawCommand::Rect { fill } => {
                fill_box(canvas, el.x * s, el.y * s, el.width * s, el.height * s, *fill);
            }
            DrawCommand::Rule { color, thickness } => {
                fill_box(canvas, el.x * s, el.y * s, el.width * s, thickness * s, *color);
            }
            DrawCommand::Text {
                text,
                style,
                baseline,
            } => {
                glyph::draw_text(canvas, self.fonts, text, style, el.x * s, baseline * s, s);
            }
            DrawCommand::Image { src } => {
                let photo = image_loader::load_image(src)?;
                let w = (el.width * s).round().max(1.0) as u32;
                let h = (el.height * s).round().max(1.0) as u32;
                let fitted = cover(&photo, w, h);
                imageops::overlay(&mut canvas.0, &fitted, (el.x * s).round() as i64, (el.y * s).round() as i64);
            }
        }
        Ok(())
    }
}

/// Fill a device-space box, snapped to whole pixels. Anything thinner than
/// a pixel still draws one pixel wide.
fn fill_box(canvas: &mut Blend<RgbaImage>, x: f64, y: f64, w: f64, h: f64, color: Color) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let (left, top) = (x.round(), y.round());
    let width = ((x + w).round() - left).max(1.0) as u32;
    let height = ((y + h).round() - top).max(1.0) as u32;
    let rect = Rect::at(left as i32, top as i32).of_size(width, height);
    draw_filled_rect_mut(canvas, rect, Rgba(color.to_rgba8()));
}

/// Scale and center-crop `img` to exactly `w`×`h`, preserving aspect ratio.
fn cover(img: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let (iw, ih) = img.dimensions();
    let ratio = (w as f64 / iw as f64).max(h as f64 / ih as f64);
    let sw = ((iw as f64 * ratio).ceil() as u32).max(w);
    let sh = ((ih as f64 * ratio).ceil() as u32).max(h);
    let scaled = imageops::resize(img, sw, sh, FilterType::Triangle);
    imageops::crop_imm(&scaled, (sw - w) / 2, (sh - h) / 2, w, h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::{RenderStyle, StylePreferences};
    use crate::layout::{ElementRole, LayoutRenderer, RenderMode};
    use crate::model::ResumeDocument;
    use crate::template::TemplateId;

    fn page_with(elements: Vec<LayoutElement>) -> LayoutPage {
        LayoutPage {
            template: TemplateId::Classic,
            width: 816.0,
            height: 1056.0,
            elements,
            content_bottom: 0.0,
        }
    }

    fn png_data_uri(w: u32, h: u32, pixel: [u8; 4]) -> String {
        use base64::Engine;
        let img = RgbaImage::from_pixel(w, h, Rgba(pixel));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
        )
    }

    #[test]
    fn test_scale_below_two_is_rejected() {
        let fonts = FontBook::new();
        assert!(matches!(Rasterizer::new(&fonts, 1), Err(RasterError::ScaleTooLow(1))));
        assert!(Rasterizer::new(&fonts, 2).is_ok());
    }

    #[test]
    fn test_canvas_size_and_white_background() {
        let fonts = FontBook::new();
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![])).unwrap();
        assert_eq!((raster.width(), raster.height()), (1632, 2112));
        assert!(raster.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));
        assert_eq!(raster.to_rgb_bytes().len(), 1632 * 2112 * 3);
    }

    #[test]
    fn test_rect_is_scaled() {
        let fonts = FontBook::new();
        let rect = LayoutElement {
            x: 10.0,
            y: 10.0,
            width: 5.0,
            height: 5.0,
            draw: DrawCommand::Rect { fill: Color::hex("#ff0000") },
            role: ElementRole::Background,
        };
        let raster = Rasterizer::new(&fonts, 3).unwrap().rasterize(&page_with(vec![rect])).unwrap();
        assert_eq!(raster.pixels().get_pixel(30, 30).0, [255, 0, 0, 255]);
        assert_eq!(raster.pixels().get_pixel(44, 44).0, [255, 0, 0, 255]);
        assert_eq!(raster.pixels().get_pixel(45, 45).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_hairline_rule_still_draws() {
        let fonts = FontBook::new();
        let rule = LayoutElement {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 0.2,
            draw: DrawCommand::Rule { color: Color::hex("#2563eb"), thickness: 0.2 },
            role: ElementRole::Divider,
        };
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![rule])).unwrap();
        let blue = raster.pixels().pixels().filter(|p| p.0 == [0x25, 0x63, 0xeb, 255]).count();
        assert_eq!(blue, 200);
    }

    #[test]
    fn test_translucent_fill_blends_over_white() {
        let fonts = FontBook::new();
        let rect = LayoutElement {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            draw: DrawCommand::Rect { fill: Color { a: 0.5, ..Color::BLACK } },
            role: ElementRole::Background,
        };
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![rect])).unwrap();
        let p = raster.pixels().get_pixel(5, 5).0;
        assert_eq!(p[3], 255);
        assert!(p[0] > 100 && p[0] < 160, "{p:?}");
    }

    #[test]
    fn test_photo_is_drawn_into_its_box() {
        let fonts = FontBook::new();
        let photo = LayoutElement {
            x: 100.0,
            y: 100.0,
            width: 20.0,
            height: 20.0,
            draw: DrawCommand::Image { src: png_data_uri(4, 8, [0, 0, 255, 255]) },
            role: ElementRole::Photo,
        };
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![photo])).unwrap();
        assert_eq!(raster.pixels().get_pixel(220, 220).0, [0, 0, 255, 255]);
        assert_eq!(raster.pixels().get_pixel(241, 241).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_remote_photo_fails_rasterization() {
        let fonts = FontBook::new();
        let photo = LayoutElement {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            draw: DrawCommand::Image { src: "https://example.com/me.jpg".to_string() },
            role: ElementRole::Photo,
        };
        let err = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![photo])).unwrap_err();
        assert!(matches!(err, RasterError::Photo(crate::error::ImageError::CrossOrigin(_))));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let fonts = FontBook::new();
        let mut doc = ResumeDocument::new();
        doc.personal.full_name = "Jane Doe".to_string();
        doc.summary = "Engineer who ships.".to_string();
        let style = RenderStyle::resolve(TemplateId::Modern, &StylePreferences::default());
        let page = LayoutRenderer::new(&fonts).render(&doc, TemplateId::Modern, &style, RenderMode::Final);
        let r = Rasterizer::new(&fonts, 2).unwrap();
        let a = r.rasterize(&page).unwrap();
        let b = r.rasterize(&page).unwrap();
        assert!(a == b);
        assert!(a.pixels().pixels().any(|p| p.0 != [255, 255, 255, 255]));
    }

    #[test]
    fn test_name_is_painted_as_glyphs() {
        let fonts = FontBook::new();
        let mut doc = ResumeDocument::new();
        doc.personal.full_name = "OOOO".to_string();
        let style = RenderStyle::resolve(TemplateId::Classic, &StylePreferences::default());
        let page = LayoutRenderer::new(&fonts).render(&doc, TemplateId::Classic, &style, RenderMode::Final);
        let name = page
            .elements
            .iter()
            .find(|e| e.text() == Some("OOOO"))
            .unwrap();
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page).unwrap();

        // Across the middle of the name, each letter leaves a hole: four
        // letters make eight ink runs.
        let DrawCommand::Text { baseline, style, .. } = &name.draw else {
            panic!("name is not text");
        };
        let cap_middle = ((baseline - style.size * 0.36) * 2.0).round() as u32;
        let x0 = (name.x * 2.0) as u32;
        let x1 = ((name.x + name.width) * 2.0) as u32 + 4;
        let mut runs = 0;
        let mut inside = false;
        for x in x0..x1 {
            let dark = raster.pixels().get_pixel(x, cap_middle).0[0] < 160;
            if dark && !inside {
                runs += 1;
            }
            inside = dark;
        }
        assert_eq!(runs, 8);
    }

    #[test]
    fn test_to_png_has_signature() {
        let fonts = FontBook::new();
        let raster = Rasterizer::new(&fonts, 2).unwrap().rasterize(&page_with(vec![])).unwrap();
        let png = raster.to_png().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_cover_crops_to_exact_size() {
        let img = RgbaImage::from_pixel(10, 40, Rgba([1, 2, 3, 255]));
        let out = cover(&img, 30, 30);
        assert_eq!(out.dimensions(), (30, 30));
    }
}
