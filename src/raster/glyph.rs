//! Painting text runs.
//!
//! Glyphs are placed one by one at the advances layout measured, so letter
//! spacing and line widths on the bitmap match the laid-out page. Each
//! glyph is drawn by imageproc from the face's `ab_glyph` outline.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, Blend};

use crate::font::{FontBook, FontKey};
use crate::style::{FontWeight, TextStyle};

/// Offset of the second strike for synthetic bold, in CSS px.
const SYNTHETIC_BOLD_OFFSET: f64 = 0.4;

/// Paint one line of text. `x` and `baseline` are in device pixels; `scale`
/// converts the style's CSS px to device pixels.
pub fn draw_text(
    canvas: &mut Blend<RgbaImage>,
    fonts: &FontBook,
    text: &str,
    style: &TextStyle,
    x: f64,
    baseline: f64,
    scale: f64,
) {
    let wanted = FontKey::of(style);
    let Some((key, font)) = fonts
        .resolve(wanted)
        .and_then(|(key, face)| face.glyphs().map(|font| (key, font)))
    else {
        tracing::warn!(font = %wanted.font, "no usable face, text run skipped");
        return;
    };

    let px = em_scale(&font, style.size * scale);
    // imageproc places the top of the line box at `y`, the baseline one
    // ascent below it.
    let top = (baseline - font.as_scaled(px).ascent() as f64).round() as i32;
    let color = Rgba(style.color.to_rgba8());
    let embolden = wanted.weight == FontWeight::Bold && key.weight == FontWeight::Regular;
    let bold_offset = ((SYNTHETIC_BOLD_OFFSET * scale).round() as i32).max(1);

    let mut pen = x;
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        if !ch.is_whitespace() {
            let glyph = ch.encode_utf8(&mut buf);
            let left = pen.round() as i32;
            draw_text_mut(canvas, color, left, top, px, &font, glyph);
            if embolden {
                draw_text_mut(canvas, color, left + bold_offset, top, px, &font, glyph);
            }
        }
        pen += (fonts.char_width(ch, style) + style.letter_spacing) * scale;
    }
}

/// The `ab_glyph` scale whose em is `size` pixels. `PxScale` measures the
/// ascent-to-descent height, not the em.
fn em_scale(font: &impl Font, size: f64) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0) as f64;
    PxScale::from((size * font.height_unscaled() as f64 / units_per_em) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::FontChoice;
    use crate::style::{Color, FontStyle};

    fn blank(w: u32, h: u32) -> Blend<RgbaImage> {
        Blend(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    fn is_ink(p: &Rgba<u8>) -> bool {
        p.0[0] < 128
    }

    fn ink(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| is_ink(p)).count()
    }

    #[test]
    fn test_letter_o_keeps_its_counter() {
        let fonts = FontBook::new();
        let style = TextStyle::new(FontChoice::Inter, 200.0, 1.2, Color::BLACK);
        let mut canvas = blank(300, 300);
        draw_text(&mut canvas, &fonts, "O", &style, 20.0, 240.0, 1.0);
        let img = &canvas.0;

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| is_ink(p))
            .map(|(x, y, _)| (x, y))
            .collect();
        let min_y = inked.iter().map(|&(_, y)| y).min().unwrap();
        let max_y = inked.iter().map(|&(_, y)| y).max().unwrap();
        let min_x = inked.iter().map(|&(x, _)| x).min().unwrap();
        let max_x = inked.iter().map(|&(x, _)| x).max().unwrap();
        let mid_y = (min_y + max_y) / 2;

        // Ink, hole, ink across the middle of the glyph.
        let mut runs = 0;
        let mut inside = false;
        for x in 0..img.width() {
            let dark = is_ink(img.get_pixel(x, mid_y));
            if dark && !inside {
                runs += 1;
            }
            inside = dark;
        }
        assert_eq!(runs, 2);
        assert_eq!(img.get_pixel((min_x + max_x) / 2, mid_y).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_text_sits_on_the_baseline() {
        let fonts = FontBook::new();
        let style = TextStyle::new(FontChoice::Lato, 40.0, 1.2, Color::BLACK);
        let mut canvas = blank(300, 100);
        draw_text(&mut canvas, &fonts, "HELLO", &style, 10.0, 60.0, 1.0);
        let img = &canvas.0;
        assert!(ink(img) > 200);
        // Capitals have no descenders: nothing inked below the baseline.
        assert!((62..100).all(|y| (0..300).all(|x| !is_ink(img.get_pixel(x, y)))));
        // Cap height is well above half the em.
        assert!((0..300).any(|x| is_ink(img.get_pixel(x, 35))));
    }

    #[test]
    fn test_bold_covers_more_than_regular() {
        let fonts = FontBook::new();
        let regular = TextStyle::new(FontChoice::EbGaramond, 30.0, 1.2, Color::BLACK);
        let mut plain = blank(400, 60);
        let mut heavy = blank(400, 60);
        draw_text(&mut plain, &fonts, "Engineer", &regular, 0.0, 40.0, 1.0);
        draw_text(&mut heavy, &fonts, "Engineer", &regular.bold(), 0.0, 40.0, 1.0);
        assert!(ink(&heavy.0) > ink(&plain.0));
    }

    #[test]
    fn test_synthetic_bold_overstrikes_italic() {
        // No bundled bold italic: bold resolves to the italic face, doubled.
        let fonts = FontBook::new();
        let italic = TextStyle {
            style: FontStyle::Italic,
            ..TextStyle::new(FontChoice::Inter, 30.0, 1.2, Color::BLACK)
        };
        let bold_italic = TextStyle {
            weight: FontWeight::Bold,
            ..italic
        };
        let mut plain = blank(400, 60);
        let mut heavy = blank(400, 60);
        draw_text(&mut plain, &fonts, "Present", &italic, 0.0, 40.0, 2.0);
        draw_text(&mut heavy, &fonts, "Present", &bold_italic, 0.0, 40.0, 2.0);
        assert!(ink(&heavy.0) > ink(&plain.0));
    }

    #[test]
    fn test_whitespace_draws_nothing() {
        let fonts = FontBook::new();
        let style = TextStyle::new(FontChoice::Lato, 20.0, 1.2, Color::BLACK);
        let mut canvas = blank(100, 40);
        draw_text(&mut canvas, &fonts, "   ", &style, 0.0, 30.0, 1.0);
        assert!(canvas.0.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_canvas_stays_opaque_under_translucent_text() {
        let fonts = FontBook::new();
        let color = Color { a: 0.5, ..Color::BLACK };
        let style = TextStyle::new(FontChoice::Oswald, 30.0, 1.2, color);
        let mut canvas = blank(200, 50);
        draw_text(&mut canvas, &fonts, "Skills", &style, 0.0, 40.0, 1.0);
        assert!(canvas.0.pixels().all(|p| p.0[3] == 255));
        assert!(canvas.0.pixels().any(|p| p.0[0] < 255));
    }
}
