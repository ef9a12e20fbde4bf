//! Faces compiled into the binary, so every palette family renders real
//! glyphs with no font directory configured. All come from the DejaVu
//! family (see `fonts/LICENSE`): sans for Inter and Lato, condensed sans
//! for Oswald, serif for EB Garamond and Computer Modern.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::{FontFace, FontKey};
use crate::customize::FontChoice;
use crate::style::{FontStyle, FontWeight};

static SANS: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
static SANS_BOLD: &[u8] = include_bytes!("../../fonts/DejaVuSans-Bold.ttf");
static SANS_ITALIC: &[u8] = include_bytes!("../../fonts/DejaVuSans-Oblique.ttf");
static CONDENSED: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed.ttf");
static CONDENSED_BOLD: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed-Bold.ttf");
static CONDENSED_ITALIC: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed-Oblique.ttf");
static SERIF: &[u8] = include_bytes!("../../fonts/DejaVuSerif.ttf");
static SERIF_BOLD: &[u8] = include_bytes!("../../fonts/DejaVuSerif-Bold.ttf");
static SERIF_ITALIC: &[u8] = include_bytes!("../../fonts/DejaVuSerif-Italic.ttf");

fn variants(font: FontChoice) -> [(FontWeight, FontStyle, &'static [u8]); 3] {
    let (regular, bold, italic) = match font {
        FontChoice::Inter | FontChoice::Lato => (SANS, SANS_BOLD, SANS_ITALIC),
        FontChoice::Oswald => (CONDENSED, CONDENSED_BOLD, CONDENSED_ITALIC),
        FontChoice::EbGaramond | FontChoice::ComputerModern => (SERIF, SERIF_BOLD, SERIF_ITALIC),
    };
    [
        (FontWeight::Regular, FontStyle::Normal, regular),
        (FontWeight::Bold, FontStyle::Normal, bold),
        (FontWeight::Regular, FontStyle::Italic, italic),
    ]
}

/// Bundled faces for every palette family, parsed on first use.
pub(super) fn faces() -> &'static HashMap<FontKey, FontFace> {
    static FACES: OnceLock<HashMap<FontKey, FontFace>> = OnceLock::new();
    FACES.get_or_init(|| {
        let mut faces = HashMap::new();
        for font in FontChoice::ALL {
            for (weight, style, data) in variants(font) {
                match FontFace::bundled(data) {
                    Ok(face) => {
                        faces.insert(FontKey { font, weight, style }, face);
                    }
                    Err(e) => tracing::warn!(font = %font, error = %e, "bundled face failed to parse"),
                }
            }
        }
        faces
    })
}
