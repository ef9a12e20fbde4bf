//! # Font Management
//!
//! Measuring and outlining text for the five palette families.
//!
//! Layout needs advance widths; rasterization needs glyph outlines. Both
//! come from the same face so the painted text lands exactly where layout
//! measured it. Faces registered in a [`FontBook`] (from a font directory)
//! take precedence; every family also has a bundled face, so text is always
//! drawn with real glyphs.

mod builtin;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::customize::FontChoice;
use crate::error::FontError;
use crate::style::{FontStyle, FontWeight, TextStyle};

/// Advance used only if no face at all resolves for a key.
const FALLBACK_ADVANCE_EM: f64 = 0.5;
const FALLBACK_ASCENT_EM: f64 = 0.8;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub font: FontChoice,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontKey {
    pub fn of(style: &TextStyle) -> Self {
        FontKey {
            font: style.font,
            weight: style.weight,
            style: style.style,
        }
    }
}

/// Parsed metrics from a TrueType/OpenType face.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    advance_widths: HashMap<char, u16>,
    default_advance: u16,
}

impl FaceMetrics {
    fn from_face(face: &ttf_parser::Face<'_>) -> Self {
        let units_per_em = face.units_per_em();
        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Latin, Latin-1, general punctuation: what resumes are written in.
        let ranges = [0x20u32..=0x7E, 0xA0..=0x17F, 0x2010..=0x2044];
        for code in ranges.into_iter().flatten() {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        FaceMetrics {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            advance_widths,
            default_advance,
        }
    }

    /// Advance of `ch` in px at `font_size` px.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }
}

#[derive(Debug, Clone)]
enum FaceData {
    Bundled(&'static [u8]),
    Loaded(Arc<Vec<u8>>),
}

impl FaceData {
    fn bytes(&self) -> &[u8] {
        match self {
            FaceData::Bundled(data) => data,
            FaceData::Loaded(data) => data.as_slice(),
        }
    }
}

/// A parsed TrueType face, bundled or loaded from disk.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: FaceData,
    pub metrics: FaceMetrics,
}

impl FontFace {
    pub fn parse(data: Vec<u8>) -> Result<Self, FontError> {
        Self::from_data(FaceData::Loaded(Arc::new(data)))
    }

    fn bundled(data: &'static [u8]) -> Result<Self, FontError> {
        Self::from_data(FaceData::Bundled(data))
    }

    fn from_data(data: FaceData) -> Result<Self, FontError> {
        let metrics = {
            let face = ttf_parser::Face::parse(data.bytes(), 0).map_err(|e| FontError::Parse(e.to_string()))?;
            FaceMetrics::from_face(&face)
        };
        Ok(FontFace { data, metrics })
    }

    /// The face as an `ab_glyph` font for drawing. Parsing only reads
    /// table offsets, so this is cheap.
    pub fn glyphs(&self) -> Option<ab_glyph::FontRef<'_>> {
        ab_glyph::FontRef::try_from_slice(self.data.bytes()).ok()
    }
}

/// Registry of faces keyed by family, weight and style, backed by the
/// bundled faces.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    faces: HashMap<FontKey, FontFace>,
}

impl FontBook {
    /// A book with no registered faces. Every family still resolves to its
    /// bundled face.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: FontKey, data: Vec<u8>) -> Result<(), FontError> {
        let face = FontFace::parse(data)?;
        self.faces.insert(key, face);
        Ok(())
    }

    /// Number of registered faces, bundled ones excluded.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Register every `.ttf`/`.otf` in `dir` whose file name names a palette
    /// family, e.g. `Inter-Bold.ttf` or `EBGaramond-Italic.otf`.
    ///
    /// Returns how many faces were registered. Unreadable or unparseable
    /// files are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, FontError> {
        let entries = std::fs::read_dir(dir).map_err(|source| FontError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if !is_font {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(key_from_file_stem) else {
                continue;
            };
            match std::fs::read(&path).map_err(|e| FontError::Parse(e.to_string())).and_then(|data| self.register(key, data)) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), font = %key.font, "registered font face");
                    loaded += 1;
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font file"),
            }
        }
        Ok(loaded)
    }

    /// The best face for `key`: exact match, then the regular weight in the
    /// same style, then the family's regular face. At each step a registered
    /// face wins over the bundled one. Returns the key that matched so
    /// callers can synthesize what is missing.
    pub fn resolve(&self, key: FontKey) -> Option<(FontKey, &FontFace)> {
        let bundled = builtin::faces();
        let candidates = [
            key,
            FontKey {
                weight: FontWeight::Regular,
                ..key
            },
            FontKey {
                weight: FontWeight::Regular,
                style: FontStyle::Normal,
                ..key
            },
        ];
        candidates.into_iter().find_map(|k| {
            self.faces
                .get(&k)
                .or_else(|| bundled.get(&k))
                .map(|face| (k, face))
        })
    }

    pub fn face(&self, key: FontKey) -> Option<&FontFace> {
        self.resolve(key).map(|(_, face)| face)
    }

    /// Advance width of one character in px, letter spacing excluded.
    pub fn char_width(&self, ch: char, style: &TextStyle) -> f64 {
        match self.face(FontKey::of(style)) {
            Some(face) => face.metrics.char_width(ch, style.size),
            None => FALLBACK_ADVANCE_EM * style.size,
        }
    }

    /// Width of `text` in px, letter spacing included.
    pub fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, style) + style.letter_spacing)
            .sum()
    }

    /// Distance from the top of the em box to the baseline, in px.
    pub fn ascent(&self, style: &TextStyle) -> f64 {
        match self.face(FontKey::of(style)) {
            Some(face) => {
                face.metrics.ascender as f64 / face.metrics.units_per_em as f64 * style.size
            }
            None => FALLBACK_ASCENT_EM * style.size,
        }
    }
}

/// Map a file stem like `Inter-BoldItalic` to a font key.
fn key_from_file_stem(stem: &str) -> Option<FontKey> {
    let (family, variant) = match stem.split_once('-') {
        Some((family, variant)) => (family, variant),
        None => (stem, "Regular"),
    };
    let family: String = family.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let font = FontChoice::ALL.into_iter().find(|f| {
        let name: String = f
            .family_name()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        name.eq_ignore_ascii_case(&family)
    })?;

    let variant = variant.to_ascii_lowercase();
    let weight = if variant.contains("bold") || variant.contains("semibold") {
        FontWeight::Bold
    } else {
        FontWeight::Regular
    };
    let style = if variant.contains("italic") || variant.contains("oblique") {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    };
    Some(FontKey {
        font,
        weight,
        style,
    })
}
