//! # Customization Layer
//!
//! Three independent style knobs: the font family, the text color scheme,
//! and an accent color remembered separately for every template. None of
//! them touch the resume document; they only feed [`RenderStyle`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PreferenceError;
use crate::style::Color;
use crate::template::TemplateId;

/// The font palette offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontChoice {
    /// Clean humanist sans-serif.
    #[default]
    Inter,
    /// Old-style serif.
    EbGaramond,
    /// Geometric humanist sans-serif.
    Lato,
    /// Condensed display sans-serif.
    Oswald,
    /// Traditional TeX serif.
    ComputerModern,
}

impl FontChoice {
    pub const ALL: [FontChoice; 5] = [
        FontChoice::Inter,
        FontChoice::EbGaramond,
        FontChoice::Lato,
        FontChoice::Oswald,
        FontChoice::ComputerModern,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FontChoice::Inter => "inter",
            FontChoice::EbGaramond => "eb-garamond",
            FontChoice::Lato => "lato",
            FontChoice::Oswald => "oswald",
            FontChoice::ComputerModern => "computer-modern",
        }
    }

    /// Family name as it appears in font files and PDF metadata.
    pub fn family_name(&self) -> &'static str {
        match self {
            FontChoice::Inter => "Inter",
            FontChoice::EbGaramond => "EB Garamond",
            FontChoice::Lato => "Lato",
            FontChoice::Oswald => "Oswald",
            FontChoice::ComputerModern => "Computer Modern",
        }
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family_name())
    }
}

impl FromStr for FontChoice {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FontChoice::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(s) || f.family_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PreferenceError::UnknownFont(s.to_string()))
    }
}

/// The text color palette offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextColorScheme {
    #[default]
    Charcoal,
    Slate,
    Navy,
    Espresso,
    Black,
}

/// Resolved colors of a text scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColors {
    /// Names and headings.
    pub primary: Color,
    /// Body text.
    pub secondary: Color,
    /// Dates, locations, placeholders.
    pub muted: Color,
}

impl TextColorScheme {
    pub const ALL: [TextColorScheme; 5] = [
        TextColorScheme::Charcoal,
        TextColorScheme::Slate,
        TextColorScheme::Navy,
        TextColorScheme::Espresso,
        TextColorScheme::Black,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TextColorScheme::Charcoal => "charcoal",
            TextColorScheme::Slate => "slate",
            TextColorScheme::Navy => "navy",
            TextColorScheme::Espresso => "espresso",
            TextColorScheme::Black => "black",
        }
    }

    pub fn colors(&self) -> TextColors {
        let (primary, secondary, muted) = match self {
            TextColorScheme::Charcoal => ("#1f2937", "#374151", "#6b7280"),
            TextColorScheme::Slate => ("#0f172a", "#334155", "#64748b"),
            TextColorScheme::Navy => ("#172554", "#1e3a8a", "#64748b"),
            TextColorScheme::Espresso => ("#3b2a20", "#4a3b31", "#7c6a5d"),
            TextColorScheme::Black => ("#000000", "#111111", "#555555"),
        };
        TextColors {
            primary: Color::hex(primary),
            secondary: Color::hex(secondary),
            muted: Color::hex(muted),
        }
    }
}

impl FromStr for TextColorScheme {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TextColorScheme::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| PreferenceError::UnknownTextColor(s.to_string()))
    }
}

/// The user's style choices. Persisted separately from the resume content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub font: FontChoice,
    pub text_color: TextColorScheme,
    /// Template id → accent hex. Each template remembers its own accent.
    pub accents: BTreeMap<TemplateId, String>,
}

impl StylePreferences {
    pub fn set_font(&mut self, font: FontChoice) {
        self.font = font;
    }

    pub fn set_text_color(&mut self, scheme: TextColorScheme) {
        self.text_color = scheme;
    }

    /// Remember `hex` as the accent of `template`. It must be one of the
    /// template's swatches.
    pub fn set_accent(&mut self, template: TemplateId, hex: &str) -> Result<(), PreferenceError> {
        let wanted = Color::parse_hex(hex);
        let swatch = template
            .descriptor()
            .swatches
            .iter()
            .find(|s| wanted.is_some() && Color::parse_hex(s) == wanted)
            .ok_or_else(|| PreferenceError::UnknownSwatch {
                template,
                color: hex.to_string(),
            })?;
        self.accents.insert(template, swatch.to_string());
        Ok(())
    }

    /// The accent for `template`: its remembered choice, else its default.
    pub fn accent_for(&self, template: TemplateId) -> Color {
        self.accents
            .get(&template)
            .and_then(|hex| Color::parse_hex(hex))
            .unwrap_or_else(|| Color::hex(template.descriptor().default_accent))
    }

    /// Drop remembered accents that are no longer swatches of their template.
    pub fn retain_valid_accents(&mut self) -> usize {
        let before = self.accents.len();
        self.accents.retain(|template, hex| {
            let wanted = Color::parse_hex(hex);
            wanted.is_some()
                && template
                    .descriptor()
                    .swatches
                    .iter()
                    .any(|s| Color::parse_hex(s) == wanted)
        });
        before - self.accents.len()
    }
}

/// Concrete rendering parameters for one template instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub font: FontChoice,
    pub text: TextColors,
    pub accent: Color,
}

impl RenderStyle {
    pub fn resolve(template: TemplateId, prefs: &StylePreferences) -> Self {
        RenderStyle {
            font: prefs.font,
            text: prefs.text_color.colors(),
            accent: prefs.accent_for(template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_is_remembered_per_template() {
        let mut prefs = StylePreferences::default();
        let modern = TemplateId::Modern.descriptor();
        let classic = TemplateId::Classic.descriptor();

        prefs.set_accent(TemplateId::Modern, modern.swatches[2]).unwrap();
        assert_eq!(prefs.accent_for(TemplateId::Modern), Color::hex(modern.swatches[2]));
        assert_eq!(prefs.accent_for(TemplateId::Classic), Color::hex(classic.default_accent));

        prefs.set_accent(TemplateId::Classic, classic.swatches[1]).unwrap();
        assert_eq!(prefs.accent_for(TemplateId::Modern), Color::hex(modern.swatches[2]));
    }

    #[test]
    fn test_accent_must_be_a_swatch() {
        let mut prefs = StylePreferences::default();
        let err = prefs.set_accent(TemplateId::Minimal, "#123456").unwrap_err();
        assert_eq!(
            err,
            PreferenceError::UnknownSwatch {
                template: TemplateId::Minimal,
                color: "#123456".to_string()
            }
        );
        assert!(prefs.set_accent(TemplateId::Minimal, "not a color").is_err());
        assert!(prefs.accents.is_empty());
    }

    #[test]
    fn test_accent_match_ignores_hex_case() {
        let mut prefs = StylePreferences::default();
        let swatch = TemplateId::Creative.descriptor().swatches[0].to_uppercase();
        prefs.set_accent(TemplateId::Creative, &swatch).unwrap();
        assert_eq!(
            prefs.accents[&TemplateId::Creative],
            TemplateId::Creative.descriptor().swatches[0]
        );
    }

    #[test]
    fn test_retain_valid_accents_drops_stale_entries() {
        let mut prefs = StylePreferences::default();
        prefs.accents.insert(TemplateId::Modern, "#abcdef".to_string());
        prefs
            .accents
            .insert(TemplateId::Classic, TemplateId::Classic.descriptor().swatches[0].to_string());
        assert_eq!(prefs.retain_valid_accents(), 1);
        assert!(prefs.accents.contains_key(&TemplateId::Classic));
    }

    #[test]
    fn test_font_and_color_parse() {
        assert_eq!("eb-garamond".parse::<FontChoice>(), Ok(FontChoice::EbGaramond));
        assert_eq!("Lato".parse::<FontChoice>(), Ok(FontChoice::Lato));
        assert!("comic-sans".parse::<FontChoice>().is_err());
        assert_eq!("navy".parse::<TextColorScheme>(), Ok(TextColorScheme::Navy));
    }

    #[test]
    fn test_render_style_resolves_all_knobs() {
        let prefs = StylePreferences {
            font: FontChoice::Oswald,
            text_color: TextColorScheme::Slate,
            ..Default::default()
        };
        let style = RenderStyle::resolve(TemplateId::Executive, &prefs);
        assert_eq!(style.font, FontChoice::Oswald);
        assert_eq!(style.text, TextColorScheme::Slate.colors());
        assert_eq!(style.accent, Color::hex(TemplateId::Executive.descriptor().default_accent));
    }
}
