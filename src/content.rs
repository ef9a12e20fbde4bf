//! Content predicates and text helpers shared by every template.
//!
//! Whether a section renders (or shows placeholder content instead) is
//! decided here and nowhere else, so the preview and the exported page can
//! never disagree about what counts as empty.

use serde::{Deserialize, Serialize};

use crate::model::*;

/// Whether an entry carries anything worth rendering.
pub trait HasContent {
    fn has_content(&self) -> bool;
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

impl HasContent for ExperienceEntry {
    fn has_content(&self) -> bool {
        filled(&self.company) || filled(&self.position) || filled(&self.description)
    }
}

impl HasContent for EducationEntry {
    fn has_content(&self) -> bool {
        filled(&self.school) || filled(&self.degree) || filled(&self.field)
    }
}

impl HasContent for SkillEntry {
    fn has_content(&self) -> bool {
        filled(&self.name)
    }
}

impl HasContent for ToolEntry {
    fn has_content(&self) -> bool {
        filled(&self.name)
    }
}

impl HasContent for LanguageEntry {
    fn has_content(&self) -> bool {
        filled(&self.name)
    }
}

impl HasContent for CertificationEntry {
    fn has_content(&self) -> bool {
        filled(&self.name)
    }
}

impl HasContent for ProjectEntry {
    fn has_content(&self) -> bool {
        filled(&self.name) || filled(&self.description)
    }
}

/// True iff at least one entry has content.
pub fn section_has_content<T: HasContent>(entries: &[T]) -> bool {
    entries.iter().any(HasContent::has_content)
}

/// The entries of a list that have content, in order.
pub fn with_content<T: HasContent>(entries: &[T]) -> impl Iterator<Item = &T> {
    entries.iter().filter(|e| e.has_content())
}

/// A named block of resume content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Tools,
    Languages,
    Certifications,
    Projects,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Tools,
        SectionKind::Languages,
        SectionKind::Certifications,
        SectionKind::Projects,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Tools => "Tools",
            SectionKind::Languages => "Languages",
            SectionKind::Certifications => "Certifications",
            SectionKind::Projects => "Projects",
        }
    }

    /// Sections that live in the narrow column of a two-column template.
    pub fn is_side_section(&self) -> bool {
        matches!(
            self,
            SectionKind::Skills
                | SectionKind::Tools
                | SectionKind::Languages
                | SectionKind::Certifications
                | SectionKind::Education
        )
    }
}

impl ResumeDocument {
    pub fn section_has_content(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Summary => filled(&self.summary),
            SectionKind::Experience => section_has_content(&self.experience),
            SectionKind::Education => section_has_content(&self.education),
            SectionKind::Skills => section_has_content(&self.skills),
            SectionKind::Tools => section_has_content(&self.tools),
            SectionKind::Languages => section_has_content(&self.languages),
            SectionKind::Certifications => section_has_content(&self.certifications),
            SectionKind::Projects => section_has_content(&self.projects),
        }
    }
}

/// Glyphs that only ever act as bullets.
const BULLET_GLYPHS: &[char] = &['•', '▪'];
/// Characters that act as a bullet only when a space follows, since they
/// can also start the text itself ("-5% churn").
const SPACED_MARKERS: &[char] = &['-', '*', '–', '—', '·'];

/// Split a multi-line description into bullet texts.
///
/// Blank lines are dropped and one leading bullet marker typed by the user
/// is stripped; the renderer adds its own glyph.
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    let mut chars = line.chars();
    match chars.next() {
        Some(c) if BULLET_GLYPHS.contains(&c) => chars.as_str().trim_start(),
        Some(c) if SPACED_MARKERS.contains(&c) => {
            let rest = chars.as_str();
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                line
            }
        }
        _ => line,
    }
}

/// Format a date range as `start - end`.
///
/// `end` becomes "Present" whenever `current` is set, whatever it holds.
pub fn date_range(start: &str, end: Option<&str>, current: bool) -> String {
    let start = start.trim();
    let end = if current {
        "Present"
    } else {
        end.map(str::trim).unwrap_or("")
    };
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start} - {end}"),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bullets_counts_non_blank_lines() {
        let bullets = split_bullets("Built things\n\n   \nShipped things\n");
        assert_eq!(bullets, vec!["Built things", "Shipped things"]);
    }

    #[test]
    fn test_split_bullets_strips_user_markers() {
        let bullets = split_bullets("• Led team\n- Cut costs\r\n  * Wrote docs\n•Tight bullet\n– En dash");
        assert_eq!(bullets, vec!["Led team", "Cut costs", "Wrote docs", "Tight bullet", "En dash"]);
    }

    #[test]
    fn test_split_bullets_keeps_leading_text_dashes() {
        let bullets = split_bullets("-5% churn\n--verbose flag\n- - nested");
        assert_eq!(bullets, vec!["-5% churn", "--verbose flag", "- nested"]);
    }

    #[test]
    fn test_split_bullets_keeps_inner_dashes() {
        assert_eq!(split_bullets("Cut p99 latency - by 40%"), vec!["Cut p99 latency - by 40%"]);
    }

    #[test]
    fn test_split_bullets_marker_only_line_is_dropped() {
        assert!(split_bullets("•\n - \n").is_empty());
    }

    #[test]
    fn test_date_range_current_overrides_end() {
        assert_eq!(date_range("2020", Some("2022"), true), "2020 - Present");
        assert_eq!(date_range("2020", None, true), "2020 - Present");
    }

    #[test]
    fn test_date_range_collapses_blank_halves() {
        assert_eq!(date_range("2018", Some("2020"), false), "2018 - 2020");
        assert_eq!(date_range("2018", None, false), "2018");
        assert_eq!(date_range(" ", Some("2020"), false), "2020");
        assert_eq!(date_range("", None, false), "");
    }

    #[test]
    fn test_blank_entries_have_no_content() {
        let doc = ResumeDocument::new();
        for kind in SectionKind::ALL {
            assert!(!doc.section_has_content(kind), "{kind:?} should be empty");
        }
    }

    #[test]
    fn test_any_filled_entry_makes_section_non_empty() {
        let mut doc = ResumeDocument::new();
        doc.skills.push(SkillEntry {
            name: "Rust".to_string(),
            ..SkillEntry::blank()
        });
        assert!(doc.section_has_content(SectionKind::Skills));
        assert_eq!(with_content(&doc.skills).count(), 1);
    }

    #[test]
    fn test_side_sections() {
        assert!(SectionKind::Education.is_side_section());
        assert!(!SectionKind::Experience.is_side_section());
        assert!(!SectionKind::Summary.is_side_section());
    }
}
