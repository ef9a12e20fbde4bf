//! # Template Registry
//!
//! The closed set of visual templates. A template is a named layout plus
//! style tables applied to the same resume data. Lookups are an exhaustive
//! `match` over [`TemplateId`], so adding a template without its tables
//! fails to compile instead of silently borrowing another template's look.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PreferenceError;
use crate::style::{Edges, TextAlign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Minimal,
    Executive,
    Creative,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateCategory {
    Professional,
    Modern,
    Simple,
    Creative,
}

/// How sections are arranged on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnLayout {
    /// Every section stacked in one column.
    Single,
    /// A narrow side column (skills, tools, languages, certifications,
    /// education) next to a wide main column.
    TwoColumn {
        /// Width of the side column as a percentage of the content width.
        side_percent: f64,
        /// Whether the side column is on the left.
        side_first: bool,
    },
}

/// One entry of a type table: size in px and line-height multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeSize {
    pub size: f64,
    pub leading: f64,
}

const fn ts(size: f64, leading: f64) -> TypeSize {
    TypeSize { size, leading }
}

/// Per-role type sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeScale {
    pub name: TypeSize,
    pub title: TypeSize,
    pub section_header: TypeSize,
    pub entry_heading: TypeSize,
    pub body: TypeSize,
    pub meta: TypeSize,
}

/// Everything the layout renderer needs to know about a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: &'static str,
    pub category: TemplateCategory,
    pub columns: ColumnLayout,
    pub type_scale: TypeScale,
    /// Page padding in px.
    pub padding: Edges,
    /// Vertical gap between sections in px.
    pub section_gap: f64,
    pub header_align: TextAlign,
    /// Paint the header as a band of accent color with white text.
    pub header_band: bool,
    /// Background tint for the side column, if any.
    pub side_background: Option<&'static str>,
    pub default_accent: &'static str,
    /// Accent colors the user may pick from.
    pub swatches: &'static [&'static str],
}

static CLASSIC: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Classic,
    name: "Classic",
    category: TemplateCategory::Professional,
    columns: ColumnLayout::Single,
    type_scale: TypeScale {
        name: ts(28.0, 1.2),
        title: ts(14.0, 1.3),
        section_header: ts(13.0, 1.3),
        entry_heading: ts(12.5, 1.35),
        body: ts(11.5, 1.45),
        meta: ts(10.5, 1.4),
    },
    padding: Edges {
        top: 48.0,
        right: 56.0,
        bottom: 48.0,
        left: 56.0,
    },
    section_gap: 14.0,
    header_align: TextAlign::Center,
    header_band: false,
    side_background: None,
    default_accent: "#1f2937",
    swatches: &["#1f2937", "#1e3a8a", "#7f1d1d", "#14532d"],
};

static MODERN: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Modern,
    name: "Modern",
    category: TemplateCategory::Modern,
    columns: ColumnLayout::TwoColumn {
        side_percent: 33.0,
        side_first: true,
    },
    type_scale: TypeScale {
        name: ts(30.0, 1.15),
        title: ts(14.0, 1.3),
        section_header: ts(12.5, 1.3),
        entry_heading: ts(12.5, 1.35),
        body: ts(11.0, 1.45),
        meta: ts(10.0, 1.4),
    },
    padding: Edges {
        top: 40.0,
        right: 40.0,
        bottom: 40.0,
        left: 40.0,
    },
    section_gap: 16.0,
    header_align: TextAlign::Left,
    header_band: true,
    side_background: Some("#f3f4f6"),
    default_accent: "#2563eb",
    swatches: &["#2563eb", "#0d9488", "#7c3aed", "#db2777", "#ea580c"],
};

static MINIMAL: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Minimal,
    name: "Minimal",
    category: TemplateCategory::Simple,
    columns: ColumnLayout::Single,
    type_scale: TypeScale {
        name: ts(24.0, 1.2),
        title: ts(12.5, 1.3),
        section_header: ts(11.0, 1.3),
        entry_heading: ts(11.5, 1.35),
        body: ts(11.0, 1.5),
        meta: ts(10.0, 1.4),
    },
    padding: Edges {
        top: 56.0,
        right: 64.0,
        bottom: 56.0,
        left: 64.0,
    },
    section_gap: 18.0,
    header_align: TextAlign::Left,
    header_band: false,
    side_background: None,
    default_accent: "#6b7280",
    swatches: &["#6b7280", "#111827", "#0f766e"],
};

static EXECUTIVE: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Executive,
    name: "Executive",
    category: TemplateCategory::Professional,
    columns: ColumnLayout::TwoColumn {
        side_percent: 30.0,
        side_first: false,
    },
    type_scale: TypeScale {
        name: ts(30.0, 1.15),
        title: ts(15.0, 1.3),
        section_header: ts(13.0, 1.3),
        entry_heading: ts(12.5, 1.35),
        body: ts(11.0, 1.45),
        meta: ts(10.0, 1.4),
    },
    padding: Edges {
        top: 44.0,
        right: 48.0,
        bottom: 44.0,
        left: 48.0,
    },
    section_gap: 15.0,
    header_align: TextAlign::Left,
    header_band: false,
    side_background: None,
    default_accent: "#1e3a8a",
    swatches: &["#1e3a8a", "#78350f", "#334155", "#065f46"],
};

static CREATIVE: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Creative,
    name: "Creative",
    category: TemplateCategory::Creative,
    columns: ColumnLayout::TwoColumn {
        side_percent: 36.0,
        side_first: true,
    },
    type_scale: TypeScale {
        name: ts(32.0, 1.1),
        title: ts(15.0, 1.3),
        section_header: ts(13.5, 1.3),
        entry_heading: ts(12.5, 1.35),
        body: ts(11.0, 1.45),
        meta: ts(10.0, 1.4),
    },
    padding: Edges {
        top: 36.0,
        right: 36.0,
        bottom: 36.0,
        left: 36.0,
    },
    section_gap: 16.0,
    header_align: TextAlign::Left,
    header_band: true,
    side_background: Some("#fdf2f8"),
    default_accent: "#db2777",
    swatches: &["#db2777", "#9333ea", "#f59e0b", "#10b981"],
};

static TECHNICAL: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Technical,
    name: "Technical",
    category: TemplateCategory::Modern,
    columns: ColumnLayout::Single,
    type_scale: TypeScale {
        name: ts(26.0, 1.2),
        title: ts(13.0, 1.3),
        section_header: ts(12.0, 1.3),
        entry_heading: ts(12.0, 1.35),
        body: ts(10.5, 1.4),
        meta: ts(9.5, 1.4),
    },
    padding: Edges {
        top: 40.0,
        right: 48.0,
        bottom: 40.0,
        left: 48.0,
    },
    section_gap: 12.0,
    header_align: TextAlign::Left,
    header_band: false,
    side_background: None,
    default_accent: "#0f766e",
    swatches: &["#0f766e", "#1d4ed8", "#b91c1c", "#4b5563"],
};

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Executive,
        TemplateId::Creative,
        TemplateId::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Executive => "executive",
            TemplateId::Creative => "creative",
            TemplateId::Technical => "technical",
        }
    }

    pub fn descriptor(&self) -> &'static TemplateDescriptor {
        match self {
            TemplateId::Classic => &CLASSIC,
            TemplateId::Modern => &MODERN,
            TemplateId::Minimal => &MINIMAL,
            TemplateId::Executive => &EXECUTIVE,
            TemplateId::Creative => &CREATIVE,
            TemplateId::Technical => &TECHNICAL,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PreferenceError::UnknownTemplate(s.to_string()))
    }
}

/// Every template descriptor, in gallery order.
pub fn registry() -> impl Iterator<Item = &'static TemplateDescriptor> {
    TemplateId::ALL.into_iter().map(|t| t.descriptor())
}

/// Look a template up by its route id.
pub fn lookup(id: &str) -> Option<&'static TemplateDescriptor> {
    id.parse::<TemplateId>().ok().map(|t| t.descriptor())
}
