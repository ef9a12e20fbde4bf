//! # Resume Data Model
//!
//! The single source of truth for everything the renderer draws. A resume is
//! personal info, a summary, and ordered lists of entries. List order is
//! insertion order and is the order sections render in.
//!
//! Field names serialize in camelCase so documents saved by the browser
//! builder load unchanged. Every field defaults when missing, which lets a
//! partially saved document round-trip.

mod entries;

pub use entries::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// Identity of a list entry. Fresh ids are random UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn fresh() -> Self {
        EntryId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::fresh()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The person the resume is about.
///
/// Only `full_name`, `email`, `phone` and `location` count as required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Photo reference: a data URI, a file path, or a remote URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl PersonalInfo {
    /// The optional links that are present and non-blank, in display order.
    pub fn links(&self) -> Vec<&str> {
        [&self.linkedin, &self.github, &self.website]
            .into_iter()
            .filter_map(|l| l.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Whether the four required fields are all filled in.
    pub fn is_complete(&self) -> bool {
        [&self.full_name, &self.email, &self.phone, &self.location]
            .iter()
            .all(|f| !f.trim().is_empty())
    }
}

/// A complete resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(rename = "personalInfo")]
    pub personal: PersonalInfo,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub tools: Vec<ToolEntry>,
    pub languages: Vec<LanguageEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub projects: Vec<ProjectEntry>,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeDocument {
    /// A fresh document: blank personal info and one blank entry per list.
    pub fn new() -> Self {
        ResumeDocument {
            personal: PersonalInfo::default(),
            summary: String::new(),
            experience: vec![ExperienceEntry::blank()],
            education: vec![EducationEntry::blank()],
            skills: vec![SkillEntry::blank()],
            tools: vec![ToolEntry::blank()],
            languages: vec![LanguageEntry::blank()],
            certifications: vec![CertificationEntry::blank()],
            projects: vec![ProjectEntry::blank()],
        }
    }

    /// Give every empty list exactly one blank entry.
    ///
    /// Returns the number of lists that were backfilled.
    pub fn backfill_empty_sections(&mut self) -> usize {
        fn fill<T>(list: &mut Vec<T>, blank: fn() -> T) -> usize {
            if list.is_empty() {
                list.push(blank());
                1
            } else {
                0
            }
        }

        fill(&mut self.experience, ExperienceEntry::blank)
            + fill(&mut self.education, EducationEntry::blank)
            + fill(&mut self.skills, SkillEntry::blank)
            + fill(&mut self.tools, ToolEntry::blank)
            + fill(&mut self.languages, LanguageEntry::blank)
            + fill(&mut self.certifications, CertificationEntry::blank)
            + fill(&mut self.projects, ProjectEntry::blank)
    }

    /// Parse the persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the persisted JSON form.
    pub fn to_json(&self) -> String {
        // A document holds only strings, bools, enums and vectors.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
