//! Form validation and step navigation.
//!
//! Validation never fails loudly: it returns a map of field key to message,
//! and an empty map means the section is good. Keys match the form's field
//! names (`fullName`, `experience[0].company`) so a UI can attach each
//! message to its input.
//!
//! List entries that were never touched are skipped. Every section keeps at
//! least one blank entry around for editing, and that entry must not block
//! the user.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::*;

/// The builder's form steps, in order. Persisted as the step's position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub enum FormSection {
    #[default]
    Personal,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    /// Tools, languages and certifications.
    Extras,
}

impl FormSection {
    pub const ALL: [FormSection; 7] = [
        FormSection::Personal,
        FormSection::Summary,
        FormSection::Experience,
        FormSection::Education,
        FormSection::Skills,
        FormSection::Projects,
        FormSection::Extras,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FormSection::Personal => "Personal Info",
            FormSection::Summary => "Summary",
            FormSection::Experience => "Experience",
            FormSection::Education => "Education",
            FormSection::Skills => "Skills",
            FormSection::Projects => "Projects",
            FormSection::Extras => "Extras",
        }
    }

    /// Position in [`FormSection::ALL`].
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// The following step, or `None` on the last one.
    pub fn next(&self) -> Option<FormSection> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The preceding step, or `None` on the first one.
    pub fn previous(&self) -> Option<FormSection> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl From<FormSection> for usize {
    fn from(section: FormSection) -> usize {
        section.index()
    }
}

impl TryFrom<usize> for FormSection {
    type Error = StorageError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(StorageError::SectionOutOfRange(index))
    }
}

impl fmt::Display for FormSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Field key → message, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn require(&mut self, key: impl Into<String>, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.insert(key, message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key}: {message}")?;
        }
        Ok(())
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn blank_opt(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, blank)
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn validate_personal(p: &PersonalInfo, errors: &mut ValidationErrors) {
    errors.require("fullName", &p.full_name, "Full name is required");
    if blank(&p.email) {
        errors.insert("email", "Email is required");
    } else if !is_valid_email(&p.email) {
        errors.insert("email", "Enter a valid email address");
    }
    errors.require("phone", &p.phone, "Phone is required");
    errors.require("location", &p.location, "Location is required");
}

fn validate_experience(entries: &[ExperienceEntry], errors: &mut ValidationErrors) {
    for (i, e) in entries.iter().enumerate() {
        let touched = !blank(&e.company)
            || !blank(&e.position)
            || !blank_opt(&e.location)
            || !blank(&e.start_date)
            || !blank_opt(&e.end_date)
            || !blank(&e.description);
        if !touched {
            continue;
        }
        errors.require(format!("experience[{i}].company"), &e.company, "Company is required");
        errors.require(format!("experience[{i}].position"), &e.position, "Position is required");
        errors.require(format!("experience[{i}].startDate"), &e.start_date, "Start date is required");
        if !e.current && blank_opt(&e.end_date) {
            errors.insert(format!("experience[{i}].endDate"), "End date is required unless this is your current role");
        }
    }
}

fn validate_education(entries: &[EducationEntry], errors: &mut ValidationErrors) {
    for (i, e) in entries.iter().enumerate() {
        let touched = !blank(&e.school)
            || !blank(&e.degree)
            || !blank(&e.field)
            || !blank_opt(&e.location)
            || !blank(&e.start_date)
            || !blank_opt(&e.end_date)
            || !blank_opt(&e.gpa);
        if !touched {
            continue;
        }
        errors.require(format!("education[{i}].school"), &e.school, "School is required");
        errors.require(format!("education[{i}].degree"), &e.degree, "Degree is required");
    }
}

fn validate_projects(entries: &[ProjectEntry], errors: &mut ValidationErrors) {
    for (i, p) in entries.iter().enumerate() {
        let touched = !blank(&p.name)
            || !blank_opt(&p.technologies)
            || !blank_opt(&p.link)
            || !blank_opt(&p.repository)
            || !blank(&p.description);
        if touched {
            errors.require(format!("projects[{i}].name"), &p.name, "Project name is required");
        }
    }
}

fn validate_certifications(entries: &[CertificationEntry], errors: &mut ValidationErrors) {
    for (i, c) in entries.iter().enumerate() {
        if !blank_opt(&c.issuer) || !blank_opt(&c.date) {
            errors.require(format!("certifications[{i}].name"), &c.name, "Certification name is required");
        }
    }
}

/// Validate one form step.
pub fn validate_section(section: FormSection, doc: &ResumeDocument) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match section {
        FormSection::Personal => validate_personal(&doc.personal, &mut errors),
        FormSection::Experience => validate_experience(&doc.experience, &mut errors),
        FormSection::Education => validate_education(&doc.education, &mut errors),
        FormSection::Projects => validate_projects(&doc.projects, &mut errors),
        FormSection::Extras => validate_certifications(&doc.certifications, &mut errors),
        FormSection::Summary | FormSection::Skills => {}
    }
    errors
}

/// Validate every step.
pub fn validate_all(doc: &ResumeDocument) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for section in FormSection::ALL {
        errors.extend(validate_section(section, doc));
    }
    errors
}

/// The first step, in form order, that has an error.
pub fn first_invalid_section(doc: &ResumeDocument) -> Option<FormSection> {
    FormSection::ALL
        .into_iter()
        .find(|s| !validate_section(*s, doc).is_empty())
}

/// Tracks the active form step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormNavigator {
    active: FormSection,
}

impl FormNavigator {
    pub fn new(active: FormSection) -> Self {
        Self { active }
    }

    pub fn active(&self) -> FormSection {
        self.active
    }

    /// Advance if the active step is valid. On the last step this stays
    /// put and succeeds.
    pub fn next(&mut self, doc: &ResumeDocument) -> Result<FormSection, ValidationErrors> {
        let errors = validate_section(self.active, doc);
        if !errors.is_empty() {
            return Err(errors);
        }
        if let Some(next) = self.active.next() {
            self.active = next;
        }
        Ok(self.active)
    }

    /// Go back one step. Never validates.
    pub fn previous(&mut self) -> FormSection {
        if let Some(prev) = self.active.previous() {
            self.active = prev;
        }
        self.active
    }

    /// Jump to any step. Never validates.
    pub fn go_to(&mut self, section: FormSection) {
        self.active = section;
    }

    /// Validate everything. On failure the first step with an error becomes
    /// active and the full error map is returned.
    pub fn finish(&mut self, doc: &ResumeDocument) -> Result<(), ValidationErrors> {
        let errors = validate_all(doc);
        if errors.is_empty() {
            return Ok(());
        }
        if let Some(section) = first_invalid_section(doc) {
            self.active = section;
        }
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ResumeDocument {
        let mut doc = ResumeDocument::new();
        doc.personal.full_name = "Jane Doe".to_string();
        doc.personal.email = "jane@example.com".to_string();
        doc.personal.phone = "555-0100".to_string();
        doc.personal.location = "Austin, TX".to_string();
        doc
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email(" a.b+c@mail.example.org "));
        for bad in ["", "jane", "jane@", "@example.com", "jane@example", "ja ne@example.com", "a@b@c.com", "a@.com"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn test_blank_document_fails_on_personal_only() {
        let errors = validate_all(&ResumeDocument::new());
        let keys: Vec<_> = errors.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["email", "fullName", "location", "phone"]);
    }

    #[test]
    fn test_complete_document_passes() {
        assert!(validate_all(&complete()).is_empty());
    }

    #[test]
    fn test_partial_experience_entry_requires_key_fields() {
        let mut doc = complete();
        doc.experience[0].company = "Acme".to_string();
        let errors = validate_section(FormSection::Experience, &doc);
        assert!(errors.contains("experience[0].position"));
        assert!(errors.contains("experience[0].startDate"));
        assert!(errors.contains("experience[0].endDate"));
        assert!(!errors.contains("experience[0].company"));

        doc.experience[0].current = true;
        let errors = validate_section(FormSection::Experience, &doc);
        assert!(!errors.contains("experience[0].endDate"));
    }

    #[test]
    fn test_certification_issuer_without_name() {
        let mut doc = complete();
        doc.certifications[0].issuer = Some("AWS".to_string());
        let errors = validate_section(FormSection::Extras, &doc);
        assert_eq!(errors.get("certifications[0].name"), Some("Certification name is required"));
    }

    #[test]
    fn test_next_blocks_on_errors_and_advances_when_valid() {
        let mut nav = FormNavigator::default();
        let err = nav.next(&ResumeDocument::new()).unwrap_err();
        assert!(err.contains("fullName"));
        assert_eq!(nav.active(), FormSection::Personal);

        assert_eq!(nav.next(&complete()), Ok(FormSection::Summary));
        assert_eq!(nav.previous(), FormSection::Personal);
        assert_eq!(nav.previous(), FormSection::Personal);

        nav.go_to(FormSection::Extras);
        assert_eq!(nav.next(&complete()), Ok(FormSection::Extras));
    }

    #[test]
    fn test_finish_activates_first_invalid_section() {
        let mut doc = complete();
        doc.education[0].school = "MIT".to_string();
        doc.personal.full_name.clear();

        let mut nav = FormNavigator::new(FormSection::Extras);
        let errors = nav.finish(&doc).unwrap_err();
        assert!(errors.contains("fullName"));
        assert!(errors.contains("education[0].degree"));
        assert_eq!(nav.active(), FormSection::Personal);

        doc.personal.full_name = "Jane".to_string();
        let errors = nav.finish(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(nav.active(), FormSection::Education);

        doc.education[0].degree = "BSc".to_string();
        assert!(nav.finish(&doc).is_ok());
    }

    #[test]
    fn test_section_order() {
        assert_eq!(FormSection::Personal.next(), Some(FormSection::Summary));
        assert_eq!(FormSection::Extras.next(), None);
        assert_eq!(FormSection::Personal.previous(), None);
    }
}
