//! # Document Store
//!
//! The one owner of the resume being edited. Forms and renderers borrow the
//! document from here; changes go through named update operations so there
//! is a single writer and a revision number that moves on every change.

use crate::model::*;

/// A list section of the resume whose entries can be added, updated and
/// removed by id.
pub trait SectionEntry: Sized {
    fn list(doc: &ResumeDocument) -> &Vec<Self>;
    fn list_mut(doc: &mut ResumeDocument) -> &mut Vec<Self>;
    fn id(&self) -> &EntryId;
    fn blank() -> Self;
}

macro_rules! section_entry {
    ($ty:ty, $field:ident) => {
        impl SectionEntry for $ty {
            fn list(doc: &ResumeDocument) -> &Vec<Self> {
                &doc.$field
            }
            fn list_mut(doc: &mut ResumeDocument) -> &mut Vec<Self> {
                &mut doc.$field
            }
            fn id(&self) -> &EntryId {
                &self.id
            }
            fn blank() -> Self {
                <$ty>::blank()
            }
        }
    };
}

section_entry!(ExperienceEntry, experience);
section_entry!(EducationEntry, education);
section_entry!(SkillEntry, skills);
section_entry!(ToolEntry, tools);
section_entry!(LanguageEntry, languages);
section_entry!(CertificationEntry, certifications);
section_entry!(ProjectEntry, projects);

/// Centrally owned resume document.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    document: ResumeDocument,
    revision: u64,
}

impl DocumentStore {
    pub fn new(mut document: ResumeDocument) -> Self {
        document.backfill_empty_sections();
        Self {
            document,
            revision: 0,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A point-in-time copy for export.
    pub fn snapshot(&self) -> ResumeDocument {
        self.document.clone()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn set_personal(&mut self, personal: PersonalInfo) {
        self.document.personal = personal;
        self.touch();
    }

    pub fn update_personal(&mut self, f: impl FnOnce(&mut PersonalInfo)) {
        f(&mut self.document.personal);
        self.touch();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.document.summary = summary.into();
        self.touch();
    }

    pub fn entries<T: SectionEntry>(&self) -> &[T] {
        T::list(&self.document)
    }

    /// Append a blank entry and return its id.
    pub fn add<T: SectionEntry>(&mut self) -> EntryId {
        let entry = T::blank();
        let id = entry.id().clone();
        T::list_mut(&mut self.document).push(entry);
        self.touch();
        id
    }

    /// Apply `f` to the entry with `id`. Returns false if no such entry.
    pub fn update<T: SectionEntry>(&mut self, id: &EntryId, f: impl FnOnce(&mut T)) -> bool {
        let Some(entry) = T::list_mut(&mut self.document)
            .iter_mut()
            .find(|e| e.id() == id)
        else {
            return false;
        };
        f(entry);
        self.touch();
        true
    }

    /// Remove the entry with `id`. The last entry of a section is replaced
    /// by a blank one so the list never goes empty while editing.
    pub fn remove<T: SectionEntry>(&mut self, id: &EntryId) -> bool {
        let list = T::list_mut(&mut self.document);
        let before = list.len();
        list.retain(|e| e.id() != id);
        if list.len() == before {
            return false;
        }
        if list.is_empty() {
            list.push(T::blank());
        }
        self.touch();
        true
    }

    /// Swap in a whole document (e.g. one loaded from disk).
    pub fn replace(&mut self, mut document: ResumeDocument) {
        document.backfill_empty_sections();
        self.document = document;
        self.touch();
    }

    /// Discard everything and start from a fresh document.
    pub fn reset(&mut self) {
        self.document = ResumeDocument::new();
        self.touch();
    }
}
