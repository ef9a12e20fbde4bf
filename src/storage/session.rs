use serde::Serialize;

use crate::customize::{FontChoice, StylePreferences, TextColorScheme};
use crate::error::PreferenceError;
use crate::export::ExportSnapshot;
use crate::model::ResumeDocument;
use crate::store::DocumentStore;
use crate::template::TemplateId;
use crate::validate::{FormNavigator, FormSection, ValidationErrors};

use super::*;

/// A builder session: the document, the style choices and the active form
/// step, each written back to `S` as it changes.
///
/// A failed write is logged and the session carries on with its in-memory
/// state. [`Session::is_degraded`] reports whether the latest write failed.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    documents: DocumentStore,
    preferences: StylePreferences,
    navigator: FormNavigator,
    degraded: bool,
}

impl<S: KeyValueStore> Session<S> {
    pub fn open(store: S) -> Self {
        let state = PersistedState::load(&store);
        tracing::debug!(section = %state.section, font = %state.preferences.font, "session restored");
        Self {
            store,
            documents: DocumentStore::new(state.document),
            preferences: state.preferences,
            navigator: FormNavigator::new(state.section),
            degraded: false,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        self.documents.document()
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn preferences(&self) -> &StylePreferences {
        &self.preferences
    }

    pub fn navigator(&self) -> &FormNavigator {
        &self.navigator
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Capture what a download of `template` would render right now.
    pub fn export_snapshot(&self, template: TemplateId) -> ExportSnapshot {
        ExportSnapshot::capture(&self.documents, template, &self.preferences)
    }

    /// Apply an edit to the document and save it.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        let before = self.documents.revision();
        let out = f(&mut self.documents);
        if self.documents.revision() != before {
            let doc = self.documents.document().clone();
            self.persist(RESUME_DATA_KEY, &doc);
        }
        out
    }

    pub fn set_font(&mut self, font: FontChoice) {
        self.preferences.set_font(font);
        self.persist(SELECTED_FONT_KEY, &font);
    }

    pub fn set_text_color(&mut self, scheme: TextColorScheme) {
        self.preferences.set_text_color(scheme);
        self.persist(SELECTED_TEXT_COLOR_KEY, &scheme);
    }

    pub fn set_accent(&mut self, template: TemplateId, hex: &str) -> Result<(), PreferenceError> {
        self.preferences.set_accent(template, hex)?;
        let accents = self.preferences.accents.clone();
        self.persist(TEMPLATE_COLORS_KEY, &accents);
        Ok(())
    }

    /// Advance the form if the active step validates.
    pub fn next_section(&mut self) -> Result<FormSection, ValidationErrors> {
        let section = self.navigator.next(self.documents.document())?;
        self.persist(CURRENT_SECTION_KEY, &section);
        Ok(section)
    }

    pub fn previous_section(&mut self) -> FormSection {
        let section = self.navigator.previous();
        self.persist(CURRENT_SECTION_KEY, &section);
        section
    }

    pub fn go_to(&mut self, section: FormSection) {
        self.navigator.go_to(section);
        self.persist(CURRENT_SECTION_KEY, &section);
    }

    /// Validate every step, jumping to the first invalid one on failure.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        let result = self.navigator.finish(self.documents.document());
        if result.is_err() {
            let section = self.navigator.active();
            self.persist(CURRENT_SECTION_KEY, &section);
        }
        result
    }

    /// Drop the saved resume and start over. Style choices are kept.
    pub fn reset(&mut self) {
        self.documents.reset();
        self.navigator.go_to(FormSection::Personal);
        match self
            .store
            .remove(RESUME_DATA_KEY)
            .and_then(|()| self.store.remove(CURRENT_SECTION_KEY))
        {
            Ok(()) => self.degraded = false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear saved resume; continuing in memory");
                self.degraded = true;
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match write_json(&mut self.store, key, value) {
            Ok(()) => self.degraded = false,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to save; continuing in memory");
                self.degraded = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::model::SkillEntry;

    /// Accepts reads, refuses writes.
    #[derive(Default)]
    struct FullStore(MemoryStore);

    impl KeyValueStore for FullStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_edits_are_saved_and_restored() {
        let mut session = Session::open(MemoryStore::new());
        session.edit(|docs| docs.update_personal(|p| p.full_name = "Jane Doe".to_string()));
        let id = session.edit(|docs| docs.add::<SkillEntry>());
        session.edit(|docs| docs.update::<SkillEntry>(&id, |s| s.name = "Rust".to_string()));
        session.set_font(FontChoice::EbGaramond);
        session.go_to(FormSection::Skills);

        let restored = Session::open(session.into_store());
        assert_eq!(restored.document().personal.full_name, "Jane Doe");
        assert_eq!(restored.document().skills[1].name, "Rust");
        assert_eq!(restored.preferences().font, FontChoice::EbGaramond);
        assert_eq!(restored.navigator().active(), FormSection::Skills);
    }

    #[test]
    fn test_read_only_edit_writes_nothing() {
        let mut session = Session::open(MemoryStore::new());
        let name = session.edit(|docs| docs.document().personal.full_name.clone());
        assert!(name.is_empty());
        assert!(session.into_store().is_empty());
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let mut session = Session::open(FullStore::default());
        session.edit(|docs| docs.set_summary("Still editable"));
        assert!(session.is_degraded());
        assert_eq!(session.document().summary, "Still editable");

        session.set_text_color(TextColorScheme::Slate);
        assert_eq!(session.preferences().text_color, TextColorScheme::Slate);
    }

    #[test]
    fn test_rejected_accent_is_not_saved() {
        let mut session = Session::open(MemoryStore::new());
        assert!(session.set_accent(TemplateId::Modern, "#010203").is_err());
        assert!(session.into_store().get(TEMPLATE_COLORS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_finish_moves_to_first_invalid_section() {
        let mut session = Session::open(MemoryStore::new());
        session.go_to(FormSection::Extras);
        let errors = session.finish().unwrap_err();
        assert!(errors.contains("fullName"));
        assert_eq!(session.navigator().active(), FormSection::Personal);
        assert_eq!(
            session.into_store().get(CURRENT_SECTION_KEY).unwrap().as_deref(),
            Some("\"personal\"")
        );
    }

    #[test]
    fn test_reset_keeps_style() {
        let mut session = Session::open(MemoryStore::new());
        session.edit(|docs| docs.set_summary("Old"));
        session.set_font(FontChoice::Oswald);
        session.reset();
        assert!(session.document().summary.is_empty());

        let restored = Session::open(session.into_store());
        assert!(restored.document().summary.is_empty());
        assert_eq!(restored.preferences().font, FontChoice::Oswald);
    }
}
