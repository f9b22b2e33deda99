//! # API Facade
//!
//! [`SnipApi`] owns the [`Library`] and the byte store it is persisted to. It
//! is the single entry point for every UI.
//!
//! Each mutation goes through the same steps:
//!
//! 1. run the command from `commands/`
//! 2. reconcile the selection
//! 3. save the whole library under the storage key
//!
//! Nothing here returns an error to the caller. A command error (unknown id,
//! protected root, bad import) becomes an error-level message and leaves the
//! library unchanged; a failed save becomes an error-level message while the
//! in-memory library stays correct.

use crate::commands::folder::DeleteSummary;
use crate::commands::tree::FolderNode;
use crate::commands::{self, doctor, export, folder, helpers, import, select, snippet, tree};
use crate::error::Result;
use crate::model::{Folder, Library, Snippet};
use crate::persist;
use crate::store::KeyValueStore;
use log::warn;
use std::fs;
use std::path::Path;

pub const READ_FAILED: &str = "Failed to read the selected file.";

/// The main API facade for snipkeep operations.
///
/// Generic over `KeyValueStore` to allow different storage backends.
pub struct SnipApi<S: KeyValueStore> {
    store: S,
    storage_key: String,
    library: Library,
}

impl<S: KeyValueStore> SnipApi<S> {
    /// Load the library from `store`. Problems with the stored data are
    /// reported in the returned result, never as an error.
    pub fn open(store: S, storage_key: impl Into<String>) -> (Self, CmdResult) {
        let storage_key = storage_key.into();
        let (mut library, message) = persist::load(&store, &storage_key);
        doctor::repair(&mut library);
        select::reconcile(&mut library);

        let mut result = CmdResult::default();
        if let Some(message) = message {
            result.add_message(message);
        }
        let api = Self {
            store,
            storage_key,
            library,
        };
        (api, result)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // --- Selection ---

    pub fn select_folder(&mut self, folder_id: &str) -> CmdResult {
        let outcome = select::folder(&mut self.library, folder_id);
        self.commit(outcome)
    }

    pub fn select_snippet(&mut self, snippet_id: &str) -> CmdResult {
        let outcome = select::snippet(&mut self.library, snippet_id);
        self.commit(outcome)
    }

    // --- Folders ---

    /// Create a folder under `parent_id`, or under the selected folder (falling
    /// back to the root) when no parent is given.
    pub fn create_folder(&mut self, parent_id: Option<&str>, name: &str) -> CmdResult {
        let parent = parent_id
            .map(str::to_string)
            .unwrap_or_else(|| self.selected_or_root());
        let outcome = folder::create(&mut self.library, &parent, name);
        self.commit(outcome)
    }

    pub fn rename_folder(&mut self, folder_id: &str, new_name: &str) -> CmdResult {
        let outcome = folder::rename(&mut self.library, folder_id, new_name);
        self.commit(outcome)
    }

    pub fn delete_folder(&mut self, folder_id: &str) -> CmdResult {
        let outcome = folder::delete(&mut self.library, folder_id);
        self.commit(outcome)
    }

    pub fn move_folder(&mut self, folder_id: &str, new_parent_id: &str) -> CmdResult {
        let outcome = folder::move_to(&mut self.library, folder_id, new_parent_id);
        self.commit(outcome)
    }

    pub fn delete_summary(&self, folder_id: &str) -> Result<DeleteSummary> {
        folder::delete_summary(&self.library, folder_id)
    }

    // --- Snippets ---

    /// Create a snippet in `folder_id`, or in the selected folder (falling back
    /// to the root) when none is given.
    pub fn create_snippet(&mut self, folder_id: Option<&str>) -> CmdResult {
        let folder = folder_id
            .map(str::to_string)
            .unwrap_or_else(|| self.selected_or_root());
        let outcome = snippet::create(&mut self.library, &folder);
        self.commit(outcome)
    }

    pub fn save_snippet(&mut self, snippet_id: &str, title: &str, content: &str) -> CmdResult {
        let outcome = snippet::save(&mut self.library, snippet_id, title, content);
        self.commit(outcome)
    }

    pub fn delete_snippet(&mut self, snippet_id: &str) -> CmdResult {
        let outcome = snippet::delete(&mut self.library, snippet_id);
        self.commit(outcome)
    }

    pub fn move_snippet(&mut self, snippet_id: &str, folder_id: &str) -> CmdResult {
        let outcome = snippet::move_to(&mut self.library, snippet_id, folder_id);
        self.commit(outcome)
    }

    // --- Queries ---

    pub fn folder_tree(&self) -> Option<FolderNode> {
        tree::folder_tree(&self.library)
    }

    pub fn child_folders(&self, folder_id: &str) -> Result<Vec<&Folder>> {
        tree::child_folders(&self.library, folder_id)
    }

    pub fn snippets_in(&self, folder_id: &str) -> Result<Vec<&Snippet>> {
        tree::snippets_in(&self.library, folder_id)
    }

    pub fn folder_path(&self, folder_id: &str) -> Result<Vec<String>> {
        tree::folder_path(&self.library, folder_id)
    }

    pub fn resolve_folder(&self, reference: &str) -> Result<String> {
        helpers::resolve_folder_id(&self.library, reference)
    }

    pub fn resolve_snippet(&self, reference: &str) -> Result<String> {
        helpers::resolve_snippet_id(&self.library, reference)
    }

    // --- Persistence ---

    /// Write the library to the store now.
    pub fn save(&mut self) -> CmdResult {
        let mut result = CmdResult::default();
        self.persist(&mut result);
        result
    }

    pub fn export_text(&self) -> Result<String> {
        export::to_text(&self.library)
    }

    pub fn export_to_dir(&self, dir: &Path, prefix: &str) -> CmdResult {
        match export::run(&self.library, dir, prefix) {
            Ok(result) => result,
            Err(e) => {
                warn!("Export failed: {}", e);
                CmdResult::default().with_message(CmdMessage::error(format!(
                    "Unable to export data: {}",
                    e
                )))
            }
        }
    }

    /// Replace the library with exported text. Rejected input leaves the
    /// library untouched.
    pub fn import_text(&mut self, text: &str) -> CmdResult {
        match import::run(&mut self.library, text) {
            Ok(result) => {
                doctor::repair(&mut self.library);
                self.commit(Ok(result))
            }
            Err(e) => {
                warn!("Import failed: {}", e);
                CmdResult::default().with_message(CmdMessage::error(import::IMPORT_FAILED))
            }
        }
    }

    pub fn import_file(&mut self, path: &Path) -> CmdResult {
        match fs::read_to_string(path) {
            Ok(text) => self.import_text(&text),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                CmdResult::default().with_message(CmdMessage::error(READ_FAILED))
            }
        }
    }

    pub fn doctor(&mut self) -> CmdResult {
        let result = doctor::run(&mut self.library);
        self.commit(Ok(result))
    }

    // --- Internals ---

    fn selected_or_root(&self) -> String {
        if self.library.folders.contains_key(&self.library.selected_folder_id) {
            self.library.selected_folder_id.clone()
        } else {
            self.library.root_folder_id.clone()
        }
    }

    fn commit(&mut self, outcome: Result<CmdResult>) -> CmdResult {
        let mut result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("Command rejected: {}", e);
                return CmdResult::default().with_message(CmdMessage::error(e.to_string()));
            }
        };
        select::reconcile(&mut self.library);
        self.persist(&mut result);
        result
    }

    fn persist(&mut self, result: &mut CmdResult) {
        if let Err(e) = persist::save(&mut self.store, &self.storage_key, &self.library) {
            warn!("Failed to persist state: {}", e);
            result.add_message(CmdMessage::error(persist::SAVE_FAILED));
        }
    }
}

pub use crate::commands::doctor::DoctorReport;
pub use commands::{CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ROOT_FOLDER_NAME, UNTITLED_SNIPPET_TITLE};
    use crate::store::memory::MemoryStore;

    const KEY: &str = "snippetKeeperData";

    fn fresh() -> SnipApi<MemoryStore> {
        let (api, result) = SnipApi::open(MemoryStore::new(), KEY);
        assert!(result.messages.is_empty());
        api
    }

    #[test]
    fn walkthrough_from_empty_library() {
        let mut api = fresh();

        let created = api.create_folder(Some("root"), "Work");
        let f1 = created.affected_folders[0].clone();
        assert_eq!(api.library().root().unwrap().children_ids, vec![f1.clone()]);
        assert_eq!(api.library().selected_folder_id, f1);

        let created = api.create_snippet(Some(f1.as_str()));
        let s1 = created.affected_snippets[0].clone();
        assert_eq!(api.library().snippet(&s1).unwrap().title, "New Snippet");
        assert_eq!(api.library().folder(&f1).unwrap().snippet_ids, vec![s1.clone()]);
        assert_eq!(api.library().selected_snippet_id.as_deref(), Some(s1.as_str()));

        api.save_snippet(&s1, "", "hello");
        let snippet = api.library().snippet(&s1).unwrap();
        assert_eq!(snippet.title, UNTITLED_SNIPPET_TITLE);
        assert_eq!(snippet.content, "hello");

        api.delete_folder(&f1);
        assert!(api.library().folder(&f1).is_none());
        assert!(api.library().snippet(&s1).is_none());
        assert_eq!(api.library().selected_folder_id, "root");
        assert_eq!(api.library().selected_snippet_id, None);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut api = fresh();
        api.create_folder(None, "Saved");
        let bytes = api.store().get(KEY).unwrap().unwrap();
        let stored = persist::parse_library(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(&stored, api.library());
    }

    #[test]
    fn reopening_restores_state() {
        let mut api = fresh();
        let f = api.create_folder(None, "Keep").affected_folders[0].clone();
        let SnipApi { store, .. } = api;
        let (reopened, result) = SnipApi::open(store, KEY);
        assert!(result.messages.is_empty());
        assert_eq!(reopened.library().folder(&f).unwrap().name, "Keep");
        assert_eq!(reopened.library().selected_folder_id, f);
    }

    #[test]
    fn corrupt_store_opens_fresh_with_error() {
        let store = MemoryStore::new().with_entry(KEY, "not json");
        let (api, result) = SnipApi::open(store, KEY);
        assert_eq!(api.library(), &Library::default());
        assert!(result.has_errors());
        assert_eq!(result.messages[0].content, persist::LOAD_FAILED);
    }

    #[test]
    fn missing_ids_are_reported_not_thrown() {
        let mut api = fresh();
        let before = api.library().clone();
        for result in [
            api.rename_folder("ghost", "x"),
            api.delete_folder("ghost"),
            api.select_folder("ghost"),
            api.select_snippet("ghost"),
            api.save_snippet("ghost", "t", "c"),
            api.delete_snippet("ghost"),
            api.create_snippet(Some("ghost")),
        ] {
            assert!(result.has_errors());
        }
        assert_eq!(api.library(), &before);
    }

    #[test]
    fn root_is_protected() {
        let mut api = fresh();
        let result = api.rename_folder("root", "x");
        assert_eq!(result.messages[0].content, "The root folder cannot be renamed.");
        assert_eq!(api.library().root().unwrap().name, ROOT_FOLDER_NAME);
        let result = api.delete_folder("root");
        assert_eq!(result.messages[0].content, "Cannot delete the root folder.");
        assert!(api.library().root().is_some());
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let mut api = fresh();
        api.store_mut().set_simulate_write_error(true);
        let result = api.create_folder(None, "Volatile");
        assert!(result.has_errors());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == persist::SAVE_FAILED));
        assert_eq!(api.library().folders.len(), 2);
    }

    #[test]
    fn new_items_default_to_selected_folder() {
        let mut api = fresh();
        let work = api.create_folder(None, "Work").affected_folders[0].clone();
        let nested = api.create_folder(None, "Nested").affected_folders[0].clone();
        assert_eq!(
            api.library().folder(&nested).unwrap().parent_id.as_deref(),
            Some(work.as_str())
        );
        let s = api.create_snippet(None).affected_snippets[0].clone();
        assert_eq!(api.library().snippet(&s).unwrap().folder_id, nested);
    }

    #[test]
    fn import_replaces_and_bad_import_does_not() {
        let mut source = fresh();
        let f = source.create_folder(None, "Shared").affected_folders[0].clone();
        source.create_snippet(None);
        let text = source.export_text().unwrap();

        let mut target = fresh();
        let result = target.import_text(&text);
        assert!(!result.has_errors());
        assert_eq!(target.library(), source.library());
        assert!(target.library().folder(&f).is_some());

        let before = target.library().clone();
        let result = target.import_text(r#"{ "folders": {} }"#);
        assert_eq!(result.messages[0].content, import::IMPORT_FAILED);
        assert_eq!(target.library(), &before);
    }

    #[test]
    fn unreadable_import_file_is_reported() {
        let mut api = fresh();
        let result = api.import_file(Path::new("/definitely/not/here.json"));
        assert_eq!(result.messages[0].content, READ_FAILED);
    }

    #[test]
    fn selecting_snippet_elsewhere_switches_folder() {
        let mut api = fresh();
        let a = api.create_folder(Some("root"), "A").affected_folders[0].clone();
        let s = api.create_snippet(Some(a.as_str())).affected_snippets[0].clone();
        api.select_folder("root");
        assert_eq!(api.library().selected_snippet_id, None);
        api.select_snippet(&s);
        assert_eq!(api.library().selected_folder_id, a);
        assert_eq!(api.library().selected_snippet_id.as_deref(), Some(s.as_str()));
    }
}
