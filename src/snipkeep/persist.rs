//! Serialized form of a [`Library`] and its round-trip through a [`KeyValueStore`].
//!
//! The blob is the library as JSON:
//!
//! ```text
//! {
//!   "folders":  { "<id>": Folder, ... },
//!   "snippets": { "<id>": Snippet, ... },
//!   "rootFolderId": "root",
//!   "selectedFolderId": "root",
//!   "selectedSnippetId": null
//! }
//! ```
//!
//! Parsing is lenient: whatever is present is laid over the default library,
//! and a missing or broken root folder resets the folder set to the default.
//! Loading never fails; unreadable data yields a fresh library and a status
//! message instead.

use crate::commands::CmdMessage;
use crate::error::{Result, SnipError};
use crate::model::{Folder, Library, Snippet, ROOT_FOLDER_ID};
use crate::store::KeyValueStore;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LOAD_FAILED: &str = "Could not load saved data. Starting fresh.";
pub const SAVE_FAILED: &str = "Unable to save to local storage.";

/// Read the library stored under `key`.
///
/// An absent key gives the default library silently; unreadable data gives
/// the default library plus an error-level message.
pub fn load<S: KeyValueStore>(store: &S, key: &str) -> (Library, Option<CmdMessage>) {
    match try_load(store, key) {
        Ok(Some(library)) => (library, None),
        Ok(None) => (Library::default(), None),
        Err(e) => {
            warn!("Failed to load state: {}", e);
            (Library::default(), Some(CmdMessage::error(LOAD_FAILED)))
        }
    }
}

fn try_load<S: KeyValueStore>(store: &S, key: &str) -> Result<Option<Library>> {
    let Some(bytes) = store.get(key)? else {
        debug!("No saved state under {:?}", key);
        return Ok(None);
    };
    let text = String::from_utf8(bytes)
        .map_err(|e| SnipError::InvalidData(format!("stored state is not UTF-8: {}", e)))?;
    parse_library(&text).map(Some)
}

/// Write the whole library under `key`.
pub fn save<S: KeyValueStore>(store: &mut S, key: &str, library: &Library) -> Result<()> {
    let bytes = serde_json::to_vec(library).map_err(SnipError::Serialization)?;
    store.set(key, &bytes)
}

/// Parse serialized text into a library, applying the default merge.
pub fn parse_library(text: &str) -> Result<Library> {
    let value: Value = serde_json::from_str(text).map_err(SnipError::Serialization)?;
    match value {
        Value::Object(data) => merge_onto_default(data),
        _ => Err(SnipError::InvalidData("expected a JSON object".to_string())),
    }
}

/// Lay parsed top-level fields over the default library.
///
/// Selection ids of the wrong type fall back to the defaults and are left for
/// reconciliation to repair. A folder or snippet entry that does not parse is
/// dropped on its own; only a `folders` or `snippets` field that is not an
/// object rejects the whole blob.
pub fn merge_onto_default(mut data: Map<String, Value>) -> Result<Library> {
    ensure_root_folder(&mut data);
    let mut library = Library::default();

    if let Some(id) = take_id(&mut data, "rootFolderId").filter(|id| !id.is_empty()) {
        library.root_folder_id = id;
    }
    if let Some(id) = take_id(&mut data, "selectedFolderId") {
        library.selected_folder_id = id;
    }
    library.selected_snippet_id = take_id(&mut data, "selectedSnippetId");

    let parsed_folders: BTreeMap<String, Folder> = take_entries(&mut data, "folders")?;
    // A custom root replaces the default one, so there is never a second root.
    if library.root_folder_id != ROOT_FOLDER_ID {
        library.folders.clear();
    }
    for (key, mut folder) in parsed_folders {
        if folder.id.is_empty() {
            folder.id = key.clone();
        }
        library.folders.insert(key, folder);
    }

    let parsed_snippets: BTreeMap<String, Snippet> = take_entries(&mut data, "snippets")?;
    library.snippets = parsed_snippets
        .into_iter()
        .map(|(key, mut snippet)| {
            if snippet.id.is_empty() {
                snippet.id = key.clone();
            }
            (key, snippet)
        })
        .collect();

    Ok(library)
}

/// Reset the folder set to the default one when the referenced root is
/// missing or unreadable.
fn ensure_root_folder(data: &mut Map<String, Value>) {
    let root_id = data
        .get("rootFolderId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .unwrap_or(ROOT_FOLDER_ID)
        .to_string();
    let has_root = data
        .get("folders")
        .and_then(Value::as_object)
        .and_then(|folders| folders.get(&root_id))
        .is_some_and(|root| serde_json::from_value::<Folder>(root.clone()).is_ok());

    if !has_root {
        debug!("Saved state has no root folder {:?}; resetting folders", root_id);
        data.insert("folders".to_string(), default_folders_value());
        data.insert(
            "rootFolderId".to_string(),
            Value::String(ROOT_FOLDER_ID.to_string()),
        );
    }
}

fn default_folders_value() -> Value {
    // The default library always serializes.
    serde_json::to_value(Library::default().folders).unwrap_or(Value::Null)
}

/// Remove a string field. Anything that is not a string reads as absent.
fn take_id(data: &mut Map<String, Value>, key: &str) -> Option<String> {
    match data.remove(key) {
        Some(Value::String(id)) => Some(id),
        None | Some(Value::Null) => None,
        Some(other) => {
            warn!("Ignoring {} of unexpected type: {}", key, other);
            None
        }
    }
}

/// Remove an id-keyed map field, skipping entries that do not deserialize.
fn take_entries<T: DeserializeOwned>(
    data: &mut Map<String, Value>,
    key: &str,
) -> Result<BTreeMap<String, T>> {
    let entries = match data.remove(key) {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => {
            return Err(SnipError::InvalidData(format!(
                "{} must be an object keyed by id",
                key
            )))
        }
    };

    let mut parsed = BTreeMap::new();
    for (id, value) in entries {
        match serde_json::from_value(value) {
            Ok(entry) => {
                parsed.insert(id, entry);
            }
            Err(e) => warn!("Dropping unreadable {} entry {:?}: {}", key, id, e),
        }
    }
    Ok(parsed)
}
