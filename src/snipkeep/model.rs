use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const ROOT_FOLDER_ID: &str = "root";
pub const ROOT_FOLDER_NAME: &str = "All Snippets";
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";
pub const NEW_SNIPPET_TITLE: &str = "New Snippet";
pub const UNTITLED_SNIPPET_TITLE: &str = "Untitled Snippet";

/// A named node in the folder tree.
///
/// Links to the parent and children are ids into [`Library::folders`], never
/// direct references, so the tree can be freely mutated and serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub snippet_ids: Vec<String>,
}

impl Folder {
    pub fn new(name: String, parent_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            name,
            parent_id,
            children_ids: Vec::new(),
            snippet_ids: Vec::new(),
        }
    }

    fn root() -> Self {
        Self {
            id: ROOT_FOLDER_ID.to_string(),
            name: ROOT_FOLDER_NAME.to_string(),
            parent_id: None,
            children_ids: Vec::new(),
            snippet_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    // Kept as the raw strings: imported data is not guaranteed to be well formed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Snippet {
    pub fn new(folder_id: String) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            folder_id,
            title: NEW_SNIPPET_TITLE.to_string(),
            content: String::new(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        }
    }

    /// The time used for ordering: `updated_at`, falling back to `created_at`.
    /// `None` when neither is present or the chosen one does not parse.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(parse_timestamp)
    }
}

/// The whole state store: every folder, every snippet and the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub folders: BTreeMap<String, Folder>,
    pub snippets: BTreeMap<String, Snippet>,
    pub root_folder_id: String,
    pub selected_folder_id: String,
    pub selected_snippet_id: Option<String>,
}

impl Default for Library {
    fn default() -> Self {
        let root = Folder::root();
        let mut folders = BTreeMap::new();
        folders.insert(root.id.clone(), root);
        Self {
            folders,
            snippets: BTreeMap::new(),
            root_folder_id: ROOT_FOLDER_ID.to_string(),
            selected_folder_id: ROOT_FOLDER_ID.to_string(),
            selected_snippet_id: None,
        }
    }
}

impl Library {
    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn snippet(&self, id: &str) -> Option<&Snippet> {
        self.snippets.get(id)
    }

    pub fn root(&self) -> Option<&Folder> {
        self.folders.get(&self.root_folder_id)
    }

    pub fn is_root(&self, folder_id: &str) -> bool {
        self.root_folder_id == folder_id
    }

    pub fn selected_snippet(&self) -> Option<&Snippet> {
        self.selected_snippet_id
            .as_deref()
            .and_then(|id| self.snippets.get(id))
    }

    /// First entry of the folder's stored `snippet_ids` that still resolves.
    pub fn first_snippet_in(&self, folder_id: &str) -> Option<String> {
        self.folders.get(folder_id).and_then(|folder| {
            folder
                .snippet_ids
                .iter()
                .find(|id| self.snippets.contains_key(*id))
                .cloned()
        })
    }
}

/// Generates a new collision-resistant identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp. Strings without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// Builds libraries with hand-picked ids so assertions can name them.
    pub struct LibraryFixture {
        pub library: Library,
    }

    impl Default for LibraryFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LibraryFixture {
        pub fn new() -> Self {
            Self {
                library: Library::default(),
            }
        }

        pub fn with_folder(mut self, id: &str, name: &str, parent_id: &str) -> Self {
            self.library.folders.insert(
                id.to_string(),
                Folder {
                    id: id.to_string(),
                    name: name.to_string(),
                    parent_id: Some(parent_id.to_string()),
                    children_ids: Vec::new(),
                    snippet_ids: Vec::new(),
                },
            );
            if let Some(parent) = self.library.folders.get_mut(parent_id) {
                parent.children_ids.push(id.to_string());
            }
            self
        }

        pub fn with_snippet(mut self, id: &str, folder_id: &str, updated_at: &str) -> Self {
            self.library.snippets.insert(
                id.to_string(),
                Snippet {
                    id: id.to_string(),
                    folder_id: folder_id.to_string(),
                    title: format!("Snippet {}", id),
                    content: format!("Content of {}", id),
                    created_at: Some(updated_at.to_string()),
                    updated_at: Some(updated_at.to_string()),
                },
            );
            if let Some(folder) = self.library.folders.get_mut(folder_id) {
                folder.snippet_ids.insert(0, id.to_string());
            }
            self
        }

        pub fn selecting(mut self, folder_id: &str, snippet_id: Option<&str>) -> Self {
            self.library.selected_folder_id = folder_id.to_string();
            self.library.selected_snippet_id = snippet_id.map(str::to_string);
            self
        }

        pub fn build(self) -> Library {
            self.library
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_library_has_only_the_root() {
        let lib = Library::default();
        assert_eq!(lib.folders.len(), 1);
        assert!(lib.snippets.is_empty());
        let root = lib.root().unwrap();
        assert_eq!(root.name, ROOT_FOLDER_NAME);
        assert_eq!(root.parent_id, None);
        assert_eq!(lib.selected_folder_id, ROOT_FOLDER_ID);
        assert_eq!(lib.selected_snippet_id, None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Library::default()).unwrap();
        assert_eq!(json["rootFolderId"], "root");
        assert_eq!(json["selectedFolderId"], "root");
        assert!(json["selectedSnippetId"].is_null());
        assert!(json["folders"]["root"]["parentId"].is_null());
        assert!(json["folders"]["root"]["childrenIds"].is_array());
    }

    #[test]
    fn new_snippet_timestamps_match() {
        let snippet = Snippet::new("root".into());
        assert_eq!(snippet.title, NEW_SNIPPET_TITLE);
        assert_eq!(snippet.created_at, snippet.updated_at);
        assert!(snippet.created_at.as_deref().unwrap().ends_with('Z'));
        assert!(snippet.last_modified().is_some());
    }

    #[test]
    fn last_modified_falls_back_to_created_at() {
        let mut snippet = Snippet::new("root".into());
        snippet.created_at = Some("2024-03-01T10:00:00.000Z".into());
        snippet.updated_at = None;
        assert_eq!(
            snippet.last_modified(),
            parse_timestamp("2024-03-01T10:00:00Z")
        );
    }

    #[test]
    fn malformed_timestamp_has_no_time() {
        let mut snippet = Snippet::new("root".into());
        snippet.updated_at = Some("yesterday-ish".into());
        assert_eq!(snippet.last_modified(), None);
    }

    #[test]
    fn parses_timestamps_without_offset() {
        assert_eq!(
            parse_timestamp("2024-01-01T10:00:00"),
            parse_timestamp("2024-01-01T10:00:00Z")
        );
        assert_eq!(
            parse_timestamp("2024-01-01T10:00:00.250"),
            parse_timestamp("2024-01-01T10:00:00.250Z")
        );
        assert!(parse_timestamp("2024-01-01T10:00").is_some());
    }

    #[test]
    fn parses_bare_dates() {
        assert!(parse_timestamp("2024-05-06").is_some());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
