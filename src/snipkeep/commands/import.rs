use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SnipError};
use crate::model::Library;
use crate::persist::merge_onto_default;
use log::debug;
use serde_json::Value;

pub const IMPORT_FAILED: &str = "Unable to import file.";

/// Parse and validate exported text into a library.
///
/// The text must be a JSON object carrying `snippets`. A missing `folders`
/// (or a missing root inside it) is filled with the default root; the rest
/// follows the same default merge as loading saved state.
pub fn from_text(text: &str) -> Result<Library> {
    let value: Value = serde_json::from_str(text).map_err(SnipError::Serialization)?;
    let Value::Object(data) = value else {
        return Err(SnipError::InvalidData("Invalid file format".to_string()));
    };
    if !data.contains_key("snippets") {
        return Err(SnipError::InvalidData(
            "Missing required data fields".to_string(),
        ));
    }

    let mut library = merge_onto_default(data)?;
    if !library.folders.contains_key(&library.selected_folder_id) {
        library.selected_folder_id = library.root_folder_id.clone();
    }
    let snippet_known = library
        .selected_snippet_id
        .as_ref()
        .is_some_and(|id| library.snippets.contains_key(id));
    if !snippet_known {
        library.selected_snippet_id = library.first_snippet_in(&library.selected_folder_id);
    }
    Ok(library)
}

/// Replace the library wholesale with the imported one.
/// On error the current library is left as it was.
pub fn run(library: &mut Library, text: &str) -> Result<CmdResult> {
    *library = from_text(text)?;

    debug!(
        "Imported {} folders and {} snippets",
        library.folders.len(),
        library.snippets.len()
    );
    Ok(CmdResult::default().with_message(CmdMessage::success("Import successful.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{export, folder, select, snippet};
    use crate::model::fixtures::LibraryFixture;

    #[test]
    fn export_then_import_is_identity() {
        let mut lib = Library::default();
        let work = folder::create(&mut lib, "root", "Work").unwrap().affected_folders[0].clone();
        folder::create(&mut lib, &work, "Nested").unwrap();
        let s = snippet::create(&mut lib, &work).unwrap().affected_snippets[0].clone();
        snippet::save(&mut lib, &s, "Greeting", "hello\nworld").unwrap();
        select::reconcile(&mut lib);

        let text = export::to_text(&lib).unwrap();
        let mut restored = Library::default();
        run(&mut restored, &text).unwrap();
        assert_eq!(restored, lib);
    }

    #[test]
    fn rejects_non_objects() {
        for text in ["[]", "3", "\"x\"", "null", "garbage"] {
            assert!(from_text(text).is_err(), "accepted {}", text);
        }
    }

    #[test]
    fn rejects_missing_snippets() {
        assert!(matches!(
            from_text(r#"{ "folders": {} }"#),
            Err(SnipError::InvalidData(_))
        ));
        assert!(matches!(from_text("{}"), Err(SnipError::InvalidData(_))));
    }

    #[test]
    fn snippets_only_gets_the_default_root() {
        let lib = from_text(r#"{ "snippets": {} }"#).unwrap();
        assert_eq!(lib, Library::default());
    }

    #[test]
    fn failed_import_leaves_library_alone() {
        let mut lib = LibraryFixture::new().with_folder("a", "A", "root").build();
        let before = lib.clone();
        assert!(run(&mut lib, "{ nope").is_err());
        assert_eq!(lib, before);
    }

    #[test]
    fn invalid_selection_falls_back() {
        let text = r#"{
            "folders": {
                "root": { "id": "root", "name": "All Snippets", "parentId": null,
                          "childrenIds": [], "snippetIds": ["s1"] }
            },
            "snippets": {
                "s1": { "id": "s1", "folderId": "root", "title": "T", "content": "C",
                        "createdAt": "2024-01-01T00:00:00.000Z",
                        "updatedAt": "2024-01-01T00:00:00.000Z" }
            },
            "rootFolderId": "root",
            "selectedFolderId": "gone",
            "selectedSnippetId": "also-gone"
        }"#;
        let lib = from_text(text).unwrap();
        assert_eq!(lib.selected_folder_id, "root");
        assert_eq!(lib.selected_snippet_id.as_deref(), Some("s1"));
    }

    #[test]
    fn root_is_restored_when_missing() {
        let lib = from_text(r#"{ "folders": {}, "snippets": {} }"#).unwrap();
        assert_eq!(lib, Library::default());
    }
}
