use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SnipError};
use crate::model::{now_timestamp, Library, Snippet, UNTITLED_SNIPPET_TITLE};
use log::debug;

use super::helpers::normalize_name;

/// Create an empty snippet at the front of `folder_id` and select it.
pub fn create(library: &mut Library, folder_id: &str) -> Result<CmdResult> {
    let Some(folder) = library.folders.get_mut(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };

    let snippet = Snippet::new(folder_id.to_string());
    let id = snippet.id.clone();
    folder.snippet_ids.insert(0, id.clone());
    library.snippets.insert(id.clone(), snippet);

    library.selected_folder_id = folder_id.to_string();
    library.selected_snippet_id = Some(id.clone());

    debug!("Created snippet {} in {}", id, folder_id);
    Ok(CmdResult::default()
        .with_affected_snippets(vec![id])
        .with_message(CmdMessage::success("New snippet created.")))
}

/// Store a new title and content. Content is kept verbatim.
pub fn save(library: &mut Library, snippet_id: &str, title: &str, content: &str) -> Result<CmdResult> {
    let Some(snippet) = library.snippets.get_mut(snippet_id) else {
        return Err(SnipError::SnippetNotFound(snippet_id.to_string()));
    };

    snippet.title = normalize_name(title).unwrap_or_else(|| UNTITLED_SNIPPET_TITLE.to_string());
    snippet.content = content.to_string();
    snippet.updated_at = Some(now_timestamp());

    debug!("Saved snippet {}", snippet_id);
    Ok(CmdResult::default()
        .with_affected_snippets(vec![snippet_id.to_string()])
        .with_message(CmdMessage::success("Snippet saved.")))
}

/// Remove a snippet. Selection falls back to its folder's first remaining snippet.
pub fn delete(library: &mut Library, snippet_id: &str) -> Result<CmdResult> {
    let Some(snippet) = library.snippets.remove(snippet_id) else {
        return Err(SnipError::SnippetNotFound(snippet_id.to_string()));
    };

    if let Some(folder) = library.folders.get_mut(&snippet.folder_id) {
        folder.snippet_ids.retain(|id| id != snippet_id);
    }
    library.selected_snippet_id = library.first_snippet_in(&snippet.folder_id);

    debug!("Deleted snippet {} from {}", snippet_id, snippet.folder_id);
    Ok(CmdResult::default()
        .with_affected_snippets(vec![snippet_id.to_string()])
        .with_message(CmdMessage::success("Snippet deleted.")))
}

/// Move a snippet to the front of another folder.
pub fn move_to(library: &mut Library, snippet_id: &str, folder_id: &str) -> Result<CmdResult> {
    let Some(snippet) = library.snippet(snippet_id) else {
        return Err(SnipError::SnippetNotFound(snippet_id.to_string()));
    };
    let Some(target) = library.folder(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };
    let message = format!("Moved snippet \"{}\" to \"{}\"", snippet.title, target.name);
    let old_folder_id = snippet.folder_id.clone();

    if let Some(old_folder) = library.folders.get_mut(&old_folder_id) {
        old_folder.snippet_ids.retain(|id| id != snippet_id);
    }
    if let Some(target) = library.folders.get_mut(folder_id) {
        target.snippet_ids.retain(|id| id != snippet_id);
        target.snippet_ids.insert(0, snippet_id.to_string());
    }
    if let Some(snippet) = library.snippets.get_mut(snippet_id) {
        snippet.folder_id = folder_id.to_string();
    }

    debug!("Moved snippet {} from {} to {}", snippet_id, old_folder_id, folder_id);
    Ok(CmdResult::default()
        .with_affected_snippets(vec![snippet_id.to_string()])
        .with_message(CmdMessage::success(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::LibraryFixture;
    use crate::model::NEW_SNIPPET_TITLE;

    fn library() -> Library {
        LibraryFixture::new()
            .with_folder("work", "Work", "root")
            .with_folder("home", "Home", "root")
            .with_snippet("w1", "work", "2024-01-01T00:00:00.000Z")
            .with_snippet("w2", "work", "2024-01-02T00:00:00.000Z")
            .build()
    }

    #[test]
    fn create_prepends_and_selects() {
        let mut lib = library();
        let result = create(&mut lib, "work").unwrap();
        let id = result.affected_snippets[0].clone();

        let snippet = lib.snippet(&id).unwrap();
        assert_eq!(snippet.title, NEW_SNIPPET_TITLE);
        assert_eq!(snippet.content, "");
        assert_eq!(snippet.folder_id, "work");
        assert_eq!(snippet.created_at, snippet.updated_at);
        assert_eq!(lib.folders["work"].snippet_ids[0], id);
        assert_eq!(lib.selected_snippet_id.as_deref(), Some(id.as_str()));
        assert_eq!(lib.selected_folder_id, "work");
    }

    #[test]
    fn create_in_missing_folder_is_rejected() {
        let mut lib = library();
        let before = lib.clone();
        assert!(matches!(
            create(&mut lib, "ghost"),
            Err(SnipError::FolderNotFound(_))
        ));
        assert_eq!(lib, before);
    }

    #[test]
    fn save_defaults_blank_title_and_keeps_content() {
        let mut lib = library();
        save(&mut lib, "w1", "   ", "  hello\n").unwrap();
        let snippet = lib.snippet("w1").unwrap();
        assert_eq!(snippet.title, UNTITLED_SNIPPET_TITLE);
        assert_eq!(snippet.content, "  hello\n");
    }

    #[test]
    fn save_trims_title_and_touches_updated_at() {
        let mut lib = library();
        save(&mut lib, "w1", " Greeting ", "hi").unwrap();
        let snippet = lib.snippet("w1").unwrap();
        assert_eq!(snippet.title, "Greeting");
        assert_eq!(snippet.created_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert!(snippet.last_modified() > crate::model::parse_timestamp("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn save_missing_is_rejected() {
        let mut lib = library();
        assert!(matches!(
            save(&mut lib, "ghost", "t", "c"),
            Err(SnipError::SnippetNotFound(_))
        ));
    }

    #[test]
    fn delete_unlinks_and_reselects() {
        let mut lib = library();
        lib.selected_folder_id = "work".into();
        lib.selected_snippet_id = Some("w2".into());
        delete(&mut lib, "w2").unwrap();
        assert!(lib.snippet("w2").is_none());
        assert_eq!(lib.folders["work"].snippet_ids, vec!["w1"]);
        assert_eq!(lib.selected_snippet_id.as_deref(), Some("w1"));

        delete(&mut lib, "w1").unwrap();
        assert_eq!(lib.selected_snippet_id, None);
    }

    #[test]
    fn delete_missing_is_rejected() {
        let mut lib = library();
        assert!(delete(&mut lib, "ghost").is_err());
        assert_eq!(lib.snippets.len(), 2);
    }

    #[test]
    fn move_relinks_both_folders() {
        let mut lib = library();
        move_to(&mut lib, "w1", "home").unwrap();
        assert_eq!(lib.snippet("w1").unwrap().folder_id, "home");
        assert_eq!(lib.folders["work"].snippet_ids, vec!["w2"]);
        assert_eq!(lib.folders["home"].snippet_ids, vec!["w1"]);
    }

    #[test]
    fn move_to_missing_folder_is_rejected() {
        let mut lib = library();
        let before = lib.clone();
        assert!(matches!(
            move_to(&mut lib, "w1", "ghost"),
            Err(SnipError::FolderNotFound(_))
        ));
        assert_eq!(lib, before);
    }
}
