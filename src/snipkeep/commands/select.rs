use crate::commands::CmdResult;
use crate::error::{Result, SnipError};
use crate::model::Library;
use log::debug;

/// Make `folder_id` the active folder.
///
/// The selected snippet survives only if it is listed in the new folder;
/// otherwise the folder's first snippet (or nothing) becomes selected.
pub fn folder(library: &mut Library, folder_id: &str) -> Result<CmdResult> {
    let Some(folder) = library.folder(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };

    let keeps_snippet = library
        .selected_snippet_id
        .as_ref()
        .is_some_and(|id| folder.snippet_ids.contains(id));
    if !keeps_snippet {
        library.selected_snippet_id = library.first_snippet_in(folder_id);
    }
    library.selected_folder_id = folder_id.to_string();

    debug!("Selected folder {}", folder_id);
    Ok(CmdResult::default().with_affected_folders(vec![folder_id.to_string()]))
}

/// Make `snippet_id` the active snippet. Its owning folder becomes the active
/// folder as well, so the selection stays consistent.
pub fn snippet(library: &mut Library, snippet_id: &str) -> Result<CmdResult> {
    let Some(snippet) = library.snippet(snippet_id) else {
        return Err(SnipError::SnippetNotFound(snippet_id.to_string()));
    };

    let owner = snippet.folder_id.clone();
    if library.folders.contains_key(&owner) {
        library.selected_folder_id = owner;
    }
    library.selected_snippet_id = Some(snippet_id.to_string());

    debug!("Selected snippet {}", snippet_id);
    Ok(CmdResult::default().with_affected_snippets(vec![snippet_id.to_string()]))
}

/// Restore the selection invariants after a mutation.
///
/// - A vanished folder selection falls back to the root.
/// - Dangling ids are pruned from the selected folder's `snippet_ids`.
/// - A snippet selection that is missing, or that belongs to another folder,
///   is replaced by the folder's first snippet, or cleared.
///
/// Idempotent: a second call changes nothing.
pub fn reconcile(library: &mut Library) {
    if !library.folders.contains_key(&library.selected_folder_id) {
        library.selected_folder_id = library.root_folder_id.clone();
    }

    let selected_folder_id = library.selected_folder_id.clone();
    let snippets = &library.snippets;
    if let Some(folder) = library.folders.get_mut(&selected_folder_id) {
        folder.snippet_ids.retain(|id| snippets.contains_key(id));
    }

    let valid = library
        .selected_snippet()
        .is_some_and(|s| s.folder_id == selected_folder_id);
    if !valid {
        library.selected_snippet_id = library.first_snippet_in(&selected_folder_id);
    }
}
