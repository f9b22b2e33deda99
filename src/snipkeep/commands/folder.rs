use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SnipError};
use crate::model::{Folder, Library, DEFAULT_FOLDER_NAME};
use log::debug;
use std::collections::HashSet;

use super::helpers::{descendant_folder_ids, normalize_name};

/// What `delete` would remove, for confirmation prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    pub name: String,
    pub subfolders: usize,
    pub snippets: usize,
}

impl DeleteSummary {
    pub fn prompt(&self) -> String {
        format!(
            "Delete folder \"{}\" and {} subfolders containing {} snippet(s)?",
            self.name, self.subfolders, self.snippets
        )
    }
}

/// Create a folder under `parent_id` and select it.
pub fn create(library: &mut Library, parent_id: &str, name: &str) -> Result<CmdResult> {
    if !library.folders.contains_key(parent_id) {
        return Err(SnipError::FolderNotFound(parent_id.to_string()));
    }

    let name = normalize_name(name).unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());
    let folder = Folder::new(name.clone(), Some(parent_id.to_string()));
    let id = folder.id.clone();
    library.folders.insert(id.clone(), folder);

    if let Some(parent) = library.folders.get_mut(parent_id) {
        if !parent.children_ids.contains(&id) {
            parent.children_ids.push(id.clone());
        }
    }

    library.selected_folder_id = id.clone();
    library.selected_snippet_id = None;

    debug!("Created folder {} under {}", id, parent_id);
    Ok(CmdResult::default()
        .with_affected_folders(vec![id])
        .with_message(CmdMessage::success(format!("Created folder \"{}\"", name))))
}

/// Rename a folder. Blank names are ignored; the root cannot be renamed.
pub fn rename(library: &mut Library, folder_id: &str, new_name: &str) -> Result<CmdResult> {
    if library.is_root(folder_id) {
        return Err(SnipError::RootFolder(
            "The root folder cannot be renamed.".to_string(),
        ));
    }
    let Some(folder) = library.folders.get_mut(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };
    let Some(name) = normalize_name(new_name) else {
        return Ok(CmdResult::default());
    };

    folder.name = name;
    debug!("Renamed folder {} to {:?}", folder_id, folder.name);
    Ok(CmdResult::default()
        .with_affected_folders(vec![folder_id.to_string()])
        .with_message(CmdMessage::success("Folder renamed.")))
}

pub fn delete_summary(library: &Library, folder_id: &str) -> Result<DeleteSummary> {
    let folder = library
        .folder(folder_id)
        .ok_or_else(|| SnipError::FolderNotFound(folder_id.to_string()))?;
    let descendants = descendant_folder_ids(library, folder_id);
    let snippets = std::iter::once(folder_id)
        .chain(descendants.iter().map(String::as_str))
        .filter_map(|id| library.folder(id))
        .map(|f| f.snippet_ids.len())
        .sum();

    Ok(DeleteSummary {
        name: folder.name.clone(),
        subfolders: descendants.len(),
        snippets,
    })
}

/// Delete a folder together with every nested folder and every snippet they own.
///
/// Selection moves to the parent (or the root) and its first snippet.
pub fn delete(library: &mut Library, folder_id: &str) -> Result<CmdResult> {
    if library.is_root(folder_id) {
        return Err(SnipError::RootFolder(
            "Cannot delete the root folder.".to_string(),
        ));
    }
    let Some(folder) = library.folder(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };
    let parent_id = folder.parent_id.clone();

    let mut doomed = vec![folder_id.to_string()];
    doomed.extend(descendant_folder_ids(library, folder_id));

    if let Some(parent) = parent_id.as_ref().and_then(|id| library.folders.get_mut(id)) {
        parent.children_ids.retain(|id| id != folder_id);
    }

    let mut removed_snippets = Vec::new();
    for id in &doomed {
        if let Some(f) = library.folders.remove(id) {
            for snippet_id in f.snippet_ids {
                if library.snippets.remove(&snippet_id).is_some() {
                    removed_snippets.push(snippet_id);
                }
            }
        }
    }
    // Snippets pointing into the subtree without being listed there
    let doomed_set: HashSet<&String> = doomed.iter().collect();
    library.snippets.retain(|id, s| {
        let keep = !doomed_set.contains(&s.folder_id);
        if !keep {
            removed_snippets.push(id.clone());
        }
        keep
    });

    let next_folder = parent_id
        .filter(|id| library.folders.contains_key(id))
        .unwrap_or_else(|| library.root_folder_id.clone());
    library.selected_snippet_id = library.first_snippet_in(&next_folder);
    library.selected_folder_id = next_folder;

    debug!(
        "Deleted folder {} ({} folders, {} snippets)",
        folder_id,
        doomed.len(),
        removed_snippets.len()
    );
    Ok(CmdResult::default()
        .with_affected_folders(doomed)
        .with_affected_snippets(removed_snippets)
        .with_message(CmdMessage::success("Folder deleted.")))
}

/// Re-parent a folder. A folder cannot move into itself or its own subtree.
pub fn move_to(library: &mut Library, folder_id: &str, new_parent_id: &str) -> Result<CmdResult> {
    if library.is_root(folder_id) {
        return Err(SnipError::RootFolder(
            "The root folder cannot be moved.".to_string(),
        ));
    }
    let Some(folder) = library.folder(folder_id) else {
        return Err(SnipError::FolderNotFound(folder_id.to_string()));
    };
    let Some(new_parent) = library.folder(new_parent_id) else {
        return Err(SnipError::FolderNotFound(new_parent_id.to_string()));
    };
    if folder_id == new_parent_id {
        return Err(SnipError::InvalidMove(format!(
            "Cannot move folder \"{}\" into itself",
            folder.name
        )));
    }
    if descendant_folder_ids(library, folder_id)
        .iter()
        .any(|id| id == new_parent_id)
    {
        return Err(SnipError::InvalidMove(format!(
            "Cannot move folder \"{}\" into its own subfolder",
            folder.name
        )));
    }
    let message = format!("Moved folder \"{}\" to \"{}\"", folder.name, new_parent.name);
    let old_parent_id = folder.parent_id.clone();

    if let Some(old_parent) = old_parent_id.and_then(|id| library.folders.get_mut(&id)) {
        old_parent.children_ids.retain(|id| id != folder_id);
    }
    if let Some(new_parent) = library.folders.get_mut(new_parent_id) {
        if !new_parent.children_ids.iter().any(|id| id == folder_id) {
            new_parent.children_ids.push(folder_id.to_string());
        }
    }
    if let Some(folder) = library.folders.get_mut(folder_id) {
        folder.parent_id = Some(new_parent_id.to_string());
    }

    debug!("Moved folder {} under {}", folder_id, new_parent_id);
    Ok(CmdResult::default()
        .with_affected_folders(vec![folder_id.to_string()])
        .with_message(CmdMessage::success(message)))
}
