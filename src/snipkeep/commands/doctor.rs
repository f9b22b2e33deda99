use crate::commands::{CmdMessage, CmdResult};
use crate::model::Library;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Counts of the structural problems fixed by [`repair`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub dangling_children: usize,
    pub dangling_snippet_ids: usize,
    pub orphan_folders: usize,
    pub orphan_snippets: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Restore parent/child and folder/snippet link consistency.
///
/// Nothing is deleted: folders whose parent is gone, and snippets whose folder
/// is gone, are re-attached to the root.
pub fn repair(library: &mut Library) -> DoctorReport {
    let mut report = DoctorReport::default();
    let root_id = library.root_folder_id.clone();

    for (key, folder) in library.folders.iter_mut() {
        if folder.id != *key {
            folder.id = key.clone();
        }
    }
    for (key, snippet) in library.snippets.iter_mut() {
        if snippet.id != *key {
            snippet.id = key.clone();
        }
    }

    if let Some(root) = library.folders.get_mut(&root_id) {
        root.parent_id = None;
    }

    // Folders with a missing parent, or claiming to be a second root.
    let orphans: Vec<String> = library
        .folders
        .values()
        .filter(|f| f.id != root_id)
        .filter(|f| match &f.parent_id {
            Some(parent) => parent == &f.id || !library.folders.contains_key(parent),
            None => true,
        })
        .map(|f| f.id.clone())
        .collect();
    for id in &orphans {
        if let Some(folder) = library.folders.get_mut(id) {
            folder.parent_id = Some(root_id.clone());
        }
    }
    report.orphan_folders = orphans.len();

    // Parent chains that loop without reaching the root.
    let ids: Vec<String> = library.folders.keys().cloned().collect();
    for id in ids {
        if !reaches_root(library, &id) {
            if let Some(folder) = library.folders.get_mut(&id) {
                folder.parent_id = Some(root_id.clone());
            }
            report.orphan_folders += 1;
        }
    }

    // Each folder listed exactly once, by its actual parent.
    let parents: HashMap<String, Option<String>> = library
        .folders
        .values()
        .map(|f| (f.id.clone(), f.parent_id.clone()))
        .collect();
    for folder in library.folders.values_mut() {
        let folder_id = folder.id.clone();
        let mut listed = HashSet::new();
        let before = folder.children_ids.len();
        folder.children_ids.retain(|child| {
            parents.get(child).is_some_and(|p| p.as_ref() == Some(&folder_id))
                && listed.insert(child.clone())
        });
        report.dangling_children += before - folder.children_ids.len();
    }
    let mut missing_links: Vec<(String, String)> = parents
        .iter()
        .filter_map(|(id, parent)| parent.clone().map(|p| (p, id.clone())))
        .filter(|(parent, child)| {
            library
                .folders
                .get(parent)
                .is_some_and(|p| !p.children_ids.contains(child))
        })
        .collect();
    missing_links.sort();
    for (parent, child) in missing_links {
        if let Some(p) = library.folders.get_mut(&parent) {
            p.children_ids.push(child);
        }
    }

    // Snippets whose folder vanished go to the root.
    let orphan_snippets: Vec<String> = library
        .snippets
        .values()
        .filter(|s| !library.folders.contains_key(&s.folder_id))
        .map(|s| s.id.clone())
        .collect();
    for id in &orphan_snippets {
        if let Some(snippet) = library.snippets.get_mut(id) {
            snippet.folder_id = root_id.clone();
        }
    }
    report.orphan_snippets = orphan_snippets.len();

    let owners: HashMap<String, String> = library
        .snippets
        .values()
        .map(|s| (s.id.clone(), s.folder_id.clone()))
        .collect();
    for folder in library.folders.values_mut() {
        let folder_id = folder.id.clone();
        let mut listed = HashSet::new();
        let before = folder.snippet_ids.len();
        folder.snippet_ids.retain(|id| {
            owners.get(id) == Some(&folder_id) && listed.insert(id.clone())
        });
        report.dangling_snippet_ids += before - folder.snippet_ids.len();
    }
    let mut unlisted: Vec<(&String, &String)> = owners
        .iter()
        .filter(|(id, owner)| {
            library
                .folders
                .get(*owner)
                .is_some_and(|f| !f.snippet_ids.contains(*id))
        })
        .collect();
    unlisted.sort();
    for (id, owner) in unlisted {
        if let Some(folder) = library.folders.get_mut(owner) {
            folder.snippet_ids.insert(0, id.clone());
        }
    }

    if !report.is_clean() {
        warn!("Repaired library structure: {:?}", report);
    }
    report
}

fn reaches_root(library: &Library, folder_id: &str) -> bool {
    let mut seen = HashSet::new();
    let mut current = folder_id;
    loop {
        if library.is_root(current) {
            return true;
        }
        if !seen.insert(current) {
            return false;
        }
        match library.folder(current).and_then(|f| f.parent_id.as_deref()) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

pub fn run(library: &mut Library) -> CmdResult {
    let report = repair(library);
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return result;
    }

    result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
    if report.orphan_folders > 0 {
        result.add_message(CmdMessage::info(format!(
            "  - Re-attached {} folder(s) with a missing parent to the root.",
            report.orphan_folders
        )));
    }
    if report.orphan_snippets > 0 {
        result.add_message(CmdMessage::info(format!(
            "  - Re-attached {} snippet(s) with a missing folder to the root.",
            report.orphan_snippets
        )));
    }
    if report.dangling_children > 0 {
        result.add_message(CmdMessage::info(format!(
            "  - Removed {} stale child folder reference(s).",
            report.dangling_children
        )));
    }
    if report.dangling_snippet_ids > 0 {
        result.add_message(CmdMessage::info(format!(
            "  - Removed {} stale snippet reference(s).",
            report.dangling_snippet_ids
        )));
    }
    result
}
