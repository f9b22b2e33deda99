//! Read-side views of the library.
//!
//! Display order is always derived here and never stored: folders sort by
//! name (case-insensitive), snippets by last modification, newest first.

use crate::error::{Result, SnipError};
use crate::model::{Folder, Library, Snippet};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub snippet_count: usize,
    pub children: Vec<FolderNode>,
}

/// The folder tree from the root down, children sorted by name.
pub fn folder_tree(library: &Library) -> Option<FolderNode> {
    let root = library.root()?;
    let mut seen = HashSet::new();
    Some(build_node(library, root, &mut seen))
}

fn build_node<'a>(library: &'a Library, folder: &'a Folder, seen: &mut HashSet<&'a str>) -> FolderNode {
    seen.insert(folder.id.as_str());
    let mut children: Vec<&Folder> = folder
        .children_ids
        .iter()
        .filter_map(|id| library.folder(id))
        .collect();
    children.sort_by(|a, b| compare_folder_names(a, b));

    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        if seen.contains(child.id.as_str()) {
            continue;
        }
        nodes.push(build_node(library, child, seen));
    }

    FolderNode {
        id: folder.id.clone(),
        name: folder.name.clone(),
        snippet_count: folder.snippet_ids.len(),
        children: nodes,
    }
}

fn compare_folder_names(a: &Folder, b: &Folder) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Direct child folders of `folder_id`, in display order.
pub fn child_folders<'a>(library: &'a Library, folder_id: &str) -> Result<Vec<&'a Folder>> {
    let folder = library
        .folder(folder_id)
        .ok_or_else(|| SnipError::FolderNotFound(folder_id.to_string()))?;
    let mut children: Vec<&Folder> = folder
        .children_ids
        .iter()
        .filter_map(|id| library.folder(id))
        .collect();
    children.sort_by(|a, b| compare_folder_names(a, b));
    Ok(children)
}

/// Snippets of `folder_id`, most recently modified first.
///
/// Snippets without a usable timestamp go last; ties keep stored order.
pub fn snippets_in<'a>(library: &'a Library, folder_id: &str) -> Result<Vec<&'a Snippet>> {
    let folder = library
        .folder(folder_id)
        .ok_or_else(|| SnipError::FolderNotFound(folder_id.to_string()))?;
    let mut snippets: Vec<&Snippet> = folder
        .snippet_ids
        .iter()
        .filter_map(|id| library.snippet(id))
        .collect();
    snippets.sort_by(|a, b| match (a.last_modified(), b.last_modified()) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    Ok(snippets)
}

/// Names from the root down to `folder_id`, e.g. `["All Snippets", "Work"]`.
pub fn folder_path(library: &Library, folder_id: &str) -> Result<Vec<String>> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(folder_id.to_string());
    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            break;
        }
        let folder = library
            .folder(&id)
            .ok_or_else(|| SnipError::FolderNotFound(id.clone()))?;
        path.push(folder.name.clone());
        current = folder.parent_id.clone();
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::LibraryFixture;

    #[test]
    fn tree_sorts_children_case_insensitively() {
        let lib = LibraryFixture::new()
            .with_folder("z", "zebra", "root")
            .with_folder("a", "Apple", "root")
            .with_folder("m", "mango", "root")
            .with_folder("b", "banana", "a")
            .build();
        let tree = folder_tree(&lib).unwrap();
        let names: Vec<&str> = tree.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "mango", "zebra"]);
        assert_eq!(tree.children[0].children[0].name, "banana");
    }

    #[test]
    fn tree_ignores_dangling_children_and_cycles() {
        let mut lib = LibraryFixture::new()
            .with_folder("a", "A", "root")
            .build();
        lib.folders.get_mut("a").unwrap().children_ids.push("root".into());
        lib.folders.get_mut("root").unwrap().children_ids.push("ghost".into());
        let tree = folder_tree(&lib).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn tree_counts_snippets() {
        let lib = LibraryFixture::new()
            .with_snippet("s1", "root", "2024-01-01T00:00:00Z")
            .with_snippet("s2", "root", "2024-01-01T00:00:00Z")
            .build();
        assert_eq!(folder_tree(&lib).unwrap().snippet_count, 2);
    }

    #[test]
    fn snippets_sort_newest_first_with_bad_times_last() {
        let mut lib = LibraryFixture::new()
            .with_snippet("old", "root", "2023-01-01T00:00:00.000Z")
            .with_snippet("bad", "root", "not a date")
            .with_snippet("new", "root", "2024-06-01T12:00:00.000Z")
            .with_snippet("mid", "root", "2024-01-01T00:00:00.000Z")
            .build();
        lib.snippets.get_mut("mid").unwrap().updated_at = None;

        let ids: Vec<&str> = snippets_in(&lib, "root")
            .unwrap()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old", "bad"]);
    }

    #[test]
    fn snippets_in_missing_folder_is_an_error() {
        let lib = Library::default();
        assert!(snippets_in(&lib, "ghost").is_err());
    }

    #[test]
    fn child_folders_are_sorted() {
        let lib = LibraryFixture::new()
            .with_folder("b", "beta", "root")
            .with_folder("a", "Alpha", "root")
            .build();
        let names: Vec<&str> = child_folders(&lib, "root")
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn path_walks_up_to_root() {
        let lib = LibraryFixture::new()
            .with_folder("work", "Work", "root")
            .with_folder("proj", "Projects", "work")
            .build();
        assert_eq!(
            folder_path(&lib, "proj").unwrap(),
            vec!["All Snippets", "Work", "Projects"]
        );
    }
}
