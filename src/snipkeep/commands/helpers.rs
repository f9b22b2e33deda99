use crate::error::{Result, SnipError};
use crate::model::Library;
use std::collections::HashSet;

/// All folders transitively nested under `folder_id`, depth-first, parents
/// before their children. The folder itself is not included.
///
/// Only ids that resolve are followed, and each folder is visited once, so a
/// corrupt tree with a cycle still terminates.
pub fn descendant_folder_ids(library: &Library, folder_id: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    seen.insert(folder_id.to_string());
    let mut out = Vec::new();
    collect_descendants(library, folder_id, &mut seen, &mut out);
    out
}

fn collect_descendants(
    library: &Library,
    folder_id: &str,
    seen: &mut HashSet<String>,
    out: &mut Vec<String>,
) {
    let Some(folder) = library.folder(folder_id) else {
        return;
    };
    for child_id in &folder.children_ids {
        if !library.folders.contains_key(child_id) || !seen.insert(child_id.clone()) {
            continue;
        }
        out.push(child_id.clone());
        collect_descendants(library, child_id, seen, out);
    }
}

/// Trimmed name, or `None` when nothing but whitespace is left.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve a user-typed folder reference: an exact id, or a unique id prefix.
pub fn resolve_folder_id(library: &Library, reference: &str) -> Result<String> {
    resolve_id(library.folders.keys(), reference)
        .ok_or_else(|| SnipError::FolderNotFound(reference.to_string()))?
}

/// Resolve a user-typed snippet reference: an exact id, or a unique id prefix.
pub fn resolve_snippet_id(library: &Library, reference: &str) -> Result<String> {
    resolve_id(library.snippets.keys(), reference)
        .ok_or_else(|| SnipError::SnippetNotFound(reference.to_string()))?
}

fn resolve_id<'a, I>(ids: I, reference: &str) -> Option<Result<String>>
where
    I: Iterator<Item = &'a String>,
{
    if reference.is_empty() {
        return None;
    }
    let mut matches = Vec::new();
    for id in ids {
        if id == reference {
            return Some(Ok(id.clone()));
        }
        if id.starts_with(reference) {
            matches.push(id.clone());
        }
    }
    match matches.len() {
        0 => None,
        1 => matches.pop().map(Ok),
        n => Some(Err(SnipError::Api(format!(
            "Id prefix '{}' is ambiguous ({} matches)",
            reference, n
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::LibraryFixture;

    fn nested() -> Library {
        LibraryFixture::new()
            .with_folder("a", "A", "root")
            .with_folder("b", "B", "a")
            .with_folder("c", "C", "b")
            .with_folder("d", "D", "a")
            .build()
    }

    #[test]
    fn collects_descendants_depth_first() {
        let lib = nested();
        assert_eq!(descendant_folder_ids(&lib, "a"), vec!["b", "c", "d"]);
        assert!(descendant_folder_ids(&lib, "c").is_empty());
        assert!(descendant_folder_ids(&lib, "missing").is_empty());
    }

    #[test]
    fn descendants_survive_cycles() {
        let mut lib = nested();
        lib.folders.get_mut("c").unwrap().children_ids.push("a".into());
        assert_eq!(descendant_folder_ids(&lib, "a"), vec!["b", "c", "d"]);
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("  Work "), Some("Work".to_string()));
        assert_eq!(normalize_name(" \t\n"), None);
    }

    #[test]
    fn resolves_exact_and_prefix_ids() {
        let lib = LibraryFixture::new()
            .with_folder("abc123", "One", "root")
            .with_folder("abd456", "Two", "root")
            .build();
        assert_eq!(resolve_folder_id(&lib, "abc123").unwrap(), "abc123");
        assert_eq!(resolve_folder_id(&lib, "abd").unwrap(), "abd456");
        assert!(matches!(
            resolve_folder_id(&lib, "ab"),
            Err(SnipError::Api(_))
        ));
        assert!(matches!(
            resolve_folder_id(&lib, "zzz"),
            Err(SnipError::FolderNotFound(_))
        ));
        assert!(matches!(
            resolve_snippet_id(&lib, ""),
            Err(SnipError::SnippetNotFound(_))
        ));
    }
}
