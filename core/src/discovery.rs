//! Source file discovery.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::PbxError;
use crate::error::Result;
use crate::objects::FileDescriptor;

/// Collect every file under `root` whose extension is in `extensions`.
///
/// Paths are relative to `root`, use `/` separators and come back sorted
/// lexicographically so the generated project does not depend on directory
/// enumeration order. Traversal errors are returned, not skipped.
pub fn discover_sources(root: &Path, extensions: &[String]) -> Result<Vec<FileDescriptor>> {
    if !root.is_dir() {
        return Err(PbxError::SourceRootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
        if !matches {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(FileDescriptor::from_path(relative));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Discovered {} source files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "// source\n").unwrap();
    }

    #[test]
    fn finds_nested_files_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sub/B.swift");
        touch(dir.path(), "A.swift");
        touch(dir.path(), "README.md");
        touch(dir.path(), "Core/Services/C.swift");

        let files = discover_sources(dir.path(), &["swift".to_string()]).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["A.swift", "Core/Services/C.swift", "sub/B.swift"]);
        assert_eq!(files[2].name, "B.swift");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_sources(&dir.path().join("Nope"), &["swift".to_string()]).unwrap_err();
        assert!(matches!(err, PbxError::SourceRootNotFound(_)));
    }
}
