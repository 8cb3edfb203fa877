//! Error types for the store layer.

use std::fmt;

use crate::path::StorePath;

/// What was already present when a structural conflict was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    /// A directory was needed where a leaf already exists.
    DirectoryOverLeaf,
    /// A leaf was needed where a directory already exists.
    LeafOverDirectory,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::DirectoryOverLeaf => f.write_str("cannot create directory over file"),
            ConflictKind::LeafOverDirectory => f.write_str("cannot create file over directory"),
        }
    }
}

/// Errors raised by store operations.
///
/// Lookups of missing paths are not errors (they return `None`), and path
/// strings are never rejected, so the only failure is a tree build that finds
/// a path used both as a leaf and as a directory.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("structural conflict at {path}: {kind}")]
    StructuralConflict { path: StorePath, kind: ConflictKind },
}

impl Error {
    /// The path an error refers to.
    pub fn path(&self) -> &StorePath {
        match self {
            Error::StructuralConflict { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display_names_path() {
        let e = Error::StructuralConflict {
            path: StorePath::normalize("/a"),
            kind: ConflictKind::DirectoryOverLeaf,
        };
        let display = format!("{}", e);
        assert!(display.contains("structural conflict"));
        assert!(display.contains("/a"));
        assert!(display.contains("directory over file"));
    }

    #[test]
    fn leaf_over_directory_display() {
        let e = Error::StructuralConflict {
            path: StorePath::normalize("/docs"),
            kind: ConflictKind::LeafOverDirectory,
        };
        assert!(format!("{}", e).contains("file over directory"));
        assert_eq!(e.path(), "/docs");
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(Error::StructuralConflict {
            path: StorePath::root(),
            kind: ConflictKind::DirectoryOverLeaf,
        });
        let _ = err.to_string();
    }
}
