//! The replication source, resolved once at batch start.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::errors::SourceUnreadable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Directory,
}

/// A file or directory payload. The kind comes from filesystem inspection,
/// not from caller declaration, and the spec is immutable for the lifetime
/// of a batch.
#[derive(Clone, Debug)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceSpec {
    /// Stat the path and classify it. Fails only when the path itself cannot
    /// be read, which is the one batch-aborting condition.
    pub fn resolve(path: &Path) -> Result<Self, SourceUnreadable> {
        let metadata =
            std::fs::metadata(path).map_err(|error| SourceUnreadable::new(path, error))?;
        let kind = if metadata.is_dir() {
            SourceKind::Directory
        } else {
            SourceKind::File
        };
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == SourceKind::Directory
    }

    pub fn base_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }
}
