//! Destination-path policy: where under a volume's root the payload lands.
//!
//! Pure path construction, no I/O. Malformed configuration degrades to the
//! volume root rather than producing an invalid join.

use std::path::{Path, PathBuf};

use crate::source::{SourceKind, SourceSpec};

/// Placement policy, identical across all volumes in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Write directly at the volume root.
    Root,
    /// Write under a fixed subfolder.
    NamedFolder(String),
    /// Write under a subfolder named after the source: a directory keeps its
    /// name, a file loses its final extension.
    SourceNameFolder,
}

fn trimmed(name: &str) -> &str {
    name.trim().trim_matches(|c| c == '/' || c == '\\')
}

/// Base destination for one volume.
pub fn base_destination(placement: &Placement, volume_root: &Path, source: &SourceSpec) -> PathBuf {
    match placement {
        Placement::Root => volume_root.to_path_buf(),
        Placement::NamedFolder(name) => {
            let name = trimmed(name);
            if name.is_empty() {
                volume_root.to_path_buf()
            } else {
                volume_root.join(name)
            }
        }
        Placement::SourceNameFolder => {
            let derived = match source.kind {
                SourceKind::Directory => source.path.file_name(),
                // An extension-only name like ".bin" strips to nothing; keep
                // the full base name in that case.
                SourceKind::File => source.path.file_stem().or_else(|| source.path.file_name()),
            };
            match derived {
                Some(name) if !name.is_empty() => volume_root.join(name),
                _ => volume_root.to_path_buf(),
            }
        }
    }
}

/// Final path of a file-source payload under `base`. The rename replaces the
/// base name only when it is non-empty after trimming.
pub fn final_file_path(base: &Path, source: &SourceSpec, rename: Option<&str>) -> PathBuf {
    match rename.map(trimmed).filter(|name| !name.is_empty()) {
        Some(name) => base.join(name),
        None => match source.path.file_name() {
            Some(name) => base.join(name),
            None => base.to_path_buf(),
        },
    }
}
