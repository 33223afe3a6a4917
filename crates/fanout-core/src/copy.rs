//! Merging tree replication.
//!
//! The copy direction is add/overwrite only: destination entries with no
//! source counterpart are never touched. The one destructive path (clearing
//! an overwrite target) lives with the batch loop, not here.

use std::path::Path;

use filetime::FileTime;
use walkdir::WalkDir;

use crate::errors::FileFailure;

/// Result of replicating one source onto one destination.
#[derive(Clone, Debug, Default)]
pub struct ReplicateStats {
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub failures: Vec<FileFailure>,
}

impl ReplicateStats {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn add_file(&mut self, bytes: u64) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
    }

    fn add_failure(&mut self, path: &Path, error: &dyn std::fmt::Display) {
        self.failures.push(FileFailure::new(path, error.to_string()));
    }
}

/// Copy one regular file, carrying the source's modification time along.
/// Timestamp preservation is best-effort; the copy itself is not.
pub fn copy_file_preserving(src: &Path, dst: &Path) -> std::io::Result<u64> {
    let bytes = std::fs::copy(src, dst)?;
    if let Ok(metadata) = std::fs::metadata(src) {
        if let Ok(modified) = metadata.modified() {
            let _ = filetime::set_file_mtime(dst, FileTime::from_system_time(modified));
        }
    }
    Ok(bytes)
}

/// Merge-copy the full contents of `src_dir` into `dst_dir`, creating
/// directories as needed and preserving relative structure.
///
/// Per-file failures are collected and the walk continues; the caller
/// decides what an unclean result means for the volume. Nothing under
/// `dst_dir` is ever deleted here.
pub fn merge_copy(src_dir: &Path, dst_dir: &Path) -> ReplicateStats {
    let mut stats = ReplicateStats::default();
    for entry in WalkDir::new(src_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| src_dir.to_path_buf());
                stats.add_failure(&path, &err);
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(src_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let dst = if rel.as_os_str().is_empty() {
            dst_dir.to_path_buf()
        } else {
            dst_dir.join(rel)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if let Err(err) = std::fs::create_dir_all(&dst) {
                stats.add_failure(&dst, &err);
            }
            continue;
        }
        if file_type.is_symlink() {
            // Links to files land as plain content; linked directories are
            // not descended into.
            match std::fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_dir() => {
                    log::debug!("not descending into linked directory {}", entry.path().display());
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    stats.add_failure(entry.path(), &err);
                    continue;
                }
            }
        }
        match copy_file_preserving(entry.path(), &dst) {
            Ok(bytes) => stats.add_file(bytes),
            Err(err) => stats.add_failure(&dst, &err),
        }
    }
    stats
}
