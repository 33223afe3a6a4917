//! Size estimation for the pre-flight capacity check.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::SourceUnreadable;
use crate::source::{SourceKind, SourceSpec};

/// Bytes the source will occupy at a destination, plus any entries that
/// could not be inspected. Unreadable entries are excluded from the total
/// instead of failing the whole estimate, but they are reported rather than
/// silently dropped so callers can surface them.
#[derive(Clone, Debug, Default)]
pub struct SizeEstimate {
    pub total_bytes: u64,
    pub unreadable: Vec<PathBuf>,
}

/// Estimate the byte requirement for one source. Fails only when the root
/// itself cannot be stat'd; that is the single batch-aborting condition.
pub fn estimate(source: &SourceSpec) -> Result<SizeEstimate, SourceUnreadable> {
    let root_metadata =
        std::fs::metadata(&source.path).map_err(|error| SourceUnreadable::new(&source.path, error))?;

    match source.kind {
        SourceKind::File => Ok(SizeEstimate {
            total_bytes: root_metadata.len(),
            unreadable: Vec::new(),
        }),
        SourceKind::Directory => {
            let mut estimate = SizeEstimate::default();
            for entry in WalkDir::new(&source.path) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let path = err
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| source.path.clone());
                        log::debug!("size estimate: skipping {}: {err}", path.display());
                        estimate.unreadable.push(path);
                        continue;
                    }
                };
                if entry.file_type().is_file() {
                    match entry.metadata() {
                        Ok(metadata) => estimate.total_bytes += metadata.len(),
                        Err(_) => estimate.unreadable.push(entry.path().to_path_buf()),
                    }
                } else if entry.file_type().is_symlink() {
                    // Follow the link the way the copy will: a link to a file
                    // contributes its target's size.
                    match std::fs::metadata(entry.path()) {
                        Ok(metadata) if metadata.is_file() => {
                            estimate.total_bytes += metadata.len();
                        }
                        Ok(_) => {}
                        Err(_) => estimate.unreadable.push(entry.path().to_path_buf()),
                    }
                }
            }
            Ok(estimate)
        }
    }
}

/// Human-readable byte count for log lines and reports.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
