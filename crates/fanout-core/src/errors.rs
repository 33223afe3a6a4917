//! Error types callers need to match on.
//!
//! Only two conditions carry a dedicated type: the single fatal case that
//! aborts a batch before any volume is attempted, and the per-file failure
//! record aggregated into a volume's outcome. Everything else is reported
//! through `VolumeOutcome`, never raised.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The source itself could not be inspected (vanished or unreadable at the
/// root). Raised only before the volume loop begins; every later error is
/// caught at the volume boundary instead.
#[derive(Debug)]
pub struct SourceUnreadable {
    pub path: PathBuf,
    pub error: io::Error,
}

impl SourceUnreadable {
    pub fn new(path: &Path, error: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            error,
        }
    }
}

impl fmt::Display for SourceUnreadable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read source {}: {}", self.path.display(), self.error)
    }
}

impl std::error::Error for SourceUnreadable {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// One path that could not be replicated onto a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
