//! The per-volume batch loop.
//!
//! Each volume moves through plan → guard → (clear) → copy → report, and the
//! outcome of one volume never decides whether the next is attempted. The
//! only error that leaves this module is the fatal size-estimation failure
//! raised before the loop begins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering::Relaxed};

use serde::Serialize;

use crate::capacity::{admit, Admission};
use crate::copy::{copy_file_preserving, merge_copy, ReplicateStats};
use crate::errors::{FileFailure, SourceUnreadable};
use crate::estimate::{estimate, human_bytes};
use crate::events::EventSink;
use crate::placement::{base_destination, final_file_path, Placement};
use crate::source::{SourceKind, SourceSpec};
use crate::volumes::{FreeSpaceProbe, TargetVolume};

/// Fully-specified replication run. Built once, immutable while the batch
/// executes. The rename applies to file sources only and is ignored for
/// directories.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub source: SourceSpec,
    pub placement: Placement,
    pub rename: Option<String>,
    pub overwrite: bool,
    pub targets: Vec<TargetVolume>,
}

/// Terminal result for one target volume, produced exactly once.
#[derive(Clone, Debug, Serialize)]
pub enum VolumeOutcome {
    /// Capacity check rejected the volume; nothing was written.
    Skipped { free_bytes: u64, shortfall: u64 },
    Succeeded { files_copied: u64, bytes_copied: u64 },
    /// At least one path failed; earlier files may have landed.
    Failed { failures: Vec<FileFailure> },
}

impl VolumeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VolumeOutcome::Succeeded { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VolumeReport {
    pub root: PathBuf,
    pub outcome: VolumeOutcome,
}

/// Final report: one entry per attempted volume, in request order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    pub estimated_bytes: u64,
    pub unreadable_entries: Vec<PathBuf>,
    pub volumes: Vec<VolumeReport>,
}

/// Run one batch to completion on the calling thread.
///
/// Every target is attempted exactly once, in order, unless `stop` is raised
/// first; the flag is honored only between volumes, never mid-copy. All log
/// events for a volume are emitted before its progress event, and `Finished`
/// is always the last event out.
pub fn run_batch(
    request: &BatchRequest,
    probe: &dyn FreeSpaceProbe,
    events: &EventSink,
    stop: &AtomicBool,
) -> Result<BatchReport, SourceUnreadable> {
    let size = match estimate(&request.source) {
        Ok(size) => size,
        Err(err) => {
            events.log(format!("fatal: {err}"));
            events.finished();
            return Err(err);
        }
    };
    let need_bytes = size.total_bytes;

    events.log(format!("source: {}", request.source.path.display()));
    events.log(format!("estimated size to copy: {}", human_bytes(need_bytes)));
    if !size.unreadable.is_empty() {
        events.log(format!(
            "warning: {} source entries could not be read and are excluded from the estimate",
            size.unreadable.len()
        ));
    }
    events.log(describe_placement(&request.placement));

    let mut report = BatchReport {
        estimated_bytes: need_bytes,
        unreadable_entries: size.unreadable,
        volumes: Vec::with_capacity(request.targets.len()),
    };

    let total = request.targets.len();
    if total == 0 {
        events.log("no target volumes selected; nothing to do");
        events.finished();
        return Ok(report);
    }

    for (idx, target) in request.targets.iter().enumerate() {
        if stop.load(Relaxed) {
            events.log(format!(
                "stop requested; leaving {} remaining volume(s) untouched",
                total - idx
            ));
            break;
        }
        let outcome = replicate_to_volume(request, target, need_bytes, probe, events);
        log_outcome(events, target, &outcome, need_bytes);
        report.volumes.push(VolumeReport {
            root: target.root.clone(),
            outcome,
        });
        events.progress(idx + 1, total);
    }

    if report.volumes.len() == total {
        events.log("all selected volumes processed");
    }
    events.finished();
    Ok(report)
}

fn describe_placement(placement: &Placement) -> String {
    match placement {
        Placement::Root => "destination on each volume: <root>".to_string(),
        Placement::NamedFolder(name) => {
            format!("destination on each volume: folder '{}'", name.trim())
        }
        Placement::SourceNameFolder => {
            "destination on each volume: folder named after the source".to_string()
        }
    }
}

fn log_outcome(events: &EventSink, target: &TargetVolume, outcome: &VolumeOutcome, need: u64) {
    let root = target.root.display();
    match outcome {
        VolumeOutcome::Skipped {
            free_bytes,
            shortfall,
        } => events.log(format!(
            "[{root}] SKIP: not enough free space ({} free, need {}, short {})",
            human_bytes(*free_bytes),
            human_bytes(need),
            human_bytes(*shortfall)
        )),
        VolumeOutcome::Succeeded {
            files_copied,
            bytes_copied,
        } => events.log(format!(
            "[{root}] DONE ({files_copied} file(s), {})",
            human_bytes(*bytes_copied)
        )),
        VolumeOutcome::Failed { failures } => events.log(format!(
            "[{root}] ERROR: {} ({} failure(s))",
            failures[0],
            failures.len()
        )),
    }
}

/// Steps 1–5 of the per-volume sequence. Every error inside is converted to
/// an outcome here; nothing unwinds past this function.
fn replicate_to_volume(
    request: &BatchRequest,
    target: &TargetVolume,
    need_bytes: u64,
    probe: &dyn FreeSpaceProbe,
    events: &EventSink,
) -> VolumeOutcome {
    let base = base_destination(&request.placement, &target.root, &request.source);

    let free_bytes = probe.free_bytes(&target.root).unwrap_or(target.free_bytes);
    if let Admission::Reject { shortfall } = admit(free_bytes, need_bytes) {
        return VolumeOutcome::Skipped {
            free_bytes,
            shortfall,
        };
    }

    match request.source.kind {
        SourceKind::Directory => replicate_directory(request, target, &base, events),
        SourceKind::File => replicate_file(request, target, &base, events),
    }
}

fn replicate_directory(
    request: &BatchRequest,
    target: &TargetVolume,
    base: &Path,
    events: &EventSink,
) -> VolumeOutcome {
    // Clearing the volume root itself would delete unrelated drive content,
    // so the opt-in clear only applies to a subfolder destination.
    if request.overwrite && base != target.root && base.exists() {
        events.log(format!(
            "[{}] removing existing folder {}",
            target.root.display(),
            base.display()
        ));
        if let Err(err) = std::fs::remove_dir_all(base) {
            log::warn!("pre-clear of {} failed: {err}", base.display());
            events.log(format!(
                "[{}] warning: could not fully remove {}: {err}",
                target.root.display(),
                base.display()
            ));
        }
    }

    if let Err(err) = std::fs::create_dir_all(base) {
        return VolumeOutcome::Failed {
            failures: vec![FileFailure::new(base, err.to_string())],
        };
    }
    events.log(format!(
        "[{}] copying folder -> {}",
        target.root.display(),
        base.display()
    ));
    outcome_from_stats(merge_copy(&request.source.path, base))
}

fn replicate_file(
    request: &BatchRequest,
    target: &TargetVolume,
    base: &Path,
    events: &EventSink,
) -> VolumeOutcome {
    if let Err(err) = std::fs::create_dir_all(base) {
        return VolumeOutcome::Failed {
            failures: vec![FileFailure::new(base, err.to_string())],
        };
    }
    let dst = final_file_path(base, &request.source, request.rename.as_deref());

    if request.overwrite && dst.exists() {
        if let Err(err) = std::fs::remove_file(&dst) {
            // Best-effort: the copy below gets its own chance to fail.
            events.log(format!(
                "[{}] warning: could not remove existing file {}: {err}",
                target.root.display(),
                dst.display()
            ));
        }
    }

    events.log(format!(
        "[{}] copying file -> {}",
        target.root.display(),
        dst.display()
    ));
    match copy_file_preserving(&request.source.path, &dst) {
        Ok(bytes) => VolumeOutcome::Succeeded {
            files_copied: 1,
            bytes_copied: bytes,
        },
        Err(err) => VolumeOutcome::Failed {
            failures: vec![FileFailure::new(&dst, err.to_string())],
        },
    }
}

fn outcome_from_stats(stats: ReplicateStats) -> VolumeOutcome {
    if stats.is_clean() {
        VolumeOutcome::Succeeded {
            files_copied: stats.files_copied,
            bytes_copied: stats.bytes_copied,
        }
    } else {
        VolumeOutcome::Failed {
            failures: stats.failures,
        }
    }
}
