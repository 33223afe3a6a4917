//! Removable-volume discovery and the free-space query seam.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sysinfo::Disks;

/// Snapshot of one candidate volume at scan time. Advisory only: the batch
/// never re-validates it, and nothing here locks space on the device.
#[derive(Clone, Debug, Serialize)]
pub struct TargetVolume {
    pub root: PathBuf,
    pub free_bytes: u64,
}

/// Enumerate removable volumes currently mounted on the host. An empty
/// result is a normal answer, not an error.
pub fn list_removable_volumes() -> Vec<TargetVolume> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| disk.is_removable())
        .map(|disk| TargetVolume {
            root: disk.mount_point().to_path_buf(),
            free_bytes: disk.available_space(),
        })
        .collect()
}

/// Point-in-time free-space query for the volume holding `root`.
///
/// The batch loop re-queries through this seam just before each volume's
/// capacity check; `None` means "no fresher answer than the scan snapshot".
pub trait FreeSpaceProbe: Send + Sync {
    fn free_bytes(&self, root: &Path) -> Option<u64>;
}

/// Probe backed by a fresh disk scan on every query.
pub struct DiskFreeProbe;

impl FreeSpaceProbe for DiskFreeProbe {
    fn free_bytes(&self, root: &Path) -> Option<u64> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| root.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| disk.available_space())
    }
}
