pub mod batch;
pub mod capacity;
pub mod controller;
pub mod copy;
pub mod errors;
pub mod estimate;
pub mod events;
pub mod placement;
pub mod source;
pub mod volumes;

pub use batch::{run_batch, BatchReport, BatchRequest, VolumeOutcome, VolumeReport};
pub use controller::{BatchController, BusyError};
pub use errors::{FileFailure, SourceUnreadable};
pub use estimate::{estimate, human_bytes, SizeEstimate};
pub use events::{BatchEvent, EventSink};
pub use placement::{base_destination, final_file_path, Placement};
pub use source::{SourceKind, SourceSpec};
pub use volumes::{list_removable_volumes, DiskFreeProbe, FreeSpaceProbe, TargetVolume};
