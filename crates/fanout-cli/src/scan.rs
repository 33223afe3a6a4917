use eyre::Result;
use fanout_core::{human_bytes, list_removable_volumes};

use crate::ScanArgs;

pub fn run(args: &ScanArgs) -> Result<i32> {
    let volumes = list_removable_volumes();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&volumes)?);
        return Ok(0);
    }
    for volume in &volumes {
        println!(
            "{}  (free {})",
            volume.root.display(),
            human_bytes(volume.free_bytes)
        );
    }
    println!("found {} removable volume(s)", volumes.len());
    Ok(0)
}
