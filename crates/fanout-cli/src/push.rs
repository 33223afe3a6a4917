use std::sync::Arc;

use chrono::Local;
use crossbeam_channel::unbounded;
use eyre::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use fanout_core::{
    human_bytes, BatchController, BatchEvent, BatchReport, BatchRequest, DiskFreeProbe, EventSink,
    FreeSpaceProbe, Placement, SourceSpec, TargetVolume, VolumeOutcome,
};

use crate::PushArgs;

/// Exit code for the one fatal, batch-aborting case: the source could not be
/// read. A batch that merely skipped or failed some volumes exits 0 — the
/// per-volume report is the signal there.
const EXIT_SOURCE_UNREADABLE: i32 = 2;

pub fn run(args: &PushArgs) -> Result<i32> {
    let source = match SourceSpec::resolve(&args.source) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("fatal: {err}");
            return Ok(EXIT_SOURCE_UNREADABLE);
        }
    };
    let placement = if let Some(name) = &args.folder {
        Placement::NamedFolder(name.clone())
    } else if args.source_folder {
        Placement::SourceNameFolder
    } else {
        Placement::Root
    };
    let targets = select_targets(args)?;
    let total = targets.len();

    let request = BatchRequest {
        source,
        placement,
        rename: args.rename.clone(),
        overwrite: args.overwrite,
        targets,
    };

    if !args.json {
        println!(
            "----- batch started {} -----",
            Local::now().format("%H:%M:%S")
        );
    }

    let (tx, rx) = unbounded();
    let controller = BatchController::new();
    let probe: Arc<dyn FreeSpaceProbe> = Arc::new(DiskFreeProbe);
    controller
        .start(request, probe, EventSink::new(tx))
        .context("failed to start batch")?;

    // Log lines and the bar share stderr; stdout stays clean for the report.
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40}] {pos}/{len} volumes")
            .unwrap()
            .progress_chars("=> "),
    );
    for event in rx.iter() {
        match event {
            BatchEvent::Log(line) => bar.println(line),
            BatchEvent::Progress { completed, .. } => bar.set_position(completed as u64),
            BatchEvent::Finished => break,
        }
    }
    bar.finish_and_clear();

    match controller.join() {
        Some(Ok(report)) => {
            print_report(&report, args.json)?;
            Ok(0)
        }
        Some(Err(err)) => {
            eprintln!("fatal: {err}");
            Ok(EXIT_SOURCE_UNREADABLE)
        }
        None => bail!("batch worker ended without a result"),
    }
}

fn select_targets(args: &PushArgs) -> Result<Vec<TargetVolume>> {
    if args.all_removable {
        return Ok(fanout_core::list_removable_volumes());
    }
    if args.to.is_empty() {
        bail!("select at least one target volume (--to <ROOT> or --all-removable)");
    }
    let probe = DiskFreeProbe;
    let mut targets = Vec::with_capacity(args.to.len());
    for root in &args.to {
        if !root.is_dir() {
            bail!("target root {} is not a directory", root.display());
        }
        let free_bytes = match probe.free_bytes(root) {
            Some(free) => free,
            None => {
                eprintln!(
                    "[warn] free space unknown for {}; capacity check disabled for it",
                    root.display()
                );
                u64::MAX
            }
        };
        targets.push(TargetVolume {
            root: root.clone(),
            free_bytes,
        });
    }
    Ok(targets)
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let mut succeeded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for volume in &report.volumes {
        match &volume.outcome {
            VolumeOutcome::Succeeded {
                files_copied,
                bytes_copied,
            } => {
                succeeded += 1;
                println!(
                    "  ok    {}  ({} file(s), {})",
                    volume.root.display(),
                    files_copied,
                    human_bytes(*bytes_copied)
                );
            }
            VolumeOutcome::Skipped { shortfall, .. } => {
                skipped += 1;
                println!(
                    "  skip  {}  (short {})",
                    volume.root.display(),
                    human_bytes(*shortfall)
                );
            }
            VolumeOutcome::Failed { failures } => {
                failed += 1;
                println!(
                    "  fail  {}  ({} failure(s))",
                    volume.root.display(),
                    failures.len()
                );
                for failure in failures {
                    println!("          {failure}");
                }
            }
        }
    }
    println!(
        "{succeeded} ok, {skipped} skipped, {failed} failed of {} volume(s)",
        report.volumes.len()
    );
    Ok(())
}
