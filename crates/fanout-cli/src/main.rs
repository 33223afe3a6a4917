use clap::{Args, Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;

mod push;
mod scan;

#[derive(Parser)]
#[command(name = "fanout")]
#[command(about = "Replicate one file or folder onto many removable volumes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List removable volumes and their free space
    Scan(ScanArgs),
    /// Replicate a source onto the selected volumes
    Push(PushArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Emit the volume list as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct PushArgs {
    /// Source file or folder to replicate
    source: PathBuf,
    /// Target volume root (repeatable)
    #[arg(long = "to", value_name = "ROOT")]
    to: Vec<PathBuf>,
    /// Push to every removable volume currently mounted
    #[arg(long, conflicts_with = "to")]
    all_removable: bool,
    /// Place the payload under this folder on every volume
    #[arg(long, value_name = "NAME", conflicts_with = "source_folder")]
    folder: Option<String>,
    /// Place the payload under a folder named after the source
    #[arg(long)]
    source_folder: bool,
    /// Replace the file name at the destination (file sources only)
    #[arg(long, value_name = "NAME")]
    rename: Option<String>,
    /// Remove existing destination content before copying
    #[arg(long)]
    overwrite: bool,
    /// Emit the final per-volume report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let code = match &cli.command {
        Commands::Scan(args) => scan::run(args)?,
        Commands::Push(args) => push::run(args)?,
    };
    std::process::exit(code);
}
