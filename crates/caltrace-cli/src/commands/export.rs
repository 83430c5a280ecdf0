use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use caltrace_core::table::{export_csv, import_csv};

#[derive(Args)]
pub struct ExportArgs {
    /// Results CSV produced by `caltrace analyze`
    pub file: PathBuf,

    /// Cells to keep, e.g. --cells 1,2,5; omit to keep all
    #[arg(long, value_delimiter = ',')]
    pub cells: Option<Vec<u32>>,

    /// Output CSV path
    #[arg(short, long, default_value = "selected.csv")]
    pub output: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let table = import_csv(&bytes)?;

    let out = export_csv(&table, args.cells.as_deref());
    std::fs::write(&args.output, out)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
