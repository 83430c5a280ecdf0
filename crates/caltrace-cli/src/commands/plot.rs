use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use caltrace_core::plot::spec::YAxis;
use caltrace_core::plot::{render_plot, PlotSpec};
use caltrace_core::table::import_csv;

#[derive(Args)]
pub struct PlotArgs {
    /// Results CSV produced by `caltrace analyze`
    pub file: PathBuf,

    /// Cells to plot, e.g. --cells 1,2,5
    #[arg(long, value_delimiter = ',', required = true)]
    pub cells: Vec<u32>,

    /// Column to plot on the y axis (intensity or normalized_intensity)
    #[arg(long, default_value = "intensity")]
    pub y_axis: String,

    /// Plot spec TOML (see `caltrace config`); defaults apply if omitted
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "plot.png")]
    pub output: PathBuf,
}

pub fn run(args: &PlotArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let table = import_csv(&bytes)?;

    let mut spec = match &args.spec {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read spec {}", path.display()))?;
            toml::from_str::<PlotSpec>(&text)
                .with_context(|| format!("Invalid plot spec {}", path.display()))?
        }
        None => PlotSpec::default(),
    };
    spec.y_axis = YAxis::parse(&args.y_axis)?;

    let png = render_plot(&table, &args.cells, &spec)?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
