use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use caltrace_core::plot::PlotSpec;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the spec to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save the full default PlotSpec as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let spec = PlotSpec::default();
    let toml_str = toml::to_string_pretty(&spec)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write spec to {}", path.display()))?;
        println!("Default plot spec saved to {}", path.display());
    } else {
        print!("{toml_str}");
    }
    Ok(())
}
