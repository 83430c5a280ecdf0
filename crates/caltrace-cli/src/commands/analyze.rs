use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::Style;

use caltrace_core::io::decode::decode_video_path;
use caltrace_core::mask::load_mask;
use caltrace_core::normalize::BaselineMethod;
use caltrace_core::pipeline::{analyze_reported, AnalyzeConfig, CancelToken};
use caltrace_core::table::export_csv;

use crate::progress::CliReporter;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input recording (TIFF stack, GIF, MJPEG AVI, or still image)
    pub file: PathBuf,

    /// Segmentation mask image; omit to aggregate the whole frame
    #[arg(short, long)]
    pub mask: Option<PathBuf>,

    /// Use the mean of the first K frames as the baseline instead of the
    /// whole-series mean
    #[arg(long)]
    pub baseline_frames: Option<usize>,

    /// Output CSV path
    #[arg(short, long, default_value = "results.csv")]
    pub output: PathBuf,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let video = decode_video_path(&args.file)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;
    println!(
        "Decoded {} frames ({}x{})",
        video.total_frames,
        video.frames[0].width(),
        video.frames[0].height()
    );

    let mask_data = match &args.mask {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read mask {}", path.display()))?;
            let data = load_mask(&bytes)?;
            println!("Mask: {} cells", data.mask.cell_count());
            Some(data)
        }
        None => {
            println!("No mask supplied; aggregating the whole frame as cell 0");
            None
        }
    };

    let config = AnalyzeConfig {
        baseline: match args.baseline_frames {
            Some(frames) => BaselineMethod::FirstFrames { frames },
            None => BaselineMethod::WholeSeriesMean,
        },
    };

    let reporter = CliReporter::new();
    let table = analyze_reported(
        &video.frames,
        mask_data.as_ref().map(|d| &d.mask),
        &config,
        &reporter,
        &CancelToken::new(),
    )?;

    std::fs::write(&args.output, export_csv(&table, None))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_summary(&table);
    println!(
        "Wrote {} rows to {}",
        table.len(),
        args.output.display()
    );
    Ok(())
}

fn print_summary(table: &caltrace_core::table::ResultTable) {
    let header = Style::new().cyan().bold();
    let flagged_style = Style::new().yellow();

    println!();
    println!(
        "  {:>8} {:>12} {:>12} {:>12} {:>12} {:>8}",
        header.apply_to("cell"),
        header.apply_to("mean"),
        header.apply_to("min"),
        header.apply_to("max"),
        header.apply_to("std"),
        header.apply_to("frames"),
    );
    for (cell_id, stats) in table.summary() {
        let flag = if stats.flagged { " !" } else { "" };
        let line = format!(
            "  {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>8}{}",
            cell_id, stats.mean, stats.min, stats.max, stats.std, stats.count, flag
        );
        if stats.flagged {
            println!("{}", flagged_style.apply_to(line));
        } else {
            println!("{line}");
        }
    }
    println!();
}
