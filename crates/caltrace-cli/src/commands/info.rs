use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use caltrace_core::io::decode::probe_path;

#[derive(Args)]
pub struct InfoArgs {
    /// Input recording (TIFF stack, GIF, MJPEG AVI, or still image)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let (video, info) = probe_path(&args.file)?;

    println!("File:        {}", args.file.display());
    println!("Container:   {}", info.container);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);

    let decoded_mb = (video.frames.len() * info.width as usize * info.height as usize * 4) as f64
        / (1024.0 * 1024.0);
    println!("Decoded:     {:.1} MB", decoded_mb);

    Ok(())
}
