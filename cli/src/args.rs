use clap::Parser;

use std::path::PathBuf;

use mandelsplit_common::args::JobArgs;

#[derive(Debug, Parser)]
#[command(about = "Split an image at its midline, turn the upper half around and save both halves side by side")]
pub struct Args {
    #[command(flatten)]
    pub job: JobArgs,
    /// Path to save the composition to [default: cropped.png]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also write the top edge as a stereo WAV, one tone per column
    #[arg(long)]
    pub sound: Option<PathBuf>,
}
