use clap::Parser;

use mandelsplit_common::args::JobArgs;

#[derive(Debug, Parser)]
pub struct ArgsInteractive {
    #[command(flatten)]
    pub job: JobArgs,
    /// Window title, overrides the one from the job file [default: cropped]
    #[arg(long)]
    pub title: Option<String>,
    /// Smooth the image when the window is scaled
    #[arg(long)]
    pub smooth: bool,
}
