use clap::Parser;

use tracing::{error, info};

use gl_wrapper::texture::TextureFilter;

use mandelsplit_common::logging;

mod app;
mod args;

use app::{App, AppError};
use args::ArgsInteractive;

fn main() {
    logging::init();

    // clion needs help in trait annotation
    let args = <ArgsInteractive as Parser>::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: ArgsInteractive) -> Result<(), AppError> {
    let job = args.job.resolve()?;
    let title = args.title.unwrap_or(job.title);

    info!(source = %job.source, "Reading input");
    let fb = job.source.acquire(job.threads)?;

    let composed = job.pipeline.run(&fb)?;

    let filter = if args.smooth {
        TextureFilter::Linear
    } else {
        TextureFilter::Nearest
    };

    App::new(&composed, &title, filter)?.run()
}
