use std::path::PathBuf;

use clap::{Args, ValueEnum};

use mandelsplit::mandelbrot::MandelbrotParams;
use mandelsplit::{Flip, HalfOrder, OddHeight, Source};

use crate::job_loader::{Job, JobLoader, LoaderError};

/// Job options shared by both binaries, flattened into their `Args`.
#[derive(Debug, Default, Args)]
pub struct JobArgs {
    /// Image to split [default: mandel-small.jpg]
    #[arg()]
    pub input: Option<PathBuf>,
    /// Path to job json5 file, flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Render a mandelbrot set instead of loading an image
    #[arg(long, conflicts_with = "input")]
    pub mandelbrot: bool,
    /// Height of the rendered mandelbrot set
    #[arg(long, requires = "mandelbrot")]
    pub rows: Option<usize>,
    /// Binarize with this luma threshold before splitting
    #[arg(long)]
    pub threshold: Option<u8>,
    /// Flip applied to the upper half [default: both]
    #[arg(long, value_enum)]
    pub upper: Option<FlipArg>,
    /// Flip applied to the lower half [default: none]
    #[arg(long, value_enum)]
    pub lower: Option<FlipArg>,
    /// Put the upper half on the left
    #[arg(long)]
    pub upper_first: bool,
    /// Drop a row on odd heights instead of failing
    #[arg(long)]
    pub drop_row: bool,
    /// Mark the top edge with squares of this half size
    #[arg(long)]
    pub markers: Option<u32>,
    /// Threads to use for rendering (0 for automatic setting)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum FlipArg {
    None,
    Vertical,
    Horizontal,
    Both,
}

impl From<FlipArg> for Option<Flip> {
    fn from(f: FlipArg) -> Self {
        match f {
            FlipArg::None => None,
            FlipArg::Vertical => Some(Flip::Vertical),
            FlipArg::Horizontal => Some(Flip::Horizontal),
            FlipArg::Both => Some(Flip::Both),
        }
    }
}

impl JobArgs {
    pub fn resolve(&self) -> Result<Job, LoaderError> {
        let mut job = match &self.config {
            Some(path) => JobLoader::load_from_path(path)?,
            None => Job::default(),
        };

        if let Some(input) = &self.input {
            job.source = Source::File(input.clone());
        }

        if self.mandelbrot {
            let mut params = match &job.source {
                Source::Mandelbrot { mandelbrot } => mandelbrot.clone(),
                Source::File(_) => MandelbrotParams::default(),
            };

            if let Some(rows) = self.rows {
                params.rows = rows;
            }

            params
                .validate()
                .map_err(|e| LoaderError::Other(e.to_string()))?;

            job.source = Source::Mandelbrot { mandelbrot: params };
        }

        let pipeline = &mut job.pipeline;

        if self.threshold.is_some() {
            pipeline.threshold = self.threshold;
        }
        if let Some(upper) = self.upper {
            pipeline.upper = upper.into();
        }
        if let Some(lower) = self.lower {
            pipeline.lower = lower.into();
        }
        if self.upper_first {
            pipeline.order = HalfOrder::UpperFirst;
        }
        if self.drop_row {
            pipeline.odd_height = OddHeight::DropRow;
        }
        if self.markers.is_some() {
            pipeline.markers = self.markers;
        }

        if let Some(threads) = self.threads {
            job.threads = threads;
        }

        Ok(job)
    }
}
