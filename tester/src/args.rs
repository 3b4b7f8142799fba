use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Path to file with specified cases
    pub config_path: PathBuf,
    /// Write current outputs as new references instead of comparing
    #[arg(long)]
    pub bless: bool,
    /// Threads to use for mandelbrot inputs (0 for automatic setting)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,
}
