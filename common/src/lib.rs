pub mod args;
pub mod job_loader;
pub mod logging;
