pub mod concat;
pub mod framebuffer;
pub mod loader;
pub mod mandelbrot;
pub mod pipeline;
pub mod profile;
pub mod region;
pub mod rotate;
pub mod sonify;
pub mod source;
pub mod threshold;

pub use framebuffer::{FrameBuffer, Pixel};
pub use pipeline::{Composition, HalfOrder, OddHeight, PipelineError, SplitPipeline};
pub use rotate::Flip;
pub use source::{Source, SourceError};

/// Window title the composition is shown under.
pub const WINDOW_TITLE: &str = "cropped";
