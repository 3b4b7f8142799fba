use std::path::{Path, PathBuf};

use serde::Deserialize;

use mandelsplit::{Source, SplitPipeline};

/// Mean absolute error in percent a case may reach before it fails.
pub const DEFAULT_TOLERANCE: f32 = 0.5;

#[derive(Deserialize, Debug)]
pub struct Config {
    pub case: Vec<Case>,
}

#[derive(Deserialize, Debug)]
pub struct Case {
    #[serde(default)]
    pub input: Source,
    #[serde(rename = "reference")]
    pub reference_image: PathBuf,
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    #[serde(flatten)]
    pub pipeline: SplitPipeline,
}

fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}

impl Config {
    /// Makes file paths relative to `base` absolute.
    pub fn resolve_paths(&mut self, base: &Path) {
        for case in &mut self.case {
            if let Source::File(path) = &mut case.input {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }

            if case.reference_image.is_relative() {
                case.reference_image = base.join(&case.reference_image);
            }
        }
    }
}
