use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use tracing::debug;

use mandelsplit::{Source, SplitPipeline, WINDOW_TITLE};

/// Everything a binary needs to produce one composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub source: Source,
    pub pipeline: SplitPipeline,
    /// 0 for automatic setting
    pub threads: usize,
    pub title: String,
    pub output: Option<PathBuf>,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            source: Source::default(),
            pipeline: SplitPipeline::default(),
            threads: 0,
            title: WINDOW_TITLE.to_owned(),
            output: None,
        }
    }
}

pub struct JobLoader {}

impl JobLoader {
    /// Relative paths inside the file are resolved against the file's directory.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Job, LoaderError> {
        let path = path.as_ref();
        let job_str = std::fs::read_to_string(path).map_err(LoaderError::InputError)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let job = Self::load_from_str(&job_str, base)?;

        debug!(path = %path.display(), source = %job.source, "Read job file");

        Ok(job)
    }

    pub fn load_from_str(job_str: &str, base: &Path) -> Result<Job, LoaderError> {
        let file: JobFile = json5::from_str(job_str).map_err(LoaderError::FormatError)?;

        let mut job = Job::default();

        if let Some(source) = file.input {
            job.source = match source {
                Source::File(p) if p.is_relative() => Source::File(base.join(p)),
                other => other,
            };
        }

        if let Some(pipeline) = file.pipeline {
            job.pipeline = pipeline;
        }

        if let Some(threads) = file.threads {
            job.threads = threads;
        }

        if let Some(title) = file.title {
            if title.trim().is_empty() {
                return Err(LoaderError::Other("window title must not be empty".into()));
            }
            job.title = title;
        }

        job.output = file.output.map(|p| if p.is_relative() { base.join(p) } else { p });

        if let Source::Mandelbrot { mandelbrot } = &job.source {
            mandelbrot
                .validate()
                .map_err(|e| LoaderError::Other(e.to_string()))?;
        }

        Ok(job)
    }
}

#[derive(Debug)]
pub enum LoaderError {
    InputError(std::io::Error),
    FormatError(json5::Error),
    Other(String),
}

impl Display for LoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::InputError(e) => write!(f, "Input error: {e}"),
            LoaderError::FormatError(e) => write!(f, "Format error: {e}"),
            LoaderError::Other(e) => write!(f, "Error: {e}"),
        }
    }
}

impl Error for LoaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InputError(e) => Some(e),
            Self::FormatError(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobFile {
    input: Option<Source>,
    pipeline: Option<SplitPipeline>,
    threads: Option<usize>,
    title: Option<String>,
    output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use mandelsplit::mandelbrot::MandelbrotParams;
    use mandelsplit::{Flip, HalfOrder, OddHeight};

    #[test]
    fn empty_job_is_default() {
        let job = JobLoader::load_from_str("{}", Path::new("")).unwrap();
        assert_eq!(job, Job::default());
        assert_eq!(job.title, "cropped");
        assert_eq!(job.source, Source::File("mandel-small.jpg".into()));
    }

    #[test]
    fn full_job() {
        let job = JobLoader::load_from_str(
            r#"{
                // json5 allows comments
                input: "img/mandel.png",
                pipeline: {
                    threshold: 128,
                    upper: null,
                    lower: "both",
                    order: "upper_first",
                    odd_height: "drop_row",
                    markers: 5,
                },
                threads: 2,
                title: "binary map",
                output: "/tmp/out.png",
            }"#,
            Path::new("jobs"),
        )
        .unwrap();

        assert_eq!(job.source, Source::File(Path::new("jobs").join("img/mandel.png")));
        assert_eq!(
            job.pipeline,
            SplitPipeline {
                threshold: Some(128),
                upper: None,
                lower: Some(Flip::Both),
                order: HalfOrder::UpperFirst,
                odd_height: OddHeight::DropRow,
                markers: Some(5),
            }
        );
        assert_eq!(job.threads, 2);
        assert_eq!(job.title, "binary map");
        assert_eq!(job.output, Some(PathBuf::from("/tmp/out.png")));
    }

    #[test]
    fn partial_pipeline_keeps_defaults() {
        let job =
            JobLoader::load_from_str("{ pipeline: { threshold: 10 } }", Path::new("")).unwrap();

        assert_eq!(job.pipeline.threshold, Some(10));
        assert_eq!(job.pipeline.upper, Some(Flip::Both));
        assert_eq!(job.pipeline.order, HalfOrder::LowerFirst);
    }

    #[test]
    fn mandelbrot_input() {
        let job = JobLoader::load_from_str(
            "{ input: { mandelbrot: { rows: 200, max_iter: 80 } } }",
            Path::new(""),
        )
        .unwrap();

        assert_eq!(
            job.source,
            Source::Mandelbrot {
                mandelbrot: MandelbrotParams {
                    rows: 200,
                    max_iter: 80,
                    ..Default::default()
                }
            }
        );
    }

    #[test]
    fn invalid_mandelbrot_is_rejected() {
        let res = JobLoader::load_from_str(
            "{ input: { mandelbrot: { rows: 0 } } }",
            Path::new(""),
        );
        assert!(matches!(res, Err(LoaderError::Other(_))));

        let res = JobLoader::load_from_str(
            "{ input: { mandelbrot: { re_max: Infinity, rows: 4 } } }",
            Path::new(""),
        );
        assert!(matches!(res, Err(LoaderError::Other(_))));
    }

    #[test]
    fn misspelled_mandelbrot_key_is_rejected() {
        let res = JobLoader::load_from_str(
            "{ input: { mandelbrot: { row: 200 } } }",
            Path::new(""),
        );
        assert!(matches!(res, Err(LoaderError::FormatError(_))));
    }

    #[test]
    fn unknown_keys_and_bad_values() {
        assert!(matches!(
            JobLoader::load_from_str("{ inptu: 'x' }", Path::new("")),
            Err(LoaderError::FormatError(_))
        ));
        assert!(matches!(
            JobLoader::load_from_str("{ pipeline: { threshold: 300 } }", Path::new("")),
            Err(LoaderError::FormatError(_))
        ));
        assert!(matches!(
            JobLoader::load_from_str("{ title: '  ' }", Path::new("")),
            Err(LoaderError::Other(_))
        ));
    }

    #[test]
    fn load_from_path_resolves_relative_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json5");
        std::fs::write(&path, "{ input: 'mandel-small.jpg' }").unwrap();

        let job = JobLoader::load_from_path(&path).unwrap();
        assert_eq!(job.source, Source::File(dir.path().join("mandel-small.jpg")));
    }

    #[test]
    fn missing_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = JobLoader::load_from_path(dir.path().join("missing.json5"));
        assert!(matches!(res, Err(LoaderError::InputError(_))));
    }
}
