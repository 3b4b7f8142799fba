use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;

use thiserror::Error;

use tracing::{error, info, warn};

use mandelsplit::{FrameBuffer, PipelineError, SourceError};

use mandelsplit_common::logging;

mod args;
mod config;

use crate::config::{Case, Config};

fn main() {
    logging::init();

    let args = <args::Args as Parser>::parse();

    match run(&args) {
        Ok(0) => info!("All cases passed"),
        Ok(failed) => {
            error!(failed, "Some cases failed");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

/// Runs every case and returns the number of failed ones.
fn run(args: &args::Args) -> Result<usize, TesterError> {
    let config = std::fs::read_to_string(&args.config_path)
        .map_err(|e| TesterError::Config(args.config_path.clone(), e.to_string()))?;

    let mut config: Config = toml::from_str(&config)
        .map_err(|e| TesterError::Config(args.config_path.clone(), e.to_string()))?;
    config.resolve_paths(&get_test_path(&args.config_path));

    let mut failed = 0;

    for case in &config.case {
        info!(input = %case.input, "Testing");

        let output = execute_case(case, args.threads)?;

        if args.bless {
            write_image(&case.reference_image, &output)?;
            info!(path = %case.reference_image.display(), "Wrote reference");
            continue;
        }

        let reference = read_image(&case.reference_image)?;

        match compare(&output, &reference) {
            Some(comp) if comp.percentage_err <= case.tolerance => {
                info!(
                    total = comp.total_err,
                    percent = comp.percentage_err,
                    "Passed"
                );
            }
            Some(comp) => {
                warn!(
                    total = comp.total_err,
                    percent = comp.percentage_err,
                    tolerance = case.tolerance,
                    "Failed"
                );
                failed += 1;
            }
            None => {
                warn!(
                    output = ?output.shape(),
                    reference = ?reference.shape(),
                    "Failed, shapes do not match"
                );
                failed += 1;
            }
        }
    }

    Ok(failed)
}

fn get_test_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_owned)
        .unwrap_or_default()
}

fn execute_case(case: &Case, threads: usize) -> Result<FrameBuffer, TesterError> {
    let fb = case.input.acquire(threads)?;

    Ok(case.pipeline.run(&fb)?)
}

fn read_image(path: &Path) -> Result<FrameBuffer, TesterError> {
    let image_err = |reason: String| TesterError::Image(path.to_owned(), reason);

    let file = File::open(path).map_err(|e| image_err(e.to_string()))?;

    let mut decoder = png::Decoder::new(file);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder.read_info().map_err(|e| image_err(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| image_err(e.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.color_type != png::ColorType::Rgb {
        return Err(image_err(format!(
            "expected an rgb image, found {:?}",
            info.color_type
        )));
    }

    FrameBuffer::from_rgb_bytes(info.width as usize, info.height as usize, &buf)
        .map_err(|e| image_err(e.to_string()))
}

fn write_image(path: &Path, fb: &FrameBuffer) -> Result<(), TesterError> {
    let image_err = |reason: String| TesterError::Image(path.to_owned(), reason);

    let file = File::create(path).map_err(|e| image_err(e.to_string()))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), fb.width() as u32, fb.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| image_err(e.to_string()))?;
    writer
        .write_image_data(fb.as_bytes())
        .map_err(|e| image_err(e.to_string()))?;

    writer.finish().map_err(|e| image_err(e.to_string()))
}

/// Mean absolute channel error, `None` when the shapes differ.
fn compare(new_img: &FrameBuffer, old_img: &FrameBuffer) -> Option<Comparison> {
    if new_img.shape() != old_img.shape() {
        return None;
    }

    let (new_bytes, old_bytes) = (new_img.as_bytes(), old_img.as_bytes());

    let mut total_err = 0.0;

    for (n, o) in new_bytes.iter().zip(old_bytes.iter()) {
        total_err += n.abs_diff(*o) as f32 / 255.0;
    }

    let percentage_err = if new_bytes.is_empty() {
        0.0
    } else {
        (total_err / new_bytes.len() as f32) * 100.0
    };

    Some(Comparison {
        total_err,
        percentage_err,
    })
}

#[derive(Debug, PartialEq)]
struct Comparison {
    pub total_err: f32,
    pub percentage_err: f32,
}

#[derive(Debug, Error)]
enum TesterError {
    #[error("Cannot read config {}: {1}", .0.display())]
    Config(PathBuf, String),
    #[error("Cannot process {}: {1}", .0.display())]
    Image(PathBuf, String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    use mandelsplit::Pixel;

    #[test]
    fn identical_images_have_no_error() {
        let fb = FrameBuffer::from_pixel(3, 2, Pixel::new(10, 20, 30));
        assert_eq!(
            compare(&fb, &fb),
            Some(Comparison {
                total_err: 0.0,
                percentage_err: 0.0
            })
        );
    }

    #[test]
    fn error_is_averaged_over_channels() {
        let black = FrameBuffer::new(2, 2);
        let mut other = FrameBuffer::new(2, 2);
        *other.pixel_mut(0, 0).unwrap() = Pixel::white();

        let comp = compare(&other, &black).unwrap();
        assert_eq!(comp.total_err, 3.0);
        assert_eq!(comp.percentage_err, 25.0);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        assert_eq!(compare(&FrameBuffer::new(2, 3), &FrameBuffer::new(3, 2)), None);
    }

    #[test]
    fn bless_then_compare() {
        let dir = tempfile::tempdir().unwrap();

        let pixels = (0..4 * 6).map(|i| Pixel::gray(i as u8 * 10)).collect();
        let input = FrameBuffer::from_pixels(4, 6, pixels).unwrap();
        write_image(&dir.path().join("input.png"), &input).unwrap();

        let config_path = dir.path().join("cases.toml");
        std::fs::write(
            &config_path,
            "[[case]]\ninput = \"input.png\"\nreference = \"cropped.png\"\n",
        )
        .unwrap();

        let bless = args::Args::parse_from(["tester", config_path.to_str().unwrap(), "--bless"]);
        assert_eq!(run(&bless).unwrap(), 0);

        let reference = read_image(&dir.path().join("cropped.png")).unwrap();
        assert_eq!(reference.shape(), (3, 8, 3));

        let check = args::Args::parse_from(["tester", config_path.to_str().unwrap()]);
        assert_eq!(run(&check).unwrap(), 0);
    }

    #[test]
    fn changed_output_fails() {
        let dir = tempfile::tempdir().unwrap();

        let input = FrameBuffer::from_pixel(4, 6, Pixel::white());
        write_image(&dir.path().join("input.png"), &input).unwrap();
        write_image(&dir.path().join("cropped.png"), &FrameBuffer::new(8, 3)).unwrap();

        let config_path = dir.path().join("cases.toml");
        std::fs::write(
            &config_path,
            "[[case]]\ninput = \"input.png\"\nreference = \"cropped.png\"\n",
        )
        .unwrap();

        let args = args::Args::parse_from(["tester", config_path.to_str().unwrap()]);
        assert_eq!(run(&args).unwrap(), 1);
    }
}
