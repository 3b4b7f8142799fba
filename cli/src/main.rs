use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;

use thiserror::Error;

use tracing::{error, info};

use mandelsplit::profile::Marker;
use mandelsplit::sonify::{self, CHANNELS, SAMPLE_RATE};
use mandelsplit::{FrameBuffer, PipelineError, SourceError};

use mandelsplit_common::job_loader::LoaderError;
use mandelsplit_common::logging;

mod args;

use args::Args;

const DEFAULT_OUTPUT: &str = "cropped.png";

fn main() {
    logging::init();

    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let job = args.job.resolve()?;

    let output = args
        .output
        .or(job.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    info!(source = %job.source, "Reading input");
    let fb = job.source.acquire(job.threads)?;

    let composed = job.pipeline.compose(&fb)?;

    write_out(&composed.image, &output)?;
    info!(path = %output.display(), "Saved composition");

    if let Some(sound) = &args.sound {
        write_sound(&composed.edge, composed.image.height(), sound)?;
        info!(path = %sound.display(), tones = composed.edge.len(), "Saved sound");
    }

    Ok(())
}

fn write_out(fb: &FrameBuffer, name: &Path) -> Result<(), CliError> {
    if fb.is_empty() {
        return Err(CliError::EmptyOutput);
    }

    let file = File::create(name).map_err(|e| CliError::Output(name.to_owned(), e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, fb.width() as u32, fb.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(fb.as_bytes())?;
    writer.finish()?;

    Ok(())
}

fn write_sound(edge: &[Marker], rows: usize, name: &Path) -> Result<(), CliError> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(name, spec)?;

    for sample in sonify::sonify(edge, rows) {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;

    Ok(())
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Could not read job description: {0}")]
    Job(#[from] LoaderError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("composition has no pixels, nothing to save")]
    EmptyOutput,
    #[error("could not create {}: {1}", .0.display())]
    Output(PathBuf, #[source] std::io::Error),
    #[error("could not encode png: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("could not write sound: {0}")]
    Sound(#[from] hound::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    use mandelsplit::{Pixel, SplitPipeline};

    fn read_png(path: &Path) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(File::open(path).unwrap());
        let mut reader = decoder.read_info().unwrap();

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());

        (info.width, info.height, buf)
    }

    #[test]
    fn writes_rgb_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut fb = FrameBuffer::new(3, 2);
        *fb.pixel_mut(2, 1).unwrap() = Pixel::new(1, 2, 3);
        write_out(&fb, &path).unwrap();

        let (w, h, data) = read_png(&path);
        assert_eq!((w, h), (3, 2));
        assert_eq!(data, fb.as_bytes());
    }

    #[test]
    fn refuses_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let fb = FrameBuffer::new(4, 0);
        assert!(matches!(write_out(&fb, &path), Err(CliError::EmptyOutput)));
        assert!(!path.exists());
    }

    #[test]
    fn composes_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropped.png");

        let pixels = (0..4 * 6).map(|i| Pixel::gray(i as u8)).collect();
        let fb = FrameBuffer::from_pixels(4, 6, pixels).unwrap();
        let composed = SplitPipeline::default().run(&fb).unwrap();
        write_out(&composed, &path).unwrap();

        let (w, h, data) = read_png(&path);
        assert_eq!((w, h), (8, 3));
        // first pixel is the first of the lower half, row 3
        assert_eq!(&data[..3], &[12, 12, 12]);
        // right half opens with the last pixel of the upper half
        assert_eq!(&data[4 * 3..5 * 3], &[11, 11, 11]);
    }

    #[test]
    fn writes_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.wav");

        let edge = [Marker { x: 0, y: 5 }, Marker { x: 3, y: 9 }];
        write_sound(&edge, 10, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(reader.duration() as usize, 2 * sonify::tone_frames());
    }

    #[test]
    fn sound_flag_writes_wav_next_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        let sound = dir.path().join("out.wav");

        let mut fb = FrameBuffer::new(4, 6);
        *fb.pixel_mut(1, 5).unwrap() = Pixel::white();
        write_out(&fb, &input).unwrap();

        let args = Args::parse_from([
            "mandelsplit-cli",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--sound",
            sound.to_str().unwrap(),
        ]);
        run(args).unwrap();

        assert!(output.exists());
        // a single white pixel gives a single tone
        let reader = hound::WavReader::open(&sound).unwrap();
        assert_eq!(reader.duration() as usize, sonify::tone_frames());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "mandelsplit-cli",
            dir.path().join("mandel-small.jpg").to_str().unwrap(),
            "-o",
            dir.path().join("out.png").to_str().unwrap(),
        ]);

        let err = run(args).unwrap_err();
        assert!(err.to_string().starts_with("file not found: "));
    }
}
