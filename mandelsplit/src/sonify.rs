//! Turns a top-edge profile into sound.
//!
//! Every marker becomes a short sine tone whose pitch grows with the marker's
//! row, so a profile is heard left to right. The phase keeps running across
//! tones.

use std::f64::consts::PI;

use tracing::debug;

use crate::profile::Marker;

pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u16 = 2;
/// Length of one tone.
pub const TONE_MS: u32 = 200;
/// Samples per sine period at pitch 1.
pub const TABLE_SIZE: u32 = 400;
/// Pitch of a marker on the last row.
pub const PITCH_RANGE: f32 = 10.0;

/// Frames (one sample per channel) in a single tone.
pub const fn tone_frames() -> usize {
    (SAMPLE_RATE * TONE_MS / 1000) as usize
}

/// Pitch for a marker on row `y` of an image `rows` high.
pub fn pitch(y: usize, rows: usize) -> f32 {
    if rows == 0 {
        return 0.0;
    }

    PITCH_RANGE / rows as f32 * y as f32
}

/// Pitch as a frequency in Hz.
pub fn frequency(pitch: f32) -> f32 {
    pitch * SAMPLE_RATE as f32 / TABLE_SIZE as f32
}

/// Interleaved stereo samples in `-1.0..=1.0`, one tone per marker.
pub fn sonify(markers: &[Marker], rows: usize) -> Vec<f32> {
    let frames = tone_frames();
    let mut samples = Vec::with_capacity(markers.len() * frames * CHANNELS as usize);
    let mut n: u64 = 0;

    for m in markers {
        let pitch = pitch(m.y, rows) as f64;

        for _ in 0..frames {
            let v = (pitch * 2.0 * PI * (n as f64 / TABLE_SIZE as f64)).sin() as f32;

            for _ in 0..CHANNELS {
                samples.push(v);
            }
            n += 1;
        }
    }

    debug!(tones = markers.len(), samples = samples.len(), "Sonified profile");

    samples
}
