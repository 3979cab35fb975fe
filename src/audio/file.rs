use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;
use tracing::info;

use super::framer::TARGET_SAMPLE_RATE;

/// An uploaded audio file, decoded to interleaved 16-bit samples for
/// batch transcription.
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 /
            (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Normalize to 16 kHz mono for the transcription service:
    /// stereo is downmixed by clamped summation, then the stream is
    /// decimated with the same rounded integer ratio the live framer
    /// uses.
    pub fn resample_to_mono_16khz(&self) -> Result<Vec<i16>> {
        let mono: Vec<i16> = match self.channels {
            1 => self.samples.clone(),
            2 => self
                .samples
                .chunks_exact(2)
                .map(|pair| {
                    let sum = pair[0] as i32 + pair[1] as i32;
                    sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16
                })
                .collect(),
            n => anyhow::bail!("Unsupported channel count: {}", n),
        };

        if self.sample_rate == TARGET_SAMPLE_RATE {
            return Ok(mono);
        }
        if self.sample_rate < TARGET_SAMPLE_RATE {
            anyhow::bail!(
                "Cannot upsample {}Hz audio to {}Hz",
                self.sample_rate,
                TARGET_SAMPLE_RATE
            );
        }

        let ratio = (self.sample_rate as f64 / TARGET_SAMPLE_RATE as f64).round() as usize;
        Ok(mono.iter().step_by(ratio.max(1)).copied().collect())
    }
}
