use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::framer::{PcmFrame, TARGET_SAMPLE_RATE};

/// Writes a realtime session's 16 kHz mono frames to a WAV file, so
/// the captured audio survives the session the way a standard-mode
/// recording does.
pub struct WavSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    frames_written: usize,
}

impl WavSink {
    pub fn create(dir: impl AsRef<Path>, session_id: &str) -> Result<Self> {
        fs::create_dir_all(dir.as_ref()).context("Failed to create capture directory")?;

        let path = dir.as_ref().join(format!("{}.wav", session_id));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

        info!("Capture archive: {}", path.display());

        Ok(Self {
            writer: Some(writer),
            path,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &PcmFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in frame.samples() {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            self.frames_written += 1;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }
        info!(
            "Capture archive complete: {} ({} frames)",
            self.path.display(),
            self.frames_written
        );
        Ok(self.path.clone())
    }
}

impl Drop for WavSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
