/// Target rate expected by the streaming transcription service.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Samples per emitted frame: 1600 at 16 kHz = 100 ms, comfortably
/// inside the service's accepted 50-1000 ms frame range.
pub const FRAME_SAMPLES: usize = 1_600;

/// A full 100 ms frame of 16 kHz mono PCM, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmFrame {
    samples: Vec<i16>,
}

impl PcmFrame {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Wire form: signed 16-bit little-endian.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Converts native-rate float sample blocks into fixed-size 16-bit
/// frames at the target rate.
///
/// Downsampling is point decimation: every `ratio`-th input sample,
/// where `ratio = round(native / 16000)`. No anti-alias filtering, an
/// accepted quality/complexity tradeoff for speech. A partial buffer
/// at stream end is never flushed, losing at most one frame (100 ms)
/// per session.
pub struct PcmFramer {
    ratio: usize,
    buffer: Vec<i16>,
}

impl PcmFramer {
    pub fn new(native_sample_rate: u32) -> Self {
        let ratio = (native_sample_rate as f64 / TARGET_SAMPLE_RATE as f64).round() as usize;
        Self {
            ratio: ratio.max(1),
            buffer: Vec::with_capacity(FRAME_SAMPLES),
        }
    }

    pub fn ratio(&self) -> usize {
        self.ratio
    }

    /// Feed one input block (floats in [-1, 1]); returns the frames
    /// completed by it. An empty block is a no-op, not an error.
    pub fn push_block(&mut self, block: &[f32]) -> Vec<PcmFrame> {
        if block.is_empty() {
            return Vec::new();
        }

        let output_len = block.len() / self.ratio;
        let mut frames = Vec::new();

        for i in 0..output_len {
            let sample = block[i * self.ratio].clamp(-1.0, 1.0);
            self.buffer.push((sample * i16::MAX as f32).round() as i16);

            if self.buffer.len() == FRAME_SAMPLES {
                let samples =
                    std::mem::replace(&mut self.buffer, Vec::with_capacity(FRAME_SAMPLES));
                frames.push(PcmFrame { samples });
            }
        }

        frames
    }

    /// Samples accumulated toward the next (unemitted) frame.
    pub fn pending_samples(&self) -> usize {
        self.buffer.len()
    }
}
