pub mod capture;
pub mod file;
pub mod framer;
pub mod pipeline;

pub use capture::WavSink;
pub use file::AudioFile;
pub use framer::{PcmFrame, PcmFramer, FRAME_SAMPLES, TARGET_SAMPLE_RATE};
pub use pipeline::{frame_channel, FrameSender, DEFAULT_FRAME_CHANNEL_CAPACITY};
