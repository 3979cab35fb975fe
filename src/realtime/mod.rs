//! Realtime streaming session
//!
//! This module provides the live-transcription pipeline:
//! - Framing captured audio into fixed 100ms PCM frames
//! - Publishing frames to the STT service over the transport
//! - Folding returned turns into the accumulated transcript
//! - Persisting transcript growth through the session store
//! - Lifecycle supervision (connect/pause/disconnect)

mod accumulator;
mod stream;

pub use accumulator::TranscriptAccumulator;
pub use stream::{RealtimeStream, StreamConfig};
