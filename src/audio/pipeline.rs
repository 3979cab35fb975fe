use tokio::sync::mpsc;
use tracing::warn;

use super::framer::PcmFrame;

/// Default capacity of the frame channel: 64 frames = 6.4 s of audio.
pub const DEFAULT_FRAME_CHANNEL_CAPACITY: usize = 64;

/// Bounded frame channel between the framer and the publisher.
///
/// When the consumer can't keep up the newest frame is dropped and
/// counted, rather than queueing without bound. Sustained overload
/// therefore degrades transcription quality instead of exhausting
/// memory.
pub struct FrameSender {
    tx: mpsc::Sender<PcmFrame>,
    dropped: usize,
}

pub fn frame_channel(capacity: usize) -> (FrameSender, mpsc::Receiver<PcmFrame>) {
    let (tx, rx) = mpsc::channel(capacity);
    (FrameSender { tx, dropped: 0 }, rx)
}

impl FrameSender {
    /// Offer a frame; drops it (and counts the drop) when the channel
    /// is full or closed.
    pub fn offer(&mut self, frame: PcmFrame) {
        if self.tx.try_send(frame).is_err() {
            self.dropped += 1;
            if self.dropped % 50 == 1 {
                warn!("Frame channel congested, {} frame(s) dropped so far", self.dropped);
            }
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
