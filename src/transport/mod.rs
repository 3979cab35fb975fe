pub mod client;
pub mod messages;

pub use client::TransportClient;
pub use messages::{AudioFrameMessage, TranscriptMessage};
