use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use tracing::{debug, info};

pub struct TransportClient {
    client: Client,
    session_id: String,
}

impl TransportClient {
    /// Connect to the message broker
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to transport at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to transport")?;

        info!("Connected to transport successfully");

        Ok(Self { client, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publish one PCM frame. An empty `pcm_bytes` with
    /// `final_frame = true` marks end of stream.
    pub async fn publish_frame(
        &self,
        pcm_bytes: &[u8],
        sequence: u32,
        final_frame: bool,
    ) -> Result<()> {
        let subject = format!("audio.frame.session-{}", self.session_id);

        let message = super::messages::AudioFrameMessage {
            session_id: self.session_id.clone(),
            sequence,
            pcm: base64::engine::general_purpose::STANDARD.encode(pcm_bytes),
            sample_rate: crate::audio::TARGET_SAMPLE_RATE,
            channels: 1,
            timestamp: chrono::Utc::now().to_rfc3339(),
            final_frame,
        };

        let payload = serde_json::to_vec(&message)?;

        self.client.publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish audio frame")?;

        debug!(
            "Published audio frame to {} (seq={}, bytes={}, final={})",
            subject, sequence, pcm_bytes.len(), final_frame
        );

        Ok(())
    }

    /// Subscribe to transcript messages
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        // The STT service publishes to stt.text.partial and stt.text.final;
        // we take both and filter by session_id in the message payload.
        let subject = "stt.text.>";

        info!("Subscribing to transcripts on {}", subject);

        let subscriber = self.client.subscribe(subject)
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }

    pub async fn close(self) -> Result<()> {
        info!("Closing transport connection");
        // async-nats handles cleanup on drop
        Ok(())
    }
}
