use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::audio::{frame_channel, PcmFramer, WavSink, DEFAULT_FRAME_CHANNEL_CAPACITY};
use crate::lifecycle::SessionSupervisor;
use crate::session::{Mode, SessionStore};
use crate::transport::{TransportClient, TranscriptMessage};

use super::accumulator::TranscriptAccumulator;

/// Configuration for a realtime streaming session
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Message broker URL
    pub transport_url: String,

    /// Sample rate the capture boundary delivers blocks at
    pub native_sample_rate: u32,

    /// Frame channel capacity (frames beyond it are dropped, newest first)
    pub frame_channel_capacity: usize,

    /// Where to archive the session's captured audio, if anywhere
    pub archive_dir: Option<PathBuf>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            transport_url: "nats://localhost:4222".to_string(),
            native_sample_rate: 48_000,
            frame_channel_capacity: DEFAULT_FRAME_CHANNEL_CAPACITY,
            archive_dir: None,
        }
    }
}

/// A live transcription session: frames captured audio, streams it to
/// the STT service, folds returned turns into the accumulated
/// transcript, and persists transcript growth.
///
/// The supervisor's stream-pause flag suspends framing/publishing
/// without touching the connection; stopping publishes the final-frame
/// marker and leaves any partial frame unflushed.
pub struct RealtimeStream {
    config: StreamConfig,

    transport: Arc<TransportClient>,

    supervisor: Arc<SessionSupervisor>,

    sessions: SessionStore,

    /// Whether the stream tasks should keep running
    active: Arc<AtomicBool>,

    /// Frames published so far
    frames_published: Arc<AtomicUsize>,

    /// Accumulated transcript state
    transcript: Arc<Mutex<TranscriptAccumulator>>,

    /// Handle for the framing task
    framing_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Handle for the publishing task
    publish_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Handle for the transcript receiving task
    transcript_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RealtimeStream {
    /// Connect the transport and prepare a session. The supervisor
    /// moves to `connecting` here and to `connected` once `start`
    /// has the pipeline up.
    pub async fn new(
        config: StreamConfig,
        supervisor: Arc<SessionSupervisor>,
        sessions: SessionStore,
    ) -> Result<Self> {
        info!("Creating realtime stream: {}", config.session_id);

        supervisor.begin_connect();

        let transport = match TransportClient::connect(
            &config.transport_url,
            config.session_id.clone(),
        )
        .await
        {
            Ok(client) => Arc::new(client),
            Err(e) => {
                supervisor.disconnect();
                return Err(e).context("Failed to connect transport");
            }
        };

        // Resume from whatever transcript the mode already persisted.
        let persisted = sessions.load(Mode::Realtime).transcript;

        Ok(Self {
            config,
            transport,
            supervisor,
            sessions,
            active: Arc::new(AtomicBool::new(false)),
            frames_published: Arc::new(AtomicUsize::new(0)),
            transcript: Arc::new(Mutex::new(TranscriptAccumulator::with_committed(persisted))),
            framing_task: Arc::new(Mutex::new(None)),
            publish_task: Arc::new(Mutex::new(None)),
            transcript_task: Arc::new(Mutex::new(None)),
        })
    }

    /// Start the pipeline, consuming native-rate float sample blocks
    /// from the capture boundary.
    pub async fn start(&self, mut samples_rx: mpsc::Receiver<Vec<f32>>) -> Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            warn!("Stream already started");
            return Ok(());
        }

        info!("Starting realtime stream: {}", self.config.session_id);

        let (mut frame_tx, mut frame_rx) = frame_channel(self.config.frame_channel_capacity);

        // Framing task: sample blocks -> fixed 100ms frames
        let active = Arc::clone(&self.active);
        let supervisor = Arc::clone(&self.supervisor);
        let native_rate = self.config.native_sample_rate;

        let framing_task = tokio::spawn(async move {
            let mut framer = PcmFramer::new(native_rate);

            while let Some(block) = samples_rx.recv().await {
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                // Pause suspends capture/sending; the connection stays up.
                if supervisor.is_stream_paused() {
                    continue;
                }
                for frame in framer.push_block(&block) {
                    frame_tx.offer(frame);
                }
            }

            if framer.pending_samples() > 0 {
                info!(
                    "Discarding {} samples of partial frame at stream end",
                    framer.pending_samples()
                );
            }
            // frame_tx drops here, closing the channel toward the publisher
        });

        {
            let mut handle = self.framing_task.lock().await;
            *handle = Some(framing_task);
        }

        // Publishing task: frames -> transport (+ optional capture archive)
        let transport = Arc::clone(&self.transport);
        let frames_published = Arc::clone(&self.frames_published);
        let mut sink = match &self.config.archive_dir {
            Some(dir) => match WavSink::create(dir, &self.config.session_id) {
                Ok(sink) => Some(sink),
                Err(e) => {
                    warn!("Capture archive disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        let publish_task = tokio::spawn(async move {
            let mut sequence: u32 = 0;

            while let Some(frame) = frame_rx.recv().await {
                if let Err(e) = transport
                    .publish_frame(&frame.to_le_bytes(), sequence, false)
                    .await
                {
                    error!("Failed to publish audio frame: {}", e);
                }

                let archive_failed = match &mut sink {
                    Some(active_sink) => match active_sink.write_frame(&frame) {
                        Ok(()) => false,
                        Err(e) => {
                            warn!("Capture archive write failed, disabling: {}", e);
                            true
                        }
                    },
                    None => false,
                };
                if archive_failed {
                    sink = None;
                }

                sequence += 1;
                frames_published.store(sequence as usize, Ordering::SeqCst);
            }

            // End of stream marker
            if let Err(e) = transport.publish_frame(&[], sequence, true).await {
                error!("Failed to publish final frame marker: {}", e);
            }

            if let Some(sink) = sink.take() {
                if let Err(e) = sink.finish() {
                    warn!("Failed to finalize capture archive: {}", e);
                }
            }
        });

        {
            let mut handle = self.publish_task.lock().await;
            *handle = Some(publish_task);
        }

        // Transcript task: STT messages -> accumulator -> persistence
        let mut subscriber = self
            .transport
            .subscribe_transcripts()
            .await
            .context("Failed to subscribe to transcripts")?;

        let active = Arc::clone(&self.active);
        let transcript = Arc::clone(&self.transcript);
        let sessions = self.sessions.clone();
        let session_id = self.config.session_id.clone();

        let transcript_task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                if !active.load(Ordering::SeqCst) {
                    break;
                }

                match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(message) => {
                        if message.session_id != session_id {
                            continue;
                        }

                        let mut acc = transcript.lock().await;
                        if message.partial {
                            acc.set_partial(&message.text);
                        } else {
                            acc.fold_final(&message.text);
                            sessions.save_transcript(Mode::Realtime, acc.committed_text());
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                    }
                }
            }

            info!("Transcript receiving task stopped");
        });

        {
            let mut handle = self.transcript_task.lock().await;
            *handle = Some(transcript_task);
        }

        self.supervisor.mark_connected();
        info!("Realtime stream started successfully");

        Ok(())
    }

    /// Stop the pipeline and disconnect. The capture boundary's sender
    /// must be dropped by the caller; this waits for the tasks to
    /// drain and deliver the final marker.
    pub async fn stop(&self) -> Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            warn!("Stream not active");
            return Ok(());
        }

        info!("Stopping realtime stream: {}", self.config.session_id);

        // Wait for the audio side to drain (the caller closed the
        // sample channel), so the final marker goes out before we
        // disconnect.
        for handle in [&self.framing_task, &self.publish_task] {
            let mut handle = handle.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Stream task panicked: {}", e);
                }
            }
        }

        // The transcript subscription blocks on broker delivery; cancel it.
        {
            let mut handle = self.transcript_task.lock().await;
            if let Some(task) = handle.take() {
                task.abort();
                if let Err(e) = task.await {
                    if !e.is_cancelled() {
                        error!("Transcript task panicked: {}", e);
                    }
                }
            }
        }

        self.supervisor.disconnect();
        info!("Realtime stream stopped");

        Ok(())
    }

    /// Current transcript including any in-progress partial.
    pub async fn transcript(&self) -> String {
        self.transcript.lock().await.full_text()
    }

    pub fn frames_published(&self) -> usize {
        self.frames_published.load(Ordering::SeqCst)
    }
}
