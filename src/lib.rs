pub mod audio;
pub mod coalesce;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod llm;
pub mod realtime;
pub mod session;
pub mod settings;
pub mod storage;
pub mod transport;
pub mod usage;

pub use audio::{AudioFile, FrameSender, PcmFrame, PcmFramer, WavSink, FRAME_SAMPLES};
pub use coalesce::{merge_form_values, FormFiller, QuestionEvaluator, TriggerOutcome};
pub use config::Config;
pub use http::{create_router, AppState};
pub use lifecycle::{ConnectionStatus, RecorderState, SessionSupervisor, SupervisorStatus};
pub use llm::{llm_config_from_store, HttpLlmService, LlmConfig, LlmProvider, LlmService};
pub use realtime::{RealtimeStream, StreamConfig, TranscriptAccumulator};
pub use session::{LatestTranscript, LiveQuestion, Mode, OutputMode, SessionData, SessionStore};
pub use settings::{ConfigCodecError, ExportOptions};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use transport::{AudioFrameMessage, TransportClient, TranscriptMessage};
pub use usage::{TokenUsage, TokenUsageEntry, UsageLedger};
