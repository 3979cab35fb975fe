//! Per-mode session persistence
//!
//! This module provides the session record abstraction:
//! - Two independent namespaced records (standard, realtime)
//! - Transcript/summary/form-state/question persistence per mode
//! - The `updated_at` stamp written only on transcript writes
//! - Cross-mode "latest transcript" recency resolution

mod store;
mod types;

pub use store::SessionStore;
pub use types::{LatestTranscript, LiveQuestion, Mode, OutputMode, QuestionStatus, SessionData};
