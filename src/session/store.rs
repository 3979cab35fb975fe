use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::warn;

use crate::storage::keys::{self, SessionField};
use crate::storage::KeyValueStore;

use super::types::{LatestTranscript, LiveQuestion, Mode, OutputMode, SessionData};

/// Persistence for the two per-mode session records.
///
/// One parameterized store covers both modes; the mode tag selects the
/// key namespace. `save_transcript` is the only operation that stamps
/// `updated_at`; summary and form writes deliberately do not, since
/// the stamp's sole purpose is cross-mode transcript recency.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, mode: Mode) -> SessionData {
        let get = |field: SessionField| self.store.get(&keys::session(mode, field));

        let transcript = get(SessionField::Transcript).unwrap_or_default();
        let summary = get(SessionField::Summary).unwrap_or_default();
        let form_template_id = get(SessionField::FormTemplateId);
        let updated_at = get(SessionField::UpdatedAt).and_then(|raw| raw.parse::<i64>().ok());

        let output_mode = get(SessionField::OutputMode)
            .and_then(|raw| raw.parse::<OutputMode>().ok())
            .unwrap_or_default();

        // Malformed persisted JSON degrades to empty rather than failing the load.
        let form_values = get(SessionField::FormValues)
            .and_then(|raw| match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => Some(values),
                Err(e) => {
                    warn!("Discarding malformed {} form values: {}", mode, e);
                    None
                }
            })
            .unwrap_or_default();

        let questions = get(SessionField::Questions)
            .and_then(|raw| match serde_json::from_str::<Vec<LiveQuestion>>(&raw) {
                Ok(questions) => Some(questions),
                Err(e) => {
                    warn!("Discarding malformed {} questions: {}", mode, e);
                    None
                }
            })
            .unwrap_or_default();

        SessionData {
            transcript,
            summary,
            form_template_id,
            form_values,
            output_mode,
            questions,
            updated_at,
        }
    }

    /// Overwrite the transcript and stamp `updated_at` with the
    /// current time.
    pub fn save_transcript(&self, mode: Mode, transcript: &str) {
        self.store
            .set(&keys::session(mode, SessionField::Transcript), transcript);
        self.store.set(
            &keys::session(mode, SessionField::UpdatedAt),
            &Utc::now().timestamp_millis().to_string(),
        );
    }

    pub fn save_summary(&self, mode: Mode, summary: &str) {
        self.store
            .set(&keys::session(mode, SessionField::Summary), summary);
    }

    pub fn save_form_template_id(&self, mode: Mode, template_id: Option<&str>) {
        let key = keys::session(mode, SessionField::FormTemplateId);
        match template_id {
            Some(id) => self.store.set(&key, id),
            None => self.store.remove(&key),
        }
    }

    pub fn save_form_values(&self, mode: Mode, values: &Map<String, Value>) {
        match serde_json::to_string(values) {
            Ok(json) => self
                .store
                .set(&keys::session(mode, SessionField::FormValues), &json),
            Err(e) => warn!("Failed to serialize {} form values: {}", mode, e),
        }
    }

    /// Standard mode only: which output the workflow renders.
    pub fn save_output_mode(&self, output_mode: OutputMode) {
        self.store.set(
            &keys::session(Mode::Standard, SessionField::OutputMode),
            output_mode.as_str(),
        );
    }

    /// Realtime mode only: the live question list.
    pub fn save_questions(&self, questions: &[LiveQuestion]) {
        match serde_json::to_string(questions) {
            Ok(json) => self
                .store
                .set(&keys::session(Mode::Realtime, SessionField::Questions), &json),
            Err(e) => warn!("Failed to serialize questions: {}", e),
        }
    }

    /// Remove every key in the mode's namespace.
    pub fn clear(&self, mode: Mode) {
        for field in SessionField::for_mode(mode) {
            self.store.remove(&keys::session(mode, *field));
        }
    }

    /// Compare the two modes' `updated_at` stamps (absent = 0) and
    /// return the more recently written transcript. Realtime wins only
    /// on a strictly greater stamp. `None` when neither mode has ever
    /// saved a transcript, or the winning mode's transcript is empty
    /// despite a stamp.
    pub fn latest_transcript(&self) -> Option<LatestTranscript> {
        let stamp = |mode: Mode| {
            self.store
                .get(&keys::session(mode, SessionField::UpdatedAt))
                .and_then(|raw| raw.parse::<i64>().ok())
                .unwrap_or(0)
        };

        let standard = stamp(Mode::Standard);
        let realtime = stamp(Mode::Realtime);

        if standard == 0 && realtime == 0 {
            return None;
        }

        let mode = if realtime > standard {
            Mode::Realtime
        } else {
            Mode::Standard
        };

        let transcript = self
            .store
            .get(&keys::session(mode, SessionField::Transcript))
            .unwrap_or_default();

        if transcript.is_empty() {
            return None;
        }

        Some(LatestTranscript { transcript, mode })
    }
}
