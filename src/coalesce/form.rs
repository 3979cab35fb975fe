use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::info;

use crate::llm::{FillFormRequest, FormField, LlmConfig, LlmService};

use super::{InFlightGuard, TriggerOutcome};

/// Merge precedence for form values: previous state first, then the
/// remote fill result, then manual edits. Manual edits always
/// dominate, so a stale remote result applied afterwards can never
/// overwrite what the user typed.
pub fn merge_form_values(
    previous: &Map<String, Value>,
    remote: &Map<String, Value>,
    manual: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = previous.clone();
    for (key, value) in remote {
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in manual {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Auto-fills a form from a growing transcript.
///
/// The single pending item is "the form": once marked complete, or
/// while the transcript hasn't grown past the watermark, triggers are
/// no-ops.
pub struct FormFiller {
    llm: Arc<dyn LlmService>,
    values: Mutex<Map<String, Value>>,
    manual_edits: Mutex<Map<String, Value>>,
    complete: AtomicBool,
    last_filled_transcript_len: AtomicUsize,
    in_flight: AtomicBool,
}

impl FormFiller {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            values: Mutex::new(Map::new()),
            manual_edits: Mutex::new(Map::new()),
            complete: AtomicBool::new(false),
            last_filled_transcript_len: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a fill call should be made for this transcript.
    pub fn should_fill(&self, transcript: &str) -> bool {
        if transcript.trim().is_empty() {
            return false;
        }
        if self.complete.load(Ordering::SeqCst) {
            return false;
        }
        transcript.len() > self.last_filled_transcript_len.load(Ordering::SeqCst)
    }

    /// Issue at most one fill call for the current transcript.
    ///
    /// Skips silently when a call is already in flight or nothing
    /// qualifies. On success the watermark advances to the transcript
    /// length at call time and the result is merged under
    /// [`merge_form_values`] precedence. On failure only the in-flight
    /// flag is reset; the next growth event retries.
    pub async fn trigger_fill(
        &self,
        transcript: &str,
        fields: &[FormField],
        config: &LlmConfig,
    ) -> Result<TriggerOutcome> {
        if self.in_flight.load(Ordering::SeqCst) {
            return Ok(TriggerOutcome::Skipped);
        }
        if fields.is_empty() || !self.should_fill(transcript) {
            return Ok(TriggerOutcome::Skipped);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(TriggerOutcome::Skipped);
        }
        let _guard = InFlightGuard::new(&self.in_flight);

        // Previous values carry manual edits so the model sees what the
        // user already settled.
        let previous = {
            let values = self.values.lock().unwrap().clone();
            let manual = self.manual_edits.lock().unwrap().clone();
            merge_form_values(&values, &Map::new(), &manual)
        };
        let has_previous = previous.values().any(|v| !v.is_null());

        let request = FillFormRequest {
            llm: config.clone(),
            transcript: transcript.to_string(),
            fields: fields.to_vec(),
            previous_values: has_previous.then(|| previous),
        };

        let response = self
            .llm
            .fill_form(request)
            .await
            .context("form fill request failed")?;

        // Watermark advances to the length at call time, not response
        // time, so interim growth re-qualifies the next trigger.
        self.last_filled_transcript_len
            .store(transcript.len(), Ordering::SeqCst);

        let manual = self.manual_edits.lock().unwrap().clone();
        {
            let mut values = self.values.lock().unwrap();
            let merged = merge_form_values(&values, &response.values, &manual);
            *values = merged;
        }

        info!("Form fill merged {} remote values", response.values.len());
        Ok(TriggerOutcome::Triggered)
    }

    /// Record a user edit. Manual edits win over every later remote
    /// result until the form is reset.
    pub fn set_manual_value(&self, field_id: &str, value: Value) {
        self.manual_edits
            .lock()
            .unwrap()
            .insert(field_id.to_string(), value.clone());
        self.values.lock().unwrap().insert(field_id.to_string(), value);
    }

    pub fn toggle_complete(&self) -> bool {
        !self.complete.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    /// Clear values, manual edits, the complete flag, and the
    /// watermark. An in-flight call is not aborted; its eventual
    /// result merges into the cleared state and the reset watermark
    /// re-qualifies the next growth event.
    pub fn reset(&self) {
        self.values.lock().unwrap().clear();
        self.manual_edits.lock().unwrap().clear();
        self.complete.store(false, Ordering::SeqCst);
        self.last_filled_transcript_len.store(0, Ordering::SeqCst);
    }

    pub fn values(&self) -> Map<String, Value> {
        self.values.lock().unwrap().clone()
    }

    pub fn manual_edits(&self) -> Map<String, Value> {
        self.manual_edits.lock().unwrap().clone()
    }
}
