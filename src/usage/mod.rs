//! Token usage ledger
//!
//! Append-only history of LLM token consumption, capped at a fixed
//! count with oldest-first eviction. The ledger is correct in memory
//! even when persistence fails; routine storage trouble is swallowed
//! by the adapter.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::keys::USAGE_HISTORY_KEY;
use crate::storage::KeyValueStore;

/// Maximum retained entries; recording beyond it evicts from the front.
pub const MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsageEntry {
    pub provider: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    /// Epoch ms, stamped at record time.
    pub timestamp: i64,
}

/// A usage report before the ledger stamps it.
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub provider: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

pub struct UsageLedger {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
    entries: Mutex<Vec<TokenUsageEntry>>,
}

impl UsageLedger {
    /// Load the persisted history; malformed history starts empty.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, MAX_ENTRIES)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        let entries = store
            .get(USAGE_HISTORY_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<TokenUsageEntry>>(&raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!("Discarding malformed usage history: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            store,
            max_entries,
            entries: Mutex::new(entries),
        }
    }

    /// Append a stamped entry, evict past the cap, persist the full
    /// sequence. Returns the stored entry.
    pub fn record_usage(&self, usage: TokenUsage) -> TokenUsageEntry {
        let entry = TokenUsageEntry {
            provider: usage.provider,
            model: usage.model,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
            timestamp: Utc::now().timestamp_millis(),
        };

        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }
        self.persist(&entries);

        entry
    }

    pub fn clear_history(&self) {
        self.entries.lock().unwrap().clear();
        self.store.remove(USAGE_HISTORY_KEY);
    }

    pub fn entries(&self) -> Vec<TokenUsageEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn persist(&self, entries: &[TokenUsageEntry]) {
        match serde_json::to_string(entries) {
            Ok(json) => self.store.set(USAGE_HISTORY_KEY, &json),
            Err(e) => warn!("Failed to serialize usage history: {}", e),
        }
    }
}
