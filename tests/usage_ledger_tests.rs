// Integration tests for the token usage ledger

use std::sync::Arc;

use scribeflow::storage::keys::USAGE_HISTORY_KEY;
use scribeflow::storage::{KeyValueStore, MemoryStore};
use scribeflow::usage::{TokenUsage, UsageLedger, MAX_ENTRIES};

fn usage(model: &str, total: u64) -> TokenUsage {
    TokenUsage {
        provider: "openai".to_string(),
        model: model.to_string(),
        input_tokens: total / 2,
        output_tokens: total - total / 2,
        total_tokens: total,
    }
}

#[test]
fn test_record_usage_appends_and_stamps() {
    let store = Arc::new(MemoryStore::new());
    let ledger = UsageLedger::new(store);

    let entry = ledger.record_usage(usage("gpt-4.1", 1000));
    assert!(entry.timestamp > 0, "entries are stamped at record time");

    let entries = ledger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].total_tokens, 1000);
    assert_eq!(entries[0].input_tokens + entries[0].output_tokens, 1000);
}

#[test]
fn test_default_cap_matches_spec() {
    assert_eq!(MAX_ENTRIES, 10_000);
}

#[test]
fn test_cap_evicts_oldest_first() {
    let cap = 20;
    let store = Arc::new(MemoryStore::new());
    let ledger = UsageLedger::with_capacity(store, cap);

    for i in 0..(cap + 5) {
        ledger.record_usage(usage(&format!("model-{}", i), i as u64));
    }

    let entries = ledger.entries();
    assert_eq!(entries.len(), cap);

    // The 5 oldest are gone; the rest keep their relative order
    assert_eq!(entries[0].model, "model-5");
    assert_eq!(entries[cap - 1].model, format!("model-{}", cap + 4));
    for window in entries.windows(2) {
        assert!(window[0].total_tokens < window[1].total_tokens);
    }
}

#[test]
fn test_history_persists_across_ledger_instances() {
    let store = Arc::new(MemoryStore::new());

    {
        let ledger = UsageLedger::new(store.clone());
        ledger.record_usage(usage("claude-sonnet", 500));
        ledger.record_usage(usage("claude-sonnet", 700));
    }

    let reloaded = UsageLedger::new(store);
    let entries = reloaded.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].total_tokens, 500);
    assert_eq!(entries[1].total_tokens, 700);
}

#[test]
fn test_malformed_persisted_history_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(USAGE_HISTORY_KEY, "{definitely not json");

    let ledger = UsageLedger::new(store);
    assert!(ledger.entries().is_empty());
}

#[test]
fn test_clear_history_empties_memory_and_storage() {
    let store = Arc::new(MemoryStore::new());
    let ledger = UsageLedger::new(store.clone());

    ledger.record_usage(usage("gemini-pro", 300));
    ledger.clear_history();

    assert!(ledger.entries().is_empty());
    assert_eq!(store.get(USAGE_HISTORY_KEY), None);
}
