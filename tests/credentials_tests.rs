// Tests for assembling LLM call configuration from stored settings

use scribeflow::llm::{
    azure_config_from_store, langdock_config_from_store, llm_config_from_store, model_from_store,
    LlmProvider,
};
use scribeflow::storage::{keys, KeyValueStore, MemoryStore};

#[test]
fn test_llm_config_reads_provider_key() {
    let store = MemoryStore::new();
    store.set(&keys::api_key("anthropic"), "sk-ant-test");

    let config = llm_config_from_store(&store, LlmProvider::Anthropic, "claude-sonnet");
    assert_eq!(config.api_key, "sk-ant-test");
    assert_eq!(config.model, "claude-sonnet");
    assert_eq!(config.provider, LlmProvider::Anthropic);
}

#[test]
fn test_missing_key_reads_empty_not_error() {
    let store = MemoryStore::new();

    let config = llm_config_from_store(&store, LlmProvider::Gemini, "gemini-pro");
    assert_eq!(config.api_key, "");
}

#[test]
fn test_azure_config_requires_all_three_fields() {
    let store = MemoryStore::new();

    store.set(&keys::azure("api_version"), "2024-06-01");
    store.set(&keys::azure("endpoint"), "https://example.openai.azure.com");
    assert_eq!(azure_config_from_store(&store), None, "deployment name missing");

    store.set(&keys::azure("deployment_name"), "gpt-test");
    let azure = azure_config_from_store(&store).unwrap();
    assert_eq!(azure.api_version, "2024-06-01");
    assert_eq!(azure.azure_endpoint, "https://example.openai.azure.com");
    assert_eq!(azure.deployment_name, "gpt-test");
}

#[test]
fn test_azure_config_rejects_empty_fields() {
    let store = MemoryStore::new();
    store.set(&keys::azure("api_version"), "2024-06-01");
    store.set(&keys::azure("endpoint"), "");
    store.set(&keys::azure("deployment_name"), "gpt-test");

    assert_eq!(azure_config_from_store(&store), None);
}

#[test]
fn test_langdock_region_parsing() {
    let store = MemoryStore::new();
    assert_eq!(langdock_config_from_store(&store), None);

    store.set(&keys::langdock("region"), "eu");
    assert!(langdock_config_from_store(&store).is_some());

    store.set(&keys::langdock("region"), "mars");
    assert_eq!(langdock_config_from_store(&store), None);
}

#[test]
fn test_model_selection_lookup() {
    let store = MemoryStore::new();
    assert_eq!(model_from_store(&store, LlmProvider::Openai), None);

    store.set(&keys::model("openai"), "gpt-4.1");
    assert_eq!(
        model_from_store(&store, LlmProvider::Openai).as_deref(),
        Some("gpt-4.1")
    );

    store.set(&keys::model("openai"), "");
    assert_eq!(model_from_store(&store, LlmProvider::Openai), None);
}
