use crate::storage::keys;
use crate::storage::KeyValueStore;

use super::types::{AzureConfig, LangdockConfig, LangdockRegion, LlmConfig, LlmProvider};

/// Assemble the provider/credential configuration for a remote call
/// from stored settings. A missing API key comes back empty; the
/// caller decides whether that is an error for its operation.
pub fn llm_config_from_store(
    store: &dyn KeyValueStore,
    provider: LlmProvider,
    model: &str,
) -> LlmConfig {
    LlmConfig {
        provider,
        api_key: store.get(&keys::api_key(provider.as_str())).unwrap_or_default(),
        model: model.to_string(),
        azure_config: azure_config_from_store(store),
        langdock_config: langdock_config_from_store(store),
    }
}

/// The Azure connection config counts as configured only when all
/// three fields are present.
pub fn azure_config_from_store(store: &dyn KeyValueStore) -> Option<AzureConfig> {
    let api_version = store.get(&keys::azure("api_version"))?;
    let azure_endpoint = store.get(&keys::azure("endpoint"))?;
    let deployment_name = store.get(&keys::azure("deployment_name"))?;

    if api_version.is_empty() || azure_endpoint.is_empty() || deployment_name.is_empty() {
        return None;
    }

    Some(AzureConfig {
        api_version,
        azure_endpoint,
        deployment_name,
    })
}

pub fn langdock_config_from_store(store: &dyn KeyValueStore) -> Option<LangdockConfig> {
    let region = match store.get(&keys::langdock("region"))?.as_str() {
        "eu" => LangdockRegion::Eu,
        "us" => LangdockRegion::Us,
        _ => return None,
    };
    Some(LangdockConfig { region })
}

/// The stored model selection for a provider, if any.
pub fn model_from_store(store: &dyn KeyValueStore, provider: LlmProvider) -> Option<String> {
    store
        .get(&keys::model(provider.as_str()))
        .filter(|model| !model.is_empty())
}
