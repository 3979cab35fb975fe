use tracing::warn;

use crate::storage::keys::TEMPLATES_KEY;
use crate::storage::KeyValueStore;

use super::types::FormTemplate;

/// Custom form templates, persisted as one JSON list. Malformed
/// persisted data degrades to an empty list.
pub fn load_templates(store: &dyn KeyValueStore) -> Vec<FormTemplate> {
    store
        .get(TEMPLATES_KEY)
        .and_then(|raw| match serde_json::from_str::<Vec<FormTemplate>>(&raw) {
            Ok(templates) => Some(templates),
            Err(e) => {
                warn!("Discarding malformed form templates: {}", e);
                None
            }
        })
        .unwrap_or_default()
}

pub fn save_templates(store: &dyn KeyValueStore, templates: &[FormTemplate]) {
    match serde_json::to_string(templates) {
        Ok(json) => store.set(TEMPLATES_KEY, &json),
        Err(e) => warn!("Failed to serialize form templates: {}", e),
    }
}

pub fn find_template(store: &dyn KeyValueStore, id: &str) -> Option<FormTemplate> {
    load_templates(store)
        .into_iter()
        .find(|template| template.id == id)
}
