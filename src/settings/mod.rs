//! Settings export/import codec
//!
//! Serializes a filtered snapshot of the persisted key/value settings
//! into a single opaque token safe for a URL query parameter or a QR
//! code, and reverses the process with strict validation.
//!
//! Token format: `CFG1_` + URL-safe-Base64(DEFLATE(UTF8(JSON object))).
//! Import also accepts legacy tokens in standard Base64.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;
use tracing::info;

use crate::storage::keys;
use crate::storage::{KeyValueStore, StorageError};

/// Version tag prefixed to every exported token.
pub const CONFIG_TOKEN_PREFIX: &str = "CFG1_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigCodecError {
    #[error("missing {CONFIG_TOKEN_PREFIX} version prefix")]
    InvalidFormat,
    #[error("empty payload")]
    EmptyPayload,
    #[error("malformed Base64 payload")]
    MalformedEncoding,
    #[error("decompression failed")]
    DecompressionError,
    #[error("payload is not valid JSON")]
    InvalidJson,
    #[error("expected a key-value object")]
    InvalidShape,
    #[error("unexpected key {0:?}")]
    InvalidKey(String),
    #[error("value for {0:?} is not a string")]
    InvalidValueType(String),
    #[error("failed to write settings to storage")]
    WriteFailure(#[source] StorageError),
    #[error("no API keys configured")]
    NoKeysConfigured,
}

/// Which key partitions an export includes. API keys and session data
/// can each be left out of a shared token.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub include_api_keys: bool,
    pub include_session_data: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_api_keys: false,
            include_session_data: false,
        }
    }
}

/// Collect all application-prefixed keys from the store, filtered per
/// the export options. The sorted map keeps the serialized form
/// canonical for identical contents.
pub fn collect_settings(
    store: &dyn KeyValueStore,
    options: ExportOptions,
) -> BTreeMap<String, String> {
    let mut settings = BTreeMap::new();
    for key in store.keys() {
        if !key.starts_with(keys::APP_PREFIX) {
            continue;
        }
        if !options.include_api_keys && key.starts_with(keys::API_KEY_PREFIX) {
            continue;
        }
        if !options.include_session_data && keys::is_session_key(&key) {
            continue;
        }
        if let Some(value) = store.get(&key) {
            settings.insert(key, value);
        }
    }
    settings
}

/// Serialize a settings snapshot into a portable token.
pub fn export_settings(store: &dyn KeyValueStore, options: ExportOptions) -> String {
    encode_token(&collect_settings(store, options))
}

/// Export only the connection-credential keys (API keys plus
/// Azure/Langdock connection settings), for compact QR sharing.
pub fn export_api_keys(store: &dyn KeyValueStore) -> Result<String, ConfigCodecError> {
    let mut settings = BTreeMap::new();
    for key in store.keys() {
        if keys::is_credential_key(&key) {
            if let Some(value) = store.get(&key) {
                settings.insert(key, value);
            }
        }
    }

    if settings.is_empty() {
        return Err(ConfigCodecError::NoKeysConfigured);
    }

    Ok(encode_token(&settings))
}

fn encode_token(settings: &BTreeMap<String, String>) -> String {
    let json = serde_json::to_vec(settings).expect("string map serializes");

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).expect("in-memory deflate");
    let compressed = encoder.finish().expect("in-memory deflate");

    format!("{}{}", CONFIG_TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(compressed))
}

/// Parse and fully validate a config token. Returns the settings
/// mapping only if every validation step passes; there is no partial
/// or best-effort result.
pub fn parse_config_string(token: &str) -> Result<BTreeMap<String, String>, ConfigCodecError> {
    let trimmed = token.trim();
    let payload = trimmed
        .strip_prefix(CONFIG_TOKEN_PREFIX)
        .ok_or(ConfigCodecError::InvalidFormat)?;

    if payload.is_empty() {
        return Err(ConfigCodecError::EmptyPayload);
    }

    // Normalize legacy standard-Base64 tokens to the URL-safe alphabet.
    let normalized: String = payload
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let normalized = normalized.trim_end_matches('=');

    let compressed = URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|_| ConfigCodecError::MalformedEncoding)?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|_| ConfigCodecError::DecompressionError)?;

    let parsed: Value =
        serde_json::from_slice(&json).map_err(|_| ConfigCodecError::InvalidJson)?;

    let object = match parsed {
        Value::Object(object) => object,
        _ => return Err(ConfigCodecError::InvalidShape),
    };

    let mut settings = BTreeMap::new();
    for (key, value) in object {
        if !key.starts_with(keys::APP_PREFIX) {
            return Err(ConfigCodecError::InvalidKey(key));
        }
        match value {
            Value::String(value) => {
                settings.insert(key, value);
            }
            _ => return Err(ConfigCodecError::InvalidValueType(key)),
        }
    }

    Ok(settings)
}

/// Validate a token and write every key it carries into storage.
/// Returns the number of keys written.
///
/// Unlike routine adapter writes, a storage failure here is fatal: the
/// user explicitly asked for the import and must see it fail.
pub fn import_settings(
    store: &dyn KeyValueStore,
    token: &str,
) -> Result<usize, ConfigCodecError> {
    let settings = parse_config_string(token)?;

    let mut written = 0;
    for (key, value) in &settings {
        store
            .try_set(key, value)
            .map_err(ConfigCodecError::WriteFailure)?;
        written += 1;
    }

    info!("Imported {} settings keys", written);
    Ok(written)
}

/// Whether a parsed settings mapping carries any API keys, so import
/// flows can warn before overwriting credentials.
pub fn config_contains_api_keys(settings: &BTreeMap<String, String>) -> bool {
    settings
        .keys()
        .any(|key| key.starts_with(keys::API_KEY_PREFIX))
}
