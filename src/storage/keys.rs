//! Typed registry of persisted key names
//!
//! All durable keys live under one versioned application prefix and
//! are built here, so readers and writers cannot drift apart on the
//! string form of a key.

use crate::session::Mode;

/// Every persisted key starts with this prefix. The settings codec
/// refuses to export or import anything outside it.
pub const APP_PREFIX: &str = "scribeflow:v1:";

/// Connection-credential sub-namespaces (the "API keys" partition).
pub const API_KEY_PREFIX: &str = "scribeflow:v1:apikey:";
pub const AZURE_PREFIX: &str = "scribeflow:v1:azure:";
pub const LANGDOCK_PREFIX: &str = "scribeflow:v1:langdock:";

/// Per-provider model selection and UI/behavior preferences.
pub const MODEL_PREFIX: &str = "scribeflow:v1:model:";
pub const PREF_PREFIX: &str = "scribeflow:v1:pref:";

/// Per-mode session data.
pub const SESSION_PREFIX: &str = "scribeflow:v1:session:";

pub const TEMPLATES_KEY: &str = "scribeflow:v1:templates";
pub const USAGE_HISTORY_KEY: &str = "scribeflow:v1:token_usage_history";

/// Fields of a persisted session record. `OutputMode` only exists for
/// the standard mode, `Questions` only for realtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Transcript,
    Summary,
    FormTemplateId,
    FormValues,
    OutputMode,
    Questions,
    UpdatedAt,
}

impl SessionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionField::Transcript => "transcript",
            SessionField::Summary => "summary",
            SessionField::FormTemplateId => "form_template_id",
            SessionField::FormValues => "form_values",
            SessionField::OutputMode => "output_mode",
            SessionField::Questions => "questions",
            SessionField::UpdatedAt => "updated_at",
        }
    }

    /// The full set of fields a mode's namespace can contain, used by
    /// `SessionStore::clear` to remove a record completely.
    pub fn for_mode(mode: Mode) -> &'static [SessionField] {
        match mode {
            Mode::Standard => &[
                SessionField::Transcript,
                SessionField::Summary,
                SessionField::FormTemplateId,
                SessionField::FormValues,
                SessionField::OutputMode,
                SessionField::UpdatedAt,
            ],
            Mode::Realtime => &[
                SessionField::Transcript,
                SessionField::Summary,
                SessionField::FormTemplateId,
                SessionField::FormValues,
                SessionField::Questions,
                SessionField::UpdatedAt,
            ],
        }
    }
}

pub fn api_key(provider: &str) -> String {
    format!("{}{}", API_KEY_PREFIX, provider)
}

pub fn azure(field: &str) -> String {
    format!("{}{}", AZURE_PREFIX, field)
}

pub fn langdock(field: &str) -> String {
    format!("{}{}", LANGDOCK_PREFIX, field)
}

pub fn model(provider: &str) -> String {
    format!("{}{}", MODEL_PREFIX, provider)
}

pub fn pref(name: &str) -> String {
    format!("{}{}", PREF_PREFIX, name)
}

pub fn session(mode: Mode, field: SessionField) -> String {
    format!("{}{}:{}", SESSION_PREFIX, mode.as_str(), field.as_str())
}

/// True for keys holding connection credentials (API keys plus the
/// Azure/Langdock connection settings they belong with).
pub fn is_credential_key(key: &str) -> bool {
    key.starts_with(API_KEY_PREFIX)
        || key.starts_with(AZURE_PREFIX)
        || key.starts_with(LANGDOCK_PREFIX)
}

pub fn is_session_key(key: &str) -> bool {
    key.starts_with(SESSION_PREFIX)
}
