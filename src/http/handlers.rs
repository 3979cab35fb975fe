use super::state::AppState;
use crate::coalesce::TriggerOutcome;
use crate::llm::{self, FormField, LlmProvider};
use crate::session::Mode;
use crate::settings::{self, ConfigCodecError, ExportOptions};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveTranscriptRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub include_api_keys: bool,
    #[serde(default)]
    pub include_session_data: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub written: usize,
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_mode(raw: &str) -> Result<Mode, axum::response::Response> {
    raw.parse::<Mode>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown mode {:?}, expected standard or realtime", raw),
            }),
        )
            .into_response()
    })
}

/// Validation failures are the caller's fault and name the specific
/// reason; a storage write failure during import is ours.
fn codec_error_response(e: ConfigCodecError) -> axum::response::Response {
    let status = match &e {
        ConfigCodecError::WriteFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ConfigCodecError::NoKeysConfigured => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /status
/// Lifecycle snapshot, including the navigation-guard flag
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.supervisor.status()))
}

/// GET /sessions/latest-transcript
/// Cross-mode recency resolution
pub async fn get_latest_transcript(State(state): State<AppState>) -> impl IntoResponse {
    match state.sessions.latest_transcript() {
        Some(latest) => (StatusCode::OK, Json(latest)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No transcript has been saved in either mode".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/:mode
pub async fn get_session(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> impl IntoResponse {
    let mode = match parse_mode(&mode) {
        Ok(mode) => mode,
        Err(response) => return response,
    };

    (StatusCode::OK, Json(state.sessions.load(mode))).into_response()
}

/// POST /sessions/:mode/transcript
pub async fn save_transcript(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(req): Json<SaveTranscriptRequest>,
) -> impl IntoResponse {
    let mode = match parse_mode(&mode) {
        Ok(mode) => mode,
        Err(response) => return response,
    };

    state.sessions.save_transcript(mode, &req.text);
    info!("Saved {} transcript ({} chars)", mode, req.text.len());

    (
        StatusCode::OK,
        Json(SavedResponse {
            status: "saved".to_string(),
        }),
    )
        .into_response()
}

/// DELETE /sessions/:mode
pub async fn clear_session(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> impl IntoResponse {
    let mode = match parse_mode(&mode) {
        Ok(mode) => mode,
        Err(response) => return response,
    };

    state.sessions.clear(mode);
    info!("Cleared {} session", mode);

    (
        StatusCode::OK,
        Json(SavedResponse {
            status: "cleared".to_string(),
        }),
    )
        .into_response()
}

/// GET /settings/export
pub async fn export_settings(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let token = settings::export_settings(
        state.store.as_ref(),
        ExportOptions {
            include_api_keys: query.include_api_keys,
            include_session_data: query.include_session_data,
        },
    );

    (StatusCode::OK, Json(ExportResponse { token }))
}

/// GET /settings/export/api-keys
/// Credential-only token for compact QR sharing
pub async fn export_api_keys(State(state): State<AppState>) -> impl IntoResponse {
    match settings::export_api_keys(state.store.as_ref()) {
        Ok(token) => (StatusCode::OK, Json(ExportResponse { token })).into_response(),
        Err(e) => codec_error_response(e),
    }
}

/// POST /settings/import
/// Also reachable via the `/?import=<token>` URL convention.
pub async fn import_settings(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> impl IntoResponse {
    match settings::import_settings(state.store.as_ref(), &req.token) {
        Ok(written) => {
            info!("Settings import wrote {} keys", written);
            (StatusCode::OK, Json(ImportResponse { written })).into_response()
        }
        Err(e) => {
            warn!("Settings import rejected: {}", e);
            codec_error_response(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub import: String,
}

/// GET /?import=<url-encoded token>
pub async fn import_via_url(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
) -> impl IntoResponse {
    match settings::import_settings(state.store.as_ref(), &query.import) {
        Ok(written) => {
            info!("Settings import wrote {} keys", written);
            (StatusCode::OK, Json(ImportResponse { written })).into_response()
        }
        Err(e) => {
            warn!("Settings import rejected: {}", e);
            codec_error_response(e)
        }
    }
}

// --- Live questions ---

#[derive(Debug, Deserialize)]
pub struct AddQuestionRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub transcript: String,
    pub provider: LlmProvider,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub outcome: String,
}

fn outcome_label(outcome: TriggerOutcome) -> String {
    match outcome {
        TriggerOutcome::Triggered => "triggered".to_string(),
        TriggerOutcome::Skipped => "skipped".to_string(),
    }
}

/// GET /questions
pub async fn get_questions(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.questions.questions()))
}

/// POST /questions
pub async fn add_question(
    State(state): State<AppState>,
    Json(req): Json<AddQuestionRequest>,
) -> impl IntoResponse {
    match state.questions.add_question(&req.text) {
        Some(question) => {
            state.sessions.save_questions(&state.questions.questions());
            (StatusCode::OK, Json(question)).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Question text must not be empty".to_string(),
            }),
        )
            .into_response(),
    }
}

/// DELETE /questions/:id
pub async fn remove_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.questions.remove_question(&id) {
        state.sessions.save_questions(&state.questions.questions());
        (
            StatusCode::OK,
            Json(SavedResponse {
                status: "removed".to_string(),
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Question {} not found", id),
            }),
        )
            .into_response()
    }
}

/// POST /questions/:id/reset
pub async fn reset_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.questions.reset_question(&id) {
        state.sessions.save_questions(&state.questions.questions());
        (
            StatusCode::OK,
            Json(SavedResponse {
                status: "reset".to_string(),
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Question {} not found", id),
            }),
        )
            .into_response()
    }
}

/// POST /questions/evaluate
/// Coalesced: no growth and no new questions means no remote call.
pub async fn evaluate_questions(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let config = llm::llm_config_from_store(state.store.as_ref(), req.provider, &req.model);

    match state
        .questions
        .trigger_evaluation(&req.transcript, &config)
        .await
    {
        Ok(outcome) => {
            if outcome == TriggerOutcome::Triggered {
                state.sessions.save_questions(&state.questions.questions());
            }
            (
                StatusCode::OK,
                Json(TriggerResponse {
                    outcome: outcome_label(outcome),
                }),
            )
                .into_response()
        }
        Err(e) => {
            // Transient: watermarks are untouched, the next growth or
            // new-question event retries.
            warn!("Question evaluation failed: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to evaluate questions against the transcript".to_string(),
                }),
            )
                .into_response()
        }
    }
}

// --- Form auto-fill ---

#[derive(Debug, Deserialize)]
pub struct FillFormRequestBody {
    pub transcript: String,
    pub fields: Vec<FormField>,
    pub provider: LlmProvider,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct FormStateResponse {
    pub values: serde_json::Map<String, Value>,
    pub manual_edits: serde_json::Map<String, Value>,
    pub complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct ManualEditRequest {
    pub value: Value,
}

fn form_state(state: &AppState) -> FormStateResponse {
    FormStateResponse {
        values: state.form.values(),
        manual_edits: state.form.manual_edits(),
        complete: state.form.is_complete(),
    }
}

/// GET /form
pub async fn get_form(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(form_state(&state)))
}

/// POST /form/fill
/// Coalesced: an unchanged transcript or a complete form means no
/// remote call.
pub async fn fill_form(
    State(state): State<AppState>,
    Json(req): Json<FillFormRequestBody>,
) -> impl IntoResponse {
    let config = llm::llm_config_from_store(state.store.as_ref(), req.provider, &req.model);

    match state
        .form
        .trigger_fill(&req.transcript, &req.fields, &config)
        .await
    {
        Ok(outcome) => {
            if outcome == TriggerOutcome::Triggered {
                state
                    .sessions
                    .save_form_values(Mode::Standard, &state.form.values());
            }
            (StatusCode::OK, Json(form_state(&state))).into_response()
        }
        Err(e) => {
            warn!("Form fill failed: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to fill the form from the transcript".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// PUT /form/values/:field_id
pub async fn set_manual_value(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
    Json(req): Json<ManualEditRequest>,
) -> impl IntoResponse {
    state.form.set_manual_value(&field_id, req.value);
    state
        .sessions
        .save_form_values(Mode::Standard, &state.form.values());
    (StatusCode::OK, Json(form_state(&state)))
}

/// POST /form/complete
pub async fn toggle_form_complete(State(state): State<AppState>) -> impl IntoResponse {
    state.form.toggle_complete();
    (StatusCode::OK, Json(form_state(&state)))
}

/// POST /form/reset
pub async fn reset_form(State(state): State<AppState>) -> impl IntoResponse {
    state.form.reset();
    (StatusCode::OK, Json(form_state(&state)))
}

// --- Form templates ---

/// GET /templates
pub async fn get_templates(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(llm::load_templates(state.store.as_ref())))
}

/// PUT /templates
pub async fn put_templates(
    State(state): State<AppState>,
    Json(templates): Json<Vec<crate::llm::FormTemplate>>,
) -> impl IntoResponse {
    llm::save_templates(state.store.as_ref(), &templates);
    (
        StatusCode::OK,
        Json(SavedResponse {
            status: "saved".to_string(),
        }),
    )
}

/// GET /usage
pub async fn get_usage(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.usage.entries()))
}

/// DELETE /usage
pub async fn clear_usage(State(state): State<AppState>) -> impl IntoResponse {
    state.usage.clear_history();
    (
        StatusCode::OK,
        Json(SavedResponse {
            status: "cleared".to_string(),
        }),
    )
}
