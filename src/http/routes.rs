use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check and lifecycle status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::get_status))
        // Import URL convention: /?import=<token>
        .route("/", get(handlers::import_via_url))
        // Session records
        .route(
            "/sessions/latest-transcript",
            get(handlers::get_latest_transcript),
        )
        .route(
            "/sessions/:mode",
            get(handlers::get_session).delete(handlers::clear_session),
        )
        .route(
            "/sessions/:mode/transcript",
            post(handlers::save_transcript),
        )
        // Live questions
        .route(
            "/questions",
            get(handlers::get_questions).post(handlers::add_question),
        )
        .route("/questions/:id", delete(handlers::remove_question))
        .route("/questions/:id/reset", post(handlers::reset_question))
        .route("/questions/evaluate", post(handlers::evaluate_questions))
        // Form auto-fill
        .route("/form", get(handlers::get_form))
        .route("/form/fill", post(handlers::fill_form))
        .route("/form/values/:field_id", put(handlers::set_manual_value))
        .route("/form/complete", post(handlers::toggle_form_complete))
        .route("/form/reset", post(handlers::reset_form))
        // Form templates
        .route(
            "/templates",
            get(handlers::get_templates).put(handlers::put_templates),
        )
        // Settings export/import
        .route("/settings/export", get(handlers::export_settings))
        .route("/settings/export/api-keys", get(handlers::export_api_keys))
        .route("/settings/import", post(handlers::import_settings))
        // Usage ledger
        .route("/usage", get(handlers::get_usage).delete(handlers::clear_usage))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
