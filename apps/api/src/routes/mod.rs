pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        // Stateless document tools
        .route("/api/v1/resumes/normalize", post(handlers::handle_normalize))
        .route(
            "/api/v1/resumes/recommendations",
            post(handlers::handle_recommendations),
        )
        .route("/api/v1/resumes/validate", post(handlers::handle_validate))
        .route("/api/v1/resumes/preview", post(handlers::handle_preview))
        .route(
            "/api/v1/resumes/export/markdown",
            post(handlers::handle_export_markdown),
        )
        // Stored résumés
        .route(
            "/api/v1/resumes/:user_id",
            get(handlers::handle_get_resume).put(handlers::handle_save_resume),
        )
        .route(
            "/api/v1/resumes/:user_id/about",
            put(handlers::handle_set_about),
        )
        .route(
            "/api/v1/resumes/:user_id/entries/:section",
            post(handlers::handle_add_entry),
        )
        .route(
            "/api/v1/resumes/:user_id/entries/:section/:entry_id",
            delete(handlers::handle_remove_entry),
        )
        .route(
            "/api/v1/resumes/:user_id/export/markdown",
            post(handlers::handle_export_stored),
        )
        .route(
            "/api/v1/resumes/:user_id/import/github/:username",
            post(handlers::handle_github_import),
        )
        // GitHub
        .route(
            "/api/v1/github/:username/repos",
            get(handlers::handle_github_repos),
        )
        .with_state(state)
}
