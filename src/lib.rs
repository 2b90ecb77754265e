//src/lib.rs

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;

/// Roteador completo da API.
pub fn app(app_state: AppState) -> Router {
    let case_routes = Router::new()
        .route("/", get(handlers::cases::list_cases).post(handlers::cases::create_case))
        .route("/events", get(handlers::workflow::case_events))
        .route(
            "/{id}",
            get(handlers::cases::get_case)
                .patch(handlers::cases::update_case)
                .delete(handlers::cases::delete_case),
        )
        .route("/{id}/move/preview", post(handlers::cases::preview_move))
        .route("/{id}/move", post(handlers::cases::move_case))
        .route("/{id}/health", get(handlers::cases::case_health))
        .route("/{id}/actions", get(handlers::cases::case_actions))
        .route("/{id}/actions/{index}", post(handlers::cases::apply_action))
        .route("/{id}/highlights", get(handlers::cases::highlights))
        .route("/{id}/tasks", post(handlers::cases::add_task))
        .route("/{id}/tasks/{task_id}", patch(handlers::cases::update_task))
        .route("/{id}/mandados", post(handlers::cases::add_mandado))
        .route("/{id}/mandados/{ms_id}", patch(handlers::cases::update_mandado))
        .route("/{id}/contact", post(handlers::cases::log_contact));

    let workflow_routes = Router::new()
        .route("/", get(handlers::workflow::get_workflow))
        .route("/views", get(handlers::workflow::list_views))
        .route("/views/{view}", get(handlers::workflow::get_view));

    let appointment_routes = Router::new()
        .route(
            "/",
            get(handlers::appointments::list_appointments).post(handlers::appointments::create_appointment),
        )
        .route("/{id}/cancel", post(handlers::appointments::cancel_appointment))
        .route("/{id}/confirm", post(handlers::appointments::confirm_appointment));

    let backup_routes = Router::new()
        .route("/", get(handlers::backup::export_backup).post(handlers::backup::restore_backup))
        .route("/cases.csv", get(handlers::backup::export_cases_csv));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .route("/api/board/{view}", get(handlers::workflow::get_board))
        .route("/api/users", get(handlers::office::list_users).post(handlers::office::create_user))
        .route("/api/templates", get(handlers::office::list_templates).post(handlers::office::save_template))
        .route("/api/settings", get(handlers::office::get_settings).put(handlers::office::update_settings))
        .nest("/api/cases", case_routes)
        .nest("/api/workflow", workflow_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/backup", backup_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
