// src/handlers/workflow.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};

use crate::{
    common::error::AppError,
    config::AppState,
    db::CaseEvent,
    models::workflow::{ViewDefinition, ViewType, WorkflowConfig},
    services::case_service::Board,
};

// GET /api/workflow
#[utoipa::path(
    get,
    path = "/api/workflow",
    tag = "Fluxo",
    responses((status = 200, description = "Visões, regras e ações sugeridas em vigor", body = WorkflowConfig))
)]
pub async fn get_workflow(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.case_service.config().clone())
}

// GET /api/workflow/views
#[utoipa::path(
    get,
    path = "/api/workflow/views",
    tag = "Fluxo",
    responses((status = 200, body = Vec<ViewDefinition>))
)]
pub async fn list_views(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.case_service.config().views.clone())
}

// GET /api/workflow/views/{view}
#[utoipa::path(
    get,
    path = "/api/workflow/views/{view}",
    tag = "Fluxo",
    params(("view" = ViewType, Path, description = "Visão")),
    responses((status = 200, body = ViewDefinition), (status = 409, description = "Visão não configurada"))
)]
pub async fn get_view(
    State(app_state): State<AppState>,
    Path(view): Path<ViewType>,
) -> Result<impl IntoResponse, AppError> {
    let definition = app_state
        .case_service
        .config()
        .view(view)
        .cloned()
        .ok_or(AppError::InvalidPosition { view, column: String::new() })?;
    Ok((StatusCode::OK, Json(definition)))
}

// GET /api/board/{view}
#[utoipa::path(
    get,
    path = "/api/board/{view}",
    tag = "Fluxo",
    params(("view" = ViewType, Path, description = "Visão")),
    responses((status = 200, description = "Colunas com casos, saúde e ações sugeridas", body = Board))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    Path(view): Path<ViewType>,
) -> Result<impl IntoResponse, AppError> {
    let board = app_state.case_service.board(view).await?;
    Ok((StatusCode::OK, Json(board)))
}

// GET /api/cases/events
// Cada cliente recebe as gravações de casos feitas depois da conexão.
pub async fn case_events(State(app_state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(app_state.case_service.subscribe()).filter_map(|message| match message {
        Ok(event) => {
            let name = match &event {
                CaseEvent::Saved { .. } => "saved",
                CaseEvent::Deleted { .. } => "deleted",
            };
            match Event::default().event(name).json_data(&event) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(e) => {
                    tracing::error!("Falha ao serializar evento de caso: {:?}", e);
                    None
                }
            }
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Assinante atrasado: {} eventos descartados", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
