// src/handlers/cases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::Actor,
    models::{
        case::{
            Case, ClientContactPayload, CreateCasePayload, NewMandadoPayload, NewTaskPayload, UpdateMandadoPayload,
            UpdateTaskPayload,
        },
        patch::CasePatch,
        workflow::ViewType,
    },
    services::{
        case_service::MoveResult,
        health_service::CaseHealth,
        smart_action_service::{ApplyActionPayload, SuggestedActions},
        transition_service::{MovePreview, MoveRequest},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ViewFilter {
    /// Restringe a uma visão.
    pub view: Option<ViewType>,
}

// =============================================================================
//  CRUD
// =============================================================================

// GET /api/cases
#[utoipa::path(
    get,
    path = "/api/cases",
    tag = "Casos",
    params(ViewFilter),
    responses((status = 200, description = "Lista de casos", body = Vec<Case>))
)]
pub async fn list_cases(
    State(app_state): State<AppState>,
    Query(filter): Query<ViewFilter>,
) -> Result<impl IntoResponse, AppError> {
    let cases = app_state.case_service.list_cases(filter.view).await?;
    Ok((StatusCode::OK, Json(cases)))
}

// POST /api/cases
#[utoipa::path(
    post,
    path = "/api/cases",
    tag = "Casos",
    request_body = CreateCasePayload,
    responses(
        (status = 201, description = "Caso criado", body = Case),
        (status = 409, description = "Coluna inválida para a visão"),
        (status = 422, description = "Dados inválidos (ex.: CPF)")
    )
)]
pub async fn create_case(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateCasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.create_case(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

// GET /api/cases/{id}
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    responses(
        (status = 200, body = Case),
        (status = 404, description = "Caso não encontrado")
    )
)]
pub async fn get_case(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.get_case(id).await?;
    Ok((StatusCode::OK, Json(case)))
}

// PATCH /api/cases/{id}
#[utoipa::path(
    patch,
    path = "/api/cases/{id}",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body(content = CasePatch, description = "Campo ausente = mantém; null = limpa"),
    responses(
        (status = 200, body = Case),
        (status = 400, description = "Prazo ou CPF inválido"),
        (status = 404, description = "Caso não encontrado")
    )
)]
pub async fn update_case(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Json(patch): Json<CasePatch>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.update_case(id, patch, &actor).await?;
    Ok((StatusCode::OK, Json(case)))
}

// DELETE /api/cases/{id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    responses(
        (status = 204, description = "Caso removido"),
        (status = 404, description = "Caso não encontrado")
    )
)]
pub async fn delete_case(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.case_service.delete_case(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  MOVIMENTO
// =============================================================================

// POST /api/cases/{id}/move/preview
#[utoipa::path(
    post,
    path = "/api/cases/{id}/move/preview",
    tag = "Movimento",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Regra acionada e campos faltantes", body = MovePreview),
        (status = 409, description = "Destino inexistente"),
        (status = 422, description = "Mesma coluna")
    )
)]
pub async fn preview_move(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MoveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let preview = app_state.case_service.preview_move(id, &request).await?;
    Ok((StatusCode::OK, Json(preview)))
}

// POST /api/cases/{id}/move
#[utoipa::path(
    post,
    path = "/api/cases/{id}/move",
    tag = "Movimento",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Movimento gravado", body = MoveResult),
        (status = 409, description = "Destino inexistente"),
        (status = 422, description = "Formulário da transição incompleto")
    )
)]
pub async fn move_case(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Json(request): Json<MoveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.case_service.move_case(id, request, &actor).await?;
    Ok((StatusCode::OK, Json(result)))
}

// =============================================================================
//  SAÚDE E AÇÕES SUGERIDAS
// =============================================================================

// GET /api/cases/{id}/health
#[utoipa::path(
    get,
    path = "/api/cases/{id}/health",
    tag = "Saúde",
    params(("id" = i64, Path, description = "ID do caso")),
    responses((status = 200, body = CaseHealth))
)]
pub async fn case_health(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let health = app_state.case_service.case_health(id).await?;
    Ok((StatusCode::OK, Json(health)))
}

// GET /api/cases/{id}/actions
#[utoipa::path(
    get,
    path = "/api/cases/{id}/actions",
    tag = "Ações sugeridas",
    params(("id" = i64, Path, description = "ID do caso")),
    responses((status = 200, body = SuggestedActions))
)]
pub async fn case_actions(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actions = app_state.case_service.suggested_actions(id).await?;
    Ok((StatusCode::OK, Json(actions)))
}

// POST /api/cases/{id}/actions/{index}
#[utoipa::path(
    post,
    path = "/api/cases/{id}/actions/{index}",
    tag = "Ações sugeridas",
    params(
        ("id" = i64, Path, description = "ID do caso"),
        ("index" = usize, Path, description = "Posição da ação na lista sugerida")
    ),
    request_body = ApplyActionPayload,
    responses(
        (status = 200, body = MoveResult),
        (status = 404, description = "Ação inexistente"),
        (status = 422, description = "Formulário da transição incompleto")
    )
)]
pub async fn apply_action(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path((id, index)): Path<(i64, usize)>,
    Json(payload): Json<ApplyActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.case_service.apply_action(id, index, payload, &actor).await?;
    Ok((StatusCode::OK, Json(result)))
}

// GET /api/cases/{id}/highlights
#[utoipa::path(
    get,
    path = "/api/cases/{id}/highlights",
    tag = "Ações sugeridas",
    params(("id" = i64, Path, description = "ID do caso"), ViewFilter),
    responses((status = 200, description = "Zonas a destacar durante o arraste", body = Vec<String>))
)]
pub async fn highlights(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<ViewFilter>,
) -> Result<impl IntoResponse, AppError> {
    let zones = app_state.case_service.highlights(id, filter.view).await?;
    Ok((StatusCode::OK, Json(zones)))
}

// =============================================================================
//  TAREFAS, MANDADOS E CONTATO
// =============================================================================

// POST /api/cases/{id}/tasks
#[utoipa::path(
    post,
    path = "/api/cases/{id}/tasks",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body = NewTaskPayload,
    responses((status = 201, body = Case))
)]
pub async fn add_task(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Json(payload): Json<NewTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.add_task(id, payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

// PATCH /api/cases/{id}/tasks/{task_id}
#[utoipa::path(
    patch,
    path = "/api/cases/{id}/tasks/{task_id}",
    tag = "Casos",
    params(
        ("id" = i64, Path, description = "ID do caso"),
        ("task_id" = Uuid, Path, description = "ID da tarefa")
    ),
    request_body = UpdateTaskPayload,
    responses((status = 200, body = Case), (status = 404, description = "Tarefa não encontrada"))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path((id, task_id)): Path<(i64, Uuid)>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state
        .case_service
        .set_task_completed(id, task_id, payload.completed, &actor)
        .await?;
    Ok((StatusCode::OK, Json(case)))
}

// POST /api/cases/{id}/mandados
#[utoipa::path(
    post,
    path = "/api/cases/{id}/mandados",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body = NewMandadoPayload,
    responses((status = 201, body = Case))
)]
pub async fn add_mandado(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Json(payload): Json<NewMandadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.add_mandado(id, payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

// PATCH /api/cases/{id}/mandados/{ms_id}
#[utoipa::path(
    patch,
    path = "/api/cases/{id}/mandados/{ms_id}",
    tag = "Casos",
    params(
        ("id" = i64, Path, description = "ID do caso"),
        ("ms_id" = Uuid, Path, description = "ID do mandado de segurança")
    ),
    request_body = UpdateMandadoPayload,
    responses((status = 200, body = Case), (status = 404, description = "Mandado não encontrado"))
)]
pub async fn update_mandado(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path((id, ms_id)): Path<(i64, Uuid)>,
    Json(payload): Json<UpdateMandadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.update_mandado(id, ms_id, payload, &actor).await?;
    Ok((StatusCode::OK, Json(case)))
}

// POST /api/cases/{id}/contact
#[utoipa::path(
    post,
    path = "/api/cases/{id}/contact",
    tag = "Casos",
    params(("id" = i64, Path, description = "ID do caso")),
    request_body = ClientContactPayload,
    responses((status = 200, body = Case))
)]
pub async fn log_contact(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Json(payload): Json<ClientContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.case_service.log_client_contact(id, payload, &actor).await?;
    Ok((StatusCode::OK, Json(case)))
}
