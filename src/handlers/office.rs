// src/handlers/office.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        office::{CreateUserPayload, DocumentTemplate, OfficeUser, SaveTemplatePayload},
        settings::SystemSettings,
    },
};

// --- EQUIPE ---

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Escritório",
    responses((status = 200, body = Vec<OfficeUser>))
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = app_state.office_service.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Escritório",
    request_body = CreateUserPayload,
    responses((status = 201, body = OfficeUser), (status = 422, description = "Dados inválidos"))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.office_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// --- MODELOS ---

// GET /api/templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Escritório",
    responses((status = 200, body = Vec<DocumentTemplate>))
)]
pub async fn list_templates(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let templates = app_state.office_service.list_templates().await?;
    Ok((StatusCode::OK, Json(templates)))
}

// POST /api/templates
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Escritório",
    request_body = SaveTemplatePayload,
    responses((status = 200, body = DocumentTemplate))
)]
pub async fn save_template(
    State(app_state): State<AppState>,
    Json(payload): Json<SaveTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let template = app_state.office_service.save_template(payload).await?;
    Ok((StatusCode::OK, Json(template)))
}

// --- CONFIGURAÇÕES ---

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Escritório",
    responses((status = 200, body = SystemSettings))
)]
pub async fn get_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.office_service.get_settings().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Escritório",
    request_body = SystemSettings,
    responses((status = 200, body = SystemSettings), (status = 422, description = "Valores fora da faixa"))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<SystemSettings>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.office_service.update_settings(payload).await?;
    Ok((StatusCode::OK, Json(updated)))
}
