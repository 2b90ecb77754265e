// src/handlers/backup.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::backup::{RestoreSummary, SystemBackup},
};

// GET /api/backup
#[utoipa::path(
    get,
    path = "/api/backup",
    tag = "Backup",
    responses((status = 200, description = "Backup completo", body = SystemBackup))
)]
pub async fn export_backup(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let backup = app_state.backup_service.export().await?;
    let filename = format!(
        "attachment; filename=\"backup-{}.json\"",
        backup.timestamp.format("%Y-%m-%d")
    );
    Ok((StatusCode::OK, [(header::CONTENT_DISPOSITION, filename)], Json(backup)))
}

// POST /api/backup
#[utoipa::path(
    post,
    path = "/api/backup",
    tag = "Backup",
    request_body = SystemBackup,
    responses(
        (status = 200, body = RestoreSummary),
        (status = 409, description = "Caso em coluna desconhecida"),
        (status = 422, description = "Versão não suportada")
    )
)]
pub async fn restore_backup(
    State(app_state): State<AppState>,
    Json(backup): Json<SystemBackup>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.backup_service.restore(backup).await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/backup/cases.csv
#[utoipa::path(
    get,
    path = "/api/backup/cases.csv",
    tag = "Backup",
    responses((status = 200, description = "Casos em CSV (separador ';')", body = String, content_type = "text/csv"))
)]
pub async fn export_cases_csv(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.backup_service.export_csv().await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"casos.csv\""),
        ],
        csv,
    ))
}
