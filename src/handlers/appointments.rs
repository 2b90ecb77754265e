// src/handlers/appointments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::appointment::{Appointment, CreateAppointmentPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct AppointmentFilter {
    /// Dia (AAAA-MM-DD).
    pub date: Option<NaiveDate>,
    pub lawyer_id: Option<Uuid>,
    #[serde(default)]
    pub include_cancelled: bool,
}

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Agenda",
    params(AppointmentFilter),
    responses((status = 200, body = Vec<Appointment>))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<impl IntoResponse, AppError> {
    let list = app_state
        .appointment_service
        .list(filter.date, filter.lawyer_id, filter.include_cancelled)
        .await?;
    Ok((StatusCode::OK, Json(list)))
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Agenda",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, body = Appointment),
        (status = 404, description = "Advogado não encontrado"),
        (status = 422, description = "Dados inválidos")
    )
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// POST /api/appointments/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/cancel",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses((status = 200, body = Appointment), (status = 404, description = "Agendamento não encontrado"))
)]
pub async fn cancel_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.cancel(id).await?;
    Ok((StatusCode::OK, Json(appointment)))
}

// POST /api/appointments/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/confirm",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses((status = 200, description = "Confirmação por WhatsApp registrada", body = Appointment))
)]
pub async fn confirm_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.confirm_whatsapp(id).await?;
    Ok((StatusCode::OK, Json(appointment)))
}
