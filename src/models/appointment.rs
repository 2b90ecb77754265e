// src/models/appointment.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    InPerson,
    Video,
    Phone,
    ExternalVisit,
}

// Agendamentos nunca são apagados, apenas cancelados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// Referência fraca: o caso pode ter sido removido.
    pub case_id: Option<i64>,
    #[schema(example = "Maria da Silva")]
    pub client_name: String,
    pub lawyer_id: Uuid,
    #[serde(with = "appointment_datetime")]
    #[schema(value_type = String, example = "2024-02-20T14:30:00")]
    pub date_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub whatsapp_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub case_id: Option<i64>,

    #[validate(length(min = 2, message = "Informe o nome do cliente"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    pub lawyer_id: Uuid,

    #[serde(with = "appointment_datetime")]
    #[schema(value_type = String, example = "2024-02-20T14:30")]
    pub date_time: NaiveDateTime,

    #[serde(rename = "type")]
    pub kind: AppointmentType,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

mod appointment_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::common::dates::parse_local_datetime(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("data/hora inválida: {raw}")))
    }
}
