// src/db/office_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        appointment::Appointment,
        office::{DocumentTemplate, OfficeUser},
        settings::SystemSettings,
    },
};

/// Demais registros do escritório: agenda, equipe, modelos e parâmetros.
#[async_trait]
pub trait OfficeStore: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError>;
    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, AppError>;
    async fn save_appointment(&self, appointment: &Appointment) -> Result<(), AppError>;

    async fn list_users(&self) -> Result<Vec<OfficeUser>, AppError>;
    async fn save_user(&self, user: &OfficeUser) -> Result<(), AppError>;

    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, AppError>;
    async fn save_template(&self, template: &DocumentTemplate) -> Result<(), AppError>;

    async fn get_settings(&self) -> Result<SystemSettings, AppError>;
    async fn save_settings(&self, settings: &SystemSettings) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgOfficeRepository {
    pool: PgPool,
}

impl PgOfficeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficeStore for PgOfficeRepository {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, (Json<Appointment>,)>("SELECT data FROM appointments ORDER BY date_time")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(a),)| a).collect())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let row = sqlx::query_as::<_, (Json<Appointment>,)>("SELECT data FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(a),)| a))
    }

    async fn save_appointment(&self, appointment: &Appointment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO appointments (id, case_id, date_time, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET case_id = EXCLUDED.case_id, date_time = EXCLUDED.date_time, data = EXCLUDED.data
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.case_id)
        .bind(appointment.date_time)
        .bind(Json(appointment))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<OfficeUser>, AppError> {
        let rows = sqlx::query_as::<_, (Json<OfficeUser>,)>("SELECT data FROM office_users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(u),)| u).collect())
    }

    async fn save_user(&self, user: &OfficeUser) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO office_users (id, data) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(user.id)
        .bind(Json(user))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, AppError> {
        let rows = sqlx::query_as::<_, (Json<DocumentTemplate>,)>("SELECT data FROM document_templates")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(t),)| t).collect())
    }

    async fn save_template(&self, template: &DocumentTemplate) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO document_templates (id, data) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(template.id)
        .bind(Json(template))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        // Sem linha gravada, valem os padrões
        let row = sqlx::query_as::<_, (Json<SystemSettings>,)>("SELECT data FROM system_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(s),)| s).unwrap_or_default())
    }

    async fn save_settings(&self, settings: &SystemSettings) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (id, data, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(Json(settings))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
