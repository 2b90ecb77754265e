// src/services/office_service.rs
//
// Equipe, modelos de documentos e parâmetros de SLA do escritório.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::OfficeStore,
    models::{
        office::{CreateUserPayload, DocumentTemplate, OfficeUser, SaveTemplatePayload},
        settings::SystemSettings,
    },
};

#[derive(Clone)]
pub struct OfficeService {
    store: Arc<dyn OfficeStore>,
}

impl OfficeService {
    pub fn new(store: Arc<dyn OfficeStore>) -> Self {
        Self { store }
    }

    // --- EQUIPE ---

    pub async fn list_users(&self) -> Result<Vec<OfficeUser>, AppError> {
        self.store.list_users().await
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<OfficeUser, AppError> {
        payload.validate()?;
        let user = OfficeUser {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            email: payload.email,
            role: payload.role,
            active: true,
        };
        self.store.save_user(&user).await?;
        tracing::info!("Usuário {} ({:?}) cadastrado", user.name, user.role);
        Ok(user)
    }

    // --- MODELOS ---

    pub async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, AppError> {
        self.store.list_templates().await
    }

    /// Cria ou substitui (quando `id` vem preenchido) um modelo.
    pub async fn save_template(&self, payload: SaveTemplatePayload) -> Result<DocumentTemplate, AppError> {
        payload.validate()?;
        let template = DocumentTemplate {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            title: payload.title.trim().to_string(),
            category: payload.category.trim().to_uppercase(),
            content: payload.content,
            updated_at: Utc::now(),
        };
        self.store.save_template(&template).await?;
        Ok(template)
    }

    // --- CONFIGURAÇÕES ---

    pub async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        self.store.get_settings().await
    }

    pub async fn update_settings(&self, settings: SystemSettings) -> Result<SystemSettings, AppError> {
        settings.validate()?;
        self.store.save_settings(&settings).await?;
        tracing::info!(
            "Parâmetros de SLA atualizados (MS em {} dias, PP em {} dias)",
            settings.sla_mandado_seguranca,
            settings.pp_alert_days
        );
        Ok(settings)
    }
}
