// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::workflow::ViewType;

#[derive(Debug, Error)]
pub enum AppError {
    // Campos obrigatórios da transição ou do payload ausentes/ inválidos
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Caso {0} não encontrado")]
    CaseNotFound(i64),

    #[error("Agendamento {0} não encontrado")]
    AppointmentNotFound(Uuid),

    #[error("Tarefa {0} não encontrada")]
    TaskNotFound(Uuid),

    #[error("Mandado de segurança {0} não encontrado")]
    MandadoNotFound(Uuid),

    #[error("Usuário {0} não encontrado")]
    UserNotFound(Uuid),

    #[error("Coluna '{column}' não pertence à visão {view:?}")]
    InvalidPosition { view: ViewType, column: String },

    #[error("Prazo inválido: fim anterior ao início")]
    InvalidDeadlineWindow,

    #[error("CPF inválido")]
    InvalidCpf,

    #[error("Ação sugerida {0} inexistente para a posição atual")]
    SmartActionNotFound(usize),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Atalho para um erro de validação de um único campo.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.into());
        errors.add(field, error);
        AppError::ValidationError(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::CaseNotFound(_) => (StatusCode::NOT_FOUND, "Caso não encontrado."),
            AppError::AppointmentNotFound(_) => (StatusCode::NOT_FOUND, "Agendamento não encontrado."),
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "Tarefa não encontrada."),
            AppError::MandadoNotFound(_) => (StatusCode::NOT_FOUND, "Mandado de segurança não encontrado."),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::SmartActionNotFound(_) => (StatusCode::NOT_FOUND, "Ação sugerida não encontrada."),
            AppError::InvalidPosition { .. } => (StatusCode::CONFLICT, "Coluna inválida para esta visão."),
            AppError::InvalidDeadlineWindow => (StatusCode::BAD_REQUEST, "O fim do prazo não pode ser anterior ao início."),
            AppError::InvalidCpf => (StatusCode::BAD_REQUEST, "CPF inválido."),

            // Todos os outros erros viram 500, com o detalhe apenas no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
