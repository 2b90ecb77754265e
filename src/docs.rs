// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Fluxo ---
        handlers::workflow::get_workflow,
        handlers::workflow::list_views,
        handlers::workflow::get_view,
        handlers::workflow::get_board,

        // --- Casos ---
        handlers::cases::list_cases,
        handlers::cases::create_case,
        handlers::cases::get_case,
        handlers::cases::update_case,
        handlers::cases::delete_case,
        handlers::cases::add_task,
        handlers::cases::update_task,
        handlers::cases::add_mandado,
        handlers::cases::update_mandado,
        handlers::cases::log_contact,

        // --- Movimento ---
        handlers::cases::preview_move,
        handlers::cases::move_case,

        // --- Saúde e ações ---
        handlers::cases::case_health,
        handlers::cases::case_actions,
        handlers::cases::apply_action,
        handlers::cases::highlights,

        // --- Agenda ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::cancel_appointment,
        handlers::appointments::confirm_appointment,

        // --- Escritório ---
        handlers::office::list_users,
        handlers::office::create_user,
        handlers::office::list_templates,
        handlers::office::save_template,
        handlers::office::get_settings,
        handlers::office::update_settings,

        // --- Backup ---
        handlers::backup::export_backup,
        handlers::backup::restore_backup,
        handlers::backup::export_cases_csv,
    ),
    components(
        schemas(
            // --- Fluxo ---
            models::workflow::ViewType,
            models::workflow::TransitionType,
            models::workflow::ColumnKind,
            models::workflow::ColumnDefinition,
            models::workflow::ViewDefinition,
            models::workflow::TransitionRule,
            models::workflow::SmartAction,
            models::workflow::SmartActionEntry,
            models::workflow::WorkflowConfig,

            // --- Casos ---
            models::case::Urgency,
            models::case::DecisionOutcome,
            models::case::Case,
            models::case::CaseTask,
            models::case::HistoryEntry,
            models::case::MandadoSeguranca,
            models::case::Position,
            models::patch::CasePatch,

            // --- Movimento e saúde ---
            services::transition_service::TransitionDraft,
            services::transition_service::MoveRequest,
            services::transition_service::MovePreview,
            services::case_service::MoveResult,
            services::case_service::Board,
            services::health_service::CaseHealth,
            services::health_service::SlaClock,
            services::smart_action_service::SuggestedActions,
            services::smart_action_service::ApplyActionPayload,

            // --- Escritório ---
            models::appointment::Appointment,
            models::office::OfficeUser,
            models::office::DocumentTemplate,
            models::settings::SystemSettings,
            models::backup::SystemBackup,
            models::backup::RestoreSummary,
        )
    ),
    tags(
        (name = "Fluxo", description = "Visões, colunas, zonas e quadro"),
        (name = "Casos", description = "Cadastro e acompanhamento de casos"),
        (name = "Movimento", description = "Transições entre colunas com formulário obrigatório"),
        (name = "Saúde", description = "SLA, estagnação e alertas"),
        (name = "Ações sugeridas", description = "Próximos passos por posição"),
        (name = "Agenda", description = "Atendimentos e perícias"),
        (name = "Escritório", description = "Equipe, modelos e parâmetros de SLA"),
        (name = "Backup", description = "Exportação e restauração")
    )
)]
pub struct ApiDoc;
