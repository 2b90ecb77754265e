// src/services/case_service.rs
//
// Orquestra o motor de fluxo sobre o armazenamento: carrega o caso, aplica as
// funções puras e grava o resultado.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        cpf::{normalize_cpf, validate_cpf},
        dates,
        error::AppError,
    },
    db::{CaseEvent, CaseStore, OfficeStore},
    models::{
        case::{
            Case, ClientContactPayload, CreateCasePayload, HistoryEntry, MandadoSeguranca, MandadoStatus,
            NewMandadoPayload, NewTaskPayload, UpdateMandadoPayload,
        },
        office::OfficeUser,
        patch::{CasePatch, Patch},
        workflow::{ColumnDefinition, TransitionType, ViewType, WorkflowConfig},
    },
    services::{
        column_graph::{columns_for_view, suggest_next_column},
        health_service::{analyze_case, historical_averages, CaseHealth},
        smart_action_service::{apply_smart_action, drag_highlights, resolve_actions, ApplyActionPayload, SuggestedActions},
        transition_service::{build_partial_split, commit_move, preview_move, MoveOutcome, MovePreview, MoveRequest},
    },
};

/// Resultado de um movimento já gravado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub case: Case,
    pub transition: Option<TransitionType>,
    /// Caso de recurso criado por concessão parcial.
    pub split_case: Option<Case>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    pub case: Case,
    pub health: CaseHealth,
    /// Próxima coluna comum (botão "avançar").
    pub next_column: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub column: ColumnDefinition,
    pub cases: Vec<BoardCard>,
    pub suggestions: SuggestedActions,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub view: ViewType,
    pub title: String,
    /// Colunas comuns seguidas das zonas (zonas nunca têm casos).
    pub columns: Vec<BoardColumn>,
}

#[derive(Clone)]
pub struct CaseService {
    cases: Arc<dyn CaseStore>,
    office: Arc<dyn OfficeStore>,
    config: Arc<WorkflowConfig>,
}

impl CaseService {
    pub fn new(cases: Arc<dyn CaseStore>, office: Arc<dyn OfficeStore>, config: Arc<WorkflowConfig>) -> Self {
        Self { cases, office, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.cases.subscribe()
    }

    // --- CRUD ---

    pub async fn list_cases(&self, view: Option<ViewType>) -> Result<Vec<Case>, AppError> {
        let mut cases = self.cases.get_cases().await?;
        if let Some(view) = view {
            cases.retain(|c| c.view == view);
        }
        Ok(cases)
    }

    pub async fn get_case(&self, id: i64) -> Result<Case, AppError> {
        self.cases.get_case(id).await?.ok_or(AppError::CaseNotFound(id))
    }

    pub async fn create_case(&self, payload: CreateCasePayload, actor: &str) -> Result<Case, AppError> {
        payload.validate()?;

        let view = payload.view.unwrap_or(ViewType::Admin);
        let column_id = match payload.column_id {
            Some(column) => column,
            None => self
                .config
                .first_column(view)
                .map(|c| c.id.clone())
                .ok_or(AppError::InvalidPosition { view, column: String::new() })?,
        };
        // Caso novo nunca nasce dentro de uma zona
        if !self.config.is_standard_column(view, &column_id) {
            return Err(AppError::InvalidPosition { view, column: column_id });
        }

        let responsible = match payload.responsible_id {
            Some(id) => Some(self.find_active_user(id).await?),
            None => None,
        };

        let now = Utc::now();
        let id = self.cases.next_case_id().await?;
        let mut case = Case::new(id, payload.client_name.trim(), &normalize_cpf(&payload.cpf), view, &column_id, now);
        case.benefit_type = payload.benefit_type;
        case.birth_date = payload.birth_date;
        case.phone = payload.phone;
        case.email = payload.email;
        case.urgency = payload.urgency;
        if let Some(user) = responsible {
            case.responsible_id = Some(user.id);
            case.responsible_name = Some(user.name);
        }

        let mut entry = HistoryEntry::new(actor, "Caso criado", format!("Cliente {}", case.client_name), now);
        entry.to = Some(case.position());
        case.push_history(entry);

        self.cases.save_case(&case).await?;
        tracing::info!("Caso #{} criado em {}/{}", case.id, view.as_str(), case.column_id);
        Ok(case)
    }

    /// Atualização parcial: só os campos presentes no patch mudam.
    pub async fn update_case(&self, id: i64, mut patch: CasePatch, actor: &str) -> Result<Case, AppError> {
        let mut case = self.get_case(id).await?;
        if patch.is_empty() {
            return Ok(case);
        }

        if let Patch::Set(cpf) = &patch.cpf {
            if !validate_cpf(cpf) {
                return Err(AppError::InvalidCpf);
            }
            patch.cpf = Patch::Set(normalize_cpf(cpf));
        }
        patch.responsible_name = match patch.responsible_id {
            Patch::Set(user_id) => Patch::Set(self.find_active_user(user_id).await?.name),
            Patch::Clear => Patch::Clear,
            Patch::Keep => Patch::Keep,
        };

        let now = Utc::now();
        let changed = patch.apply_to(&mut case);
        if !case.deadline_is_consistent() {
            return Err(AppError::InvalidDeadlineWindow);
        }
        if changed.is_empty() {
            return Ok(case);
        }

        case.last_update = now;
        case.push_history(HistoryEntry::new(actor, "Dados atualizados", changed.join(", "), now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    pub async fn delete_case(&self, id: i64) -> Result<(), AppError> {
        if !self.cases.delete_case(id).await? {
            return Err(AppError::CaseNotFound(id));
        }
        tracing::warn!("Caso #{} removido", id);
        Ok(())
    }

    // --- MOVIMENTO ---

    pub async fn preview_move(&self, id: i64, request: &MoveRequest) -> Result<MovePreview, AppError> {
        let case = self.get_case(id).await?;
        preview_move(&self.config, &case, request, dates::today())
    }

    pub async fn move_case(&self, id: i64, request: MoveRequest, actor: &str) -> Result<MoveResult, AppError> {
        let case = self.get_case(id).await?;
        let users = self.office.list_users().await?;
        let now = Utc::now();
        let outcome = commit_move(&self.config, &users, &case, &request, actor, now, dates::today())?;
        self.persist_outcome(outcome, actor, now).await
    }

    pub async fn apply_action(
        &self,
        id: i64,
        index: usize,
        payload: ApplyActionPayload,
        actor: &str,
    ) -> Result<MoveResult, AppError> {
        let case = self.get_case(id).await?;
        let users = self.office.list_users().await?;
        let now = Utc::now();
        let outcome = apply_smart_action(&self.config, &users, &case, index, payload, actor, now, dates::today())?;
        self.persist_outcome(outcome, actor, now).await
    }

    async fn persist_outcome(&self, outcome: MoveOutcome, actor: &str, now: DateTime<Utc>) -> Result<MoveResult, AppError> {
        let MoveOutcome { case, transition, split_required } = outcome;

        if !split_required {
            self.cases.save_case(&case).await?;
            return Ok(MoveResult { case, transition, split_case: None });
        }

        let new_id = self.cases.next_case_id().await?;
        let split = build_partial_split(&self.config, &case, new_id, actor, now)?;
        let mut original = case;
        original.push_history(HistoryEntry::new(
            actor,
            "Desmembramento",
            format!("Parte indeferida segue no caso #{new_id}"),
            now,
        ));

        // Os dois casos são gravados juntos
        self.cases.update_cases_bulk(&[original.clone(), split.clone()]).await?;
        tracing::info!("Caso #{} desmembrado: recurso no caso #{}", original.id, split.id);
        Ok(MoveResult { case: original, transition, split_case: Some(split) })
    }

    // --- LEITURA DERIVADA ---

    pub async fn case_health(&self, id: i64) -> Result<CaseHealth, AppError> {
        let cases = self.cases.get_cases().await?;
        let case = cases.iter().find(|c| c.id == id).ok_or(AppError::CaseNotFound(id))?;
        let settings = self.office.get_settings().await?;
        let averages = historical_averages(&self.config, &cases);
        Ok(analyze_case(&self.config, &settings, &averages, case, dates::today()))
    }

    pub async fn suggested_actions(&self, id: i64) -> Result<SuggestedActions, AppError> {
        let case = self.get_case(id).await?;
        Ok(resolve_actions(&self.config, case.view, &case.column_id))
    }

    pub async fn highlights(&self, id: i64, view: Option<ViewType>) -> Result<Vec<String>, AppError> {
        let case = self.get_case(id).await?;
        Ok(drag_highlights(&self.config, &case, view.unwrap_or(case.view)))
    }

    pub async fn board(&self, view: ViewType) -> Result<Board, AppError> {
        let definition = self
            .config
            .view(view)
            .ok_or(AppError::InvalidPosition { view, column: String::new() })?;

        let all_cases = self.cases.get_cases().await?;
        let settings = self.office.get_settings().await?;
        let averages = historical_averages(&self.config, &all_cases);
        let today = dates::today();

        let columns = columns_for_view(&self.config, view)
            .into_iter()
            .map(|column| {
                let cases = all_cases
                    .iter()
                    .filter(|c| c.view == view && c.column_id == column.id)
                    .map(|c| BoardCard {
                        health: analyze_case(&self.config, &settings, &averages, c, today),
                        next_column: suggest_next_column(&self.config, view, &c.column_id).map(|n| n.id.clone()),
                        case: c.clone(),
                    })
                    .collect();
                BoardColumn {
                    column: column.clone(),
                    cases,
                    suggestions: resolve_actions(&self.config, view, &column.id),
                }
            })
            .collect();

        Ok(Board { view, title: definition.title.clone(), columns })
    }

    // --- TAREFAS, MANDADOS E CONTATO ---

    pub async fn add_task(&self, id: i64, payload: NewTaskPayload, actor: &str) -> Result<Case, AppError> {
        payload.validate()?;
        let mut case = self.get_case(id).await?;
        let now = Utc::now();
        let text = payload.text.trim().to_string();
        case.add_tasks([text.as_str()], now);
        case.last_update = now;
        case.push_history(HistoryEntry::new(actor, "Tarefa adicionada", text, now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    pub async fn set_task_completed(&self, id: i64, task_id: Uuid, completed: bool, actor: &str) -> Result<Case, AppError> {
        let mut case = self.get_case(id).await?;
        let task = case
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(AppError::TaskNotFound(task_id))?;
        if task.completed == completed {
            return Ok(case);
        }
        task.completed = completed;
        let action = if completed { "Tarefa concluída" } else { "Tarefa reaberta" };
        let details = task.text.clone();

        let now = Utc::now();
        case.last_update = now;
        case.push_history(HistoryEntry::new(actor, action, details, now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    pub async fn add_mandado(&self, id: i64, payload: NewMandadoPayload, actor: &str) -> Result<Case, AppError> {
        payload.validate()?;
        let mut case = self.get_case(id).await?;
        let now = Utc::now();
        let mandado = MandadoSeguranca {
            id: Uuid::new_v4(),
            npu: payload.npu.trim().to_string(),
            filing_date: payload.filing_date,
            reason: payload.reason,
            status: MandadoStatus::Awaiting,
            notes: payload.notes,
        };
        let details = format!("MS {} impetrado em {}", mandado.npu, dates::format_br(mandado.filing_date));
        case.mandados_seguranca.push(mandado);
        case.last_update = now;
        case.push_history(HistoryEntry::new(actor, "Mandado de segurança", details, now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    pub async fn update_mandado(
        &self,
        id: i64,
        mandado_id: Uuid,
        payload: UpdateMandadoPayload,
        actor: &str,
    ) -> Result<Case, AppError> {
        let mut case = self.get_case(id).await?;
        let mandado = case
            .mandados_seguranca
            .iter_mut()
            .find(|m| m.id == mandado_id)
            .ok_or(AppError::MandadoNotFound(mandado_id))?;
        mandado.status = payload.status;
        if payload.notes.is_some() {
            mandado.notes = payload.notes;
        }
        let details = format!("MS {}: {:?}", mandado.npu, mandado.status);

        let now = Utc::now();
        case.last_update = now;
        case.push_history(HistoryEntry::new(actor, "Mandado de segurança", details, now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    pub async fn log_client_contact(&self, id: i64, payload: ClientContactPayload, actor: &str) -> Result<Case, AppError> {
        let mut case = self.get_case(id).await?;
        let today = dates::today();
        let date: NaiveDate = payload.date.unwrap_or(today);
        if date > today {
            return Err(AppError::field("date", "future_date", "A data do contato não pode ser futura"));
        }

        let now = Utc::now();
        // Um registro retroativo não apaga um contato mais recente
        case.last_client_contact = Some(case.last_client_contact.map_or(date, |d| d.max(date)));
        case.last_update = now;
        let mut details = format!("Contato em {}", dates::format_br(date));
        if let Some(notes) = payload.notes.filter(|n| !n.trim().is_empty()) {
            details.push_str(": ");
            details.push_str(notes.trim());
        }
        case.push_history(HistoryEntry::new(actor, "Contato com cliente", details, now));
        self.cases.save_case(&case).await?;
        Ok(case)
    }

    async fn find_active_user(&self, id: Uuid) -> Result<OfficeUser, AppError> {
        self.office
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.id == id && u.active)
            .ok_or(AppError::UserNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{
        case::{DecisionOutcome, TAG_DENIED},
        office::UserRole,
    };
    use crate::services::{transition_service::TransitionDraft, workflow_config::default_config};

    fn service() -> (CaseService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let svc = CaseService::new(store.clone(), store.clone(), Arc::new(default_config()));
        (svc, store)
    }

    fn payload(view: ViewType, column: &str) -> CreateCasePayload {
        CreateCasePayload {
            client_name: "Maria da Silva".into(),
            cpf: "529.982.247-25".into(),
            view: Some(view),
            column_id: Some(column.into()),
            benefit_type: Some("41".into()),
            birth_date: None,
            phone: None,
            email: None,
            responsible_id: None,
            urgency: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_create_validates_cpf_and_position() {
        let (svc, _) = service();
        let case = svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();
        assert_eq!(case.id, 1);
        assert_eq!(case.cpf, "52998224725");
        assert_eq!(case.history.len(), 1);

        let mut bad = payload(ViewType::Admin, "adm_triagem");
        bad.cpf = "111.111.111-11".into();
        assert!(matches!(svc.create_case(bad, "ana").await, Err(AppError::ValidationError(_))));

        let zone = payload(ViewType::Admin, "zone_mesa");
        assert!(matches!(svc.create_case(zone, "ana").await, Err(AppError::InvalidPosition { .. })));
    }

    #[tokio::test]
    async fn test_update_merges_and_logs() {
        let (svc, _) = service();
        let case = svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();

        let patch = CasePatch { protocol_number: Patch::Set("123".into()), ..Default::default() };
        let updated = svc.update_case(case.id, patch, "ana").await.unwrap();
        assert_eq!(updated.protocol_number.as_deref(), Some("123"));
        assert_eq!(updated.benefit_type.as_deref(), Some("41"));
        assert_eq!(updated.history.last().unwrap().action, "Dados atualizados");

        let inverted = CasePatch {
            deadline_start: Patch::Set(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
            deadline_end: Patch::Set(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            ..Default::default()
        };
        assert!(matches!(svc.update_case(case.id, inverted, "ana").await, Err(AppError::InvalidDeadlineWindow)));
    }

    #[tokio::test]
    async fn test_partial_decision_creates_appeal_case() {
        let (svc, store) = service();
        let case = svc.create_case(payload(ViewType::Admin, "adm_protocolado"), "ana").await.unwrap();

        let request = MoveRequest {
            target_column: "adm_decisao".into(),
            draft: Some(TransitionDraft {
                outcome: Some(DecisionOutcome::Partial),
                decision_date: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = svc.move_case(case.id, request, "ana").await.unwrap();
        let split = result.split_case.expect("caso de recurso");

        assert_eq!(result.case.column_id, "adm_decisao");
        assert_eq!(split.parent_case_id, Some(case.id));
        assert_eq!(split.view, ViewType::RecursoAdm);
        assert!(split.has_tag(TAG_DENIED));
        assert_eq!(store.get_cases().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_handover_requires_active_user() {
        let (svc, store) = service();
        let user = OfficeUser {
            id: Uuid::new_v4(),
            name: "Dr. Paulo".into(),
            email: None,
            role: UserRole::Lawyer,
            active: true,
        };
        store.save_user(&user).await.unwrap();
        let case = svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();

        let request = MoveRequest {
            target_column: "adm_documentacao".into(),
            responsible_id: Some(user.id),
            ..Default::default()
        };
        let moved = svc.move_case(case.id, request, "ana").await.unwrap().case;
        assert_eq!(moved.responsible_name.as_deref(), Some("Dr. Paulo"));

        let unknown = MoveRequest {
            target_column: "adm_triagem".into(),
            responsible_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(svc.move_case(case.id, unknown, "ana").await.is_err());
    }

    #[tokio::test]
    async fn test_patch_sets_and_clears_responsible() {
        let (svc, store) = service();
        let user = OfficeUser {
            id: Uuid::new_v4(),
            name: "Dra. Lúcia".into(),
            email: None,
            role: UserRole::Lawyer,
            active: true,
        };
        store.save_user(&user).await.unwrap();
        let case = svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();

        let patch: CasePatch = serde_json::from_value(serde_json::json!({
            "responsibleId": user.id,
            "responsibleName": "Nome forjado"
        }))
        .unwrap();
        let updated = svc.update_case(case.id, patch, "ana").await.unwrap();
        assert_eq!(updated.responsible_id, Some(user.id));
        assert_eq!(updated.responsible_name.as_deref(), Some("Dra. Lúcia"));

        let patch: CasePatch = serde_json::from_str(r#"{"responsibleId": null}"#).unwrap();
        let cleared = svc.update_case(case.id, patch, "ana").await.unwrap();
        assert_eq!(cleared.responsible_id, None);
        assert_eq!(cleared.responsible_name, None);
    }

    #[tokio::test]
    async fn test_tasks_and_contact() {
        let (svc, _) = service();
        let case = svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();

        let case = svc.add_task(case.id, NewTaskPayload { text: "Ligar".into() }, "ana").await.unwrap();
        let task_id = case.tasks[0].id;
        let case = svc.set_task_completed(case.id, task_id, true, "ana").await.unwrap();
        assert!(case.tasks[0].completed);
        assert!(matches!(
            svc.set_task_completed(case.id, Uuid::new_v4(), true, "ana").await,
            Err(AppError::TaskNotFound(_))
        ));

        let case = svc.log_client_contact(case.id, ClientContactPayload::default(), "ana").await.unwrap();
        assert_eq!(case.last_client_contact, Some(dates::today()));
        let health = svc.case_health(case.id).await.unwrap();
        assert_eq!(health.client_contact.days, 0);
    }

    #[tokio::test]
    async fn test_board_lists_cases_per_column() {
        let (svc, _) = service();
        svc.create_case(payload(ViewType::Admin, "adm_triagem"), "ana").await.unwrap();
        svc.create_case(payload(ViewType::AuxDoenca, "aux_chegada"), "ana").await.unwrap();

        let board = svc.board(ViewType::Admin).await.unwrap();
        let triage = board.columns.iter().find(|c| c.column.id == "adm_triagem").unwrap();
        assert_eq!(triage.cases.len(), 1);
        assert_eq!(triage.cases[0].next_column.as_deref(), Some("adm_documentacao"));
        assert!(board.columns.iter().any(|c| c.column.is_zone()));
    }
}
