// src/services/transition_service.rs
//
// Motor de transições: casa regras, valida o formulário do tipo exigido e
// aplica o movimento no caso. Tudo aqui é síncrono e sem I/O.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{
        dates::{add_days, deadline_window, format_br, format_br_datetime},
        error::AppError,
    },
    models::{
        case::{Case, DecisionOutcome, HistoryEntry, Position, TAG_DENIED, TAG_GRANTED},
        office::OfficeUser,
        patch::{CasePatch, Patch},
        workflow::{TransitionRule, TransitionType, ViewType, WorkflowConfig},
    },
    services::column_graph::{resolve_target, ResolvedTarget},
};

// Prazo padrão de duração quando a DCB não é fixada na concessão
const DEFAULT_CESSATION_DAYS: u32 = 120;

/// Tipo de transição para um movimento `source -> dest`, se houver regra.
/// A primeira regra que casar vence.
pub fn match_transition(rules: &[TransitionRule], source: &str, dest: &str) -> Option<TransitionType> {
    rules
        .iter()
        .find(|rule| rule.to == dest && rule.from.matches(source))
        .map(|rule| rule.kind)
}

// =============================================================================
//  RASCUNHO (estado do diálogo) E FORMULÁRIO VALIDADO
// =============================================================================

/// Campos coletados pelo diálogo de transição. Todos opcionais: a validação
/// depende do tipo de transição.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionDraft {
    #[schema(example = "555")]
    pub protocol_number: Option<String>,
    pub protocol_date: Option<NaiveDate>,
    #[serde(with = "crate::common::dates::opt_local_datetime")]
    #[schema(value_type = Option<String>, example = "2024-02-20T09:00")]
    pub pericia_date: Option<NaiveDateTime>,

    pub appeal_protocol_number: Option<String>,
    pub appeal_date: Option<NaiveDate>,

    pub notice_date: Option<NaiveDate>,
    #[schema(example = 30)]
    pub window_days: Option<u32>,
    pub exigency_details: Vec<String>,

    pub decision_date: Option<NaiveDate>,
    pub outcome: Option<DecisionOutcome>,
    pub dcb_date: Option<NaiveDate>,
    pub benefit_number: Option<String>,

    pub missing_docs: Vec<String>,
}

/// Formulário completo, com apenas os campos do seu tipo.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionForm {
    ProtocolInss {
        protocol_number: String,
        protocol_date: NaiveDate,
        pericia_date: Option<NaiveDateTime>,
    },
    ProtocolAppeal {
        appeal_protocol_number: String,
        appeal_date: Option<NaiveDate>,
    },
    Deadline {
        notice_date: NaiveDate,
        window_days: u32,
        exigency_details: Vec<String>,
    },
    Pendency {
        missing_docs: Vec<String>,
    },
    Conclusion {
        decision_date: NaiveDate,
        outcome: DecisionOutcome,
        dcb_date: Option<NaiveDate>,
        benefit_number: Option<String>,
    },
}

fn filled(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn clean_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|o| o == item) {
            out.push(item.to_string());
        }
    }
    out
}

/// Maior prazo aceito no formulário de exigência.
pub const MAX_WINDOW_DAYS: u32 = 365;

fn required_message(field: &str) -> &'static str {
    match field {
        "protocolNumber" => "Informe o número do protocolo",
        "protocolDate" => "Informe a data do protocolo",
        "periciaDate" => "Informe data e hora da perícia",
        "appealProtocolNumber" => "Informe o protocolo do recurso",
        "noticeDate" => "Informe a data de ciência",
        "windowDays" => "O prazo deve ficar entre 1 e 365 dias",
        "decisionDate" => "Informe a data da decisão",
        "outcome" => "Informe o resultado da decisão",
        _ => "Campo obrigatório",
    }
}

impl TransitionDraft {
    /// Campos que ainda faltam para o tipo (o botão de confirmar fica
    /// desabilitado enquanto a lista não estiver vazia).
    pub fn missing_fields(&self, kind: TransitionType, requires_exam: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match kind {
            TransitionType::ProtocolInss => {
                if filled(&self.protocol_number).is_none() {
                    missing.push("protocolNumber");
                }
                if self.protocol_date.is_none() {
                    missing.push("protocolDate");
                }
                if requires_exam && self.pericia_date.is_none() {
                    missing.push("periciaDate");
                }
            }
            TransitionType::ProtocolAppeal => {
                if filled(&self.appeal_protocol_number).is_none() {
                    missing.push("appealProtocolNumber");
                }
            }
            TransitionType::Deadline => {
                if self.notice_date.is_none() {
                    missing.push("noticeDate");
                }
                if self.window_days.is_some_and(|days| !(1..=MAX_WINDOW_DAYS).contains(&days)) {
                    missing.push("windowDays");
                }
            }
            TransitionType::ConclusionNb => {
                if self.decision_date.is_none() {
                    missing.push("decisionDate");
                }
                if self.outcome.is_none() {
                    missing.push("outcome");
                }
            }
            // Lista vazia é aceita (apenas sinalizada no log)
            TransitionType::Pendency => {}
        }
        missing
    }

    /// Converte o rascunho no formulário do tipo, ou devolve todos os campos faltantes.
    pub fn finalize(
        &self,
        kind: TransitionType,
        requires_exam: bool,
        default_window_days: u32,
    ) -> Result<TransitionForm, AppError> {
        let missing = self.missing_fields(kind, requires_exam);
        if !missing.is_empty() {
            let mut errors = ValidationErrors::new();
            for field in missing {
                let code = if field == "windowDays" { "out_of_range" } else { "required" };
                let mut error = ValidationError::new(code);
                error.message = Some(required_message(field).into());
                errors.add(field, error);
            }
            return Err(AppError::ValidationError(errors));
        }

        // Os `ok_or` abaixo não disparam: `missing_fields` já conferiu tudo
        let missing = |field: &'static str| AppError::field(field, "required", "Campo obrigatório");

        let form = match kind {
            TransitionType::ProtocolInss => TransitionForm::ProtocolInss {
                protocol_number: filled(&self.protocol_number).ok_or_else(|| missing("protocolNumber"))?,
                protocol_date: self.protocol_date.ok_or_else(|| missing("protocolDate"))?,
                pericia_date: self.pericia_date,
            },
            TransitionType::ProtocolAppeal => TransitionForm::ProtocolAppeal {
                appeal_protocol_number: filled(&self.appeal_protocol_number)
                    .ok_or_else(|| missing("appealProtocolNumber"))?,
                appeal_date: self.appeal_date,
            },
            TransitionType::Deadline => TransitionForm::Deadline {
                notice_date: self.notice_date.ok_or_else(|| missing("noticeDate"))?,
                window_days: self.window_days.unwrap_or(default_window_days),
                exigency_details: clean_list(&self.exigency_details),
            },
            TransitionType::Pendency => TransitionForm::Pendency {
                missing_docs: clean_list(&self.missing_docs),
            },
            TransitionType::ConclusionNb => TransitionForm::Conclusion {
                decision_date: self.decision_date.ok_or_else(|| missing("decisionDate"))?,
                outcome: self.outcome.ok_or_else(|| missing("outcome"))?,
                dcb_date: self.dcb_date,
                benefit_number: filled(&self.benefit_number),
            },
        };
        Ok(form)
    }
}

/// Efeito de um formulário sobre o caso.
#[derive(Debug, Default)]
pub struct FormEffect {
    pub patch: CasePatch,
    pub summary: Vec<String>,
    pub add_tags: Vec<&'static str>,
    pub remove_tags: Vec<&'static str>,
    /// Concessão parcial: o trecho negado segue em um novo caso de recurso.
    pub split: bool,
}

impl TransitionForm {
    pub fn kind(&self) -> TransitionType {
        match self {
            TransitionForm::ProtocolInss { .. } => TransitionType::ProtocolInss,
            TransitionForm::ProtocolAppeal { .. } => TransitionType::ProtocolAppeal,
            TransitionForm::Deadline { .. } => TransitionType::Deadline,
            TransitionForm::Pendency { .. } => TransitionType::Pendency,
            TransitionForm::Conclusion { .. } => TransitionType::ConclusionNb,
        }
    }

    /// Traduz o formulário em patch + resumo para o histórico.
    pub fn effect(self, config: &WorkflowConfig, dest_column: &str, today: NaiveDate) -> FormEffect {
        let mut fx = FormEffect::default();
        match self {
            TransitionForm::ProtocolInss { protocol_number, protocol_date, pericia_date } => {
                fx.summary.push(format!("Protocolo {} em {}", protocol_number, format_br(protocol_date)));
                fx.patch.protocol_number = Patch::Set(protocol_number);
                fx.patch.protocol_date = Patch::Set(protocol_date);
                if let Some(pericia) = pericia_date {
                    fx.summary.push(format!("Perícia em {}", format_br_datetime(pericia)));
                    fx.patch.pericia_date = Patch::Set(pericia);
                }
            }
            TransitionForm::ProtocolAppeal { appeal_protocol_number, appeal_date } => {
                let filed = appeal_date.unwrap_or(today);
                fx.summary.push(format!("Recurso {} em {}", appeal_protocol_number, format_br(filed)));
                fx.patch.appeal_protocol_number = Patch::Set(appeal_protocol_number);
                if config.is_second_instance(dest_column) {
                    fx.patch.appeal_special_date = Patch::Set(filed);
                } else {
                    fx.patch.appeal_ordinary_date = Patch::Set(filed);
                }
            }
            TransitionForm::Deadline { notice_date, window_days, exigency_details } => {
                let (start, end) = deadline_window(notice_date, window_days);
                fx.summary.push(format!(
                    "Ciência em {}, prazo de {} dias até {}",
                    format_br(notice_date),
                    window_days,
                    format_br(end)
                ));
                if !exigency_details.is_empty() {
                    fx.summary.push(format!("Exigências: {}", exigency_details.join(", ")));
                }
                fx.patch.deadline_start = Patch::Set(start);
                fx.patch.deadline_end = Patch::Set(end);
                fx.patch.exigency_details = Some(exigency_details);
            }
            TransitionForm::Pendency { missing_docs } => {
                if missing_docs.is_empty() {
                    tracing::warn!("Pendência registrada sem documentos em {}", dest_column);
                    fx.summary.push("Pendência sem documentos listados".to_string());
                } else {
                    fx.summary.push(format!("Documentos pendentes: {}", missing_docs.join(", ")));
                }
                fx.patch.missing_docs = Some(missing_docs);
            }
            TransitionForm::Conclusion { decision_date, outcome, dcb_date, benefit_number } => {
                let label = match outcome {
                    DecisionOutcome::Granted => "Concedido",
                    DecisionOutcome::Partial => "Concedido parcialmente",
                    DecisionOutcome::Denied => "Indeferido",
                };
                fx.summary.push(format!("{} em {}", label, format_br(decision_date)));
                fx.patch.decision_date = Patch::Set(decision_date);
                fx.patch.decision_outcome = Patch::Set(outcome);
                if let Some(nb) = benefit_number {
                    fx.summary.push(format!("NB {}", nb));
                    fx.patch.benefit_number = Patch::Set(nb);
                }
                match outcome {
                    DecisionOutcome::Denied | DecisionOutcome::Partial => {
                        let (start, end) = deadline_window(decision_date, config.appeal_window_days);
                        fx.summary.push(format!("Prazo recursal até {}", format_br(end)));
                        fx.patch.deadline_start = Patch::Set(start);
                        fx.patch.deadline_end = Patch::Set(end);
                    }
                    DecisionOutcome::Granted => {
                        // Prazo anterior (exigência) perde o objeto com a concessão
                        fx.patch.deadline_start = Patch::Clear;
                        fx.patch.deadline_end = Patch::Clear;
                    }
                }
                if outcome != DecisionOutcome::Denied {
                    if let Some(dcb) = dcb_date {
                        fx.summary.push(format!("DCB {}", format_br(dcb)));
                        fx.patch.dcb_date = Patch::Set(dcb);
                    }
                }
                match outcome {
                    DecisionOutcome::Denied => {
                        fx.add_tags.push(TAG_DENIED);
                        fx.remove_tags.push(TAG_GRANTED);
                    }
                    DecisionOutcome::Granted | DecisionOutcome::Partial => {
                        fx.add_tags.push(TAG_GRANTED);
                        fx.remove_tags.push(TAG_DENIED);
                    }
                }
                fx.split = outcome == DecisionOutcome::Partial;
            }
        }
        fx
    }
}

/// DCB sugerida na concessão, apenas para benefícios com cessação.
pub fn suggest_dcb(config: &WorkflowConfig, case: &Case, decision_date: NaiveDate) -> Option<NaiveDate> {
    let benefit = case.benefit_type.as_deref()?;
    config
        .has_cessation(benefit)
        .then(|| add_days(decision_date, DEFAULT_CESSATION_DAYS))
}

// =============================================================================
//  MOVIMENTO
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Visão de destino; ausente = visão atual do caso.
    pub target_view: Option<ViewType>,
    #[schema(example = "aux_pericia")]
    pub target_column: String,
    /// Novo responsável; ausente = mantém o atual.
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub draft: Option<TransitionDraft>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovePreview {
    pub from: Position,
    pub to: Position,
    pub zone_id: Option<String>,
    pub transition: Option<TransitionType>,
    pub requires_exam_date: bool,
    pub missing_fields: Vec<String>,
    pub can_confirm: bool,
    pub tasks_to_add: Vec<String>,
    pub default_window_days: u32,
    pub suggested_dcb: Option<NaiveDate>,
    pub suggestions: Vec<String>,
    pub current_responsible_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub case: Case,
    pub transition: Option<TransitionType>,
    pub split_required: bool,
}

struct Plan {
    target: ResolvedTarget,
    transition: Option<TransitionType>,
    requires_exam: bool,
}

fn plan(config: &WorkflowConfig, case: &Case, request: &MoveRequest) -> Result<Plan, AppError> {
    let target = resolve_target(config, case.view, request.target_view, &request.target_column)?;
    if target.view == case.view && target.column_id == case.column_id {
        return Err(AppError::field("targetColumn", "same_column", "O caso já está nesta coluna"));
    }
    let transition = match_transition(&config.rules, &case.column_id, &target.column_id);
    let requires_exam = transition == Some(TransitionType::ProtocolInss) && config.is_exam_column(&target.column_id);
    Ok(Plan { target, transition, requires_exam })
}

/// O que o diálogo precisa mostrar antes do commit.
pub fn preview_move(config: &WorkflowConfig, case: &Case, request: &MoveRequest, today: NaiveDate) -> Result<MovePreview, AppError> {
    let plan = plan(config, case, request)?;
    let draft = request.draft.clone().unwrap_or_default();
    let missing_fields: Vec<String> = plan
        .transition
        .map(|kind| draft.missing_fields(kind, plan.requires_exam).into_iter().map(String::from).collect())
        .unwrap_or_default();

    let suggestions = match plan.transition {
        Some(TransitionType::Pendency) => config.pendency_suggestions.clone(),
        Some(TransitionType::Deadline) => config.exigency_suggestions.clone(),
        _ => Vec::new(),
    };
    let suggested_dcb = match plan.transition {
        Some(TransitionType::ConclusionNb) => suggest_dcb(config, case, draft.decision_date.unwrap_or(today)),
        _ => None,
    };

    Ok(MovePreview {
        from: case.position(),
        to: Position { view: plan.target.view, column_id: plan.target.column_id.clone() },
        zone_id: plan.target.zone_id.clone(),
        transition: plan.transition,
        requires_exam_date: plan.requires_exam,
        can_confirm: missing_fields.is_empty(),
        missing_fields,
        tasks_to_add: plan.target.tasks_to_add.clone(),
        default_window_days: config.default_deadline_days,
        suggested_dcb,
        suggestions,
        current_responsible_id: case.responsible_id,
    })
}

fn column_title(config: &WorkflowConfig, view: ViewType, column_id: &str) -> String {
    config
        .column(view, column_id)
        .map(|c| c.title.clone())
        .unwrap_or_else(|| column_id.to_string())
}

/// Aplica o movimento em uma cópia do caso. Ou tudo é aplicado (posição,
/// campos do formulário, responsável, tarefas, histórico) ou nada é.
pub fn commit_move(
    config: &WorkflowConfig,
    users: &[OfficeUser],
    case: &Case,
    request: &MoveRequest,
    actor: &str,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<MoveOutcome, AppError> {
    let plan = plan(config, case, request)?;

    let effect = match plan.transition {
        Some(kind) => {
            let draft = request.draft.clone().unwrap_or_default();
            let form = draft.finalize(kind, plan.requires_exam, config.default_deadline_days)?;
            Some(form.effect(config, &plan.target.column_id, today))
        }
        None => None,
    };

    let handover = match request.responsible_id {
        Some(id) if Some(id) != case.responsible_id => {
            let user = users
                .iter()
                .find(|u| u.id == id && u.active)
                .ok_or_else(|| AppError::field("responsibleId", "unknown_user", "Responsável não encontrado"))?;
            Some(user)
        }
        _ => None,
    };

    let mut updated = case.clone();
    let mut details = vec![format!(
        "{} → {}",
        column_title(config, case.view, &case.column_id),
        column_title(config, plan.target.view, &plan.target.column_id)
    )];

    let mut split_required = false;
    if let Some(effect) = effect {
        effect.patch.apply_to(&mut updated);
        for tag in effect.remove_tags {
            updated.remove_tag(tag);
        }
        for tag in effect.add_tags {
            updated.add_tag(tag);
        }
        details.extend(effect.summary);
        split_required = effect.split;
    }

    if !updated.deadline_is_consistent() {
        return Err(AppError::InvalidDeadlineWindow);
    }

    if let Some(user) = handover {
        details.push(format!(
            "Responsável: {} → {}",
            case.responsible_name.as_deref().unwrap_or("—"),
            user.name
        ));
        updated.responsible_id = Some(user.id);
        updated.responsible_name = Some(user.name.clone());
    }

    updated.view = plan.target.view;
    updated.column_id = plan.target.column_id.clone();
    updated.add_tasks(&plan.target.tasks_to_add, now);
    updated.last_update = now;

    let action = match plan.transition {
        Some(kind) => kind.label(),
        None => "Movimentação",
    };
    let mut entry = HistoryEntry::new(actor, action, details.join("; "), now);
    entry.from = Some(case.position());
    entry.to = Some(updated.position());
    entry.transition = plan.transition;
    updated.push_history(entry);

    tracing::info!(
        "Caso #{} movido de {} para {}/{} ({:?})",
        case.id,
        case.column_id,
        updated.view.as_str(),
        updated.column_id,
        plan.transition
    );

    Ok(MoveOutcome { case: updated, transition: plan.transition, split_required })
}

/// Novo caso de recurso para o trecho negado de uma concessão parcial.
/// Copia os dados do cliente e do benefício; posição, histórico, tarefas e
/// notas começam do zero, com referência ao caso de origem.
pub fn build_partial_split(
    config: &WorkflowConfig,
    original: &Case,
    new_id: i64,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Case, AppError> {
    let first = config
        .first_column(ViewType::RecursoAdm)
        .ok_or(AppError::InvalidPosition { view: ViewType::RecursoAdm, column: String::new() })?;

    let mut split = original.clone();
    split.id = new_id;
    split.view = ViewType::RecursoAdm;
    split.column_id = first.id.clone();
    split.parent_case_id = Some(original.id);
    split.tasks = Vec::new();
    split.history = Vec::new();
    split.sticky_notes = Vec::new();
    split.files = Vec::new();
    split.missing_docs = Vec::new();
    split.exigency_details = Vec::new();
    split.mandados_seguranca = Vec::new();
    split.appeal_protocol_number = None;
    split.appeal_ordinary_date = None;
    split.appeal_special_date = None;
    split.remove_tag(TAG_GRANTED);
    split.add_tag(TAG_DENIED);
    split.created_at = now;
    split.last_update = now;
    split.add_tasks(["Redigir recurso contra a parte indeferida"], now);

    let mut entry = HistoryEntry::new(
        actor,
        "Caso criado",
        format!("Desmembrado do caso #{} (concessão parcial) para recurso da parte negada", original.id),
        now,
    );
    entry.to = Some(split.position());
    split.push_history(entry);
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{case::Urgency, office::UserRole, workflow::RuleSource};
    use crate::services::workflow_config::default_config;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 15, 0, 0).unwrap()
    }

    fn case_at(view: ViewType, column: &str) -> Case {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        Case::new(7, "João Pereira", "11144477735", view, column, created)
    }

    fn to(column: &str, draft: TransitionDraft) -> MoveRequest {
        MoveRequest { target_column: column.into(), draft: Some(draft), ..Default::default() }
    }

    #[test]
    fn test_wildcard_rule_matches_any_source() {
        let config = default_config();
        for source in ["adm_triagem", "adm_protocolado", "qualquer"] {
            assert_eq!(match_transition(&config.rules, source, "adm_exigencia"), Some(TransitionType::Deadline));
        }
        assert_eq!(match_transition(&config.rules, "adm_triagem", "adm_documentacao"), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            TransitionRule {
                from: RuleSource::Column("a".into()),
                to: "b".into(),
                kind: TransitionType::Pendency,
            },
            TransitionRule::any("b", TransitionType::Deadline),
        ];
        assert_eq!(match_transition(&rules, "a", "b"), Some(TransitionType::Pendency));
        assert_eq!(match_transition(&rules, "x", "b"), Some(TransitionType::Deadline));
    }

    #[test]
    fn test_denied_conclusion_opens_appeal_window() {
        let config = default_config();
        let draft = TransitionDraft {
            decision_date: Some(d(2024, 1, 1)),
            outcome: Some(DecisionOutcome::Denied),
            ..Default::default()
        };
        let form = draft.finalize(TransitionType::ConclusionNb, false, 30).unwrap();
        let fx = form.effect(&config, "adm_decisao", d(2024, 1, 2));
        assert_eq!(fx.patch.deadline_start, Patch::Set(d(2024, 1, 1)));
        assert_eq!(fx.patch.deadline_end, Patch::Set(d(2024, 1, 31)));
        assert_eq!(fx.add_tags, vec![TAG_DENIED]);
        assert!(!fx.split);
    }

    #[test]
    fn test_missing_fields_block_commit() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_triagem");
        let request = to("adm_protocolado", TransitionDraft {
            protocol_number: Some("   ".into()),
            ..Default::default()
        });
        let err = commit_move(&config, &[], &case, &request, "ana", now(), d(2024, 2, 5)).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("protocolNumber"));
                assert!(fields.contains_key("protocolDate"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_ungated_move_needs_no_draft() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_triagem");
        let request = MoveRequest { target_column: "adm_documentacao".into(), ..Default::default() };
        let outcome = commit_move(&config, &[], &case, &request, "ana", now(), d(2024, 2, 5)).unwrap();
        assert_eq!(outcome.case.column_id, "adm_documentacao");
        assert_eq!(outcome.transition, None);
        assert_eq!(outcome.case.history.len(), 1);
        assert_eq!(outcome.case.history[0].action, "Movimentação");
    }

    #[test]
    fn test_sick_leave_exam_scheduling_end_to_end() {
        let config = default_config();
        let mut case = case_at(ViewType::AuxDoenca, "aux_chegada");
        case.benefit_number = Some("NB1".into());

        let preview = preview_move(&config, &case, &to("aux_pericia", TransitionDraft::default()), d(2024, 2, 5)).unwrap();
        assert_eq!(preview.transition, Some(TransitionType::ProtocolInss));
        assert!(preview.requires_exam_date);
        assert!(preview.missing_fields.contains(&"periciaDate".to_string()));
        assert!(!preview.can_confirm);

        let draft: TransitionDraft = serde_json::from_str(
            r#"{"protocolNumber": "555", "protocolDate": "2024-02-01", "periciaDate": "2024-02-20T09:00"}"#,
        )
        .unwrap();
        let outcome = commit_move(&config, &[], &case, &to("aux_pericia", draft), "ana", now(), d(2024, 2, 5)).unwrap();
        let moved = outcome.case;

        assert_eq!(moved.column_id, "aux_pericia");
        assert_eq!(moved.view, ViewType::AuxDoenca);
        assert_eq!(moved.protocol_number.as_deref(), Some("555"));
        assert_eq!(moved.protocol_date, Some(d(2024, 2, 1)));
        assert_eq!(moved.pericia_date.unwrap().date(), d(2024, 2, 20));
        assert_eq!(moved.benefit_number.as_deref(), Some("NB1"));
        assert_eq!(moved.last_update, now());
        let last = moved.history.last().unwrap();
        assert_eq!(last.date, now());
        assert_eq!(last.transition, Some(TransitionType::ProtocolInss));
        assert!(last.details.contains("555"));
    }

    #[test]
    fn test_exam_date_only_required_in_exam_columns() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_triagem");
        let draft = TransitionDraft {
            protocol_number: Some("123".into()),
            protocol_date: Some(d(2024, 2, 1)),
            ..Default::default()
        };
        assert!(commit_move(&config, &[], &case, &to("adm_protocolado", draft.clone()), "ana", now(), d(2024, 2, 5)).is_ok());
        assert!(commit_move(&config, &[], &case, &to("adm_pericia", draft), "ana", now(), d(2024, 2, 5)).is_err());
    }

    #[test]
    fn test_deadline_uses_default_window() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_protocolado");
        let draft = TransitionDraft {
            notice_date: Some(d(2024, 3, 1)),
            exigency_details: vec!["CNIS".into(), " CNIS ".into(), "".into()],
            ..Default::default()
        };
        let moved = commit_move(&config, &[], &case, &to("adm_exigencia", draft), "ana", now(), d(2024, 3, 1)).unwrap().case;
        assert_eq!(moved.deadline_start, Some(d(2024, 3, 1)));
        assert_eq!(moved.deadline_end, Some(d(2024, 3, 31)));
        assert_eq!(moved.exigency_details, vec!["CNIS".to_string()]);
    }

    #[test]
    fn test_zero_day_window_is_rejected() {
        let draft = TransitionDraft { notice_date: Some(d(2024, 3, 1)), window_days: Some(0), ..Default::default() };
        assert_eq!(draft.missing_fields(TransitionType::Deadline, false), vec!["windowDays"]);
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let mut draft = TransitionDraft { notice_date: Some(d(2024, 3, 1)), window_days: Some(u32::MAX), ..Default::default() };
        assert_eq!(draft.missing_fields(TransitionType::Deadline, false), vec!["windowDays"]);

        let Err(AppError::ValidationError(errors)) = draft.finalize(TransitionType::Deadline, false, 30) else {
            panic!("prazo acima do teto deveria ser recusado");
        };
        assert_eq!(errors.field_errors()["windowDays"][0].code, "out_of_range");

        draft.window_days = Some(MAX_WINDOW_DAYS);
        assert!(draft.missing_fields(TransitionType::Deadline, false).is_empty());
    }

    #[test]
    fn test_appeal_protocol_sets_instance_date() {
        let config = default_config();
        let case = case_at(ViewType::RecursoAdm, "rec_elaboracao");
        let draft = TransitionDraft { appeal_protocol_number: Some("44221".into()), ..Default::default() };
        let moved = commit_move(&config, &[], &case, &to("rec_ordinario", draft.clone()), "ana", now(), d(2024, 2, 5)).unwrap().case;
        assert_eq!(moved.appeal_ordinary_date, Some(d(2024, 2, 5)));
        assert_eq!(moved.appeal_special_date, None);

        let moved = commit_move(&config, &[], &moved, &to("rec_especial", draft), "ana", now(), d(2024, 6, 1)).unwrap().case;
        assert_eq!(moved.appeal_special_date, Some(d(2024, 6, 1)));
        assert_eq!(moved.appeal_ordinary_date, Some(d(2024, 2, 5)));
    }

    #[test]
    fn test_pendency_accepts_empty_list() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_documentacao");
        let moved = commit_move(&config, &[], &case, &to("adm_pendencia", TransitionDraft::default()), "ana", now(), d(2024, 2, 5)).unwrap().case;
        assert!(moved.missing_docs.is_empty());
        assert_eq!(moved.column_id, "adm_pendencia");
    }

    #[test]
    fn test_responsible_handover() {
        let config = default_config();
        let user = OfficeUser { id: Uuid::new_v4(), name: "Dr. Carlos".into(), email: None, role: UserRole::Lawyer, active: true };
        let mut case = case_at(ViewType::Admin, "adm_triagem");
        case.responsible_name = Some("Dra. Ana".into());

        let mut request = MoveRequest { target_column: "adm_documentacao".into(), ..Default::default() };
        request.responsible_id = Some(user.id);
        let moved = commit_move(&config, std::slice::from_ref(&user), &case, &request, "ana", now(), d(2024, 2, 5)).unwrap().case;
        assert_eq!(moved.responsible_id, Some(user.id));
        assert_eq!(moved.responsible_name.as_deref(), Some("Dr. Carlos"));
        assert!(moved.history[0].details.contains("Dra. Ana → Dr. Carlos"));

        request.responsible_id = Some(Uuid::new_v4());
        assert!(commit_move(&config, &[user], &case, &request, "ana", now(), d(2024, 2, 5)).is_err());
    }

    #[test]
    fn test_zone_move_adds_checklist() {
        let config = default_config();
        let case = case_at(ViewType::MesaDecisao, "mesa_analise");
        let request = MoveRequest { target_column: "zone_judicial".into(), ..Default::default() };
        let moved = commit_move(&config, &[], &case, &request, "ana", now(), d(2024, 2, 5)).unwrap().case;
        assert_eq!(moved.view, ViewType::Judicial);
        assert_eq!(moved.column_id, "jud_triagem");
        assert_eq!(moved.tasks.len(), 4);

        // Repetir o salto não duplica tarefas pendentes
        let back = MoveRequest { target_view: Some(ViewType::MesaDecisao), target_column: "mesa_analise".into(), ..Default::default() };
        let returned = commit_move(&config, &[], &moved, &back, "ana", now(), d(2024, 2, 5)).unwrap().case;
        let again = commit_move(&config, &[], &returned, &request, "ana", now(), d(2024, 2, 5)).unwrap().case;
        assert_eq!(again.tasks.len(), 4);
        assert_eq!(again.history.len(), 3);
    }

    #[test]
    fn test_same_column_is_rejected() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_triagem");
        let request = MoveRequest { target_column: "adm_triagem".into(), ..Default::default() };
        assert!(commit_move(&config, &[], &case, &request, "ana", now(), d(2024, 2, 5)).is_err());
    }

    #[test]
    fn test_partial_conclusion_requests_split() {
        let config = default_config();
        let mut case = case_at(ViewType::Admin, "adm_pericia");
        case.benefit_type = Some("31".into());
        case.urgency = Urgency::High;
        let draft = TransitionDraft {
            decision_date: Some(d(2024, 1, 1)),
            outcome: Some(DecisionOutcome::Partial),
            dcb_date: Some(d(2024, 5, 1)),
            ..Default::default()
        };
        let outcome = commit_move(&config, &[], &case, &to("adm_decisao", draft), "ana", now(), d(2024, 1, 2)).unwrap();
        assert!(outcome.split_required);
        assert!(outcome.case.has_tag(TAG_GRANTED));
        assert_eq!(outcome.case.dcb_date, Some(d(2024, 5, 1)));
        assert_eq!(outcome.case.deadline_end, Some(d(2024, 1, 31)));

        let split = build_partial_split(&config, &outcome.case, 99, "ana", now()).unwrap();
        assert_eq!(split.id, 99);
        assert_eq!(split.parent_case_id, Some(7));
        assert_eq!(split.view, ViewType::RecursoAdm);
        assert_eq!(split.column_id, "rec_elaboracao");
        assert_eq!(split.client_name, case.client_name);
        assert_eq!(split.history.len(), 1);
        assert!(split.has_tag(TAG_DENIED));
        assert!(!split.has_tag(TAG_GRANTED));
        assert_eq!(split.deadline_end, Some(d(2024, 1, 31)));
    }

    #[test]
    fn test_dcb_suggestion_only_for_cessation_benefits() {
        let config = default_config();
        let mut case = case_at(ViewType::AuxDoenca, "aux_aguardando");
        assert_eq!(suggest_dcb(&config, &case, d(2024, 1, 1)), None);
        case.benefit_type = Some("41".into());
        assert_eq!(suggest_dcb(&config, &case, d(2024, 1, 1)), None);
        case.benefit_type = Some("31".into());
        assert_eq!(suggest_dcb(&config, &case, d(2024, 1, 1)), Some(d(2024, 4, 30)));
    }
}
