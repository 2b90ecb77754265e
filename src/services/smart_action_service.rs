// src/services/smart_action_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        case::{Case, TAG_DENIED, TAG_GRANTED},
        office::OfficeUser,
        workflow::{ColumnKind, SmartAction, ViewType, WorkflowConfig},
    },
    services::transition_service::{commit_move, MoveOutcome, MoveRequest, TransitionDraft},
};

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedActions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub actions: Vec<SmartAction>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyActionPayload {
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub draft: Option<TransitionDraft>,
}

/// Consulta direta na tabela; posição sem entrada devolve lista vazia.
pub fn resolve_actions(config: &WorkflowConfig, view: ViewType, column_id: &str) -> SuggestedActions {
    config
        .smart_actions
        .iter()
        .find(|e| e.view == view && e.column_id == column_id)
        .map(|e| SuggestedActions {
            title: Some(e.title.clone()),
            description: Some(e.description.clone()),
            actions: e.actions.clone(),
        })
        .unwrap_or_default()
}

/// Zonas que devem pulsar enquanto o caso é arrastado na visão `view`.
/// INDEFERIDO destaca Judicial/Recurso; CONCEDIDO destaca o arquivo.
pub fn drag_highlights(config: &WorkflowConfig, case: &Case, view: ViewType) -> Vec<String> {
    let denied = case.has_tag(TAG_DENIED);
    let granted = case.has_tag(TAG_GRANTED);
    if !denied && !granted {
        return Vec::new();
    }
    let Some(definition) = config.view(view) else {
        return Vec::new();
    };

    definition
        .zones
        .iter()
        .filter(|zone| match &zone.kind {
            ColumnKind::Zone { target_view, is_archive, .. } => {
                (denied && !is_archive && matches!(target_view, ViewType::Judicial | ViewType::RecursoAdm))
                    || (granted && *is_archive)
            }
            ColumnKind::Standard => false,
        })
        .map(|zone| zone.id.clone())
        .collect()
}

/// Executa a ação sugerida de índice `index` pelo caminho normal de movimento
/// (as regras de transição continuam valendo) e aplica urgência e tarefas.
pub fn apply_smart_action(
    config: &WorkflowConfig,
    users: &[OfficeUser],
    case: &Case,
    index: usize,
    payload: ApplyActionPayload,
    actor: &str,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<MoveOutcome, AppError> {
    let suggestions = resolve_actions(config, case.view, &case.column_id);
    let action = suggestions.actions.get(index).ok_or(AppError::SmartActionNotFound(index))?;

    let request = MoveRequest {
        target_view: Some(action.target_view),
        target_column: action.target_column.clone(),
        responsible_id: payload.responsible_id,
        draft: payload.draft,
    };
    let mut outcome = commit_move(config, users, case, &request, actor, now, today)?;
    let previous_urgency = outcome.case.urgency;
    outcome.case.urgency = action.urgency;
    outcome.case.add_tasks(&action.tasks, now);

    // A entrada do movimento registra qual ação rodou
    let mut note = format!("Ação sugerida: {}", action.label);
    if previous_urgency != action.urgency {
        note.push_str(&format!("; urgência {:?} -> {:?}", previous_urgency, action.urgency));
    }
    if let Some(entry) = outcome.case.history.last_mut() {
        if entry.details.is_empty() {
            entry.details = note;
        } else {
            entry.details = format!("{}; {}", entry.details, note);
        }
    }

    tracing::info!("Ação sugerida '{}' aplicada ao caso #{}", action.label, case.id);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::case::Urgency;
    use crate::services::workflow_config::default_config;
    use chrono::TimeZone;

    fn case_at(view: ViewType, column: &str) -> Case {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        Case::new(3, "Ana", "52998224725", view, column, now)
    }

    #[test]
    fn test_lookup_and_empty_result() {
        let config = default_config();
        let found = resolve_actions(&config, ViewType::MesaDecisao, "mesa_analise");
        assert_eq!(found.actions.len(), 3);
        assert!(found.title.is_some());

        let none = resolve_actions(&config, ViewType::Admin, "adm_triagem");
        assert!(none.actions.is_empty());
        assert!(none.title.is_none());
    }

    #[test]
    fn test_highlights_by_tag() {
        let config = default_config();
        let mut case = case_at(ViewType::MesaDecisao, "mesa_analise");
        assert!(drag_highlights(&config, &case, ViewType::MesaDecisao).is_empty());

        case.add_tag(TAG_DENIED);
        let zones = drag_highlights(&config, &case, ViewType::MesaDecisao);
        assert_eq!(zones, vec!["zone_recurso".to_string(), "zone_judicial".to_string()]);

        case.remove_tag(TAG_DENIED);
        case.add_tag("concedido");
        assert_eq!(drag_highlights(&config, &case, ViewType::MesaDecisao), vec!["zone_arquivo".to_string()]);
    }

    #[test]
    fn test_apply_action_moves_and_assigns_urgency() {
        let config = default_config();
        let case = case_at(ViewType::MesaDecisao, "mesa_analise");
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        let outcome = apply_smart_action(
            &config, &[], &case, 1, ApplyActionPayload::default(), "ana", now,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(outcome.case.view, ViewType::Judicial);
        assert_eq!(outcome.case.column_id, "jud_triagem");
        assert_eq!(outcome.case.urgency, Urgency::High);
        assert_eq!(outcome.case.tasks.len(), 4);

        let details = &outcome.case.history.last().unwrap().details;
        let label = &resolve_actions(&config, ViewType::MesaDecisao, "mesa_analise").actions[1].label;
        assert!(details.contains(&format!("Ação sugerida: {label}")), "{details}");
        assert!(details.contains("urgência Normal -> High"), "{details}");
    }

    #[test]
    fn test_apply_action_still_enforces_rules() {
        let config = default_config();
        let case = case_at(ViewType::Admin, "adm_exigencia");
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        // "Exigência cumprida" leva a uma coluna que exige protocolo
        assert!(apply_smart_action(&config, &[], &case, 0, ApplyActionPayload::default(), "ana", now, today).is_err());
        assert!(matches!(
            apply_smart_action(&config, &[], &case, 5, ApplyActionPayload::default(), "ana", now, today),
            Err(AppError::SmartActionNotFound(5))
        ));
    }
}
