// src/services/health_service.rs
//
// Saúde do caso: relógio de SLA desde a âncora da fase (protocolo ou
// recurso), estagnação, contato com o cliente, prazos e alerta de PP.
// Não bloqueia movimentos; apenas sinaliza.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::dates::{days_between, days_since},
    models::{
        case::{Case, Urgency},
        settings::SystemSettings,
        workflow::{TransitionType, ViewType, WorkflowConfig},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlaStatus {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorKind {
    Protocol,
    AppealOrdinary,
    AppealSpecial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitSource {
    Fixed,
    Historical,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlaClock {
    pub status: SlaStatus,
    pub anchor: AnchorKind,
    pub anchor_date: NaiveDate,
    pub days_elapsed: i64,
    pub normal_limit: i64,
    pub mandamus_limit: i64,
    pub limit_source: LimitSource,
    pub historical_samples: usize,
    /// Limite ultrapassado (para exibição), se houver.
    pub breached_limit: Option<i64>,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub days: i64,
    pub limit: i64,
    pub breached: bool,
}

impl Signal {
    fn elapsed(days: i64, limit: i64) -> Self {
        Self { days, limit, breached: days > limit }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineClock {
    pub deadline_end: NaiveDate,
    pub days_remaining: i64,
    pub overdue: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseHealth {
    pub case_id: i64,
    /// `None` quando o caso ainda não tem âncora (sem protocolo).
    pub sla: Option<SlaClock>,
    pub stagnation: Signal,
    pub spider_web: Signal,
    pub client_contact: Signal,
    pub internal_analysis: Option<Signal>,
    /// Dias até a DCB; alerta para pedir prorrogação.
    pub pp_alert: Option<Signal>,
    pub deadline: Option<DeadlineClock>,
    /// Libera a ação "Impetrar MS agora".
    pub can_file_mandado: bool,
    pub suggested_urgency: Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAverage {
    pub mean_days: i64,
    pub samples: usize,
}

/// Médias de tempo até a decisão, por coluna.
pub type HistoricalAverages = HashMap<String, ColumnAverage>;

/// Data local de um instante gravado em UTC.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Âncora da fase do caso numa posição.
pub fn anchor_for(config: &WorkflowConfig, case: &Case, view: ViewType, column_id: &str) -> Option<(AnchorKind, NaiveDate)> {
    if view == ViewType::RecursoAdm && config.is_first_instance(column_id) {
        return case.appeal_ordinary_date.map(|d| (AnchorKind::AppealOrdinary, d));
    }
    if view == ViewType::RecursoAdm && config.is_second_instance(column_id) {
        return case.appeal_special_date.map(|d| (AnchorKind::AppealSpecial, d));
    }
    case.protocol_date.map(|d| (AnchorKind::Protocol, d))
}

/// Recalcula as médias a partir dos casos já decididos. Para cada caso,
/// a última conclusão registrada no histórico diz de qual coluna ele saiu;
/// o tempo é `decisão - âncora` daquela coluna.
pub fn historical_averages(config: &WorkflowConfig, cases: &[Case]) -> HistoricalAverages {
    let mut sums: HashMap<String, (i64, usize)> = HashMap::new();

    for case in cases {
        let Some(decision_date) = case.decision_date else { continue };
        let last_conclusion = case
            .history
            .iter()
            .rev()
            .find(|h| h.transition == Some(TransitionType::ConclusionNb));
        let Some(from) = last_conclusion.and_then(|h| h.from.as_ref()) else { continue };
        let Some((_, anchor)) = anchor_for(config, case, from.view, &from.column_id) else { continue };

        let elapsed = days_since(anchor, decision_date);
        if elapsed < 0 {
            continue;
        }
        let slot = sums.entry(from.column_id.clone()).or_insert((0, 0));
        slot.0 += elapsed;
        slot.1 += 1;
    }

    sums.into_iter()
        .map(|(column, (total, n))| {
            let mean = (total as f64 / n as f64).round() as i64;
            (column, ColumnAverage { mean_days: mean.max(1), samples: n })
        })
        .collect()
}

/// Classificação pura do relógio: estritamente maior que o limite.
pub fn classify(days_elapsed: i64, normal_limit: i64, mandamus_limit: i64) -> SlaStatus {
    if days_elapsed > mandamus_limit {
        SlaStatus::Critical
    } else if days_elapsed > normal_limit {
        SlaStatus::Warning
    } else {
        SlaStatus::Normal
    }
}

pub fn sla_clock(
    config: &WorkflowConfig,
    settings: &SystemSettings,
    averages: &HistoricalAverages,
    case: &Case,
    today: NaiveDate,
) -> Option<SlaClock> {
    let (anchor, anchor_date) = anchor_for(config, case, case.view, &case.column_id)?;
    // Decisão posterior à âncora: a análise já terminou, não há relógio
    if case.decision_date.is_some_and(|d| d >= anchor_date) {
        return None;
    }

    let days_elapsed = days_since(anchor_date, today);
    let mandamus_limit = settings.sla_mandado_seguranca;
    let (normal_limit, limit_source, historical_samples) = match averages.get(&case.column_id) {
        Some(avg) if avg.samples > 0 => (avg.mean_days, LimitSource::Historical, avg.samples),
        _ => (config.default_normal_limit_days, LimitSource::Fixed, 0),
    };

    let status = classify(days_elapsed, normal_limit, mandamus_limit);
    let breached_limit = match status {
        SlaStatus::Critical => Some(mandamus_limit),
        SlaStatus::Warning => Some(normal_limit),
        SlaStatus::Normal => None,
    };
    let progress = if mandamus_limit > 0 {
        (days_elapsed.max(0) * 100 / mandamus_limit).min(100)
    } else {
        100
    };

    Some(SlaClock {
        status,
        anchor,
        anchor_date,
        days_elapsed,
        normal_limit,
        mandamus_limit,
        limit_source,
        historical_samples,
        breached_limit,
        progress_percent: progress as u8,
    })
}

fn entered_current_column(case: &Case) -> NaiveDate {
    case.history
        .iter()
        .rev()
        .find(|h| h.to.as_ref().is_some_and(|p| p.view == case.view && p.column_id == case.column_id))
        .map(|h| local_date(h.date))
        .unwrap_or_else(|| local_date(case.created_at))
}

pub fn analyze_case(
    config: &WorkflowConfig,
    settings: &SystemSettings,
    averages: &HistoricalAverages,
    case: &Case,
    today: NaiveDate,
) -> CaseHealth {
    let sla = sla_clock(config, settings, averages, case, today);

    let stagnation = Signal::elapsed(days_since(local_date(case.last_update), today), settings.sla_stagnation);

    let last_movement = case
        .history
        .last()
        .map(|h| local_date(h.date))
        .unwrap_or_else(|| local_date(case.created_at));
    let spider_web = Signal::elapsed(days_since(last_movement, today), settings.sla_spider_web);

    let last_contact = case.last_client_contact.unwrap_or_else(|| local_date(case.created_at));
    let client_contact = Signal::elapsed(days_since(last_contact, today), settings.sla_client_contact);

    let internal_analysis = config
        .internal_analysis_columns
        .iter()
        .any(|c| *c == case.column_id)
        .then(|| Signal::elapsed(days_since(entered_current_column(case), today), settings.sla_internal_analysis));

    let pp_alert = case.dcb_date.map(|dcb| {
        let days = days_between(today, dcb);
        Signal { days, limit: settings.pp_alert_days, breached: days <= settings.pp_alert_days }
    });

    let deadline = case.deadline_end.map(|end| {
        let days_remaining = days_between(today, end);
        DeadlineClock { deadline_end: end, days_remaining, overdue: days_remaining < 0 }
    });

    let can_file_mandado = sla.as_ref().is_some_and(|s| s.status == SlaStatus::Critical);

    let derived = if can_file_mandado || deadline.as_ref().is_some_and(|d| d.days_remaining <= 3) {
        Urgency::Critical
    } else if sla.as_ref().is_some_and(|s| s.status == SlaStatus::Warning)
        || pp_alert.is_some_and(|p| p.breached)
        || deadline.as_ref().is_some_and(|d| d.days_remaining <= 10)
    {
        Urgency::High
    } else {
        Urgency::Normal
    };

    CaseHealth {
        case_id: case.id,
        sla,
        stagnation,
        spider_web,
        client_contact,
        internal_analysis,
        pp_alert,
        deadline,
        can_file_mandado,
        suggested_urgency: derived.max(case.urgency),
    }
}
