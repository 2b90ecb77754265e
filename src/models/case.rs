// src/models/case.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::workflow::{TransitionType, ViewType};

pub const TAG_GRANTED: &str = "CONCEDIDO";
pub const TAG_DENIED: &str = "INDEFERIDO";

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    #[default]
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    M,
    F,
}

/// Resultado de uma decisão administrativa ou judicial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionOutcome {
    Granted,
    Partial,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MandadoReason {
    DelayInAnalysis,
    DelayInAppeal,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MandadoStatus {
    Awaiting,
    InjunctionGranted,
    InjunctionDenied,
    FinalRuling,
}

// --- COLEÇÕES EMBUTIDAS ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseTask {
    pub id: Uuid,
    #[schema(example = "Coletar procuração judicial")]
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl CaseTask {
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), text: text.into(), completed: false, created_at: now }
    }
}

/// Posição de um caso no quadro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub view: ViewType,
    pub column_id: String,
}

/// Registro imutável do histórico do caso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    #[schema(example = "Dra. Ana")]
    pub user: String,
    #[schema(example = "Movimentação")]
    pub action: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MandadoSeguranca {
    pub id: Uuid,
    #[schema(example = "5001234-56.2024.4.04.7100")]
    pub npu: String,
    pub filing_date: NaiveDate,
    pub reason: MandadoReason,
    pub status: MandadoStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub color: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFile {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

// --- CASO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: i64,

    // Cliente
    #[schema(example = "Maria da Silva")]
    pub client_name: String,
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,

    // Posição no fluxo
    pub view: ViewType,
    #[schema(example = "adm_triagem")]
    pub column_id: String,

    // Benefício
    #[serde(default)]
    #[schema(example = "31")]
    pub benefit_type: Option<String>,
    #[serde(default)]
    pub benefit_number: Option<String>,
    #[serde(default)]
    pub protocol_number: Option<String>,
    #[serde(default)]
    pub protocol_date: Option<NaiveDate>,
    #[serde(default)]
    pub appeal_protocol_number: Option<String>,
    #[serde(default)]
    pub appeal_ordinary_date: Option<NaiveDate>,
    #[serde(default)]
    pub appeal_special_date: Option<NaiveDate>,
    #[serde(default)]
    pub decision_outcome: Option<DecisionOutcome>,
    #[serde(default)]
    pub decision_date: Option<NaiveDate>,
    #[serde(default)]
    pub dcb_date: Option<NaiveDate>,

    // Âncoras temporais
    #[serde(default, with = "crate::common::dates::opt_local_datetime")]
    #[schema(value_type = Option<String>, example = "2024-02-20T09:00:00")]
    pub pericia_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub deadline_start: Option<NaiveDate>,
    #[serde(default)]
    pub deadline_end: Option<NaiveDate>,
    #[serde(default)]
    pub last_client_contact: Option<NaiveDate>,

    // Responsável
    #[serde(default)]
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub responsible_name: Option<String>,

    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Caso de origem quando criado por divisão (concessão parcial).
    #[serde(default)]
    pub parent_case_id: Option<i64>,
    #[serde(default)]
    pub exigency_details: Vec<String>,

    // Coleções
    #[serde(default)]
    pub tasks: Vec<CaseTask>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub mandados_seguranca: Vec<MandadoSeguranca>,
    #[serde(default)]
    pub missing_docs: Vec<String>,
    #[serde(default)]
    pub sticky_notes: Vec<StickyNote>,
    #[serde(default)]
    pub files: Vec<CaseFile>,

    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl Case {
    pub fn new(id: i64, client_name: &str, cpf: &str, view: ViewType, column_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_name: client_name.to_string(),
            cpf: cpf.to_string(),
            birth_date: None,
            sex: None,
            marital_status: None,
            address: None,
            phone: None,
            email: None,
            view,
            column_id: column_id.to_string(),
            benefit_type: None,
            benefit_number: None,
            protocol_number: None,
            protocol_date: None,
            appeal_protocol_number: None,
            appeal_ordinary_date: None,
            appeal_special_date: None,
            decision_outcome: None,
            decision_date: None,
            dcb_date: None,
            pericia_date: None,
            deadline_start: None,
            deadline_end: None,
            last_client_contact: None,
            responsible_id: None,
            responsible_name: None,
            urgency: Urgency::Normal,
            tags: Vec::new(),
            parent_case_id: None,
            exigency_details: Vec::new(),
            tasks: Vec::new(),
            history: Vec::new(),
            mandados_seguranca: Vec::new(),
            missing_docs: Vec::new(),
            sticky_notes: Vec::new(),
            files: Vec::new(),
            created_at: now,
            last_update: now,
        }
    }

    pub fn position(&self) -> Position {
        Position { view: self.view, column_id: self.column_id.clone() }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn add_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| !t.eq_ignore_ascii_case(tag));
    }

    /// O histórico só cresce: nenhuma entrada é alterada ou removida.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Adiciona tarefas ignorando textos já pendentes no caso.
    pub fn add_tasks<I, S>(&mut self, texts: I, now: DateTime<Utc>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in texts {
            let text = text.as_ref();
            if !self.tasks.iter().any(|t| !t.completed && t.text == text) {
                self.tasks.push(CaseTask::new(text, now));
            }
        }
    }

    pub fn deadline_is_consistent(&self) -> bool {
        match (self.deadline_start, self.deadline_end) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        }
    }
}

impl HistoryEntry {
    pub fn new(user: &str, action: &str, details: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: now,
            user: user.to_string(),
            action: action.to_string(),
            details: details.into(),
            from: None,
            to: None,
            transition: None,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCasePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    #[validate(custom(function = "crate::common::cpf::validate_cpf_field"))]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,

    /// Ausente = visão administrativa.
    pub view: Option<ViewType>,
    /// Ausente = primeira coluna da visão.
    pub column_id: Option<String>,

    #[schema(example = "41")]
    pub benefit_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub urgency: Urgency,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ligar para o cliente")]
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskPayload {
    pub completed: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMandadoPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "5001234-56.2024.4.04.7100")]
    pub npu: String,
    pub filing_date: NaiveDate,
    pub reason: MandadoReason,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMandadoPayload {
    pub status: MandadoStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClientContactPayload {
    /// Ausente = hoje.
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}
