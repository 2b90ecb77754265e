// src/models/workflow.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::case::Urgency;

// --- Enums ---

/// As cinco visões (quadros Kanban) do escritório.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewType {
    Admin,
    AuxDoenca,
    MesaDecisao,
    RecursoAdm,
    Judicial,
}

impl ViewType {
    pub const ALL: [ViewType; 5] = [
        ViewType::Admin,
        ViewType::AuxDoenca,
        ViewType::MesaDecisao,
        ViewType::RecursoAdm,
        ViewType::Judicial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Admin => "ADMIN",
            ViewType::AuxDoenca => "AUX_DOENCA",
            ViewType::MesaDecisao => "MESA_DECISAO",
            ViewType::RecursoAdm => "RECURSO_ADM",
            ViewType::Judicial => "JUDICIAL",
        }
    }
}

/// Tipo de coleta de dados exigida antes de um movimento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TransitionType {
    #[serde(rename = "PROTOCOL_INSS")]
    ProtocolInss,
    #[serde(rename = "PROTOCOL_APPEAL")]
    ProtocolAppeal,
    #[serde(rename = "DEADLINE")]
    Deadline,
    #[serde(rename = "PENDENCY")]
    Pendency,
    #[serde(rename = "CONCLUSION_NB")]
    ConclusionNb,
}

impl TransitionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransitionType::ProtocolInss => "Protocolo INSS",
            TransitionType::ProtocolAppeal => "Protocolo de Recurso",
            TransitionType::Deadline => "Exigência / Prazo",
            TransitionType::Pendency => "Pendência Documental",
            TransitionType::ConclusionNb => "Conclusão",
        }
    }
}

// --- Colunas ---

/// Coluna comum (posição ordenada) ou zona de salto para outra visão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    Standard,
    Zone {
        #[serde(rename = "targetView")]
        target_view: ViewType,
        #[serde(rename = "targetColumn")]
        target_column: String,
        #[serde(default, rename = "tasksToAdd")]
        tasks_to_add: Vec<String>,
        #[serde(default, rename = "isArchive")]
        is_archive: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[schema(example = "adm_exigencia")]
    pub id: String,
    #[schema(example = "Em Exigência")]
    pub title: String,
    #[schema(example = "orange")]
    pub color: String,
    pub kind: ColumnKind,
}

impl ColumnDefinition {
    pub fn standard(id: &str, title: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            kind: ColumnKind::Standard,
        }
    }

    pub fn zone(id: &str, title: &str, color: &str, target_view: ViewType, target_column: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            kind: ColumnKind::Zone {
                target_view,
                target_column: target_column.to_string(),
                tasks_to_add: Vec::new(),
                is_archive: false,
            },
        }
    }

    pub fn is_zone(&self) -> bool {
        matches!(self.kind, ColumnKind::Zone { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub view: ViewType,
    #[schema(example = "Administrativo")]
    pub title: String,
    /// Colunas comuns, na ordem de progresso.
    pub columns: Vec<ColumnDefinition>,
    /// Zonas de salto (sem ordem).
    pub zones: Vec<ColumnDefinition>,
}

// --- Regras de transição ---

/// Origem de uma regra: uma coluna específica ou `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleSource {
    Any,
    Column(String),
}

impl RuleSource {
    pub fn matches(&self, source: &str) -> bool {
        match self {
            RuleSource::Any => true,
            RuleSource::Column(id) => id == source,
        }
    }
}

impl From<String> for RuleSource {
    fn from(value: String) -> Self {
        if value == "*" {
            RuleSource::Any
        } else {
            RuleSource::Column(value)
        }
    }
}

impl From<RuleSource> for String {
    fn from(value: RuleSource) -> Self {
        match value {
            RuleSource::Any => "*".to_string(),
            RuleSource::Column(id) => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRule {
    #[schema(value_type = String, example = "*")]
    pub from: RuleSource,
    #[schema(example = "adm_exigencia")]
    pub to: String,
    #[serde(rename = "type")]
    pub kind: TransitionType,
}

impl TransitionRule {
    pub fn any(to: &str, kind: TransitionType) -> Self {
        Self { from: RuleSource::Any, to: to.to_string(), kind }
    }
}

// --- Ações sugeridas ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartAction {
    #[schema(example = "Ajuizar Ação")]
    pub label: String,
    pub target_view: ViewType,
    pub target_column: String,
    // Apenas apresentação
    pub icon: String,
    pub color: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartActionEntry {
    pub view: ViewType,
    pub column_id: String,
    pub title: String,
    pub description: String,
    pub actions: Vec<SmartAction>,
}

// --- Configuração completa ---

/// Tabelas estáticas do fluxo, injetadas no início da aplicação.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub views: Vec<ViewDefinition>,
    pub rules: Vec<TransitionRule>,
    pub smart_actions: Vec<SmartActionEntry>,
    /// Colunas de agendamento de perícia (PROTOCOL_INSS exige data do exame).
    pub exam_columns: Vec<String>,
    /// Colunas de recurso em 1ª instância (âncora: data do recurso ordinário).
    pub first_instance_columns: Vec<String>,
    /// Colunas de recurso em 2ª instância (âncora: data do recurso especial).
    pub second_instance_columns: Vec<String>,
    /// Colunas de triagem interna (SLA de análise interna).
    pub internal_analysis_columns: Vec<String>,
    /// Códigos de benefício com data de cessação (pensão, auxílio-reclusão, auxílio-doença).
    pub has_cessation_benefits: Vec<String>,
    /// Sugestões de documentos para pendências.
    pub pendency_suggestions: Vec<String>,
    /// Sugestões de itens de exigência.
    pub exigency_suggestions: Vec<String>,
    /// Prazo padrão de cumprimento de exigência (dias).
    pub default_deadline_days: u32,
    /// Prazo recursal após indeferimento (dias).
    pub appeal_window_days: u32,
    /// SLA esperado quando não há histórico (dias).
    pub default_normal_limit_days: i64,
}

impl WorkflowConfig {
    pub fn view(&self, view: ViewType) -> Option<&ViewDefinition> {
        self.views.iter().find(|v| v.view == view)
    }

    /// Colunas comuns seguidas das zonas.
    pub fn columns_of(&self, view: ViewType) -> Vec<&ColumnDefinition> {
        self.view(view)
            .map(|v| v.columns.iter().chain(v.zones.iter()).collect())
            .unwrap_or_default()
    }

    pub fn column(&self, view: ViewType, column_id: &str) -> Option<&ColumnDefinition> {
        self.view(view)?
            .columns
            .iter()
            .chain(self.view(view)?.zones.iter())
            .find(|c| c.id == column_id)
    }

    pub fn is_standard_column(&self, view: ViewType, column_id: &str) -> bool {
        self.view(view)
            .is_some_and(|v| v.columns.iter().any(|c| c.id == column_id))
    }

    pub fn first_column(&self, view: ViewType) -> Option<&ColumnDefinition> {
        self.view(view)?.columns.first()
    }

    pub fn is_exam_column(&self, column_id: &str) -> bool {
        self.exam_columns.iter().any(|c| c == column_id)
    }

    pub fn is_first_instance(&self, column_id: &str) -> bool {
        self.first_instance_columns.iter().any(|c| c == column_id)
    }

    pub fn is_second_instance(&self, column_id: &str) -> bool {
        self.second_instance_columns.iter().any(|c| c == column_id)
    }

    pub fn has_cessation(&self, benefit_type: &str) -> bool {
        self.has_cessation_benefits.iter().any(|b| b == benefit_type)
    }
}
