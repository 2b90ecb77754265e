// src/models/backup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    case::Case,
    office::{DocumentTemplate, OfficeUser},
    settings::SystemSettings,
};

pub const BACKUP_VERSION: &str = "1.0";

/// Backup completo. O formato de topo precisa ser mantido para migrações:
/// `{version, timestamp, officeData, data: {cases, users, templates}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemBackup {
    #[schema(example = "1.0")]
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub office_data: OfficeData,
    pub data: BackupData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub settings: SystemSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BackupData {
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub users: Vec<OfficeUser>,
    #[serde(default)]
    pub templates: Vec<DocumentTemplate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub cases: usize,
    pub users: usize,
    pub templates: usize,
}
