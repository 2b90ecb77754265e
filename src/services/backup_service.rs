// src/services/backup_service.rs
//
// Exportação/importação do backup JSON e listagem de casos em CSV.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    common::{cpf::format_cpf, dates::format_br, error::AppError},
    db::{CaseStore, OfficeStore},
    models::{
        backup::{BackupData, OfficeData, RestoreSummary, SystemBackup, BACKUP_VERSION},
        case::Case,
        workflow::WorkflowConfig,
    },
    services::column_graph::validate_position,
};

const CSV_HEADER: [&str; 12] = [
    "ID",
    "Cliente",
    "CPF",
    "Visão",
    "Coluna",
    "Benefício",
    "Protocolo",
    "Data do protocolo",
    "Resultado",
    "Responsável",
    "Urgência",
    "Etiquetas",
];

#[derive(Clone)]
pub struct BackupService {
    cases: Arc<dyn CaseStore>,
    office: Arc<dyn OfficeStore>,
    config: Arc<WorkflowConfig>,
    office_name: Option<String>,
}

impl BackupService {
    pub fn new(
        cases: Arc<dyn CaseStore>,
        office: Arc<dyn OfficeStore>,
        config: Arc<WorkflowConfig>,
        office_name: Option<String>,
    ) -> Self {
        Self { cases, office, config, office_name }
    }

    pub async fn export(&self) -> Result<SystemBackup, AppError> {
        let backup = SystemBackup {
            version: BACKUP_VERSION.to_string(),
            timestamp: Utc::now(),
            office_data: OfficeData {
                name: self.office_name.clone(),
                settings: self.office.get_settings().await?,
            },
            data: BackupData {
                cases: self.cases.get_cases().await?,
                users: self.office.list_users().await?,
                templates: self.office.list_templates().await?,
            },
        };
        tracing::info!("Backup exportado com {} casos", backup.data.cases.len());
        Ok(backup)
    }

    /// Restaura por cima do que existe (mesmo id = substitui). Parâmetros
    /// fora da faixa e casos em posições que a configuração atual não conhece
    /// são rejeitados antes de qualquer escrita.
    pub async fn restore(&self, backup: SystemBackup) -> Result<RestoreSummary, AppError> {
        if backup.version.split('.').next() != BACKUP_VERSION.split('.').next() {
            return Err(AppError::field("version", "unsupported_version", "Versão de backup não suportada"));
        }
        backup.office_data.settings.validate()?;
        for case in &backup.data.cases {
            validate_position(&self.config, case.view, &case.column_id)?;
            if !case.deadline_is_consistent() {
                return Err(AppError::InvalidDeadlineWindow);
            }
        }

        let BackupData { cases, users, templates } = backup.data;
        self.cases.update_cases_bulk(&cases).await?;
        for user in &users {
            self.office.save_user(user).await?;
        }
        for template in &templates {
            self.office.save_template(template).await?;
        }
        self.office.save_settings(&backup.office_data.settings).await?;

        let summary = RestoreSummary { cases: cases.len(), users: users.len(), templates: templates.len() };
        tracing::warn!(
            "Backup de {} restaurado: {} casos, {} usuários, {} modelos",
            backup.timestamp,
            summary.cases,
            summary.users,
            summary.templates
        );
        Ok(summary)
    }

    pub async fn export_csv(&self) -> Result<String, AppError> {
        let cases = self.cases.get_cases().await?;
        Ok(cases_to_csv(&self.config, &cases))
    }
}

/// Separador `;` e BOM UTF-8, como o Excel em pt-BR espera.
pub fn cases_to_csv(config: &WorkflowConfig, cases: &[Case]) -> String {
    let mut out = String::from("\u{feff}");
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));

    for case in cases {
        let column = config
            .column(case.view, &case.column_id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| case.column_id.clone());
        let view = config
            .view(case.view)
            .map(|v| v.title.clone())
            .unwrap_or_else(|| case.view.as_str().to_string());
        let outcome = case.decision_outcome.map(|o| format!("{o:?}")).unwrap_or_default();

        push_row(
            &mut out,
            [
                case.id.to_string(),
                case.client_name.clone(),
                format_cpf(&case.cpf),
                view,
                column,
                case.benefit_type.clone().unwrap_or_default(),
                case.protocol_number.clone().unwrap_or_default(),
                case.protocol_date.map(format_br).unwrap_or_default(),
                outcome,
                case.responsible_name.clone().unwrap_or_default(),
                format!("{:?}", case.urgency),
                case.tags.join(", "),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    out.push_str(&row.join(";"));
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains(&[';', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{settings::SystemSettings, workflow::ViewType};
    use crate::services::workflow_config::default_config;

    fn service(store: Arc<MemoryStore>) -> BackupService {
        BackupService::new(store.clone(), store, Arc::new(default_config()), Some("Escritório Teste".into()))
    }

    fn sample_case(id: i64) -> Case {
        let mut case = Case::new(id, "Maria; \"Mary\"", "52998224725", ViewType::Admin, "adm_protocolado", Utc::now());
        case.protocol_number = Some("555".into());
        case
    }

    #[tokio::test]
    async fn test_backup_restores_into_empty_store() {
        let source = Arc::new(MemoryStore::new());
        source.save_case(&sample_case(12)).await.unwrap();
        source
            .save_settings(&SystemSettings { pp_alert_days: 20, ..Default::default() })
            .await
            .unwrap();
        let backup = service(source).export().await.unwrap();

        // O JSON precisa manter o formato de topo
        let json = serde_json::to_value(&backup).unwrap();
        assert_eq!(json["version"], "1.0");
        assert!(json["officeData"]["settings"]["pp_alert_days"].is_number());
        assert!(json["data"]["cases"].is_array());

        let target = Arc::new(MemoryStore::new());
        let parsed: SystemBackup = serde_json::from_value(json).unwrap();
        let summary = service(target.clone()).restore(parsed).await.unwrap();
        assert_eq!(summary.cases, 1);
        assert_eq!(target.get_case(12).await.unwrap().unwrap().protocol_number.as_deref(), Some("555"));
        assert_eq!(target.get_settings().await.unwrap().pp_alert_days, 20);
        assert_eq!(target.next_case_id().await.unwrap(), 13);
    }

    #[tokio::test]
    async fn test_restore_rejects_unknown_position() {
        let store = Arc::new(MemoryStore::new());
        let mut backup = service(store.clone()).export().await.unwrap();
        let mut bad = sample_case(1);
        bad.column_id = "coluna_removida".into();
        backup.data.cases.push(bad);

        assert!(matches!(service(store.clone()).restore(backup).await, Err(AppError::InvalidPosition { .. })));
        assert!(store.get_cases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_rejects_out_of_range_settings() {
        let store = Arc::new(MemoryStore::new());
        let mut backup = service(store.clone()).export().await.unwrap();
        backup.data.cases.push(sample_case(1));
        backup.office_data.settings.sla_mandado_seguranca = 0;
        backup.office_data.settings.pp_alert_days = -5;

        assert!(matches!(service(store.clone()).restore(backup).await, Err(AppError::ValidationError(_))));
        assert!(store.get_cases().await.unwrap().is_empty());
        assert_eq!(store.get_settings().await.unwrap(), SystemSettings::default());
    }

    #[test]
    fn test_csv_escapes_separator_and_quotes() {
        let csv = cases_to_csv(&default_config(), &[sample_case(3)]);
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert!(lines[0].starts_with("ID;Cliente;CPF"));
        assert!(lines[1].starts_with("3;\"Maria; \"\"Mary\"\"\";529.982.247-25;"));
        assert!(lines[1].contains(";555;"));
    }
}
