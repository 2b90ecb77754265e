// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{CaseStore, MemoryStore, OfficeStore, PgCaseRepository, PgOfficeRepository},
    models::workflow::WorkflowConfig,
    services::{
        workflow_config::{default_config, load_config},
        AppointmentService, BackupService, CaseService, OfficeService,
    },
};

/// Variáveis de ambiente (lidas também do `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sem DATABASE_URL os dados ficam apenas em memória.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub office_name: Option<String>,
    pub workflow_config_path: Option<PathBuf>,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse()?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            office_name: non_empty_var("OFFICE_NAME"),
            workflow_config_path: non_empty_var("WORKFLOW_CONFIG_PATH").map(PathBuf::from),
            max_connections,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct AppState {
    pub case_service: CaseService,
    pub appointment_service: AppointmentService,
    pub office_service: OfficeService,
    pub backup_service: BackupService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let workflow = Arc::new(load_config(config.workflow_config_path.as_deref())?);

        let state = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Self::with_stores(
                    Arc::new(PgCaseRepository::new(pool.clone())),
                    Arc::new(PgOfficeRepository::new(pool)),
                    workflow,
                    config.office_name.clone(),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando armazenamento em memória");
                let store = Arc::new(MemoryStore::new());
                Self::with_stores(store.clone(), store, workflow, config.office_name.clone())
            }
        };
        Ok(state)
    }

    /// Monta o gráfico de dependências sobre os armazenamentos dados.
    pub fn with_stores(
        cases: Arc<dyn CaseStore>,
        office: Arc<dyn OfficeStore>,
        workflow: Arc<WorkflowConfig>,
        office_name: Option<String>,
    ) -> Self {
        Self {
            case_service: CaseService::new(cases.clone(), office.clone(), workflow.clone()),
            appointment_service: AppointmentService::new(office.clone()),
            office_service: OfficeService::new(office.clone()),
            backup_service: BackupService::new(cases, office, workflow, office_name),
        }
    }

    /// Estado com tabelas padrão e armazenamento em memória.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store, Arc::new(default_config()), None)
    }
}
