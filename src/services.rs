// Motor de fluxo (funções puras)
pub mod column_graph;
pub mod health_service;
pub mod smart_action_service;
pub mod transition_service;
pub mod workflow_config;

// Orquestração sobre o armazenamento
pub mod appointment_service;
pub use appointment_service::AppointmentService;
pub mod backup_service;
pub use backup_service::BackupService;
pub mod case_service;
pub use case_service::CaseService;
pub mod office_service;
pub use office_service::OfficeService;
