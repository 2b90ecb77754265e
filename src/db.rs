pub mod case_repo;
pub use case_repo::{CaseEvent, CaseStore, PgCaseRepository};
pub mod office_repo;
pub use office_repo::{OfficeStore, PgOfficeRepository};
pub mod memory_repo;
pub use memory_repo::MemoryStore;
