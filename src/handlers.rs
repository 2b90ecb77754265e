pub mod appointments;
pub mod backup;
pub mod cases;
pub mod office;
pub mod workflow;
