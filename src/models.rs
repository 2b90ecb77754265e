pub mod appointment;
pub mod backup;
pub mod case;
pub mod office;
pub mod patch;
pub mod settings;
pub mod workflow;
