pub mod cpf;
pub mod dates;
pub mod error;
