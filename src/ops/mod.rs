pub mod agenda;
pub mod validate;
