//! Local records for QuestLog: users, projects and tasks kept as JSON
//! collection documents, one file per entity type.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;

pub use io::database::Database;
pub use io::store::{RecordStore, StoreError};
pub use model::{AppConfig, Entity, RecordId, UniqueKey, ValidationContext, ValidationErrors, Violation};
