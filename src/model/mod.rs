pub mod config;
pub mod entity;
pub mod project;
pub mod task;
pub mod user;

pub use config::*;
pub use entity::*;
pub use project::*;
pub use task::*;
pub use user::*;
