pub mod atomic;
pub mod config_io;
pub mod database;
pub mod store;
