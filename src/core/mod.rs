//! Core logic: env file rewriting, backups, secret lookup and the sync itself.

pub mod backup;
pub mod config;
pub mod env_file;
pub mod error;
pub mod paths;
pub mod secret_store;
pub mod sync;
