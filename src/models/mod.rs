//! Data structures shared by the sync core and the CLI.

pub mod key_mapping;
pub mod sync_config;
