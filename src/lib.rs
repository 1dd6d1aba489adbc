//! Sync API credentials from the OS keyring into a plaintext `.env` file.
//!
//! Matching `KEY=` lines are rewritten with the stored values; every other
//! line is left as-is. The env file is backed up first and restored from the
//! backup if the rewrite fails.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Sync operation, env file handling, backups, secret stores
//! - `models` — Config data structures
//! - `util` — Permissions, logging, masking

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
