//! Utility modules for filesystem permissions, logging and masking.

pub mod fs;
pub mod logging;
pub mod redact;
