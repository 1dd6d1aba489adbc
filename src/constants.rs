//! Centralized constants for defaults, file names, and permissions.

/// Config file looked up in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "envsync.toml";

/// Env file name used when neither the CLI nor the config names one.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Secret store service used when neither the CLI nor the config names one.
pub const DEFAULT_SERVICE: &str = "memex";

/// Suffix appended to the env file name to form the backup path.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Expected permission mode for env files holding plaintext secrets.
pub const ENV_FILE_MODE: u32 = 0o600;

/// Permission mode for a freshly written config file.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Maximum secret size in bytes (1 MiB).
pub const MAX_SECRET_SIZE: usize = 1_048_576;

/// Built-in recognized keys: (env key, store key, expected prefix).
pub const DEFAULT_KEYS: &[(&str, &str, &str)] = &[
    ("OPENAI_API_KEY", "OPENAI_API_KEY", "sk-"),
    ("ANTHROPIC_API_KEY", "CLAUDE_API_KEY", "sk-ant-"),
];
