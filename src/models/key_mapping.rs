//! Recognized keys and their lookup identifiers in the secret store.

use serde::{Deserialize, Serialize};

/// A key the sync is allowed to overwrite in the env file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    /// Key name as it appears in the env file.
    pub env: String,

    /// Key name in the secret store (defaults to `env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Literal prefix a well-formed value is expected to start with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_prefix: Option<String>,
}

impl KeyMapping {
    pub fn new(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            secret: None,
            expect_prefix: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.expect_prefix = Some(prefix.into());
        self
    }

    /// Key name to query in the secret store.
    pub fn store_key(&self) -> &str {
        self.secret.as_deref().unwrap_or(&self.env)
    }

    /// Best-effort format check. Returns false only when a prefix is
    /// configured and the value does not start with it.
    pub fn looks_valid(&self, value: &str) -> bool {
        match &self.expect_prefix {
            Some(prefix) => value.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Whether `name` is usable as an env file key: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_key_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
