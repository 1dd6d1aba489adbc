//! CLI routing and command dispatch.

use crate::core::config;
use crate::core::paths::SyncPaths;
use crate::core::sync::CredentialSync;
use crate::models::sync_config::SyncFile;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod config_cmd;
pub mod doctor;
pub mod plan;
pub mod restore;
pub mod store;
pub mod sync;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: SyncPaths,
    pub config: SyncFile,
    pub config_exists: bool,
    pub config_load_warning: Option<String>,
    pub service: String,
    pub non_interactive: bool,
}

impl CliContext {
    /// Sync operation for the resolved env file, service and keys.
    pub fn credential_sync(&self) -> CredentialSync {
        CredentialSync::new(
            self.paths.env_file.clone(),
            self.service.clone(),
            self.config.recognized_keys(),
        )
        .with_backup_policy(self.config.sync.backup)
    }
}

#[derive(Parser, Debug)]
#[command(name = "envsync", version, about = "Sync API keys from the OS keyring into a .env file")]
pub struct Cli {
    /// Config file (default: nearest envsync.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Env file to update (overrides the config)
    #[arg(long, global = true, value_name = "PATH", env = "ENVSYNC_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Secret store service name (overrides the config)
    #[arg(long, global = true, env = "ENVSYNC_SERVICE")]
    pub service: Option<String>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "ENVSYNC_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config_path = SyncPaths::locate_config(self.config)?;
        let config_exists = config_path.is_file();

        // A broken config only blocks commands that act on it; `doctor` and
        // `config init --force` still need to run.
        let mut config_load_warning: Option<String> = None;
        let loaded = config::load(&config_path);
        let config = match loaded {
            Ok(file) => file,
            Err(e) if self.command.tolerates_bad_config() => {
                config_load_warning = Some(e.to_string());
                SyncFile::default()
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("load config {}", config_path.display())
                })
            }
        };

        let paths =
            SyncPaths::from_config(config_path, self.env_file, config.sync.env_file.as_deref())?;
        let service = self
            .service
            .unwrap_or_else(|| config.service().to_string());

        let ctx = CliContext {
            paths,
            config,
            config_exists,
            config_load_warning,
            service,
            non_interactive: self.non_interactive,
        };

        match self.command {
            Commands::Sync(args) => sync::run(&ctx, args),
            Commands::Plan(args) => plan::run(&ctx, args),
            Commands::Restore(args) => restore::run(&ctx, args),
            Commands::Store(args) => store::run(&ctx, args),
            Commands::Doctor(args) => doctor::run(&ctx, args),
            Commands::Config { command } => config_cmd::run(&ctx, command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy secrets from the keyring into the env file
    Sync(sync::SyncArgs),
    /// Dry-run preview of what sync would change
    Plan(plan::PlanArgs),
    /// Restore the env file from its backup
    Restore(restore::RestoreArgs),
    /// Store a secret in the keyring for a recognized key
    Store(store::StoreArgs),
    /// Diagnose configuration, env file and keyring (safe, read-only)
    Doctor(doctor::DoctorArgs),
    /// Create or inspect envsync.toml
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommand,
    },
}

impl Commands {
    /// Whether the command can run on defaults when the config is unreadable.
    pub fn tolerates_bad_config(&self) -> bool {
        matches!(
            self,
            Commands::Doctor(_)
                | Commands::Config {
                    command: config_cmd::ConfigCommand::Init(_)
                }
        )
    }
}

/// Context rooted at `dir` with built-in keys, as a command would see it with
/// no config file.
#[cfg(test)]
pub(crate) fn test_context(dir: &std::path::Path) -> CliContext {
    let config = dir.join(crate::constants::CONFIG_FILE_NAME);
    CliContext {
        config_exists: config.is_file(),
        paths: SyncPaths::from_config(config, None, None).unwrap(),
        config: SyncFile::default(),
        config_load_warning: None,
        service: crate::constants::DEFAULT_SERVICE.to_string(),
        non_interactive: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_tolerates_bad_config() {
        assert!(parse(&["envsync", "doctor"]).command.tolerates_bad_config());
        assert!(parse(&["envsync", "config", "init"]).command.tolerates_bad_config());
        assert!(!parse(&["envsync", "config", "show"]).command.tolerates_bad_config());
        assert!(!parse(&["envsync", "sync"]).command.tolerates_bad_config());
        assert!(!parse(&["envsync", "plan"]).command.tolerates_bad_config());
        assert!(!parse(&["envsync", "restore"]).command.tolerates_bad_config());
    }

    #[test]
    fn test_bad_config_blocks_sync() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("envsync.toml");
        std::fs::write(&config, "[sync\nservice = ").unwrap();
        std::fs::write(dir.path().join(".env"), "OPENAI_API_KEY=old\n").unwrap();

        let cli = parse(&["envsync", "--config", config.to_str().unwrap(), "sync"]);
        let err = cli.run().unwrap_err();
        assert!(format!("{err:#}").contains("load config"), "got {err:#}");
        assert!(!dir.path().join(".env.backup").exists());
    }

    #[test]
    fn test_bad_config_still_allows_forced_init() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("envsync.toml");
        std::fs::write(&config, "[sync\nservice = ").unwrap();

        let cli = parse(&[
            "envsync",
            "--config",
            config.to_str().unwrap(),
            "config",
            "init",
            "--force",
        ]);
        cli.run().unwrap();
        assert!(config::load(&config).is_ok());
    }
}
