use crate::cli::CliContext;
use crate::core::config;
use crate::models::sync_config::SyncFile;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a starter envsync.toml with the built-in keys
    Init(ConfigInitArgs),
    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &CliContext, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Init(args) => run_init(ctx, args),
        ConfigCommand::Show => run_show(ctx),
    }
}

fn run_init(ctx: &CliContext, args: ConfigInitArgs) -> Result<()> {
    let path = &ctx.paths.config;
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config::save(path, &SyncFile::builtin())
        .with_context(|| format!("write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_show(ctx: &CliContext) -> Result<()> {
    let mut effective = ctx.config.clone();
    effective.sync.service = Some(ctx.service.clone());
    effective.sync.env_file = Some(ctx.paths.env_file.clone());
    effective.keys = ctx.config.recognized_keys();

    let source = if ctx.config_exists {
        ctx.paths.config.display().to_string()
    } else {
        "built-in defaults".to_string()
    };
    println!("# source: {}", source);
    print!(
        "{}",
        toml::to_string_pretty(&effective).context("serialize config")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_context;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        fs::write(&ctx.paths.config, "# hand written\n").unwrap();

        let err = run_init(&ctx, ConfigInitArgs { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(&ctx.paths.config).unwrap(),
            "# hand written\n"
        );
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        fs::write(&ctx.paths.config, "# hand written\n").unwrap();

        run_init(&ctx, ConfigInitArgs { force: true }).unwrap();
        let written = config::load(&ctx.paths.config).unwrap();
        assert_eq!(written.recognized_keys().len(), 2);
    }

    #[test]
    fn test_init_creates_missing_config() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        run_init(&ctx, ConfigInitArgs { force: false }).unwrap();
        assert!(ctx.paths.config.is_file());
    }
}
