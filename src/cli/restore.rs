use crate::cli::CliContext;
use crate::core::backup;
use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::Confirm;
use tracing::info;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,

    /// Delete the backup once restored
    #[arg(long)]
    pub remove_backup: bool,
}

pub fn run(ctx: &CliContext, args: RestoreArgs) -> Result<()> {
    let env_file = &ctx.paths.env_file;
    let backup_path = &ctx.paths.backup;

    if !backup_path.is_file() {
        bail!("no backup found at {}; cannot restore", backup_path.display());
    }

    if env_file.is_file() && backup::same_content(backup_path, env_file)? {
        println!("{} already matches its backup; nothing to restore.", env_file.display());
        return Ok(());
    }

    if !args.yes {
        if ctx.non_interactive {
            bail!("--non-interactive requires --yes for restore");
        }
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Overwrite {} with {}?",
                env_file.display(),
                backup_path.display()
            ))
            .default(false)
            .interact()
            .context("read confirmation")?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    backup::restore(backup_path, env_file)
        .with_context(|| format!("restore {} from backup", env_file.display()))?;
    info!(env_file = %env_file.display(), "restored from backup");

    if args.remove_backup {
        backup::remove(backup_path)
            .with_context(|| format!("remove backup {}", backup_path.display()))?;
    }

    println!("Restored {} from {}", env_file.display(), backup_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_context;
    use std::fs;
    use tempfile::TempDir;

    fn args(yes: bool) -> RestoreArgs {
        RestoreArgs {
            yes,
            remove_backup: false,
        }
    }

    #[test]
    fn test_matching_backup_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_context(dir.path());
        ctx.non_interactive = true;
        fs::write(&ctx.paths.env_file, "OPENAI_API_KEY=old\n").unwrap();
        fs::write(&ctx.paths.backup, "OPENAI_API_KEY=old\n").unwrap();

        run(&ctx, args(false)).unwrap();
        assert_eq!(
            fs::read_to_string(&ctx.paths.env_file).unwrap(),
            "OPENAI_API_KEY=old\n"
        );
    }

    #[test]
    fn test_non_interactive_requires_yes() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_context(dir.path());
        ctx.non_interactive = true;
        fs::write(&ctx.paths.env_file, "OPENAI_API_KEY=\"sk-new\"\n").unwrap();
        fs::write(&ctx.paths.backup, "OPENAI_API_KEY=old\n").unwrap();

        let err = run(&ctx, args(false)).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(
            fs::read_to_string(&ctx.paths.env_file).unwrap(),
            "OPENAI_API_KEY=\"sk-new\"\n"
        );
    }

    #[test]
    fn test_yes_restores_and_removes_backup() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_context(dir.path());
        ctx.non_interactive = true;
        fs::write(&ctx.paths.env_file, "OPENAI_API_KEY=\"sk-new\"\n").unwrap();
        fs::write(&ctx.paths.backup, "OPENAI_API_KEY=old\n").unwrap();

        run(
            &ctx,
            RestoreArgs {
                yes: true,
                remove_backup: true,
            },
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(&ctx.paths.env_file).unwrap(),
            "OPENAI_API_KEY=old\n"
        );
        assert!(!ctx.paths.backup.exists());
    }

    #[test]
    fn test_missing_backup_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        fs::write(&ctx.paths.env_file, "OPENAI_API_KEY=old\n").unwrap();
        assert!(run(&ctx, args(true)).is_err());
    }
}
