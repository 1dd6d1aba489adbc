//! Diagnostics for config, env file and keyring readiness.

use crate::cli::CliContext;
use crate::constants;
use crate::core::secret_store::{KeyringStore, SecretStore};
use crate::core::{backup, env_file};
use crate::util::fs as sync_fs;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Tighten env file and backup permissions to 0600
    #[arg(long)]
    pub fix: bool,
}

pub fn run(ctx: &CliContext, args: DoctorArgs) -> Result<()> {
    let paths = &ctx.paths;
    let mut ok = 0u32;
    let mut warn = 0u32;
    let mut fail = 0u32;

    println!("Doctor: {}", paths);

    // Config
    if let Some(w) = &ctx.config_load_warning {
        println!("  [FAIL] {}", w);
        fail += 1;
    } else if ctx.config_exists {
        println!("  [PASS] config loaded: {}", paths.config.display());
        ok += 1;
    } else {
        println!("  [INFO] no {} found; using built-in keys", constants::CONFIG_FILE_NAME);
    }

    // Env file
    let content = if paths.env_file.is_file() {
        println!("  [PASS] env file exists: {}", paths.env_file.display());
        ok += 1;
        match env_file::read(&paths.env_file) {
            Ok(c) => Some(c),
            Err(e) => {
                println!("  [FAIL] cannot read env file: {}", e);
                fail += 1;
                None
            }
        }
    } else {
        println!("  [FAIL] env file missing: {}", paths.env_file.display());
        fail += 1;
        None
    };

    // Permissions: the env file holds plaintext secrets
    for path in [&paths.env_file, &paths.backup] {
        if !path.is_file() {
            continue;
        }
        if let Some(mode) = sync_fs::mode(path)? {
            if !sync_fs::is_shared_readable(mode) {
                println!("  [PASS] mode ok: {} ({:04o})", path.display(), mode);
                ok += 1;
            } else if args.fix {
                sync_fs::set_permissions(path, constants::ENV_FILE_MODE)?;
                println!(
                    "  [PASS] mode fixed: {} ({:04o} -> {:04o})",
                    path.display(),
                    mode,
                    constants::ENV_FILE_MODE
                );
                ok += 1;
            } else {
                println!(
                    "  [WARN] {} is readable by group/others ({:04o}, expected {:04o}; run: envsync doctor --fix)",
                    path.display(),
                    mode,
                    constants::ENV_FILE_MODE
                );
                warn += 1;
            }
        }
    }

    // Recognized key lines
    let keys = ctx.config.recognized_keys();
    if let Some(content) = &content {
        for key in &keys {
            if env_file::has_key(content, &key.env) {
                println!("  [PASS] line present: {}", key.env);
                ok += 1;
            } else {
                println!("  [WARN] no '{}=' line in env file; sync will skip it", key.env);
                warn += 1;
            }
        }
    }

    // Keyring
    let store = KeyringStore::new();
    let mut resolved = 0u32;
    let mut keyring_error = false;
    for key in &keys {
        match store.get(&ctx.service, key.store_key()) {
            Ok(Some(v)) if !v.is_empty() => {
                resolved += 1;
                if !key.looks_valid(&v) {
                    println!(
                        "  [WARN] {}/{} does not start with '{}'",
                        ctx.service,
                        key.store_key(),
                        key.expect_prefix.as_deref().unwrap_or_default()
                    );
                    warn += 1;
                }
            }
            Ok(_) => {
                println!("  [INFO] {}/{} not in keyring", ctx.service, key.store_key());
            }
            Err(e) => {
                println!("  [FAIL] keyring lookup {}/{}: {}", ctx.service, key.store_key(), e);
                fail += 1;
                keyring_error = true;
                break;
            }
        }
    }
    if !keyring_error {
        if resolved > 0 {
            println!("  [PASS] keyring: {}/{} keys resolved", resolved, keys.len());
            ok += 1;
        } else {
            println!(
                "  [FAIL] keyring: no keys found under service '{}' (run: envsync store <KEY>)",
                ctx.service
            );
            fail += 1;
        }
    }

    // Backup
    if paths.backup.is_file() {
        let note = match backup::same_content(&paths.backup, &paths.env_file) {
            Ok(true) => "matches env file",
            Ok(false) => "differs from env file",
            Err(_) => "cannot compare",
        };
        println!("  [INFO] backup present: {} ({})", paths.backup.display(), note);
    } else {
        println!("  [INFO] no backup at {}", paths.backup.display());
    }

    // Summary
    println!();
    println!("Doctor summary: {} pass, {} warn, {} fail", ok, warn, fail);
    if fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}
