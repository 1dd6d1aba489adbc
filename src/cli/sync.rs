use crate::cli::CliContext;
use crate::core::secret_store::KeyringStore;
use crate::models::sync_config::BackupPolicy;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Delete the backup after a successful run (overrides the config)
    #[arg(long)]
    pub remove_backup: bool,
}

pub fn run(ctx: &CliContext, args: SyncArgs) -> Result<()> {
    let mut sync = ctx.credential_sync();
    if args.remove_backup {
        sync = sync.with_backup_policy(BackupPolicy::Remove);
    }

    println!(
        "Syncing {} from keyring service '{}'...",
        sync.env_file().display(),
        sync.service()
    );

    let report = match sync.run(&KeyringStore::new()) {
        Ok(report) => report,
        Err(e) => {
            if e.env_file_modified() {
                println!(
                    "Env file may be incomplete; run 'envsync restore' once the cause is fixed."
                );
            }
            return Err(e.into());
        }
    };

    if report.updated.is_empty() {
        println!("No lines updated.");
    } else {
        println!("Updated: {}", report.updated.join(", "));
    }
    if !report.not_in_file.is_empty() {
        println!(
            "Found in keyring but no line in env file: {}",
            report.not_in_file.join(", ")
        );
    }
    if !report.not_in_store.is_empty() {
        println!("Not in keyring (left unchanged): {}", report.not_in_store.join(", "));
    }
    for w in &report.warnings {
        println!(
            "Warning: {} does not start with '{}'; format may be invalid",
            w.key, w.expected_prefix
        );
    }
    if report.backup_retained {
        println!("Backup: {}", report.backup.display());
    }
    println!("Done. Restart the application to pick up the new keys.");
    Ok(())
}
