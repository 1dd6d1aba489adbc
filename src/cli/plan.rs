//! Dry-run preview of a sync.

use crate::cli::CliContext;
use crate::core::secret_store::KeyringStore;
use crate::core::sync::PlanStatus;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Output format (text|json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

pub fn run(ctx: &CliContext, args: PlanArgs) -> Result<()> {
    if args.format != "text" && args.format != "json" {
        bail!("unknown format '{}', expected text or json", args.format);
    }

    let sync = ctx.credential_sync();
    let entries = sync.plan(&KeyringStore::new())?;

    if args.format == "json" {
        let out = serde_json::json!({
            "env_file": sync.env_file(),
            "service": sync.service(),
            "backup": sync.backup_path(),
            "keys": entries,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize plan")?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Store Key").add_attribute(Attribute::Bold),
        Cell::new("Action").add_attribute(Attribute::Bold),
        Cell::new("Value Preview").add_attribute(Attribute::Bold),
    ]);

    for entry in &entries {
        let color = match entry.status {
            PlanStatus::Update => Color::Yellow,
            PlanStatus::Unchanged => Color::Green,
            PlanStatus::NotInFile | PlanStatus::NotInStore => Color::DarkGrey,
            PlanStatus::Unsupported => Color::Red,
        };
        let mut preview = entry.preview.clone().unwrap_or_default();
        if entry.format_warning {
            preview.push_str(" (unexpected format)");
        }
        table.add_row(vec![
            Cell::new(&entry.key),
            Cell::new(&entry.store_key),
            Cell::new(entry.status.to_string()).fg(color),
            Cell::new(preview),
        ]);
    }

    println!("Plan: {} (service '{}')", sync.env_file().display(), sync.service());
    println!("{}", table);

    let updates = entries
        .iter()
        .filter(|e| e.status == PlanStatus::Update)
        .count();
    if entries.iter().any(|e| e.status == PlanStatus::Unsupported) {
        println!("\nA value contains a double quote or line break; sync would refuse to run.");
    } else if entries.iter().all(|e| e.status == PlanStatus::NotInStore) {
        println!("\nNo secrets found in keyring; sync would fail without changes.");
    } else if updates == 0 {
        println!("\nNothing to update.");
    } else {
        println!("\n{} key(s) would be updated. Run 'envsync sync' to apply.", updates);
    }
    Ok(())
}
