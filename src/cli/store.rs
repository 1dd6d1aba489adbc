//! Write a secret into the keyring under a recognized key.

use crate::cli::CliContext;
use crate::constants;
use crate::core::env_file;
use crate::core::secret_store::KeyringStore;
use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::Password;
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Env file key (e.g. OPENAI_API_KEY); stored under its mapped store key
    pub key: String,

    /// Read the secret from stdin instead of prompting
    #[arg(long)]
    pub from_stdin: bool,

    /// Remove the keyring entry instead of writing one
    #[arg(long, conflicts_with = "from_stdin")]
    pub delete: bool,
}

pub fn run(ctx: &CliContext, args: StoreArgs) -> Result<()> {
    let keys = ctx.config.recognized_keys();
    let Some(mapping) = keys.iter().find(|k| k.env == args.key) else {
        let known: Vec<&str> = keys.iter().map(|k| k.env.as_str()).collect();
        bail!(
            "'{}' is not a recognized key (known: {})",
            args.key,
            known.join(", ")
        );
    };
    let store = KeyringStore::new();

    if args.delete {
        store
            .delete(&ctx.service, mapping.store_key())
            .with_context(|| format!("delete {} from keyring", mapping.store_key()))?;
        println!("Deleted {}/{}", ctx.service, mapping.store_key());
        return Ok(());
    }

    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for store");
    }

    let secret = read_secret(args.from_stdin, &mapping.env)?;
    if secret.is_empty() {
        bail!("secret is empty");
    }
    if !env_file::fits_quoted(&secret) {
        bail!("secret contains a double quote or line break; sync cannot write it");
    }
    if !mapping.looks_valid(&secret) {
        println!(
            "Warning: value does not start with '{}'; storing anyway",
            mapping.expect_prefix.as_deref().unwrap_or_default()
        );
    }

    store
        .set(&ctx.service, mapping.store_key(), &secret)
        .with_context(|| format!("write {} to keyring", mapping.store_key()))?;
    println!("Stored {}/{}", ctx.service, mapping.store_key());
    Ok(())
}

fn read_secret(from_stdin: bool, name: &str) -> Result<Zeroizing<String>> {
    let secret = if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read secret from stdin")?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        Zeroizing::new(
            Password::new()
                .with_prompt(format!("Secret for {}", name))
                .allow_empty_password(false)
                .interact()
                .context("read secret from prompt")?,
        )
    };
    if secret.len() > constants::MAX_SECRET_SIZE {
        bail!(
            "secret exceeds maximum size ({} bytes, max {} bytes)",
            secret.len(),
            constants::MAX_SECRET_SIZE
        );
    }
    Ok(secret)
}
