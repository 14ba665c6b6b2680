//! `veritas init` — Write a default verifier configuration.

use clap::Args;
use std::path::PathBuf;
use veritas_verifier::VerifierConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path of the configuration file to create.
    #[arg(short, long, default_value = "veritas-verifier.toml")]
    pub config: PathBuf,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.config.exists() {
        anyhow::bail!("configuration file already exists at {}", args.config.display());
    }

    VerifierConfig::default().save(&args.config)?;
    println!("Wrote verifier configuration to {}", args.config.display());
    println!("Add [[resolvers]] entries for the networks you verify against.");
    Ok(())
}
