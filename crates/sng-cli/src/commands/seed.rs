//! Seed command

use std::path::PathBuf;

use clap::Args;
use sng_core::SeedScript;
use sng_storage::operations;

use crate::{AppContext, Cli};

#[derive(Args)]
pub struct SeedArgs {
    /// Seed file (defaults to the configured seed file)
    pub file: Option<PathBuf>,
    /// Load on top of the existing data instead of clearing first
    #[arg(long)]
    pub keep: bool,
}

pub async fn run(args: &SeedArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let path = args.file.clone().unwrap_or_else(|| ctx.config.seed_file());
    let script = SeedScript::load(&path)?;

    let conn = ctx.pool.acquire().await?;
    let applied = if args.keep {
        operations::populate(&conn, &script).await?
    } else {
        operations::reset(&conn, &script).await?
    };

    if !cli.quiet {
        println!("Seeded {} statements from {}", applied, path.display());
    }
    Ok(())
}
