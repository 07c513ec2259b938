//! Serve command

use std::path::PathBuf;

use clap::Args;
use sng_core::GraphViewProjector;
use sng_web::AppState;

use crate::AppContext;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to the configured bind address)
    #[arg(long)]
    pub bind: Option<String>,
    /// Seed file loaded whenever the graph page resets the database
    #[arg(long)]
    pub seed_file: Option<PathBuf>,
    /// Label links with their relationship type
    #[arg(long)]
    pub edge_types: bool,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let bind = args.bind.clone().unwrap_or_else(|| ctx.config.bind.clone());
    let seed_file = args
        .seed_file
        .clone()
        .unwrap_or_else(|| ctx.config.seed_file());
    if !seed_file.exists() {
        tracing::warn!(
            "Seed file {} does not exist; the graph page will fail until it does",
            seed_file.display()
        );
    }

    let mut projector = GraphViewProjector::new();
    if args.edge_types {
        projector = projector.with_edge_types();
    }

    let state = AppState::new(ctx.pool.clone(), seed_file)
        .with_queries(ctx.queries.clone())
        .with_projector(projector);
    sng_web::run_server(state, &bind).await
}
