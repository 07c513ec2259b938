//! Graph view commands

use clap::Args;
use sng_core::GraphViewProjector;
use sng_storage::operations;

use crate::output::format_output;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct GraphArgs {
    /// Label links with their relationship type
    #[arg(long)]
    pub edge_types: bool,
}

pub async fn run_graph(args: &GraphArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let projector = if args.edge_types {
        GraphViewProjector::new().with_edge_types()
    } else {
        GraphViewProjector::new()
    };

    let conn = ctx.pool.acquire().await?;
    let graph = operations::get_graph(&conn, &ctx.queries, &projector).await?;
    println!("{}", format_output(&graph, cli.output_format())?);
    Ok(())
}

pub async fn run_users(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let conn = ctx.pool.acquire().await?;
    let users = operations::get_users(&conn, &ctx.queries).await?;
    println!("{}", format_output(&users, cli.output_format())?);
    Ok(())
}

pub async fn run_relationships(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let conn = ctx.pool.acquire().await?;
    let pairs = operations::get_relationships(&conn, &ctx.queries).await?;
    println!("{}", format_output(&pairs, cli.output_format())?);
    Ok(())
}
