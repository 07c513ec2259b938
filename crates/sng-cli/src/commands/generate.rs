//! Random seed file generation

use std::path::PathBuf;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sng_core::SeedGenerator;

use crate::config::Config;

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of users
    #[arg(short, long, default_value = "300")]
    pub nodes: usize,
    /// Relationship rounds; each adds one relationship per user
    #[arg(short, long, default_value = "2")]
    pub rounds: usize,
    /// Random seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs, config: &Config) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = SeedGenerator::new(args.nodes, args.rounds).with_queries(config.queries());
    let script = generator.generate(&mut rng);

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &script)?;
            tracing::info!(
                "Generated {} users and {} relationships into {}",
                args.nodes,
                args.nodes * args.rounds,
                path.display()
            );
        }
        None => print!("{}", script),
    }
    Ok(())
}
