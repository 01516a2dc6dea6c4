mod args;
mod commands;
pub mod defaults;
mod printing;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use args::{ModelArgs, SimulateArgs};
use commands::{model, simulate};

/// Seqevo: simulate sequence alignments along phylogenetic trees
///
/// Sequences evolve under a continuous-time Markov substitution model
/// (optionally a mixture, optionally with discrete gamma rate heterogeneity)
/// from the root of a tree to its leaves.
#[derive(Parser, Debug)]
#[command(name = "seqevo")]
#[command(author, version, about = "Simulates sequence alignments along phylogenetic trees", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate an alignment from a run configuration and write it as FASTA.
    Simulate(SimulateArgs),

    /// Print the model of a run configuration, after gamma expansion.
    Model(ModelArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        defaults::QUIET_LOG_FILTER
    } else {
        defaults::LOG_FILTER
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Simulate(args) => {
            simulate::simulate(&args, cli.quiet)?;
        }
        Commands::Model(args) => {
            model::show_model(&args)?;
        }
    }

    Ok(())
}
