use clap::Args;
use std::path::PathBuf;

use crate::defaults;

/// Settings that override values of the run configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Number of sites to simulate
    #[arg(short = 'n', long)]
    pub sites: Option<usize>,

    /// Seed words, comma separated (e.g. "1,2,3"; at most 256)
    #[arg(short, long, value_delimiter = ',')]
    pub seed: Option<Vec<u32>>,

    /// Number of discrete gamma rate categories
    #[arg(long, requires = "gamma_shape")]
    pub gamma_categories: Option<usize>,

    /// Shape of the gamma rate distribution
    #[arg(long, requires = "gamma_categories")]
    pub gamma_shape: Option<f64>,

    /// Number of chunks the sites are split into
    ///
    /// Output is reproducible for a fixed seed and chunk count. Defaults to
    /// the number of worker threads.
    #[arg(long)]
    pub chunks: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Run configuration (JSON)
    pub config: PathBuf,

    /// Output FASTA file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the states of internal nodes
    #[arg(long)]
    pub ancestors: bool,

    /// FASTA line width (0 disables wrapping)
    #[arg(long, default_value_t = defaults::LINE_WIDTH)]
    pub line_width: usize,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Run configuration (JSON)
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}
