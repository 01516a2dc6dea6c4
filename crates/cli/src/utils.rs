use anyhow::{Context, Result};
use log::debug;
use seqevo_sim::simulation::{GammaSpec, RunConfig};
use std::path::Path;

use crate::args::OverrideArgs;

/// Load a run configuration and apply command-line overrides.
pub fn load_config(path: &Path, overrides: &OverrideArgs) -> Result<RunConfig> {
    let mut config = RunConfig::from_path(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    if let Some(sites) = overrides.sites {
        config.sites = sites;
    }
    if let Some(seed) = &overrides.seed {
        config.seed = Some(seed.clone());
    }
    if let (Some(categories), Some(shape)) = (overrides.gamma_categories, overrides.gamma_shape) {
        let tolerance = config
            .gamma
            .as_ref()
            .map_or(seqevo_sim::model::gamma::DEFAULT_TOLERANCE, |g| g.tolerance);
        config.gamma = Some(GammaSpec {
            categories,
            shape,
            tolerance,
        });
    }
    if let Some(chunks) = overrides.chunks {
        config.chunks = Some(chunks);
    }
    debug!("Loaded configuration from {}: {config:?}", path.display());
    Ok(config)
}

/// Format seed words the way `--seed` accepts them.
pub fn format_seed(words: &[u32]) -> String {
    words
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
