use anyhow::{Context, Result};
use std::io;

use crate::args::ModelArgs;
use crate::printing::print_model_summary;
use crate::utils::load_config;

pub fn show_model(args: &ModelArgs) -> Result<()> {
    let config = load_config(&args.config, &args.overrides)?;
    let model = config.build_model().context("Failed to build the model")?;
    print_model_summary(&mut io::stdout(), &model.summarize())?;
    Ok(())
}
