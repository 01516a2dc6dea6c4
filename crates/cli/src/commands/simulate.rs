use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};

use crate::args::SimulateArgs;
use crate::commands::export;
use crate::printing::{print_run_parameters, print_run_summary};
use crate::utils::load_config;

pub fn simulate(args: &SimulateArgs, quiet: bool) -> Result<()> {
    let config = load_config(&args.config, &args.overrides)?;
    let sim = config
        .clone()
        .into_builder()
        .context("Failed to build the model")?
        .build()
        .context("Invalid simulation settings")?;

    // With FASTA on stdout, the report goes to stderr.
    let mut report: Box<dyn Write> = match (&args.output, quiet) {
        (_, true) => Box::new(io::sink()),
        (Some(_), false) => Box::new(io::stdout()),
        (None, false) => Box::new(io::stderr()),
    };
    print_run_parameters(&mut report, &config, &sim)?;

    let output = sim.run().context("Simulation failed")?;

    let records = export::records(&output, sim.tree(), args.ancestors);
    let mut fasta = Vec::new();
    export::write_fasta(&mut fasta, output.alignment.alphabet(), &records, args.line_width)?;

    // The file is only created once the whole alignment exists.
    match &args.output {
        Some(path) => {
            fs::write(path, &fasta)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_run_summary(&mut report, &output)?;
            writeln!(report, "✓ Alignment written to: {}", path.display())?;
        }
        None => {
            io::stdout().write_all(&fasta)?;
            print_run_summary(&mut report, &output)?;
        }
    }

    Ok(())
}
