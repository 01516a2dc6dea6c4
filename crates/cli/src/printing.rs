use seqevo_sim::simulation::{RunConfig, Simulation, SimulationOutput};
use std::io::{self, Write};

use crate::utils::format_seed;

pub fn print_run_parameters(out: &mut dyn Write, config: &RunConfig, sim: &Simulation) -> io::Result<()> {
    writeln!(out, "\n📋 Simulation Configuration")?;
    writeln!(out, "  • Sites: {} [-n, --sites]", sim.sites())?;
    writeln!(out, "  • Leaves: {}", sim.tree().n_leaves())?;
    writeln!(out, "  • Tree Length: {:.6}", sim.tree().total_length())?;
    writeln!(out, "  • Chunks: {} [--chunks]", sim.chunks())?;
    match &config.seed {
        Some(_) => writeln!(out, "  • Random Seed: {} [--seed]", format_seed(sim.seed().words()))?,
        None => writeln!(
            out,
            "  • Random Seed: {} (from entropy) [--seed]",
            format_seed(sim.seed().words())
        )?,
    }
    match &config.gamma {
        Some(g) => writeln!(
            out,
            "  • Gamma Rates: {} categories, shape {} [--gamma-categories, --gamma-shape]",
            g.categories, g.shape
        )?,
        None => writeln!(out, "  • Gamma Rates: Disabled")?,
    }

    writeln!(out, "\n🧬 Model")?;
    print_lines(out, &sim.model().summarize())
}

pub fn print_model_summary(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    writeln!(out, "🧬 Model Summary")?;
    writeln!(out, "============================================")?;
    print_lines(out, lines)
}

pub fn print_run_summary(out: &mut dyn Write, output: &SimulationOutput) -> io::Result<()> {
    writeln!(out, "\n✓ Simulation complete")?;
    writeln!(
        out,
        "  • Alignment: {} sequences × {} sites",
        output.alignment.n_sequences(),
        output.alignment.n_sites()
    )?;
    writeln!(out, "  • Replay with: --seed {}", format_seed(&output.seed_words))
}

fn print_lines(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
