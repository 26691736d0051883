use anyhow::{bail, Result};

use super::main::RunArgs;
use crate::engine::{load_experiment, run_simulations, ExternalCommand};

pub fn run(args: &RunArgs) -> Result<()> {
    let simulations = load_experiment(&args.experiment_dir)?;
    if simulations.is_empty() {
        bail!(
            "no planned simulations in {}",
            args.experiment_dir.display()
        );
    }
    let simulator = ExternalCommand::new(&args.command, args.args.clone());
    let outputs = run_simulations(&simulator, &simulations)?;
    println!("ran {} simulations", outputs.len());
    Ok(())
}
