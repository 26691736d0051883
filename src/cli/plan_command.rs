use anyhow::Result;

use super::main::PlanArgs;
use crate::settings::{load_settings, ExperimentSettings};
use crate::sweep::experiments::build_plan;
use crate::sweep::plan::write_plan;

pub fn plan(args: &PlanArgs) -> Result<()> {
    let mut settings: ExperimentSettings = load_settings(args.settings.as_deref())?;
    if let Some(name) = &args.name {
        settings.name = Some(name.clone());
    }
    if let Some(num_seeds) = args.num_seeds {
        settings.num_seeds = num_seeds;
    }
    if let Some(num_years) = args.num_years {
        settings.num_years = num_years;
    }
    if let Some(input_dir) = &args.input_dir {
        settings.input_dir = input_dir.clone();
    }
    settings.all_arms |= args.all_arms;

    let plan = build_plan(args.experiment, &settings)?;
    let simulations = write_plan(&plan, &args.output_dir)?;
    println!(
        "{} ({} simulations)",
        args.output_dir.join(&plan.name).display(),
        simulations.len()
    );
    Ok(())
}
