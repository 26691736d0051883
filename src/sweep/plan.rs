//! Writing an experiment's simulations to disk.

use crate::config::{write_json, ConfigBuilder};
use crate::engine::{Simulation, EXPERIMENT_FILE, TAGS_FILE};
use crate::error::VgError;
use crate::log::{debug, info};
use crate::sweep::SweepBuilder;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs::create_dir_all;
use std::path::Path;

/// A simulation that has been written to disk and is ready to run.
pub type PlannedSimulation = Simulation;

/// A named experiment: a base configuration and the sweep applied to it.
#[derive(Debug, Clone)]
pub struct ExperimentPlan {
    pub name: String,
    pub base: ConfigBuilder,
    pub builder: SweepBuilder,
}

impl ExperimentPlan {
    #[must_use]
    pub fn new(name: &str, base: ConfigBuilder, builder: SweepBuilder) -> Self {
        ExperimentPlan {
            name: name.to_string(),
            base,
            builder,
        }
    }
}

fn id_width(count: usize) -> usize {
    let digits = count.saturating_sub(1).to_string().len();
    digits.max(4)
}

/// Writes every simulation of `plan` under `<out_dir>/<plan.name>/`.
///
/// Each simulation gets a zero-padded sequential directory holding `config.json`,
/// `campaign.json`, `custom_reports.json` and `tags.json`. The experiment directory also gets an
/// `experiment.json` naming the experiment, its simulation count and its sweep variables.
pub fn write_plan(plan: &ExperimentPlan, out_dir: &Path) -> Result<Vec<PlannedSimulation>, VgError> {
    if plan.builder.is_empty() {
        return Err(VgError::InvalidSweep(format!(
            "experiment {} has no sweep points",
            plan.name
        )));
    }

    let experiment_dir = out_dir.join(&plan.name);
    create_dir_all(&experiment_dir)?;
    let width = id_width(plan.builder.len());

    let mut simulations = Vec::with_capacity(plan.builder.len());
    let mut sweep_variables = BTreeSet::new();
    for (index, point) in plan.builder.iter().enumerate() {
        let configured = point.apply(&plan.base)?;
        let id = format!("{index:0width$}");
        let dir = experiment_dir.join(&id);
        configured.config.write_to(&dir)?;
        write_json(&dir.join(TAGS_FILE), &serde_json::to_value(&configured.tags)?)?;
        debug!("wrote simulation {} with tags {:?}", id, configured.tags);

        sweep_variables.extend(configured.tags.keys().cloned());
        simulations.push(Simulation {
            id,
            experiment: plan.name.clone(),
            dir,
            tags: configured.tags,
        });
    }

    write_json(
        &experiment_dir.join(EXPERIMENT_FILE),
        &json!({
            "name": plan.name,
            "simulations": simulations.len(),
            "sweep_variables": sweep_variables,
        }),
    )?;
    info!(
        "planned {} simulations of {} in {}",
        simulations.len(),
        plan.name,
        experiment_dir.display()
    );
    Ok(simulations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimType;
    use crate::engine::load_experiment;
    use crate::sweep::{seeds, ModFn};
    use serde_json::Value;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn ids_are_zero_padded() {
        assert_eq!(id_width(1), 4);
        assert_eq!(id_width(10_000), 4);
        assert_eq!(id_width(10_001), 5);
    }

    #[test]
    fn writes_and_reloads_experiment() {
        let temp_dir = tempdir().unwrap();
        let points = seeds(3)
            .into_iter()
            .map(|seed| vec![seed, ModFn::set_param("Serialized_Population_Path", "")])
            .collect();
        let plan = ExperimentPlan::new(
            "demo",
            ConfigBuilder::from_defaults(SimType::VectorSim),
            SweepBuilder::from_list(points),
        );
        let planned = write_plan(&plan, temp_dir.path()).unwrap();
        assert_eq!(planned.len(), 3);
        assert_eq!(planned[2].id, "0002");

        let config: Value =
            serde_json::from_reader(File::open(planned[2].dir.join("config.json")).unwrap())
                .unwrap();
        assert_eq!(config["parameters"]["Run_Number"], json!(2));

        let experiment: Value = serde_json::from_reader(
            File::open(temp_dir.path().join("demo").join(EXPERIMENT_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(experiment["simulations"], json!(3));
        assert_eq!(
            experiment["sweep_variables"],
            json!(["Run_Number", "Serialized_Population_Path"])
        );

        let reloaded = load_experiment(&temp_dir.path().join("demo")).unwrap();
        assert_eq!(reloaded, planned);
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let plan = ExperimentPlan::new(
            "empty",
            ConfigBuilder::from_defaults(SimType::VectorSim),
            SweepBuilder::default(),
        );
        assert!(matches!(
            write_plan(&plan, temp_dir.path()),
            Err(VgError::InvalidSweep(_))
        ));
    }
}
