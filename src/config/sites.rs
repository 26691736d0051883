//! Base configurations shared by the experiments.

use crate::config::builder::{ConfigBuilder, SimType};
use crate::config::interventions::linear_spline_habitat;
use serde_json::json;
use std::path::Path;

fn input_path(inputs_dir: &Path, parts: &[&str]) -> String {
    let mut path = inputs_dir.to_path_buf();
    for part in parts {
        path.push(part);
    }
    path.to_string_lossy().into_owned()
}

/// Demographics, human and vector migration, and climate files for a spatial simulation of
/// `geography`. Input files are looked up under `inputs_dir` by `prefix`.
pub fn standard_spatial_updates(
    cb: &mut ConfigBuilder,
    inputs_dir: &Path,
    prefix: &str,
    geography: &str,
    migration_mul: f64,
) {
    let demographics = input_path(
        inputs_dir,
        &["Demographics", &format!("{prefix}_demographics.json")],
    );
    let migration = input_path(
        inputs_dir,
        &["Migration", &format!("{prefix}_local_migration.bin")],
    );
    let climate = |kind: &str| {
        input_path(
            inputs_dir,
            &["Climate", &format!("{geography}_30arcsec_{kind}_daily.bin")],
        )
    };

    cb.update_params(json!({
        "Demographics_Filenames": [demographics],
        "Geography": geography,
        "Age_Initialization_Distribution_Type": "DISTRIBUTION_COMPLEX",
        "Birth_Rate_Dependence": "FIXED_BIRTH_RATE",
        "Enable_Nondisease_Mortality": 1,
        "New_Diagnostic_Sensitivity": 0.025,
        "Disable_IP_Whitelist": 1,
        "Disable_NP_Whitelist": 1,
        "Enable_Demographics_Builtin": 0,
        "Valid_Intervention_States": [],
    }));

    cb.update_params(json!({
        "Vector_Migration_Filename_Local": migration,
        "Enable_Vector_Migration": 1,
        "Enable_Vector_Migration_Local": 1,
        "Vector_Sampling_Type": "TRACK_ALL_VECTORS",
        "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE",
        "Roundtrip_Waypoints": 5,
        "Local_Migration_Filename": migration,
        "Enable_Local_Migration": 1,
        "Migration_Model": "FIXED_RATE_MIGRATION",
        "Migration_Pattern": "SINGLE_ROUND_TRIPS",
        "Local_Migration_Roundtrip_Duration": 2,
        "Local_Migration_Roundtrip_Probability": 0.95,
        "x_Local_Migration": 10,
        "x_Vector_Migration_Local": migration_mul,
    }));

    cb.update_params(json!({
        "Air_Temperature_Filename": climate("air_temperature"),
        "Climate_Model": "CLIMATE_CONSTANT",
        "Climate_Update_Resolution": "CLIMATE_UPDATE_DAY",
        "Land_Temperature_Filename": climate("air_temperature"),
        "Rainfall_Filename": climate("rainfall"),
        "Relative_Humidity_Filename": climate("relative_humidity"),
    }));
}

/// A single gambiae population with a seasonal larval habitat.
pub fn update_vector_params(cb: &mut ConfigBuilder) {
    cb.set_species(&["gambiae"]);
    cb.set_species_param("gambiae", "Anthropophily", 0.65);
    cb.update_params(json!({
        "Default_Geography_Initial_Node_Population": 1000,
        "Default_Geography_Torus_Size": 10,
        "Enable_Vector_Migration_Human": 0,
        "Enable_Vector_Migration_Wind": 0,
        "Egg_Hatch_Density_Dependence": "NO_DENSITY_DEPENDENCE",
        "Temperature_Dependent_Feeding_Cycle": "NO_TEMPERATURE_DEPENDENCE",
        "Enable_Drought_Egg_Hatch_Delay": 0,
        "Enable_Egg_Mortality": 0,
        "Enable_Temperature_Dependent_Egg_Hatching": 0,
        "Vector_Migration_Modifier_Equation": "LINEAR",
    }));
    cb.set_species_param("gambiae", "Larval_Habitat_Types", linear_spline_habitat(1e9));
    cb.set_species_param("gambiae", "Adult_Life_Expectancy", 20);
    cb.set_species_param("gambiae", "Male_Life_Expectancy", 10);
    cb.set_species_param("gambiae", "Indoor_Feeding_Fraction", 0.9);
}

/// The malaria base configuration for spatial vector-control and gene-drive runs.
#[must_use]
pub fn configure_vc_gm_intervention_system(
    inputs_dir: &Path,
    prefix: &str,
    geography: &str,
    num_cores: u32,
    num_years: u32,
    migration_mul: f64,
) -> ConfigBuilder {
    let mut cb = ConfigBuilder::from_defaults_with(
        SimType::MalariaSim,
        [
            ("Num_Cores", json!(num_cores)),
            ("Simulation_Duration", json!(365 * num_years)),
        ],
    );
    standard_spatial_updates(&mut cb, inputs_dir, prefix, geography, migration_mul);
    update_vector_params(&mut cb);
    cb
}

/// Single-node malaria settings used by the insecticide resistance runs.
pub fn update_single_node_params(cb: &mut ConfigBuilder, dir: &Path, geography: &str) {
    let demographics = input_path(dir, &["input_files", "vector_genetics_single_demographics.json"]);
    cb.update_params(json!({
        "Demographics_Filenames": [demographics],
        "Geography": geography,
        "Age_Initialization_Distribution_Type": "DISTRIBUTION_COMPLEX",
        "Birth_Rate_Dependence": "FIXED_BIRTH_RATE",
        "Enable_Vital_Dynamics": 1,
        "Enable_Natural_Mortality": 1,
        "New_Diagnostic_Sensitivity": 0.025,
        "Disable_IP_Whitelist": 1,
        "Disable_NP_Whitelist": 1,
        "Custom_Individual_Events": [
            "Bednet_Discarded", "Bednet_Got_New_One", "Bednet_Using", "Received_Treatment"
        ],
        "Vector_Sampling_Type": "VECTOR_COMPARTMENTS_NUMBER",
        "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE",
        "Climate_Model": "CLIMATE_CONSTANT",
        "Climate_Update_Resolution": "CLIMATE_UPDATE_DAY",
        "Default_Geography_Initial_Node_Population": 1000,
        "Default_Geography_Torus_Size": 10,
        "Egg_Hatch_Density_Dependence": "NO_DENSITY_DEPENDENCE",
        "Temperature_Dependent_Feeding_Cycle": "NO_TEMPERATURE_DEPENDENCE",
        "Enable_Drought_Egg_Hatch_Delay": 0,
        "Enable_Egg_Mortality": 0,
        "Enable_Temperature_Dependent_Egg_Hatching": 0,
        "Parasite_Smear_Sensitivity": 0.01,
        "Insecticides": [],
        "Enable_Demographics_Builtin": 0,
    }));
}

pub fn set_climate_constant(cb: &mut ConfigBuilder) {
    cb.update_params(json!({
        "Climate_Model": "CLIMATE_CONSTANT",
        "Base_Air_Temperature": 22.0,
        "Base_Land_Temperature": 26.0,
        "Base_Rainfall": 10.0,
        "Base_Relative_Humidity": 0.75,
        "Enable_Climate_Stochasticity": 0,
    }));
}

/// The vector-only single-node base: constant climate, every species in `species` with a
/// constant larval habitat, run for `duration` days.
#[must_use]
pub fn configure_vector_sim_single_node<S: AsRef<str>>(
    species: &[S],
    duration: u32,
    demographics: &str,
) -> ConfigBuilder {
    let mut cb = ConfigBuilder::from_defaults(SimType::VectorSim);
    set_climate_constant(&mut cb);
    cb.set_species(species);
    for name in species {
        let name = name.as_ref();
        cb.set_species_param(
            name,
            "Larval_Habitat_Types",
            json!({ "CONSTANT": 11_250_000_000_i64 }),
        );
        cb.set_species_param(name, "Male_Life_Expectancy", 5);
        cb.set_species_param(name, "Adult_Life_Expectancy", 10);
        cb.set_species_param(name, "Transmission_Rate", 0.5);
        cb.set_species_param(name, "Indoor_Feeding_Fraction", 1.0);
    }
    cb.update_params(json!({
        "Demographics_Filenames": [demographics],
        "Enable_Natural_Mortality": 0,
        "Birth_Rate_Dependence": "DEMOGRAPHIC_DEP_RATE",
        "Base_Land_Temperature": 26.0,
        "Base_Rainfall": 100,
        "Base_Relative_Humidity": 0.5,
        "x_Temporary_Larval_Habitat": 0.1,
        "Simulation_Duration": duration + 1,
        "Run_Number": 0,
        "Base_Air_Temperature": 25.0,
        "Enable_Demographics_Birth": 0,
        "Enable_Climate_Stochasticity": 1,
        "Age_Dependent_Biting_Risk_Type": "OFF",
        "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE",
        "Vector_Sampling_Type": "VECTOR_COMPARTMENTS_NUMBER",
        "Enable_Vector_Aging": 1,
    }));
    cb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vc_gm_base_is_spatial_malaria() {
        let cb = configure_vc_gm_intervention_system(
            Path::new("inputs"),
            "vector_genetics",
            "Burkina Faso",
            5,
            6,
            100.0,
        );
        assert_eq!(cb.get_param("Simulation_Type"), Some(&json!("MALARIA_SIM")));
        assert_eq!(cb.get_param("Simulation_Duration"), Some(&json!(2190)));
        assert_eq!(cb.get_param("Num_Cores"), Some(&json!(5)));
        assert_eq!(cb.get_param("x_Vector_Migration_Local"), Some(&json!(100.0)));
        let demographics = cb.get_param("Demographics_Filenames").unwrap()[0]
            .as_str()
            .unwrap()
            .to_string();
        assert!(demographics.ends_with("vector_genetics_demographics.json"));
        assert!(cb
            .get_param("Rainfall_Filename")
            .and_then(|v| v.as_str())
            .unwrap()
            .contains("Burkina Faso_30arcsec_rainfall_daily.bin"));

        let habitat = cb.species_param("gambiae", "Larval_Habitat_Types").unwrap();
        let times = &habitat["LINEAR_SPLINE"]["Capacity_Distribution_Over_Time"]["Times"];
        assert_eq!(times.as_array().unwrap().len(), 12);
        assert_eq!(
            cb.species_param("gambiae", "Adult_Life_Expectancy"),
            Some(&json!(20))
        );
    }

    #[test]
    fn single_node_vector_sim() {
        let cb = configure_vector_sim_single_node(&["arabiensis", "funestus"], 3650, "demo.json");
        assert_eq!(cb.get_param("Simulation_Duration"), Some(&json!(3651)));
        assert_eq!(cb.species_names(), vec!["arabiensis", "funestus"]);
        assert_eq!(
            cb.species_param("funestus", "Transmission_Rate"),
            Some(&json!(0.5))
        );
    }
}
