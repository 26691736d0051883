//! Settings files for planning and analysis.
//!
//! Both settings types are read from JSON. Every field has a default, so a settings file only
//! needs the fields it changes, and the CLI can run with no settings file at all. CLI arguments
//! are applied on top of whatever the file provides.

use crate::error::VgError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Parameters shared by the experiment plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentSettings {
    /// Overrides the experiment's default name.
    pub name: Option<String>,
    /// Replicates per sweep point.
    pub num_seeds: u32,
    pub num_years: u32,
    /// Length of the serialization burn-in runs. Each burn-in plan has its own default.
    pub burn_in_years: Option<u32>,
    /// Multiplier on local vector migration rates.
    pub migration_mul: f64,
    pub num_cores: u32,
    pub geography: String,
    /// File name prefix of the demographics and migration inputs.
    pub prefix: String,
    /// Root of the simulator's input files (`Demographics/`, `Migration/`, `Climate/`).
    pub input_dir: PathBuf,
    /// Include the arms that are defined but left out of the default plans.
    pub all_arms: bool,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        ExperimentSettings {
            name: None,
            num_seeds: 50,
            num_years: 6,
            burn_in_years: None,
            migration_mul: 100.0,
            num_cores: 5,
            geography: "Burkina Faso".to_string(),
            prefix: "vector_genetics".to_string(),
            input_dir: PathBuf::from("."),
            all_arms: false,
        }
    }
}

/// Parameters of the analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSettings {
    /// Tag names to carry into the output tables. `Run_Number` is averaged over.
    pub sweep_variables: Vec<String>,
    /// Channels to read. Each analyzer has its own default list.
    pub channels: Option<Vec<String>>,
    /// Inset chart reports to read, without the `.json` extension.
    pub report_names: Vec<String>,
    pub species: String,
    /// Gender as it appears in the genetics report file name.
    pub gender: String,
    /// Genome columns kept after normalization.
    pub genomes: Vec<String>,
    /// Keep one summary row per node; otherwise node fractions are averaged per time.
    pub by_node: bool,
    pub output_dir: PathBuf,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            sweep_variables: vec!["Run_Number".to_string()],
            channels: None,
            report_names: vec!["InsetChart".to_string()],
            species: "gambiae".to_string(),
            gender: "Female".to_string(),
            genomes: vec![
                "X-a0:X-a0".to_string(),
                "X-a0:X-a1".to_string(),
                "X-a1:X-a1".to_string(),
            ],
            by_node: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Reads settings from `path`, or returns the defaults when there is no path.
pub fn load_settings<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, VgError> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_fields_take_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"num_seeds": 3, "geography": "Kenya"}}"#).unwrap();
        let settings: ExperimentSettings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.num_seeds, 3);
        assert_eq!(settings.geography, "Kenya");
        assert_eq!(settings.num_years, 6);
        assert_eq!(settings.prefix, "vector_genetics");
    }

    #[test]
    fn no_file_is_default() {
        let settings: AnalysisSettings = load_settings(None).unwrap();
        assert_eq!(settings, AnalysisSettings::default());
        assert_eq!(settings.genomes.len(), 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"num_seed": 3}}"#).unwrap();
        let result: Result<ExperimentSettings, _> = load_settings(Some(file.path()));
        assert!(matches!(result, Err(VgError::JsonError(_))));
    }
}
