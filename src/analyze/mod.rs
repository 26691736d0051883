//! Post-processing of finished experiments.
//!
//! An [`Analyzer`] says which report files it needs, turns the contents of those files for one
//! simulation into a [`Frame`] tagged with the simulation's sweep variables, and at the end
//! receives every simulation's frame to aggregate and write out. The [`AnalyzeManager`] drives a
//! set of analyzers over a set of simulations, reading each simulation's files once.
//!
//! ```ignore
//! let simulations = load_experiment(Path::new("spatial_sim"))?;
//! let written = AnalyzeManager::new(simulations)
//!     .add_analyzer(Box::new(SpatialAnalyzer::new(&settings)))
//!     .analyze()?;
//! ```

pub mod aggregate;
mod genetics;
mod inset;
mod spatial;

pub use aggregate::{aggregate, summary_key_columns, STD_SUFFIX};
pub use genetics::GenomeFrequencyAnalyzer;
pub use inset::{InsetAnalyzer, INSET_CHANNELS};
pub use spatial::{SpatialAnalyzer, DEFAULT_SPATIAL_CHANNELS};

use crate::engine::{Simulation, SimulationData};
use crate::error::VgError;
use crate::log::{debug, info};
use crate::progress::{finalize_custom_progress, increment_custom_progress, init_custom_progress_bar};
use crate::table::Frame;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub trait Analyzer {
    /// A short name for log messages.
    fn name(&self) -> &str;

    /// The files this analyzer reads, relative to the simulation directory.
    fn filenames(&self) -> Vec<String>;

    /// Builds the tagged table of one simulation.
    fn select_simulation_data(
        &self,
        data: &SimulationData,
        simulation: &Simulation,
    ) -> Result<Frame, VgError>;

    /// Aggregates and writes the tables of all simulations. Returns the paths written.
    fn finalize(&mut self, results: Vec<(Simulation, Frame)>) -> Result<Vec<PathBuf>, VgError>;
}

/// Runs analyzers over the simulations of one or more experiments.
pub struct AnalyzeManager {
    simulations: Vec<Simulation>,
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzeManager {
    #[must_use]
    pub fn new(simulations: Vec<Simulation>) -> Self {
        AnalyzeManager {
            simulations,
            analyzers: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_analyzer(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Reads every simulation, hands its data to each analyzer, then finalizes the analyzers in
    /// the order they were added. The first failure stops the analysis.
    pub fn analyze(mut self) -> Result<Vec<PathBuf>, VgError> {
        let mut filenames: Vec<String> = Vec::new();
        for analyzer in &self.analyzers {
            for filename in analyzer.filenames() {
                if !filenames.contains(&filename) {
                    filenames.push(filename);
                }
            }
        }
        info!(
            "analyzing {} simulations with {} analyzers",
            self.simulations.len(),
            self.analyzers.len()
        );

        let mut results: Vec<Vec<(Simulation, Frame)>> =
            self.analyzers.iter().map(|_| Vec::new()).collect();
        init_custom_progress_bar("Simulations", self.simulations.len());
        let outcome = self.select_all(&filenames, &mut results);
        finalize_custom_progress();
        outcome?;

        let mut written = Vec::new();
        for (analyzer, results) in self.analyzers.iter_mut().zip(results) {
            debug!("finalizing analyzer {}", analyzer.name());
            written.extend(analyzer.finalize(results)?);
        }
        Ok(written)
    }

    fn select_all(
        &self,
        filenames: &[String],
        results: &mut [Vec<(Simulation, Frame)>],
    ) -> Result<(), VgError> {
        for simulation in &self.simulations {
            let data = SimulationData::load(simulation, filenames)?;
            for (analyzer, results) in self.analyzers.iter().zip(results.iter_mut()) {
                let frame = analyzer.select_simulation_data(&data, simulation)?;
                results.push((simulation.clone(), frame));
            }
            increment_custom_progress();
        }
        Ok(())
    }
}

/// Groups per-simulation frames by the name their output files are written under: the
/// experiment name, or `name_override` for every simulation when one is given.
#[must_use]
pub fn group_by_experiment(
    results: Vec<(Simulation, Frame)>,
    name_override: Option<&str>,
) -> BTreeMap<String, Vec<Frame>> {
    let mut groups: BTreeMap<String, Vec<Frame>> = BTreeMap::new();
    for (simulation, frame) in results {
        let name = name_override.map_or(simulation.experiment, str::to_string);
        groups.entry(name).or_default().push(frame);
    }
    groups
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sweep::{tags, TagValue, Tags};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    pub(crate) fn simulation(dir: &Path, id: &str, experiment: &str, tags: Tags) -> Simulation {
        Simulation {
            id: id.to_string(),
            experiment: experiment.to_string(),
            dir: dir.join(id),
            tags,
        }
    }

    /// Records the frames it is given and writes nothing.
    struct CountingAnalyzer {
        finalized: std::rc::Rc<std::cell::RefCell<Vec<usize>>>,
    }

    impl Analyzer for CountingAnalyzer {
        fn name(&self) -> &str {
            "counting"
        }

        fn filenames(&self) -> Vec<String> {
            vec!["output/values.txt".to_string()]
        }

        fn select_simulation_data(
            &self,
            data: &SimulationData,
            simulation: &Simulation,
        ) -> Result<Frame, VgError> {
            let text = String::from_utf8_lossy(data.get("output/values.txt")?).into_owned();
            let mut frame = Frame::new(vec!["Time".to_string()], vec!["value".to_string()]);
            for (time, cell) in text.split_whitespace().enumerate() {
                let value = cell
                    .parse::<f64>()
                    .map_err(|_| VgError::MalformedReport(cell.to_string()))?;
                frame.push_row(vec![TagValue::from(time)], vec![value])?;
            }
            frame.tag(&simulation.tags, &["Run_Number".to_string()]);
            Ok(frame)
        }

        fn finalize(&mut self, results: Vec<(Simulation, Frame)>) -> Result<Vec<PathBuf>, VgError> {
            self.finalized
                .borrow_mut()
                .extend(results.iter().map(|(_, frame)| frame.len()));
            Ok(Vec::new())
        }
    }

    fn write_values(sim: &Simulation, text: &str) {
        fs::create_dir_all(sim.output_dir()).unwrap();
        fs::write(sim.output_dir().join("values.txt"), text).unwrap();
    }

    #[test]
    fn dispatches_every_simulation() {
        let temp_dir = tempdir().unwrap();
        let a = simulation(temp_dir.path(), "0000", "exp", tags([("Run_Number", TagValue::Int(0))]));
        let b = simulation(temp_dir.path(), "0001", "exp", tags([("Run_Number", TagValue::Int(1))]));
        write_values(&a, "1 2 3");
        write_values(&b, "4 5");

        let finalized = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        AnalyzeManager::new(vec![a, b])
            .add_analyzer(Box::new(CountingAnalyzer {
                finalized: finalized.clone(),
            }))
            .analyze()
            .unwrap();
        assert_eq!(*finalized.borrow(), [3, 2]);
    }

    #[test]
    fn missing_output_stops_analysis() {
        let temp_dir = tempdir().unwrap();
        let a = simulation(temp_dir.path(), "0000", "exp", Tags::new());
        write_values(&a, "1");
        let missing = simulation(temp_dir.path(), "0001", "exp", Tags::new());

        let finalized = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let result = AnalyzeManager::new(vec![a, missing])
            .add_analyzer(Box::new(CountingAnalyzer {
                finalized: finalized.clone(),
            }))
            .analyze();
        assert!(matches!(
            result,
            Err(VgError::MissingFile { simulation, .. }) if simulation == "0001"
        ));
        assert!(finalized.borrow().is_empty());
    }

    #[test]
    fn groups_by_experiment_name() {
        let dir = Path::new("/nowhere");
        let frame = Frame::new(vec![], vec![]);
        let results = vec![
            (simulation(dir, "a", "second", Tags::new()), frame.clone()),
            (simulation(dir, "b", "first", Tags::new()), frame.clone()),
            (simulation(dir, "c", "second", Tags::new()), frame.clone()),
        ];
        let groups = group_by_experiment(results.clone(), None);
        assert_eq!(groups.keys().collect::<Vec<_>>(), ["first", "second"]);
        assert_eq!(groups["second"].len(), 2);

        let merged = group_by_experiment(results, Some("combined"));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["combined"].len(), 3);
    }

    #[test]
    fn in_memory_data() {
        let data = SimulationData::from_files(
            "sim",
            HashMap::from([("output/values.txt".to_string(), b"7".to_vec())]),
        );
        let sim = simulation(Path::new("/nowhere"), "sim", "exp", Tags::new());
        let analyzer = CountingAnalyzer {
            finalized: std::rc::Rc::default(),
        };
        let frame = analyzer.select_simulation_data(&data, &sim).unwrap();
        assert_eq!(frame.channel("value").unwrap(), vec![7.0]);
        assert_eq!(*frame.key_column("Run_Number").unwrap()[0], TagValue::Int(0));
    }
}
