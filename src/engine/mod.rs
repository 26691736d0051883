//! The boundary with the external simulator.
//!
//! A planned experiment is a directory holding one subdirectory per simulation, each with the
//! simulation's configuration files and its `tags.json`. The simulator writes its reports into
//! `<simulation dir>/output/`, where the analyzers read them back.

use crate::error::VgError;
use crate::log::{debug, info, warn};
use crate::progress::{finalize_custom_progress, increment_custom_progress, init_custom_progress_bar};
use crate::sweep::Tags;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

/// The name of the file holding a simulation's tags.
pub const TAGS_FILE: &str = "tags.json";
/// The name of the file describing an experiment.
pub const EXPERIMENT_FILE: &str = "experiment.json";
/// The directory the simulator writes its reports to, relative to the simulation directory.
pub const OUTPUT_DIR: &str = "output";

/// One simulation of an experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub id: String,
    pub experiment: String,
    pub dir: PathBuf,
    pub tags: Tags,
}

impl Simulation {
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.dir.join(OUTPUT_DIR)
    }
}

#[derive(Deserialize)]
struct ExperimentFile {
    name: String,
}

/// Lists the simulations of the experiment planned in `dir`, sorted by simulation ID.
///
/// The experiment name comes from `experiment.json` if present, otherwise from the directory
/// name. Subdirectories without a `tags.json` are skipped.
pub fn load_experiment(dir: &Path) -> Result<Vec<Simulation>, VgError> {
    let experiment = match File::open(dir.join(EXPERIMENT_FILE)) {
        Ok(file) => serde_json::from_reader::<_, ExperimentFile>(BufReader::new(file))?.name,
        Err(e) if e.kind() == io::ErrorKind::NotFound => dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        Err(e) => return Err(e.into()),
    };

    let mut simulations = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let tags_path = path.join(TAGS_FILE);
        if !path.is_dir() || !tags_path.is_file() {
            continue;
        }
        let tags: Tags = serde_json::from_reader(BufReader::new(File::open(&tags_path)?))?;
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        simulations.push(Simulation {
            id,
            experiment: experiment.clone(),
            dir: path,
            tags,
        });
    }
    simulations.sort_by(|a, b| a.id.cmp(&b.id));

    if simulations.is_empty() {
        warn!("experiment directory {} has no simulations", dir.display());
    } else {
        debug!(
            "found {} simulations of experiment {} in {}",
            simulations.len(),
            experiment,
            dir.display()
        );
    }
    Ok(simulations)
}

/// The contents of the files an analysis asked for, read from one simulation's directory.
#[derive(Debug, Default)]
pub struct SimulationData {
    simulation: String,
    files: HashMap<String, Vec<u8>>,
}

impl SimulationData {
    /// Reads each of `filenames` (relative to the simulation directory). A missing file is a
    /// [`VgError::MissingFile`].
    pub fn load<S: AsRef<str>>(sim: &Simulation, filenames: &[S]) -> Result<Self, VgError> {
        let mut files = HashMap::new();
        for filename in filenames {
            let filename = filename.as_ref();
            if files.contains_key(filename) {
                continue;
            }
            let bytes = fs::read(sim.dir.join(filename)).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => VgError::MissingFile {
                    simulation: sim.id.clone(),
                    filename: filename.to_string(),
                },
                _ => VgError::IoError(e),
            })?;
            files.insert(filename.to_string(), bytes);
        }
        Ok(SimulationData {
            simulation: sim.id.clone(),
            files,
        })
    }

    #[must_use]
    pub fn from_files(simulation: &str, files: HashMap<String, Vec<u8>>) -> Self {
        SimulationData {
            simulation: simulation.to_string(),
            files,
        }
    }

    pub fn get(&self, filename: &str) -> Result<&[u8], VgError> {
        self.files
            .get(filename)
            .map(Vec::as_slice)
            .ok_or_else(|| VgError::MissingFile {
                simulation: self.simulation.clone(),
                filename: filename.to_string(),
            })
    }
}

/// Runs one simulation and returns the directory holding its reports.
pub trait Simulator {
    fn simulate(&self, sim: &Simulation) -> Result<PathBuf, VgError>;
}

/// Runs an external program once per simulation, in the simulation's directory.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    #[must_use]
    pub fn new(program: &str, args: Vec<String>) -> Self {
        ExternalCommand {
            program: program.to_string(),
            args,
        }
    }
}

impl Simulator for ExternalCommand {
    fn simulate(&self, sim: &Simulation) -> Result<PathBuf, VgError> {
        debug!("running {} {:?} in {}", self.program, self.args, sim.dir.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&sim.dir)
            .output()?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[{}] {}", sim.id, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("[{}] {}", sim.id, line);
        }

        if !output.status.success() {
            return Err(VgError::VgError(format!(
                "simulation {} failed: {} exited with {}",
                sim.id, self.program, output.status
            )));
        }
        Ok(sim.output_dir())
    }
}

/// Runs every simulation in order. The first failure stops the run.
pub fn run_simulations(
    simulator: &dyn Simulator,
    simulations: &[Simulation],
) -> Result<Vec<PathBuf>, VgError> {
    init_custom_progress_bar("Simulating", simulations.len());
    let mut outputs = Vec::with_capacity(simulations.len());
    for sim in simulations {
        match simulator.simulate(sim) {
            Ok(dir) => outputs.push(dir),
            Err(e) => {
                finalize_custom_progress();
                return Err(e);
            }
        }
        increment_custom_progress();
    }
    finalize_custom_progress();
    info!("ran {} simulations", outputs.len());
    Ok(outputs)
}
