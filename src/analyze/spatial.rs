use super::{aggregate, group_by_experiment, summary_key_columns, Analyzer};
use crate::engine::{Simulation, SimulationData};
use crate::error::VgError;
use crate::log::info;
use crate::report::{spatial_report_path, SpatialReport};
use crate::settings::AnalysisSettings;
use crate::table::Frame;
use std::path::PathBuf;

pub const DEFAULT_SPATIAL_CHANNELS: [&str; 3] = ["Prevalence", "Daily_EIR", "Adult_Vectors"];

/// Per-node time series from the filtered spatial reports, one report per channel, merged on
/// `time` and `node`. Writes the replicate summary to `<experiment>_spatial_data.csv`.
pub struct SpatialAnalyzer {
    expt_name: Option<String>,
    channels: Vec<String>,
    sweep_variables: Vec<String>,
    output_dir: PathBuf,
}

impl SpatialAnalyzer {
    #[must_use]
    pub fn new(expt_name: Option<String>, settings: &AnalysisSettings) -> Self {
        SpatialAnalyzer {
            expt_name,
            channels: settings.channels.clone().unwrap_or_else(|| {
                DEFAULT_SPATIAL_CHANNELS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
            sweep_variables: settings.sweep_variables.clone(),
            output_dir: settings.output_dir.clone(),
        }
    }
}

impl Analyzer for SpatialAnalyzer {
    fn name(&self) -> &str {
        "spatial"
    }

    fn filenames(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| spatial_report_path(channel))
            .collect()
    }

    fn select_simulation_data(
        &self,
        data: &SimulationData,
        simulation: &Simulation,
    ) -> Result<Frame, VgError> {
        let mut merged: Option<Frame> = None;
        for channel in &self.channels {
            let report = SpatialReport::parse(data.get(&spatial_report_path(channel))?)?;
            let frame = report.to_frame(channel)?;
            merged = Some(match merged {
                Some(left) => left.merge_on_keys(&frame)?,
                None => frame,
            });
        }
        let mut frame = merged.ok_or_else(|| {
            VgError::VgError("the spatial analyzer needs at least one channel".to_string())
        })?;
        frame.tag(&simulation.tags, &self.sweep_variables);
        Ok(frame)
    }

    fn finalize(&mut self, results: Vec<(Simulation, Frame)>) -> Result<Vec<PathBuf>, VgError> {
        let group_by = summary_key_columns(&self.sweep_variables, &["time", "node"]);
        let mut written = Vec::new();
        for (experiment, frames) in group_by_experiment(results, self.expt_name.as_deref()) {
            let summary = aggregate(frames, &group_by, &self.channels)?;
            let path = self.output_dir.join(format!("{experiment}_spatial_data.csv"));
            summary.write_csv(&path)?;
            info!(
                "wrote {} spatial rows for experiment {} to {}",
                summary.len(),
                experiment,
                path.display()
            );
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::tests::simulation;
    use crate::analyze::AnalyzeManager;
    use crate::report::spatial::tests::encode;
    use crate::sweep::{tags, TagValue};
    use crate::table::SummaryTable;
    use std::fs;
    use tempfile::tempdir;

    fn settings(output_dir: PathBuf) -> AnalysisSettings {
        AnalysisSettings {
            sweep_variables: vec!["Run_Number".to_string(), "Num_Nodes".to_string()],
            channels: Some(vec!["Prevalence".to_string(), "Daily_EIR".to_string()]),
            output_dir,
            ..AnalysisSettings::default()
        }
    }

    fn write_reports(sim: &Simulation, prevalence: f32) {
        fs::create_dir_all(sim.output_dir()).unwrap();
        fs::write(
            sim.output_dir().join("SpatialReportMalariaFiltered_Prevalence.bin"),
            encode(&[11, 12], &[vec![prevalence, 0.0], vec![prevalence, 0.5]]),
        )
        .unwrap();
        fs::write(
            sim.output_dir().join("SpatialReportMalariaFiltered_Daily_EIR.bin"),
            encode(&[11, 12], &[vec![1.0, 2.0], vec![3.0, 4.0]]),
        )
        .unwrap();
    }

    #[test]
    fn merges_channels_and_summarizes() {
        let temp_dir = tempdir().unwrap();
        let sims: Vec<Simulation> = [0.25f32, 0.75]
            .iter()
            .enumerate()
            .map(|(run, prevalence)| {
                let sim = simulation(
                    temp_dir.path(),
                    &format!("{run:04}"),
                    "spatial_sim",
                    tags([("Run_Number", TagValue::from(run)), ("Num_Nodes", TagValue::Int(6))]),
                );
                write_reports(&sim, *prevalence);
                sim
            })
            .collect();

        let out_dir = temp_dir.path().join("analysis");
        let written = AnalyzeManager::new(sims)
            .add_analyzer(Box::new(SpatialAnalyzer::new(None, &settings(out_dir.clone()))))
            .analyze()
            .unwrap();
        assert_eq!(written, [out_dir.join("spatial_sim_spatial_data.csv")]);

        let summary = SummaryTable::read_csv(&written[0]).unwrap();
        assert_eq!(
            summary.headers(),
            [
                "Num_Nodes",
                "time",
                "node",
                "Prevalence",
                "Daily_EIR",
                "Prevalence_std",
                "Daily_EIR_std"
            ]
        );
        assert_eq!(summary.len(), 4);
        assert_eq!(summary.numbers("Prevalence").unwrap(), vec![0.5, 0.0, 0.5, 0.5]);
        assert_eq!(
            summary.numbers("Prevalence_std").unwrap(),
            vec![0.25, 0.0, 0.25, 0.0]
        );
        assert_eq!(summary.numbers("Daily_EIR").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn malformed_report_fails() {
        let data = SimulationData::from_files(
            "0000",
            [
                (
                    "output/SpatialReportMalariaFiltered_Prevalence.bin".to_string(),
                    vec![1, 0, 0, 0],
                ),
                (
                    "output/SpatialReportMalariaFiltered_Daily_EIR.bin".to_string(),
                    encode(&[1], &[vec![1.0]]),
                ),
            ]
            .into_iter()
            .collect(),
        );
        let sim = simulation(std::path::Path::new("/nowhere"), "0000", "exp", tags([]));
        let analyzer = SpatialAnalyzer::new(None, &settings(PathBuf::from(".")));
        assert!(matches!(
            analyzer.select_simulation_data(&data, &sim),
            Err(VgError::MalformedReport(_))
        ));
    }
}
