use super::{aggregate, group_by_experiment, summary_key_columns, Analyzer};
use crate::engine::{Simulation, SimulationData};
use crate::error::VgError;
use crate::log::info;
use crate::report::{inset_report_path, InsetChart};
use crate::settings::AnalysisSettings;
use crate::sweep::TagValue;
use crate::table::Frame;
use std::path::PathBuf;

/// The report channels read by [`InsetAnalyzer`] and the names they are written under.
pub const INSET_CHANNELS: [(&str, &str); 4] = [
    ("Blood Smear Parasite Prevalence", "RDT Prevalence"),
    ("Daily EIR", "Annual EIR"),
    ("New Clinical Cases", "Clinical Cases"),
    ("True Prevalence", "True Prevalence"),
];

/// Daily prevalence, EIR and case time series from inset chart style reports.
///
/// Writes every simulation's rows to `<experiment>_inset_data_full.csv` and the replicate
/// summary of the selected channels to `<experiment>_inset_data.csv`.
pub struct InsetAnalyzer {
    expt_name: Option<String>,
    report_names: Vec<String>,
    channels: Vec<String>,
    sweep_variables: Vec<String>,
    output_dir: PathBuf,
}

impl InsetAnalyzer {
    #[must_use]
    pub fn new(expt_name: Option<String>, settings: &AnalysisSettings) -> Self {
        InsetAnalyzer {
            expt_name,
            report_names: settings.report_names.clone(),
            channels: settings.channels.clone().unwrap_or_else(|| {
                INSET_CHANNELS
                    .iter()
                    .map(|(_, name)| (*name).to_string())
                    .collect()
            }),
            sweep_variables: settings.sweep_variables.clone(),
            output_dir: settings.output_dir.clone(),
        }
    }

    fn report_frame(chart: &InsetChart) -> Result<Frame, VgError> {
        let series = INSET_CHANNELS
            .iter()
            .map(|(source, _)| chart.channel(source))
            .collect::<Result<Vec<_>, _>>()?;
        let num_steps = series.iter().map(|s| s.len()).min().unwrap_or(0);
        let mut frame = Frame::new(
            vec!["Time".to_string()],
            INSET_CHANNELS
                .iter()
                .map(|(_, name)| (*name).to_string())
                .collect(),
        );
        for time in 0..num_steps {
            frame.push_row(
                vec![TagValue::from(time)],
                series.iter().map(|s| s[time]).collect(),
            )?;
        }
        Ok(frame)
    }
}

impl Analyzer for InsetAnalyzer {
    fn name(&self) -> &str {
        "inset"
    }

    fn filenames(&self) -> Vec<String> {
        self.report_names
            .iter()
            .map(|name| inset_report_path(name))
            .collect()
    }

    fn select_simulation_data(
        &self,
        data: &SimulationData,
        simulation: &Simulation,
    ) -> Result<Frame, VgError> {
        let frames = self
            .filenames()
            .iter()
            .map(|filename| Self::report_frame(&InsetChart::parse(data.get(filename)?)?))
            .collect::<Result<Vec<_>, _>>()?;
        let mut frame = Frame::concat(frames)?;
        frame.tag(&simulation.tags, &self.sweep_variables);
        Ok(frame)
    }

    fn finalize(&mut self, results: Vec<(Simulation, Frame)>) -> Result<Vec<PathBuf>, VgError> {
        let group_by = summary_key_columns(&self.sweep_variables, &["Time"]);
        let mut written = Vec::new();
        for (experiment, frames) in group_by_experiment(results, self.expt_name.as_deref()) {
            let full = Frame::concat(frames)?;
            let full_path = self
                .output_dir
                .join(format!("{experiment}_inset_data_full.csv"));
            full.write_csv(&full_path)?;

            let summary = aggregate(vec![full], &group_by, &self.channels)?;
            let path = self.output_dir.join(format!("{experiment}_inset_data.csv"));
            summary.write_csv(&path)?;
            info!(
                "wrote {} summary rows for experiment {} to {}",
                summary.len(),
                experiment,
                path.display()
            );
            written.push(full_path);
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
    use crate::assert_almost_eq;
    use crate::sweep::tags;
    use crate::table::SummaryTable;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_chart(sim: &Simulation, eir: &[f64]) {
        let zeros = vec![0.0; eir.len()];
        let chart = json!({
            "Channels": {
                "Blood Smear Parasite Prevalence": {"Data": zeros},
                "Daily EIR": {"Data": eir},
                "New Clinical Cases": {"Data": zeros},
                "True Prevalence": {"Data": zeros},
                "Adult Vectors": {"Data": zeros}
            }
        });
        fs::create_dir_all(sim.output_dir()).unwrap();
        fs::write(
            sim.output_dir().join("InsetChart.json"),
            serde_json::to_vec(&chart).unwrap(),
        )
        .unwrap();
    }

    fn settings(output_dir: &Path) -> AnalysisSettings {
        AnalysisSettings {
            sweep_variables: vec!["Run_Number".to_string(), "Coverage".to_string()],
            output_dir: output_dir.to_path_buf(),
            ..AnalysisSettings::default()
        }
    }

    #[test]
    fn summarizes_replicates() {
        let temp_dir = tempdir().unwrap();
        let sims: Vec<Simulation> = [1.0, 2.0, 3.0]
            .iter()
            .enumerate()
            .map(|(run, eir)| {
                let sim = simulation(
                    temp_dir.path(),
                    &format!("{run:04}"),
                    "single_node",
                    tags([("Run_Number", TagValue::from(run)), ("Coverage", 0.6.into())]),
                );
                write_chart(&sim, &[*eir, 10.0]);
                sim
            })
            .collect();

        let out_dir = temp_dir.path().join("analysis");
        let written = AnalyzeManager::new(sims)
            .add_analyzer(Box::new(InsetAnalyzer::new(None, &settings(&out_dir))))
            .analyze()
            .unwrap();
        assert_eq!(
            written,
            [
                out_dir.join("single_node_inset_data_full.csv"),
                out_dir.join("single_node_inset_data.csv")
            ]
        );

        let full = SummaryTable::read_csv(&written[0]).unwrap();
        assert_eq!(full.len(), 6);
        assert!(full.has_column("Run_Number"));

        let summary = SummaryTable::read_csv(&written[1]).unwrap();
        assert_eq!(&summary.headers()[..3], ["Coverage", "Time", "RDT Prevalence"]);
        assert!(!summary.has_column("Run_Number"));
        let eir = summary.numbers("Annual EIR").unwrap();
        let eir_std = summary.numbers("Annual EIR_std").unwrap();
        assert_almost_eq!(eir[0], 2.0, 1e-12);
        assert_almost_eq!(eir_std[0], 0.8165, 1e-4);
        assert_almost_eq!(eir[1], 10.0, 1e-12);
        assert_almost_eq!(eir_std[1], 0.0, 1e-12);
    }

    #[test]
    fn untagged_sweep_variable_is_zero() {
        let data = SimulationData::from_files(
            "0000",
            [(
                "output/InsetChart.json".to_string(),
                serde_json::to_vec(&json!({"Channels": {
                    "Blood Smear Parasite Prevalence": {"Data": [0.1]},
                    "Daily EIR": {"Data": [0.2]},
                    "New Clinical Cases": {"Data": [0.3]},
                    "True Prevalence": {"Data": [0.4]}
                }}))
                .unwrap(),
            )]
            .into_iter()
            .collect(),
        );
        let sim = simulation(Path::new("/nowhere"), "0000", "exp", tags([]));
        let analyzer = InsetAnalyzer::new(None, &settings(Path::new(".")));
        let frame = analyzer.select_simulation_data(&data, &sim).unwrap();
        assert_eq!(frame.key_columns(), ["Time", "Run_Number", "Coverage"]);
        assert_eq!(*frame.key_column("Coverage").unwrap()[0], TagValue::Int(0));
        assert_eq!(frame.channel("Clinical Cases").unwrap(), vec![0.3]);
    }

    #[test]
    fn missing_channel_fails() {
        let data = SimulationData::from_files(
            "0000",
            [(
                "output/InsetChart.json".to_string(),
                br#"{"Channels": {"Daily EIR": {"Data": [0.2]}}}"#.to_vec(),
            )]
            .into_iter()
            .collect(),
        );
        let sim = simulation(Path::new("/nowhere"), "0000", "exp", tags([]));
        let analyzer = InsetAnalyzer::new(None, &settings(Path::new(".")));
        assert!(matches!(
            analyzer.select_simulation_data(&data, &sim),
            Err(VgError::MissingChannel(_))
        ));
    }
}
