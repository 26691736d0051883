use super::{aggregate, group_by_experiment, summary_key_columns, Analyzer};
use crate::engine::{Simulation, SimulationData};
use crate::error::VgError;
use crate::log::{info, trace};
use crate::report::{genome_report_path, parse_genome_report, GenomeRecord};
use crate::settings::AnalysisSettings;
use crate::sweep::TagValue;
use crate::table::Frame;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Genome frequencies from the specific-genome vector genetics report.
///
/// Vector counts are pivoted into one column per genome for every (time, node) and divided by
/// that row's total, so each row holds the fraction of the node's population carrying each
/// genome. Repeated (time, node, genome) entries are averaged. Rows where no vectors are alive
/// have no defined fractions and hold `NaN`, which aggregation skips. Only the configured genomes
/// are kept, and a configured genome that never appears in the report is zero throughout.
///
/// With `by_node` the summary is per (time, node); otherwise node fractions are averaged
/// together with the replicates, per time.
pub struct GenomeFrequencyAnalyzer {
    expt_name: Option<String>,
    filename: String,
    genomes: Vec<String>,
    sweep_variables: Vec<String>,
    by_node: bool,
    output_dir: PathBuf,
}

const INDEX_COLUMNS: [&str; 2] = ["Time", "NodeID"];

#[allow(clippy::cast_possible_truncation)]
fn time_tag(time: f64) -> TagValue {
    if time.fract() == 0.0 && time.abs() < 1e15 {
        TagValue::Int(time as i64)
    } else {
        TagValue::Float(time)
    }
}

impl GenomeFrequencyAnalyzer {
    #[must_use]
    pub fn new(expt_name: Option<String>, settings: &AnalysisSettings) -> Self {
        GenomeFrequencyAnalyzer {
            expt_name,
            filename: genome_report_path(&settings.species, &settings.gender),
            genomes: settings.genomes.clone(),
            sweep_variables: settings.sweep_variables.clone(),
            by_node: settings.by_node,
            output_dir: settings.output_dir.clone(),
        }
    }

    fn summary_index_columns(&self) -> &[&str] {
        if self.by_node {
            &INDEX_COLUMNS
        } else {
            &INDEX_COLUMNS[..1]
        }
    }

    /// Pivots the report into per-node genome fractions.
    fn frequencies(&self, records: &[GenomeRecord]) -> Result<Frame, VgError> {
        // (sum, count) per genome, so repeated entries average.
        let mut counts: BTreeMap<Vec<TagValue>, BTreeMap<&str, (f64, u32)>> = BTreeMap::new();
        for record in records {
            let key = vec![time_tag(record.time), TagValue::from(record.node_id)];
            let entry = counts
                .entry(key)
                .or_default()
                .entry(record.genome.as_str())
                .or_insert((0.0, 0));
            entry.0 += record.vector_population;
            entry.1 += 1;
        }

        let columns = INDEX_COLUMNS.iter().map(ToString::to_string).collect();
        let mut frame = Frame::new(columns, self.genomes.clone());
        for (key, by_genome) in counts {
            let by_genome: BTreeMap<&str, f64> = by_genome
                .into_iter()
                .map(|(genome, (sum, n))| (genome, sum / f64::from(n)))
                .collect();
            let total: f64 = by_genome.values().sum();
            let row = self
                .genomes
                .iter()
                .map(|genome| {
                    if total > 0.0 {
                        by_genome.get(genome.as_str()).copied().unwrap_or(0.0) / total
                    } else {
                        f64::NAN
                    }
                })
                .collect();
            frame.push_row(key, row)?;
        }
        Ok(frame)
    }
}

impl Analyzer for GenomeFrequencyAnalyzer {
    fn name(&self) -> &str {
        "genome frequency"
    }

    fn filenames(&self) -> Vec<String> {
        vec![self.filename.clone()]
    }

    fn select_simulation_data(
        &self,
        data: &SimulationData,
        simulation: &Simulation,
    ) -> Result<Frame, VgError> {
        let records = parse_genome_report(data.get(&self.filename)?)?;
        trace!(
            "simulation {} has {} genome report rows",
            simulation.id,
            records.len()
        );
        let mut frame = self.frequencies(&records)?;
        frame.tag(&simulation.tags, &self.sweep_variables);
        Ok(frame)
    }

    fn finalize(&mut self, results: Vec<(Simulation, Frame)>) -> Result<Vec<PathBuf>, VgError> {
        let group_by = summary_key_columns(&self.sweep_variables, self.summary_index_columns());
        let mut written = Vec::new();
        for (experiment, frames) in group_by_experiment(results, self.expt_name.as_deref()) {
            let full = Frame::concat(frames)?;
            let full_path = self
                .output_dir
                .join(format!("{experiment}_establishment_rates_full.csv"));
            full.write_csv(&full_path)?;

            let summary = aggregate(vec![full], &group_by, &self.genomes)?;
            let path = self
                .output_dir
                .join(format!("{experiment}_establishment_rates.csv"));
            summary.write_csv(&path)?;
            info!(
                "wrote {} genome frequency rows for experiment {} to {}",
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
