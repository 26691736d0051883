//! Parsers for the simulator's output reports.
//!
//! Each parser takes the raw bytes of one report file, as handed out by
//! [`SimulationData`](crate::engine::SimulationData), and returns a typed view of it.

pub mod inset;
pub mod spatial;
pub mod vector_genetics;

pub use inset::InsetChart;
pub use spatial::SpatialReport;
pub use vector_genetics::{parse_genome_report, GenomeRecord};

/// The path of an inset chart style report, relative to the simulation directory.
#[must_use]
pub fn inset_report_path(report_name: &str) -> String {
    format!("output/{report_name}.json")
}

/// The path of the filtered spatial report for `channel`, relative to the simulation directory.
#[must_use]
pub fn spatial_report_path(channel: &str) -> String {
    format!("output/SpatialReportMalariaFiltered_{channel}.bin")
}

/// The path of the specific-genome vector genetics report, relative to the simulation
/// directory. `gender` is the name used in the file name (`Female`, `Male` or `Both`).
#[must_use]
pub fn genome_report_path(species: &str, gender: &str) -> String {
    format!("output/ReportVectorGenetics_{species}_{gender}_SPECIFIC_GENOME.csv")
}
