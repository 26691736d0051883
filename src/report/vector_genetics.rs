//! The vector genetics report, stratified by specific genome.
//!
//! The simulator writes one row per (time, node, genome) with the number of vectors carrying
//! that genome. Columns beyond the ones read here (vector state counts and so on) are ignored.

use crate::error::VgError;
use csv::ReaderBuilder;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenomeRecord {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "NodeID")]
    pub node_id: u32,
    #[serde(rename = "Genome")]
    pub genome: String,
    #[serde(rename = "VectorPopulation")]
    pub vector_population: f64,
}

pub fn parse_genome_report(bytes: &[u8]) -> Result<Vec<GenomeRecord>, VgError> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<GenomeRecord>, csv::Error>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let report = "\
Time,NodeID,Genome,VectorPopulation,STATE_INFECTIOUS
0,1, X-a0:X-a0 ,90,0
0,1,X-a0:X-a1,10,0
1,2,X-a1:X-a1,5.5,1
";
        let records = parse_genome_report(report.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].genome, "X-a0:X-a0");
        assert_eq!(records[2].node_id, 2);
        assert_eq!(records[2].vector_population, 5.5);
    }

    #[test]
    fn missing_column_is_an_error() {
        let report = "Time,NodeID,VectorPopulation\n0,1,90\n";
        assert!(matches!(
            parse_genome_report(report.as_bytes()),
            Err(VgError::CSVError(_))
        ));
    }
}
