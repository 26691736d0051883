//! Replicate aggregation.
//!
//! Per-simulation frames are stacked, grouped by the requested key columns (usually every key
//! column except `Run_Number`), and reduced to the mean and population standard deviation of each
//! channel. A channel `X` becomes two output channels, `X` (the mean) and `X_std`, with all means
//! before all deviations.

use crate::error::VgError;
use crate::numeric::mean_and_std;
use crate::sweep::{TagValue, RUN_NUMBER};
use crate::table::Frame;
use std::collections::BTreeMap;

/// The suffix of the standard deviation column of a channel.
pub const STD_SUFFIX: &str = "_std";

/// The summary key columns: the sweep variables other than `Run_Number`, followed by the index
/// columns (time, and node for spatial tables).
#[must_use]
pub fn summary_key_columns<S: AsRef<str>>(
    sweep_variables: &[String],
    index_columns: &[S],
) -> Vec<String> {
    sweep_variables
        .iter()
        .filter(|variable| variable.as_str() != RUN_NUMBER)
        .cloned()
        .chain(index_columns.iter().map(|c| c.as_ref().to_string()))
        .collect()
}

/// Aggregates `frames` over replicates.
///
/// `group_by` names the key columns of the output, in order; each must be a key column of the
/// input frames. `channels` names the channels to reduce. Groups are emitted in ascending key
/// order, so the result does not depend on the order of the input frames or their rows. `NaN`
/// values are skipped. Without input frames the result has the output columns and no rows.
pub fn aggregate(
    frames: Vec<Frame>,
    group_by: &[String],
    channels: &[String],
) -> Result<Frame, VgError> {
    let mut output_channels = channels.to_vec();
    output_channels.extend(channels.iter().map(|c| format!("{c}{STD_SUFFIX}")));
    let mut summary = Frame::new(group_by.to_vec(), output_channels);

    let stacked = Frame::concat(frames)?;
    if stacked.is_empty() {
        return Ok(summary);
    }
    let stacked = stacked.select_channels(channels)?;
    let key_indices = group_by
        .iter()
        .map(|name| {
            stacked
                .key_columns()
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| VgError::MissingColumn(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // For each group, one vector of replicate values per channel.
    let mut groups: BTreeMap<Vec<TagValue>, Vec<Vec<f64>>> = BTreeMap::new();
    for (keys, values) in stacked.rows() {
        let key = key_indices.iter().map(|&i| keys[i].clone()).collect();
        let columns = groups
            .entry(key)
            .or_insert_with(|| vec![Vec::new(); channels.len()]);
        for (column, value) in columns.iter_mut().zip(values) {
            if !value.is_nan() {
                column.push(*value);
            }
        }
    }

    for (key, columns) in groups {
        let (means, stds): (Vec<f64>, Vec<f64>) =
            columns.iter().map(|column| mean_and_std(column)).unzip();
        let mut row = means;
        row.extend(stds);
        summary.push_row(key, row)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::sweep::tags;

    fn replicate(run: i64, coverage: f64, eir: &[f64]) -> Frame {
        let mut frame = Frame::new(vec!["Time".to_string()], vec!["Annual EIR".to_string()]);
        for (time, value) in eir.iter().enumerate() {
            frame
                .push_row(vec![TagValue::from(time)], vec![*value])
                .unwrap();
        }
        frame.tag(
            &tags([("Run_Number", run.into()), ("Coverage", coverage.into())]),
            &["Run_Number".to_string(), "Coverage".to_string()],
        );
        frame
    }

    fn group_by() -> Vec<String> {
        summary_key_columns(&["Run_Number".to_string(), "Coverage".to_string()], &["Time"])
    }

    #[test]
    fn key_columns_drop_run_number() {
        assert_eq!(group_by(), ["Coverage", "Time"]);
    }

    #[test]
    fn mean_and_population_std_over_replicates() {
        let frames = vec![
            replicate(0, 0.5, &[1.0]),
            replicate(1, 0.5, &[2.0]),
            replicate(2, 0.5, &[3.0]),
        ];
        let summary = aggregate(frames, &group_by(), &["Annual EIR".to_string()]).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.channels(), ["Annual EIR", "Annual EIR_std"]);
        assert_almost_eq!(summary.channel("Annual EIR").unwrap()[0], 2.0, 1e-12);
        assert_almost_eq!(
            summary.channel("Annual EIR_std").unwrap()[0],
            0.816_496_580_927_726,
            1e-12
        );
    }

    #[test]
    fn independent_of_replicate_order() {
        let frames = vec![
            replicate(0, 0.5, &[1.0, 4.0]),
            replicate(1, 0.7, &[2.0, 5.0]),
            replicate(2, 0.5, &[3.0, 6.0]),
        ];
        let mut reversed = frames.clone();
        reversed.reverse();
        let channels = ["Annual EIR".to_string()];
        let forward = aggregate(frames, &group_by(), &channels).unwrap();
        let backward = aggregate(reversed, &group_by(), &channels).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 4);
        let coverage: Vec<TagValue> = forward
            .key_column("Coverage")
            .unwrap()
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(
            coverage,
            [
                TagValue::from(0.5),
                TagValue::from(0.5),
                TagValue::from(0.7),
                TagValue::from(0.7)
            ]
        );
        assert_eq!(forward.channel("Annual EIR").unwrap(), vec![2.0, 5.0, 2.0, 5.0]);
    }

    #[test]
    fn nan_values_are_skipped() {
        let frames = vec![replicate(0, 0.5, &[f64::NAN]), replicate(1, 0.5, &[4.0])];
        let summary = aggregate(frames, &group_by(), &["Annual EIR".to_string()]).unwrap();
        assert_eq!(summary.channel("Annual EIR").unwrap(), vec![4.0]);
        assert_eq!(summary.channel("Annual EIR_std").unwrap(), vec![0.0]);
    }

    #[test]
    fn empty_input_has_header_only() {
        let summary = aggregate(Vec::new(), &group_by(), &["Annual EIR".to_string()]).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.key_columns(), ["Coverage", "Time"]);
        assert_eq!(summary.channels(), ["Annual EIR", "Annual EIR_std"]);
    }

    #[test]
    fn unknown_group_column() {
        let result = aggregate(
            vec![replicate(0, 0.5, &[1.0])],
            &["Label".to_string()],
            &["Annual EIR".to_string()],
        );
        assert!(matches!(result, Err(VgError::MissingColumn(name)) if name == "Label"));
    }
}
