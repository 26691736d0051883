//! Tables of simulation output.
//!
//! A [`Frame`] is what analyzers build from one simulation's reports: a set of key columns
//! (time, node and the sweep-variable tags) and a set of numeric channel columns, one row per
//! key. A [`SummaryTable`] is the untyped view of an aggregated CSV that the plotters read back.

use crate::error::VgError;
use crate::sweep::{TagValue, Tags};
use csv::{Reader, Writer};
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    key_columns: Vec<String>,
    channels: Vec<String>,
    keys: Vec<Vec<TagValue>>,
    values: Vec<Vec<f64>>,
}

impl Frame {
    #[must_use]
    pub fn new(key_columns: Vec<String>, channels: Vec<String>) -> Self {
        Frame {
            key_columns,
            channels,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push_row(&mut self, keys: Vec<TagValue>, values: Vec<f64>) -> Result<(), VgError> {
        if keys.len() != self.key_columns.len() || values.len() != self.channels.len() {
            return Err(VgError::VgError(format!(
                "row has {} keys and {} values, frame has {} key columns and {} channels",
                keys.len(),
                values.len(),
                self.key_columns.len(),
                self.channels.len()
            )));
        }
        self.keys.push(keys);
        self.values.push(values);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Iterates over `(keys, values)` row pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&[TagValue], &[f64])> {
        self.keys
            .iter()
            .map(Vec::as_slice)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    fn key_index(&self, name: &str) -> Result<usize, VgError> {
        self.key_columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| VgError::MissingColumn(name.to_string()))
    }

    fn channel_index(&self, name: &str) -> Result<usize, VgError> {
        self.channels
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| VgError::MissingColumn(name.to_string()))
    }

    /// The values of channel `name`, in row order.
    pub fn channel(&self, name: &str) -> Result<Vec<f64>, VgError> {
        let index = self.channel_index(name)?;
        Ok(self.values.iter().map(|row| row[index]).collect())
    }

    /// The values of key column `name`, in row order.
    pub fn key_column(&self, name: &str) -> Result<Vec<&TagValue>, VgError> {
        let index = self.key_index(name)?;
        Ok(self.keys.iter().map(|row| &row[index]).collect())
    }

    /// Appends a key column per sweep variable holding the simulation's tag value. Variables the
    /// simulation was not tagged with get the integer `0`.
    pub fn tag(&mut self, tags: &Tags, sweep_variables: &[String]) {
        for variable in sweep_variables {
            if self.key_columns.contains(variable) {
                continue;
            }
            let value = tags.get(variable).cloned().unwrap_or(TagValue::Int(0));
            self.key_columns.push(variable.clone());
            for row in &mut self.keys {
                row.push(value.clone());
            }
        }
    }

    /// Inner join on identical key columns. The result has this frame's rows, in order, that
    /// have a match in `other`, with `other`'s channels appended.
    pub fn merge_on_keys(&self, other: &Frame) -> Result<Frame, VgError> {
        if self.key_columns != other.key_columns {
            return Err(VgError::VgError(format!(
                "cannot merge frames keyed by {:?} and {:?}",
                self.key_columns, other.key_columns
            )));
        }
        let lookup: HashMap<&[TagValue], usize> = other
            .keys
            .iter()
            .enumerate()
            .map(|(i, keys)| (keys.as_slice(), i))
            .collect();

        let mut channels = self.channels.clone();
        channels.extend(other.channels.iter().cloned());
        let mut merged = Frame::new(self.key_columns.clone(), channels);
        for (keys, values) in self.rows() {
            if let Some(&j) = lookup.get(keys) {
                let mut row = values.to_vec();
                row.extend_from_slice(&other.values[j]);
                merged.keys.push(keys.to_vec());
                merged.values.push(row);
            }
        }
        Ok(merged)
    }

    /// Stacks frames with identical schemas. No frames gives an empty frame.
    pub fn concat(frames: Vec<Frame>) -> Result<Frame, VgError> {
        let mut frames = frames.into_iter();
        let Some(mut result) = frames.next() else {
            return Ok(Frame::default());
        };
        for frame in frames {
            if frame.key_columns != result.key_columns || frame.channels != result.channels {
                return Err(VgError::VgError(format!(
                    "cannot concatenate frames with columns {:?}/{:?} and {:?}/{:?}",
                    result.key_columns, result.channels, frame.key_columns, frame.channels
                )));
            }
            result.keys.extend(frame.keys);
            result.values.extend(frame.values);
        }
        Ok(result)
    }

    /// A frame with the same keys and only the named channels, in the given order.
    pub fn select_channels<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame, VgError> {
        let indices = names
            .iter()
            .map(|name| self.channel_index(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Frame {
            key_columns: self.key_columns.clone(),
            channels: names.iter().map(|n| n.as_ref().to_string()).collect(),
            keys: self.keys.clone(),
            values: self
                .values
                .iter()
                .map(|row| indices.iter().map(|&i| row[i]).collect())
                .collect(),
        })
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), VgError> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(self.key_columns.iter().chain(self.channels.iter()))?;
        for (keys, values) in self.rows() {
            let record = keys
                .iter()
                .map(ToString::to_string)
                .chain(values.iter().map(ToString::to_string));
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the frame as CSV, creating parent directories as needed.
    pub fn write_csv(&self, path: &Path) -> Result<(), VgError> {
        let file = create_csv_file(path)?;
        self.write_csv_to(file)
    }
}

/// Creates `path` and its parent directories. Only `.csv` paths are accepted.
pub fn create_csv_file(path: &Path) -> Result<File, VgError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(VgError::VgError(format!(
            "output tables must be CSV files, got {}",
            path.display()
        ))),
    }
}

/// An aggregated table read back from CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SummaryTable {
    pub fn read_csv(path: &Path) -> Result<Self, VgError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VgError> {
        let mut reader = Reader::from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(SummaryTable { headers, rows })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    fn index(&self, name: &str) -> Result<usize, VgError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| VgError::MissingColumn(name.to_string()))
    }

    /// The column parsed as tag values.
    pub fn tags(&self, name: &str) -> Result<Vec<TagValue>, VgError> {
        let index = self.index(name)?;
        Ok(self.rows.iter().map(|row| TagValue::parse(&row[index])).collect())
    }

    /// The column parsed as numbers. Empty cells read as NaN.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, VgError> {
        let index = self.index(name)?;
        self.rows
            .iter()
            .map(|row| {
                let cell = row[index].trim();
                if cell.is_empty() {
                    return Ok(f64::NAN);
                }
                cell.parse::<f64>().map_err(|_| {
                    VgError::VgError(format!("column {name:?} has non-numeric value {cell:?}"))
                })
            })
            .collect()
    }

    /// The distinct values of a column, sorted.
    pub fn distinct(&self, name: &str) -> Result<Vec<TagValue>, VgError> {
        let values: BTreeSet<TagValue> = self.tags(name)?.into_iter().collect();
        Ok(values.into_iter().collect())
    }

    /// The rows whose `name` column equals `value`.
    pub fn filter(&self, name: &str, value: &TagValue) -> Result<SummaryTable, VgError> {
        let index = self.index(name)?;
        Ok(SummaryTable {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| TagValue::parse(&row[index]) == *value)
                .cloned()
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::tags;
    use tempfile::tempdir;

    fn frame(channel: &str, rows: &[(i64, i64, f64)]) -> Frame {
        let mut frame = Frame::new(
            vec!["time".to_string(), "node".to_string()],
            vec![channel.to_string()],
        );
        for &(time, node, value) in rows {
            frame
                .push_row(vec![time.into(), node.into()], vec![value])
                .unwrap();
        }
        frame
    }

    #[test]
    fn push_row_checks_width() {
        let mut f = frame("Prevalence", &[]);
        assert!(f.push_row(vec![0.into()], vec![1.0]).is_err());
        assert!(f.push_row(vec![0.into(), 1.into()], vec![]).is_err());
        assert!(f.is_empty());
    }

    #[test]
    fn tag_fills_missing_with_zero() {
        let mut f = frame("Prevalence", &[(0, 1, 0.5), (1, 1, 0.6)]);
        let sim_tags = tags([("Run_Number", TagValue::Int(4)), ("Label", "GM".into())]);
        f.tag(
            &sim_tags,
            &["Run_Number".to_string(), "Coverage".to_string(), "Label".to_string()],
        );
        assert_eq!(f.key_columns(), ["time", "node", "Run_Number", "Coverage", "Label"]);
        let coverage = f.key_column("Coverage").unwrap();
        assert_eq!(*coverage[1], TagValue::Int(0));
        assert_eq!(*f.key_column("Label").unwrap()[0], TagValue::from("GM"));
    }

    #[test]
    fn merge_is_inner_join() {
        let left = frame("Prevalence", &[(0, 1, 0.1), (0, 2, 0.2), (1, 1, 0.3)]);
        let right = frame("Daily_EIR", &[(1, 1, 3.0), (0, 1, 1.0)]);
        let merged = left.merge_on_keys(&right).unwrap();
        assert_eq!(merged.channels(), ["Prevalence", "Daily_EIR"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.channel("Daily_EIR").unwrap(), vec![1.0, 3.0]);
        assert_eq!(merged.channel("Prevalence").unwrap(), vec![0.1, 0.3]);
    }

    #[test]
    fn concat_requires_same_schema() {
        let a = frame("Prevalence", &[(0, 1, 0.1)]);
        let b = frame("Prevalence", &[(1, 1, 0.2)]);
        let c = frame("Daily_EIR", &[(1, 1, 0.2)]);
        assert_eq!(Frame::concat(vec![a.clone(), b]).unwrap().len(), 2);
        assert!(Frame::concat(vec![a, c]).is_err());
        assert!(Frame::concat(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn select_channels_reorders() {
        let merged = frame("a", &[(0, 1, 1.0)])
            .merge_on_keys(&frame("b", &[(0, 1, 2.0)]))
            .unwrap();
        let selected = merged.select_channels(&["b", "a"]).unwrap();
        assert_eq!(selected.rows().next().unwrap().1, [2.0, 1.0]);
        assert!(merged.select_channels(&["c"]).is_err());
    }

    #[test]
    fn csv_round_trip_through_summary_table() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("out.csv");
        let mut f = frame("Prevalence", &[(0, 1, 0.25), (0, 2, 0.5)]);
        f.tag(&tags([("Label", "No_nets".into())]), &["Label".to_string()]);
        f.write_csv(&path).unwrap();

        let table = SummaryTable::read_csv(&path).unwrap();
        assert_eq!(table.headers(), ["time", "node", "Label", "Prevalence"]);
        assert_eq!(table.numbers("Prevalence").unwrap(), vec![0.25, 0.5]);
        assert_eq!(
            table.distinct("node").unwrap(),
            vec![TagValue::Int(1), TagValue::Int(2)]
        );
        let filtered = table.filter("node", &TagValue::from(2)).unwrap();
        assert_eq!(filtered.len(), 1);
        assert!(matches!(
            table.numbers("Label"),
            Err(VgError::VgError(_))
        ));
        assert!(matches!(table.tags("missing"), Err(VgError::MissingColumn(_))));
    }

    #[test]
    fn only_csv_outputs() {
        let temp_dir = tempdir().unwrap();
        assert!(create_csv_file(&temp_dir.path().join("out.json")).is_err());
    }
}
