//! The filtered spatial report: one binary file per channel.
//!
//! Layout, all little-endian: `i32` node count, `i32` time step count, one `u32` node ID per node,
//! then `f32` values in time-major order (all nodes of step 0, then all nodes of step 1, ...).

use crate::error::VgError;
use crate::sweep::TagValue;
use crate::table::Frame;

const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReport {
    pub node_ids: Vec<u32>,
    /// `data[t][n]` is the value at time step `t` for `node_ids[n]`.
    pub data: Vec<Vec<f32>>,
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn word(chunk: &[u8]) -> [u8; 4] {
    [chunk[0], chunk[1], chunk[2], chunk[3]]
}

impl SpatialReport {
    pub fn parse(bytes: &[u8]) -> Result<Self, VgError> {
        if bytes.len() < HEADER_LEN {
            return Err(VgError::MalformedReport(format!(
                "spatial report is {} bytes, shorter than its header",
                bytes.len()
            )));
        }
        let n_nodes = read_i32(bytes, 0);
        let n_tstep = read_i32(bytes, 4);
        let (Ok(n_nodes), Ok(n_tstep)) = (usize::try_from(n_nodes), usize::try_from(n_tstep))
        else {
            return Err(VgError::MalformedReport(format!(
                "spatial report has negative dimensions {n_nodes} x {n_tstep}"
            )));
        };

        let expected = n_nodes
            .checked_mul(n_tstep)
            .and_then(|values| values.checked_add(n_nodes))
            .and_then(|words| words.checked_mul(4))
            .and_then(|body| body.checked_add(HEADER_LEN));
        if expected != Some(bytes.len()) {
            return Err(VgError::MalformedReport(format!(
                "spatial report with {n_nodes} nodes and {n_tstep} time steps should not be {} bytes",
                bytes.len()
            )));
        }

        let body = &bytes[HEADER_LEN..];
        let (ids, values) = body.split_at(n_nodes * 4);
        let node_ids = ids
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(word(chunk)))
            .collect();
        let data = if n_nodes == 0 {
            vec![Vec::new(); n_tstep]
        } else {
            values
                .chunks_exact(n_nodes * 4)
                .map(|step| {
                    step.chunks_exact(4)
                        .map(|chunk| f32::from_le_bytes(word(chunk)))
                        .collect()
                })
                .collect()
        };
        Ok(SpatialReport { node_ids, data })
    }

    #[must_use]
    pub fn num_timesteps(&self) -> usize {
        self.data.len()
    }

    /// One row per (time step, node), keyed by `time` and `node`, with `channel` as the only
    /// channel.
    pub fn to_frame(&self, channel: &str) -> Result<Frame, VgError> {
        let mut frame = Frame::new(
            vec!["time".to_string(), "node".to_string()],
            vec![channel.to_string()],
        );
        for (time, step) in self.data.iter().enumerate() {
            for (node, value) in self.node_ids.iter().zip(step) {
                frame.push_row(
                    vec![TagValue::from(time), TagValue::from(*node)],
                    vec![f64::from(*value)],
                )?;
            }
        }
        Ok(frame)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a spatial report the way the simulator writes it.
    pub(crate) fn encode(node_ids: &[u32], data: &[Vec<f32>]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&i32::try_from(node_ids.len()).unwrap().to_le_bytes());
        bytes.extend_from_slice(&i32::try_from(data.len()).unwrap().to_le_bytes());
        for id in node_ids {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        for value in data.iter().flatten() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn parses_time_major_values() {
        let bytes = encode(&[1001, 1002], &[vec![0.5, 0.25], vec![0.75, 1.0], vec![0.0, 0.0]]);
        let report = SpatialReport::parse(&bytes).unwrap();
        assert_eq!(report.node_ids, [1001, 1002]);
        assert_eq!(report.num_timesteps(), 3);
        assert_eq!(report.data[1], [0.75, 1.0]);
    }

    #[test]
    fn frame_has_one_row_per_time_and_node() {
        let bytes = encode(&[7, 9], &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let frame = SpatialReport::parse(&bytes)
            .unwrap()
            .to_frame("Prevalence")
            .unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.channel("Prevalence").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        let nodes: Vec<_> = frame.key_column("node").unwrap().into_iter().cloned().collect();
        assert_eq!(nodes, [TagValue::Int(7), TagValue::Int(9), TagValue::Int(7), TagValue::Int(9)]);
        assert_eq!(*frame.key_column("time").unwrap()[3], TagValue::Int(1));
    }

    #[test]
    fn truncated_report_is_malformed() {
        let mut bytes = encode(&[1, 2], &[vec![1.0, 2.0]]);
        bytes.pop();
        assert!(matches!(
            SpatialReport::parse(&bytes),
            Err(VgError::MalformedReport(_))
        ));
        assert!(matches!(
            SpatialReport::parse(&[0, 0]),
            Err(VgError::MalformedReport(_))
        ));
    }

    #[test]
    fn negative_dimensions_are_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        assert!(matches!(
            SpatialReport::parse(&bytes),
            Err(VgError::MalformedReport(_))
        ));
    }
}
