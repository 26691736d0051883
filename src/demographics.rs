//! Node locations and populations from a simulator demographics file.

use crate::error::VgError;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeAttributes {
    #[serde(rename = "InitialPopulation", default)]
    pub initial_population: f64,
    #[serde(rename = "Latitude", default)]
    pub latitude: f64,
    #[serde(rename = "Longitude", default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(rename = "NodeID")]
    pub node_id: u32,
    #[serde(rename = "NodeAttributes")]
    pub attributes: NodeAttributes,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Demographics {
    #[serde(rename = "Nodes")]
    pub nodes: Vec<Node>,
}

impl Demographics {
    pub fn load(path: &Path) -> Result<Self, VgError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, VgError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The IDs of the `n` most populous nodes, most populous first. Ties keep file order.
    #[must_use]
    pub fn find_n_largest(&self, n: usize) -> Vec<u32> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| {
            b.attributes
                .initial_population
                .total_cmp(&a.attributes.initial_population)
        });
        nodes.iter().take(n).map(|node| node.node_id).collect()
    }

    #[must_use]
    pub fn node(&self, node_id: u32) -> Option<&Node> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }
}
