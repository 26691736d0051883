use crate::error::VgError;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "Data")]
    data: Vec<f64>,
}

/// A channel report such as `InsetChart.json`: named daily time series.
#[derive(Debug, Deserialize)]
pub struct InsetChart {
    #[serde(rename = "Channels")]
    channels: BTreeMap<String, Channel>,
}

impl InsetChart {
    pub fn parse(bytes: &[u8]) -> Result<Self, VgError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The daily values of channel `name`.
    pub fn channel(&self, name: &str) -> Result<&[f64], VgError> {
        self.channels
            .get(name)
            .map(|channel| channel.data.as_slice())
            .ok_or_else(|| VgError::MissingChannel(name.to_string()))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
}
