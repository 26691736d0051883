use std::fmt::{self, Display};
use std::io;

/// Provides `VgError` and maps to other errors to
/// convert to a `VgError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum VgError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A file an analyzer asked for is absent from a simulation's directory.
    MissingFile {
        simulation: String,
        filename: String,
    },
    /// A named channel is absent from a report.
    MissingChannel(String),
    /// A column is absent from a table.
    MissingColumn(String),
    MalformedReport(String),
    InvalidSweep(String),
    PlotError(String),
    VgError(String),
}

impl From<io::Error> for VgError {
    fn from(error: io::Error) -> Self {
        VgError::IoError(error)
    }
}

impl From<serde_json::Error> for VgError {
    fn from(error: serde_json::Error) -> Self {
        VgError::JsonError(error)
    }
}

impl From<csv::Error> for VgError {
    fn from(error: csv::Error) -> Self {
        VgError::CSVError(error)
    }
}

impl From<String> for VgError {
    fn from(error: String) -> Self {
        VgError::VgError(error)
    }
}

impl From<&str> for VgError {
    fn from(error: &str) -> Self {
        VgError::VgError(error.to_string())
    }
}

impl std::error::Error for VgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VgError::IoError(e) => Some(e),
            VgError::JsonError(e) => Some(e),
            VgError::CSVError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for VgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VgError::IoError(e) => write!(f, "I/O error: {e}"),
            VgError::JsonError(e) => write!(f, "JSON error: {e}"),
            VgError::CSVError(e) => write!(f, "CSV error: {e}"),
            VgError::MissingFile {
                simulation,
                filename,
            } => write!(f, "simulation {simulation} has no output file {filename}"),
            VgError::MissingChannel(name) => write!(f, "report has no channel named {name:?}"),
            VgError::MissingColumn(name) => write!(f, "table has no column named {name:?}"),
            VgError::MalformedReport(msg) => write!(f, "malformed report: {msg}"),
            VgError::InvalidSweep(msg) => write!(f, "invalid sweep: {msg}"),
            VgError::PlotError(msg) => write!(f, "plotting failed: {msg}"),
            VgError::VgError(msg) => write!(f, "{msg}"),
        }
    }
}
