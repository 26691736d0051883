//! Tools for planning, running and post-processing parameter sweeps of an external
//! vector-genetics malaria simulator.
//!
//! The simulator itself is not part of this crate. `vgsweep` covers everything around it:
//! * Building the simulator configuration from a set of defaults and a sequence of scenario
//!   update functions (see [`config`]).
//! * Enumerating sweeps of scenario parameters, where every sweep point is a list of update
//!   functions whose returned tags identify the point (see [`sweep`]).
//! * Handing each planned simulation to an external command (see [`engine`]).
//! * Reading the per-simulation output reports, reshaping them into tables tagged with the
//!   sweep variables and aggregating them across replicates (see [`report`] and [`analyze`]).
//! * Rendering the aggregated tables as figures (see [`plot`]).
//!
//! A typical pipeline runs `vgsweep plan`, then the simulator over every planned directory,
//! then `vgsweep analyze` and finally `vgsweep plot`.
pub mod analyze;
pub mod cli;
pub mod config;
pub mod demographics;
pub mod engine;
pub mod error;
pub mod log;
mod macros;
pub mod numeric;
pub mod plot;
pub mod progress;
pub mod report;
pub mod settings;
pub mod sweep;
pub mod table;

pub use crate::log::{debug, error, info, trace, warn};
pub use config::{ConfigBuilder, SimType};
pub use error::VgError;
pub use sweep::{ModFn, SweepBuilder, SweepPoint, TagValue, Tags};
pub use table::Frame;

// Deterministic ordering is part of the output contract, so the crate uses `IndexMap` for
// insertion-ordered maps.
pub use indexmap::IndexMap;
