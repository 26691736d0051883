//! Simulation configuration: the parameter map, campaign and custom reports of one simulation,
//! plus the scenario functions the experiments are built from.

mod builder;
pub mod interventions;
pub mod sites;
pub mod species;

pub use builder::{write_json, CampaignEvent, ConfigBuilder, CustomReport, SimType};
