mod analyze_command;
mod main;
mod plan_command;
mod plot_command;
mod run_command;

// Commands here
mod commands {
    pub use super::analyze_command::analyze;
    pub use super::plan_command::plan;
    pub use super::plot_command::plot;
    pub use super::run_command::run;
}

pub use main::*;
