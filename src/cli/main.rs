use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use super::commands;
use crate::log::{set_log_level, LevelFilter, LogSpec};
use crate::sweep::experiments::ExperimentKind;

#[derive(Parser, Debug)]
#[command(name = "vgsweep")]
#[command(about = "Plan, run, analyze and plot sweeps of a vector-genetics malaria simulator")]
pub struct Cli {
    /// Log levels, e.g. `info` or `warn,vgsweep::analyze=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the simulation directories of an experiment
    Plan(PlanArgs),
    /// Run an external simulator in every simulation directory of an experiment
    Run(RunArgs),
    /// Aggregate the reports of finished experiments into CSV tables
    Analyze(AnalyzeArgs),
    /// Draw figures from aggregated CSV tables
    #[command(subcommand)]
    Plot(PlotCommand),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// The experiment to plan
    #[arg(value_enum)]
    pub experiment: ExperimentKind,

    /// Experiment settings file (JSON)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Directory the experiment directory is created in
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Overrides the experiment name
    #[arg(long)]
    pub name: Option<String>,

    /// Replicates per sweep point
    #[arg(long)]
    pub num_seeds: Option<u32>,

    /// Simulated years after the burn-in
    #[arg(long)]
    pub num_years: Option<u32>,

    /// Root of the simulator input files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Include arms left out of the default plans
    #[arg(long)]
    pub all_arms: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// A planned experiment directory
    pub experiment_dir: PathBuf,

    /// The program to run in each simulation directory
    #[arg(long)]
    pub command: String,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// Inset chart channels
    Inset,
    /// Genome frequencies from the vector genetics report
    Genetics,
    /// Per-node channels from the filtered spatial reports
    Spatial,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(value_enum)]
    pub analyzer: AnalyzerKind,

    /// Experiment directories to analyze
    #[arg(required = true)]
    pub experiment_dirs: Vec<PathBuf>,

    /// Name the output files are written under, for all experiments
    #[arg(long)]
    pub name: Option<String>,

    /// Analysis settings file (JSON)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Tags carried into the output tables
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub sweep_vars: Option<Vec<String>>,

    /// Channels to read
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub channels: Option<Vec<String>>,

    /// Genome columns to keep
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub genomes: Option<Vec<String>>,

    /// Inset chart reports to read
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub report_names: Option<Vec<String>>,

    #[arg(long)]
    pub species: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    /// Keep one genome frequency summary row per node
    #[arg(long)]
    pub by_node: bool,

    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum PlotCommand {
    /// Channels against time with a one standard deviation band
    Timeseries(TimeseriesArgs),
    /// EIR of the insecticide resistance arms per mutation rate
    Insecticide(InsecticideArgs),
    /// Maps of a per-node channel
    Spatial(SpatialArgs),
}

#[derive(Args, Debug)]
pub struct TimeseriesArgs {
    /// An aggregated CSV table
    pub summary: PathBuf,

    #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
    pub channels: Vec<String>,

    /// One figure per value of this column
    #[arg(long)]
    pub split_by: Option<String>,

    /// One line per value of this column
    #[arg(long)]
    pub line_by: Option<String>,

    #[arg(long, default_value = "Time")]
    pub time_column: String,

    #[arg(long)]
    pub max_days: Option<f64>,

    /// Label year ticks with calendar years from this year
    #[arg(long)]
    pub start_year: Option<i32>,

    #[arg(long, default_value = "timeseries")]
    pub prefix: String,

    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct InsecticideArgs {
    /// An aggregated inset chart table
    pub summary: PathBuf,

    #[arg(long, default_value = "Annual EIR")]
    pub channel: String,

    #[arg(long, default_value_t = 6 * 365)]
    pub max_days: usize,

    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct SpatialArgs {
    /// An aggregated spatial table
    pub summary: PathBuf,

    /// The demographics file giving node positions
    #[arg(long)]
    pub demographics: PathBuf,

    #[arg(long, default_value = "Prevalence")]
    pub channel: String,

    /// Days to draw
    #[arg(long, num_args = 1.., value_delimiter = ',', default_values_t = [180, 1094, 2189])]
    pub times: Vec<i64>,

    /// One panel per value of this column
    #[arg(long)]
    pub panel_by: Option<String>,

    /// Number of most populous nodes to outline
    #[arg(long, default_value_t = 6)]
    pub highlight: usize,

    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Applies `--log-level` and `-v`. The explicit level spec wins over the verbosity count.
fn configure_logging(cli: &Cli) -> Result<()> {
    if cli.verbose > 0 {
        set_log_level(verbosity_level(cli.verbose));
    }
    if let Some(spec) = &cli.log_level {
        let spec: LogSpec = spec.parse()?;
        spec.apply();
        if let Some(level) = spec.global {
            println!("Logging enabled at level {level}");
        }
        for (module, level) in &spec.modules {
            println!("Logging enabled for {module} at level {level}");
        }
    }
    Ok(())
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(&cli)?;

    match cli.command {
        Commands::Plan(args) => commands::plan(&args),
        Commands::Run(args) => commands::run(&args),
        Commands::Analyze(args) => commands::analyze(&args),
        Commands::Plot(command) => commands::plot(&command),
    }
}
