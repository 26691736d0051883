use anyhow::{bail, Result};

use super::main::{AnalyzeArgs, AnalyzerKind};
use crate::analyze::{
    Analyzer, AnalyzeManager, GenomeFrequencyAnalyzer, InsetAnalyzer, SpatialAnalyzer,
};
use crate::engine::load_experiment;
use crate::settings::{load_settings, AnalysisSettings};

/// Settings from the file, overridden by any arguments given.
fn analysis_settings(args: &AnalyzeArgs) -> Result<AnalysisSettings> {
    let mut settings: AnalysisSettings = load_settings(args.settings.as_deref())?;
    if let Some(sweep_vars) = &args.sweep_vars {
        settings.sweep_variables = sweep_vars.clone();
    }
    if args.channels.is_some() {
        settings.channels = args.channels.clone();
    }
    if let Some(genomes) = &args.genomes {
        settings.genomes = genomes.clone();
    }
    if let Some(report_names) = &args.report_names {
        settings.report_names = report_names.clone();
    }
    if let Some(species) = &args.species {
        settings.species = species.clone();
    }
    if let Some(gender) = &args.gender {
        settings.gender = gender.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        settings.output_dir = output_dir.clone();
    }
    settings.by_node |= args.by_node;
    Ok(settings)
}

pub fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let settings = analysis_settings(args)?;

    let mut simulations = Vec::new();
    for dir in &args.experiment_dirs {
        simulations.extend(load_experiment(dir)?);
    }
    if simulations.is_empty() {
        bail!("no simulations found in the given experiment directories");
    }

    let name = args.name.clone();
    let analyzer: Box<dyn Analyzer> = match args.analyzer {
        AnalyzerKind::Inset => Box::new(InsetAnalyzer::new(name, &settings)),
        AnalyzerKind::Genetics => Box::new(GenomeFrequencyAnalyzer::new(name, &settings)),
        AnalyzerKind::Spatial => Box::new(SpatialAnalyzer::new(name, &settings)),
    };
    let written = AnalyzeManager::new(simulations)
        .add_analyzer(analyzer)
        .analyze()?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
