//! The named experiments.
//!
//! Each experiment is a base configuration plus one or more arms. An arm is a block of sweep
//! points, replicated over `num_seeds` run numbers, that share the same interventions. Some arms
//! are defined but only planned with [`ExperimentSettings::all_arms`].

use crate::config::interventions::{
    add_drivers, add_filtered_spatial_report, add_health_seeking, add_insecticides, add_itns,
    add_labelled_release, add_nets, add_release, add_serialization_timesteps,
    add_trait_modifiers, add_vector_genetics_report, add_vector_stats_report,
    change_vector_params, genome, linear_spline_habitat, Genome, HealthSeekingTarget,
    InitialAlleles, VectorGeneticsReport,
};
use crate::config::sites::{
    configure_vc_gm_intervention_system, configure_vector_sim_single_node,
    standard_spatial_updates, update_single_node_params, update_vector_params,
};
use crate::config::species::{Gene, Trait, TraitModifier};
use crate::config::{ConfigBuilder, SimType};
use crate::demographics::Demographics;
use crate::error::VgError;
use crate::log::{info, warn};
use crate::settings::ExperimentSettings;
use crate::sweep::plan::ExperimentPlan;
use crate::sweep::{cartesian, seeds, ModFn, SweepBuilder, RUN_NUMBER};
use indexmap::IndexMap;
use serde_json::{json, Value};

const DRUGS: [&str; 2] = ["Artemether", "Lumefantrine"];
const RECEIVED_TREATMENT: &str = "Received_Treatment";
const SPATIAL_CHANNELS: [&str; 5] = [
    "Population",
    "Prevalence",
    "New_Clinical_Cases",
    "Daily_EIR",
    "Adult_Vectors",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExperimentKind {
    /// Spatial gene drive with and without bednets.
    SpatialGeneDrive,
    /// Burn-in for the spatial gene drive runs.
    SpatialSerialization,
    /// Single-node bednet rotation against evolving insecticide resistance.
    InsecticideResistance,
    /// Burn-in for the insecticide resistance runs.
    InsecticideSerialization,
    /// Single-node release of drive or Mendelian mosquitoes.
    SingleNodeGeneDrive,
    /// Single-node introgression of a fitness-reducing allele.
    SpeciesIntrogression,
    /// Two-species single-node control for the introgression runs.
    NoIntrogression,
    /// Single-node allele dynamics with trait modifiers, replicates only.
    VectorGeneticsSingle,
}

impl ExperimentKind {
    #[must_use]
    pub fn default_name(self) -> &'static str {
        match self {
            ExperimentKind::SpatialGeneDrive => "spatial_vector_genetics",
            ExperimentKind::SpatialSerialization => "spatial_vector_genetics_serialization",
            ExperimentKind::InsecticideResistance => "insecticide_resistance_single_node",
            ExperimentKind::InsecticideSerialization => {
                "insecticide_resistance_single_node_serialization"
            }
            ExperimentKind::SingleNodeGeneDrive => "vector_genetics_single_node_gene_drive",
            ExperimentKind::SpeciesIntrogression => "vector_genetics_single_node_introgression",
            ExperimentKind::NoIntrogression => "vector_genetics_single_node_no_introgression",
            ExperimentKind::VectorGeneticsSingle => "vector_genetics_single_node",
        }
    }
}

/// Builds the plan of experiment `kind`.
pub fn build_plan(
    kind: ExperimentKind,
    settings: &ExperimentSettings,
) -> Result<ExperimentPlan, VgError> {
    let (base, builder) = match kind {
        ExperimentKind::SpatialGeneDrive => spatial_gene_drive(settings)?,
        ExperimentKind::SpatialSerialization => spatial_serialization(settings)?,
        ExperimentKind::InsecticideResistance => insecticide_resistance(settings)?,
        ExperimentKind::InsecticideSerialization => insecticide_serialization(settings),
        ExperimentKind::SingleNodeGeneDrive => single_node_gene_drive(settings)?,
        ExperimentKind::SpeciesIntrogression => species_introgression(settings)?,
        ExperimentKind::NoIntrogression => no_introgression(settings)?,
        ExperimentKind::VectorGeneticsSingle => vector_genetics_single(settings)?,
    };
    let name = settings
        .name
        .clone()
        .unwrap_or_else(|| kind.default_name().to_string());
    info!("built plan {} with {} simulations", name, builder.len());
    Ok(ExperimentPlan {
        name,
        base,
        builder,
    })
}

fn one_gene(species: &str, gene: Gene) -> IndexMap<String, Vec<Gene>> {
    IndexMap::from([(species.to_string(), vec![gene])])
}

fn spatial_log_levels() -> Value {
    json!({
        "logLevel_JsonConfigurable": "ERROR",
        "logLevel_VectorHabitat": "ERROR",
        "logLevel_Simulation": "ERROR",
        "logLevel_StandardEventCoordinator": "ERROR",
        "logLevel_LarvalHabitatMultiplier": "ERROR",
        "logLevel_SimulationEventContext": "ERROR",
        "logLevel_SusceptibilityMalaria": "ERROR",
    })
}

fn load_release_demographics(settings: &ExperimentSettings) -> Option<Demographics> {
    let path = settings
        .input_dir
        .join("Demographics")
        .join(format!("{}_demographics.json", settings.prefix));
    match Demographics::load(&path) {
        Ok(demographics) => Some(demographics),
        Err(e) => {
            warn!(
                "cannot read {} ({}); releases will not be restricted to the most populous nodes",
                path.display(),
                e
            );
            None
        }
    }
}

/// The interventions of one spatial arm. Every list is a sweep axis.
struct SpatialArm {
    start_days: Vec<f64>,
    numbers: Vec<u64>,
    num_nodes: Vec<usize>,
    coverages: Vec<f64>,
    likelihoods: Vec<f64>,
    transmissions: Vec<f64>,
    release: bool,
}

impl SpatialArm {
    fn points(&self, num_seeds: u32, demographics: Option<&Demographics>) -> Vec<Vec<ModFn>> {
        let mut points = Vec::new();
        for seed in 0..num_seeds {
            for &start_day in &self.start_days {
                for &number in &self.numbers {
                    for &num_nodes in &self.num_nodes {
                        for &coverage in &self.coverages {
                            for &likelihood in &self.likelihoods {
                                for &transmission in &self.transmissions {
                                    let node_ids =
                                        demographics.map(|d| d.find_n_largest(num_nodes));
                                    points.push(self.point(
                                        seed,
                                        start_day,
                                        number,
                                        num_nodes,
                                        coverage,
                                        likelihood,
                                        transmission,
                                        node_ids,
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
        points
    }

    #[allow(clippy::too_many_arguments)]
    fn point(
        &self,
        seed: u32,
        start_day: f64,
        number: u64,
        num_nodes: usize,
        coverage: f64,
        likelihood: f64,
        transmission: f64,
        node_ids: Option<Vec<u32>>,
    ) -> Vec<ModFn> {
        let mut point = vec![
            ModFn::set_param(RUN_NUMBER, seed),
            ModFn::set_param("Serialized_Population_Path", ""),
            ModFn::infallible("add_nets", move |cb| {
                add_nets(cb, coverage, number, num_nodes, start_day)
            }),
        ];
        if self.release {
            point.push(ModFn::infallible("add_release", move |cb| {
                add_release(cb, number, num_nodes, start_day, node_ids.clone())
            }));
        }
        point.push(ModFn::new("add_drivers", move |cb| {
            add_drivers(cb, "gambiae", likelihood)
        }));
        point.push(ModFn::new("add_trait_modifiers", move |cb| {
            add_trait_modifiers(cb, transmission)
        }));
        point
    }
}

fn spatial_gene_drive(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = configure_vc_gm_intervention_system(
        &settings.input_dir,
        &settings.prefix,
        &settings.geography,
        settings.num_cores,
        settings.num_years,
        settings.migration_mul,
    );
    cb.update_params(json!({
        "Report_Event_Recorder": 0,
        "Listed_Events": ["Immigrating", "Emigrating"],
        "Report_Event_Recorder_Events": ["Immigrating", "Emigrating"],
        "Report_Event_Recorder_Ignore_Events_In_List": 0,
        "Serialized_Population_Filenames": ["", ""],
    }));
    cb.update_params(spatial_log_levels());
    cb.set_species_genes(one_gene(
        "gambiae",
        Gene::new([("a0", 1.0), ("a1", 0.0)], [("a1:a0", 0.05)]),
    ))?;

    add_health_seeking(
        &mut cb,
        &HealthSeekingTarget::standard(),
        &DRUGS,
        0.0,
        RECEIVED_TREATMENT,
    );
    add_vector_genetics_report(
        &mut cb,
        &VectorGeneticsReport::specific_genomes(
            "gambiae",
            vec![
                genome(&[["X", "X"], ["a1", "*"]]),
                genome(&[["X", "X"], ["a0", "a0"]]),
            ],
        ),
    );
    add_filtered_spatial_report(
        &mut cb,
        0.0,
        f64::from(365 * settings.num_years),
        &SPATIAL_CHANNELS,
    );

    let demographics = load_release_demographics(settings);
    let release_days = vec![180.0];
    let release_numbers = vec![1000];
    let release_nodes = vec![6];
    let likelihoods = vec![1.0];
    let transmissions = vec![0.3];
    let arms = [
        // VC_and_GM
        SpatialArm {
            start_days: release_days.clone(),
            numbers: release_numbers.clone(),
            num_nodes: release_nodes.clone(),
            coverages: vec![0.8],
            likelihoods: likelihoods.clone(),
            transmissions: transmissions.clone(),
            release: true,
        },
        // VC
        SpatialArm {
            start_days: vec![0.0],
            numbers: vec![0],
            num_nodes: vec![0],
            coverages: vec![0.8],
            likelihoods: vec![0.0],
            transmissions: vec![1.0],
            release: false,
        },
        // GM
        SpatialArm {
            start_days: release_days,
            numbers: release_numbers,
            num_nodes: release_nodes,
            coverages: vec![0.0],
            likelihoods,
            transmissions,
            release: true,
        },
        // No_interventions
        SpatialArm {
            start_days: vec![0.0],
            numbers: vec![0],
            num_nodes: vec![0],
            coverages: vec![0.0],
            likelihoods: vec![0.0],
            transmissions: vec![1.0],
            release: false,
        },
    ];

    let builder = arms.iter().fold(SweepBuilder::default(), |builder, arm| {
        builder.concat(SweepBuilder::from_list(
            arm.points(settings.num_seeds, demographics.as_ref()),
        ))
    });
    Ok((cb, builder))
}

fn burn_in_seeds() -> SweepBuilder {
    SweepBuilder::from_list(seeds(1).into_iter().map(|seed| vec![seed]).collect())
}

/// A single-seed burn-in that serializes the spatial population at its last day.
fn spatial_serialization(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let years = settings.burn_in_years.unwrap_or(11);
    let mut cb = ConfigBuilder::from_defaults_with(
        SimType::MalariaSim,
        [
            ("Num_Cores", json!(settings.num_cores)),
            ("Simulation_Duration", json!(365 * years)),
        ],
    );
    standard_spatial_updates(
        &mut cb,
        &settings.input_dir,
        &settings.prefix,
        &settings.geography,
        settings.migration_mul,
    );
    update_vector_params(&mut cb);
    cb.set_species_param(
        "gambiae",
        "Larval_Habitat_Types",
        linear_spline_habitat(10f64.powf(8.6)),
    );
    cb.update_params(json!({
        "x_Local_Migration": 1,
        "Enable_Spatial_Output": 1,
        "Spatial_Output_Channels": [
            "Adult_Vectors", "Infectious_Vectors", "Population", "Prevalence",
            "Daily_Bites_Per_Human"
        ],
        "Report_Event_Recorder": 1,
        "Listed_Events": ["Immigrating", "Emigrating"],
        "Report_Event_Recorder_Events": ["Immigrating", "Emigrating"],
        "Report_Event_Recorder_Ignore_Events_In_List": 0,
    }));
    cb.update_params(spatial_log_levels());
    add_serialization_timesteps(&mut cb, &[years * 365], true);
    cb.set_species_genes(one_gene(
        "gambiae",
        Gene::new::<2, 0>([("a0", 1.0), ("a1", 0.0)], []),
    ))?;
    add_health_seeking(
        &mut cb,
        &HealthSeekingTarget::standard(),
        &DRUGS,
        f64::from(years.saturating_sub(10) * 365),
        RECEIVED_TREATMENT,
    );
    Ok((cb, burn_in_seeds()))
}

fn resistance_genetics_report() -> VectorGeneticsReport {
    VectorGeneticsReport::specific_genomes(
        "gambiae",
        vec![
            genome(&[["X", "X"], ["a1", "*"]]),
            genome(&[["X", "X"], ["a0", "a0"]]),
            genome(&[["X", "X"], ["a2", "*"]]),
        ],
    )
}

/// The nets distributed in one insecticide resistance arm: `(day offset, insecticide)`.
struct NetSchedule {
    label: &'static str,
    coverage: f64,
    nets: Vec<(f64, &'static str)>,
    mutation_rates1: Vec<f64>,
    mutation_rates2: Vec<f64>,
}

impl NetSchedule {
    fn points(&self, num_seeds: u32, start: f64) -> Vec<Vec<ModFn>> {
        let axes = [self.mutation_rates1.clone(), self.mutation_rates2.clone()];
        let mut points = Vec::new();
        for seed in 0..num_seeds {
            for rates in cartesian(&axes) {
                let (m1, m2) = (rates[0], rates[1]);
                let mut point = vec![
                    ModFn::set_param(RUN_NUMBER, seed),
                    ModFn::new("change_vector_params", move |cb| {
                        change_vector_params(cb, "gambiae", m1, m2, 0, InitialAlleles::default())
                    }),
                    ModFn::set_param("Serialized_Population_Path", ""),
                ];
                for &(offset, insecticide) in &self.nets {
                    let (coverage, label) = (self.coverage, self.label);
                    point.push(ModFn::infallible("add_itns", move |cb| {
                        add_itns(cb, start + offset, coverage, insecticide, label, 0.9)
                    }));
                }
                points.push(point);
            }
        }
        points
    }
}

fn insecticide_base(settings: &ExperimentSettings, years: u32) -> ConfigBuilder {
    let mut cb = ConfigBuilder::from_defaults_with(
        SimType::MalariaSim,
        [("Simulation_Duration", json!(365 * years))],
    );
    update_single_node_params(&mut cb, &settings.input_dir, &settings.geography);
    cb
}

fn insecticide_resistance(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = insecticide_base(settings, settings.num_years);
    add_insecticides(&mut cb, 0.125, 0.25)?;
    cb.set_param("Serialized_Population_Filenames", json!(["", ""]));
    add_vector_genetics_report(&mut cb, &resistance_genetics_report());
    add_health_seeking(
        &mut cb,
        &HealthSeekingTarget::standard(),
        &DRUGS,
        0.0,
        RECEIVED_TREATMENT,
    );

    let three_years = 3.0 * 365.0;
    let swept_rates: Vec<f64> = (-4..-1).map(|x| 10f64.powi(x)).collect();
    let three_year_gap = NetSchedule {
        label: "3year",
        coverage: 0.8,
        nets: vec![(0.0, "pyrethroid"), (three_years, "carbamate")],
        mutation_rates1: swept_rates.clone(),
        mutation_rates2: swept_rates,
    };
    let no_rotation_three_year = NetSchedule {
        label: "No_rotation_3year",
        coverage: 0.6,
        nets: vec![(0.0, "pyrethroid"), (three_years, "pyrethroid")],
        mutation_rates1: vec![0.01],
        mutation_rates2: vec![0.0],
    };
    let no_nets = NetSchedule {
        label: "No_nets",
        coverage: 0.0,
        nets: vec![(0.0, "pyrethroid")],
        mutation_rates1: vec![0.01],
        mutation_rates2: vec![0.0],
    };
    let no_resistance = NetSchedule {
        label: "No_resistance",
        coverage: 0.6,
        nets: vec![(0.0, "carbamate"), (three_years, "carbamate")],
        mutation_rates1: vec![0.01],
        mutation_rates2: vec![0.0],
    };

    let mut arms = Vec::new();
    if settings.all_arms {
        arms.push(three_year_gap);
    }
    arms.extend([no_rotation_three_year, no_nets, no_resistance]);

    let start = 180.0;
    let builder = arms.iter().fold(SweepBuilder::default(), |builder, arm| {
        builder.concat(SweepBuilder::from_list(arm.points(settings.num_seeds, start)))
    });
    Ok((cb, builder))
}

/// A single-seed burn-in of the single-node resistance setting with no mutation.
fn insecticide_serialization(settings: &ExperimentSettings) -> (ConfigBuilder, SweepBuilder) {
    let years = settings.burn_in_years.unwrap_or(40);
    let mut cb = insecticide_base(settings, years);
    add_serialization_timesteps(&mut cb, &[years * 365], true);
    add_vector_genetics_report(&mut cb, &resistance_genetics_report());
    add_health_seeking(
        &mut cb,
        &HealthSeekingTarget::standard(),
        &DRUGS,
        f64::from(years.saturating_sub(10) * 365),
        RECEIVED_TREATMENT,
    );
    let points = (0..1u32)
        .map(|seed| {
            vec![
                ModFn::set_param(RUN_NUMBER, seed),
                ModFn::new("change_vector_params", move |cb| {
                    change_vector_params(
                        cb,
                        "gambiae",
                        0.0,
                        0.0,
                        i64::from(seed),
                        InitialAlleles::default(),
                    )
                }),
            ]
        })
        .collect();
    (cb, SweepBuilder::from_list(points))
}

fn labelled_release_arm(
    num_seeds: u32,
    species: &'static str,
    label: &'static str,
    number: u64,
    genomes: Vec<Genome>,
    extra: impl Fn() -> Vec<ModFn>,
) -> Vec<Vec<ModFn>> {
    (0..num_seeds)
        .map(|seed| {
            let genomes = genomes.clone();
            let mut point = vec![
                ModFn::set_param(RUN_NUMBER, seed),
                ModFn::infallible("add_release", move |cb| {
                    add_labelled_release(cb, species, label, number, &genomes)
                }),
            ];
            point.extend(extra());
            point
        })
        .collect()
}

fn single_node_duration(settings: &ExperimentSettings) -> u32 {
    365 * settings.num_years
}

fn single_node_gene_drive(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = configure_vector_sim_single_node(
        &["arabiensis"],
        single_node_duration(settings),
        "single/vector_genetics_single_node_demographics.json",
    );
    cb.set_species_genes(one_gene(
        "arabiensis",
        Gene::new([("a0", 1.0), ("a1", 0.0)], [("a0:a1", 0.0), ("a1:a0", 0.0)]),
    ))?;
    let mut report = VectorGeneticsReport::specific_genomes(
        "arabiensis",
        vec![
            genome(&[["X", "X"], ["a1", "*"]]),
            genome(&[["X", "X"], ["a0", "a0"]]),
        ],
    );
    report.include_vector_state_columns = true;
    add_vector_genetics_report(&mut cb, &report);

    let released = vec![genome(&[["X", "X"], ["a1", "a1"]])];
    let mut points = Vec::new();
    if settings.all_arms {
        for likelihood in [0.5] {
            points.extend(labelled_release_arm(
                settings.num_seeds,
                "arabiensis",
                "Gene_drive",
                1000,
                released.clone(),
                || {
                    vec![ModFn::new("add_drivers", move |cb| {
                        add_drivers(cb, "arabiensis", likelihood)
                    })]
                },
            ));
        }
    }
    points.extend(labelled_release_arm(
        settings.num_seeds,
        "arabiensis",
        "Mendelian",
        1_000_000,
        released,
        Vec::new,
    ));
    Ok((cb, SweepBuilder::from_list(points)))
}

fn species_introgression(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = configure_vector_sim_single_node(
        &["arabiensis"],
        single_node_duration(settings),
        "VectorGeneticsSingle/Demographics.json",
    );
    cb.set_species_genes(one_gene(
        "arabiensis",
        Gene::new([("a0", 1.0), ("b0", 0.0)], [("a0:b0", 0.0), ("b0:a0", 0.0)]),
    ))?;
    cb.set_species_trait_modifiers(IndexMap::from([(
        "arabiensis".to_string(),
        vec![TraitModifier::new(&[["b0", "a0"]], Trait::Mortality, 0.9)],
    )]))?;
    let mut report = VectorGeneticsReport::specific_genomes(
        "arabiensis",
        vec![
            genome(&[["X", "X"], ["b0", "*"]]),
            genome(&[["X", "X"], ["a0", "a0"]]),
        ],
    );
    report.include_vector_state_columns = true;
    add_vector_genetics_report(&mut cb, &report);

    let points = labelled_release_arm(
        settings.num_seeds,
        "arabiensis",
        "Mendelian",
        10_000,
        vec![
            genome(&[["X", "Y"], ["b0", "b0"]]),
            genome(&[["X", "X"], ["b0", "b0"]]),
        ],
        Vec::new,
    );
    Ok((cb, SweepBuilder::from_list(points)))
}

fn no_introgression(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = configure_vector_sim_single_node(
        &["arabiensis", "funestus"],
        single_node_duration(settings),
        "VectorGeneticsSingle/Demographics.json",
    );
    let mut genes = one_gene("arabiensis", Gene::new::<1, 0>([("a0", 1.0)], []));
    genes.insert(
        "funestus".to_string(),
        vec![Gene::new(
            [("b1", 1.0), ("b0", 0.0)],
            [("b1:b0", 0.0), ("b0:b1", 0.0)],
        )],
    );
    cb.set_species_genes(genes)?;
    cb.set_species_trait_modifiers(IndexMap::from([(
        "funestus".to_string(),
        vec![
            TraitModifier::new(&[["b1", "b1"]], Trait::Mortality, 100.0),
            TraitModifier::new(&[["b0", "b0"]], Trait::Mortality, 1.0),
        ],
    )]))?;

    let mut arabiensis = VectorGeneticsReport::specific_genomes(
        "arabiensis",
        vec![genome(&[["X", "X"], ["a0", "*"]])],
    );
    arabiensis.include_vector_state_columns = true;
    add_vector_genetics_report(&mut cb, &arabiensis);
    let mut funestus = VectorGeneticsReport::specific_genomes(
        "funestus",
        vec![
            genome(&[["X", "X"], ["b0", "b0"]]),
            genome(&[["X", "X"], ["b1", "*"]]),
        ],
    );
    funestus.include_vector_state_columns = true;
    add_vector_genetics_report(&mut cb, &funestus);
    add_vector_stats_report(&mut cb);

    let points = labelled_release_arm(
        settings.num_seeds,
        "funestus",
        "No_introgression",
        10_000,
        vec![
            genome(&[["X", "Y"], ["b0", "b0"]]),
            genome(&[["X", "X"], ["b0", "b0"]]),
        ],
        Vec::new,
    );
    Ok((cb, SweepBuilder::from_list(points)))
}

fn vector_genetics_single(
    settings: &ExperimentSettings,
) -> Result<(ConfigBuilder, SweepBuilder), VgError> {
    let mut cb = configure_vector_sim_single_node(
        &["arabiensis"],
        single_node_duration(settings),
        "single/vector_genetics_single_node_demographics.json",
    );
    cb.set_species_param(
        "arabiensis",
        "Larval_Habitat_Types",
        json!({ "TEMPORARY_RAINFALL": 11_250_000_000_i64 }),
    );
    cb.set_species_genes(one_gene(
        "arabiensis",
        Gene::new([("a0", 1.0), ("a1", 0.0)], [("a0:a1", 0.01), ("a1:a0", 0.01)]),
    ))?;
    cb.set_species_trait_modifiers(IndexMap::from([(
        "arabiensis".to_string(),
        vec![
            TraitModifier::new(&[["X", "X"], ["a0", "a1"]], Trait::InfectedByHuman, 0.0),
            TraitModifier::new(&[["X", "X"], ["a1", "a1"]], Trait::InfectedByHuman, 0.0),
            TraitModifier::new(&[["X", "Y"], ["a0", "a1"]], Trait::Mortality, 0.5),
            TraitModifier::new(&[["X", "Y"], ["a1", "a1"]], Trait::Mortality, 0.5),
        ],
    )]))?;
    add_vector_stats_report(&mut cb);
    add_vector_genetics_report(
        &mut cb,
        &VectorGeneticsReport::specific_genomes(
            "arabiensis",
            vec![
                genome(&[["X", "X"], ["a1", "*"]]),
                genome(&[["X", "X"], ["a0", "a0"]]),
            ],
        ),
    );

    let run_numbers: Vec<Value> = (0..settings.num_seeds).map(|seed| json!(seed)).collect();
    let builder = SweepBuilder::from_dict(IndexMap::from([(RUN_NUMBER.to_string(), run_numbers)]))?;
    Ok((cb, builder))
}
