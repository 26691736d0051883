//! Scenario update functions.
//!
//! Each function mutates a [`ConfigBuilder`] and returns the tags identifying the scenario
//! parameters it applied. Sweeps wrap these in [`ModFn`](crate::sweep::ModFn)s.

use crate::config::builder::{CampaignEvent, ConfigBuilder, CustomReport};
use crate::config::species::{Driver, Gene, Insecticide, Trait, TraitModifier};
use crate::error::VgError;
use crate::sweep::{tags, Tags};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A diploid genome as the simulator writes it: sex chromosomes first, then one pair per gene.
pub type Genome = Vec<[String; 2]>;

#[must_use]
pub fn genome(pairs: &[[&str; 2]]) -> Genome {
    pairs
        .iter()
        .map(|[a, b]| [(*a).to_string(), (*b).to_string()])
        .collect()
}

/// A single release of genetically modified mosquitoes.
#[derive(Debug, Clone, PartialEq)]
pub struct MosquitoRelease {
    pub species: String,
    pub start_day: f64,
    pub number: u64,
    pub repetitions: u32,
    pub genome: Genome,
    /// Nodes to release into. `None` releases into every node.
    pub node_ids: Option<Vec<u32>>,
}

impl MosquitoRelease {
    #[must_use]
    pub fn new(species: &str, start_day: f64, number: u64, genome: Genome) -> Self {
        MosquitoRelease {
            species: species.to_string(),
            start_day,
            number,
            repetitions: 1,
            genome,
            node_ids: None,
        }
    }
}

fn nodeset(node_ids: Option<&[u32]>) -> Value {
    match node_ids {
        Some(ids) => json!({ "class": "NodeSetNodeList", "Node_List": ids }),
        None => json!({ "class": "NodeSetAll" }),
    }
}

fn waning_exponential(initial_effect: f64, decay_time_constant: f64) -> Value {
    json!({
        "class": "WaningEffectExponential",
        "Initial_Effect": initial_effect,
        "Decay_Time_Constant": decay_time_constant,
    })
}

pub fn add_mosquito_release(cb: &mut ConfigBuilder, release: &MosquitoRelease) {
    cb.add_event(
        CampaignEvent::new("MosquitoRelease", release.start_day)
            .with("Released_Species", release.species.as_str())
            .with("Released_Number", release.number)
            .with("Released_Genome", json!(release.genome))
            .with("Number_Repetitions", release.repetitions)
            .with("Nodeset_Config", nodeset(release.node_ids.as_deref())),
    );
}

/// Releases `number` homozygous `a1` gambiae males into `node_ids` (typically the `num_nodes`
/// most populous nodes).
pub fn add_release(
    cb: &mut ConfigBuilder,
    number: u64,
    num_nodes: usize,
    start_day: f64,
    node_ids: Option<Vec<u32>>,
) -> Tags {
    let mut release = MosquitoRelease::new(
        "gambiae",
        start_day,
        number,
        genome(&[["X", "Y"], ["a1", "a1"]]),
    );
    release.node_ids = node_ids;
    add_mosquito_release(cb, &release);
    tags([
        ("Release_Number", number.into()),
        ("Num_Nodes", num_nodes.into()),
        ("Start_Day", start_day.into()),
    ])
}

/// Like [`add_release`] for single-node simulations.
pub fn add_release_single_node(cb: &mut ConfigBuilder, number: u64, start_day: f64) -> Tags {
    let release = MosquitoRelease::new(
        "gambiae",
        start_day,
        number,
        genome(&[["X", "Y"], ["a1", "a1"]]),
    );
    add_mosquito_release(cb, &release);
    tags([
        ("Release_Number", number.into()),
        ("Start_Day", start_day.into()),
    ])
}

/// Releases `number` mosquitoes of each of `genomes` on day 200 and labels the arm.
pub fn add_labelled_release(
    cb: &mut ConfigBuilder,
    species: &str,
    label: &str,
    number: u64,
    genomes: &[Genome],
) -> Tags {
    for g in genomes {
        add_mosquito_release(cb, &MosquitoRelease::new(species, 200.0, number, g.clone()));
    }
    tags([("Label", label.into()), ("Number", number.into())])
}

fn bednet(start_day: f64, coverage: f64) -> CampaignEvent {
    CampaignEvent::new("SimpleBednet", start_day)
        .with("Demographic_Coverage", coverage)
        .with("Nodeset_Config", nodeset(None))
}

/// Two ITN distributions, on day 180 and three years later. The release parameters are only
/// recorded as tags so that net-only arms group alongside release arms.
pub fn add_nets(
    cb: &mut ConfigBuilder,
    coverage: f64,
    number: u64,
    num_nodes: usize,
    start_day: f64,
) -> Tags {
    for day in [180.0, 180.0 + 3.0 * 365.0] {
        cb.add_event(
            bednet(day, coverage)
                .with("Expiration_Distribution_Type", "EXPONENTIAL_DURATION")
                .with("Expiration_Period", 639)
                .with("Blocking_Config", waning_exponential(0.6, 730.0))
                .with("Killing_Config", waning_exponential(0.7, 1460.0)),
        );
    }
    tags([
        ("ITN_Coverage", coverage.into()),
        ("Release_Number", number.into()),
        ("Num_Nodes", num_nodes.into()),
        ("Start_Day", start_day.into()),
    ])
}

/// A single insecticide-treated net distribution, with the event recorder turned on for bednet
/// events.
pub fn add_itns(
    cb: &mut ConfigBuilder,
    start: f64,
    coverage: f64,
    insecticide: &str,
    label: &str,
    killing: f64,
) -> Tags {
    cb.add_event(
        bednet(start, coverage)
            .with("Insecticide_Name", insecticide)
            .with("Expiration_Distribution_Type", "EXPONENTIAL_DISTRIBUTION")
            .with("Expiration_Period_Exponential", 660)
            .with("Blocking_Config", waning_exponential(0.9, 730.0))
            .with("Killing_Config", waning_exponential(killing, 1460.0)),
    );
    cb.update_params(json!({
        "Report_Event_Recorder": 1,
        "Report_Event_Recorder_Events": ["Bednet_Got_New_One", "Bednet_Discarded"],
        "Report_Event_Recorder_Ignore_Events_In_List": 0,
        "Report_Event_Recorder_Individual_Properties": [],
    }));
    tags([
        ("Insecticide", insecticide.into()),
        ("Coverage", coverage.into()),
        ("Start", start.into()),
        ("Label", label.into()),
    ])
}

/// Reduces transmission to humans for gambiae carrying at least one `a1` allele.
pub fn add_trait_modifiers(
    cb: &mut ConfigBuilder,
    transmission_to_human: f64,
) -> Result<Tags, VgError> {
    let modifiers = vec![
        TraitModifier::new(
            &[["a0", "a1"]],
            Trait::TransmissionToHuman,
            transmission_to_human,
        ),
        TraitModifier::new(
            &[["a1", "a1"]],
            Trait::TransmissionToHuman,
            transmission_to_human,
        ),
    ];
    cb.set_species_trait_modifiers(IndexMap::from([("gambiae".to_string(), modifiers)]))?;
    Ok(tags([(
        "Transmission_To_Human",
        transmission_to_human.into(),
    )]))
}

/// A classic `a1` drive replacing `a0` in `species`.
pub fn add_drivers(
    cb: &mut ConfigBuilder,
    species: &str,
    copy_to_likelihood: f64,
) -> Result<Tags, VgError> {
    cb.set_species_drivers(IndexMap::from([(
        species.to_string(),
        vec![Driver::classic("a1", "a0", copy_to_likelihood)],
    )]))?;
    Ok(tags([("Copy_To_Likelihood", copy_to_likelihood.into())]))
}

/// Initial frequencies of the three resistance alleles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialAlleles {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for InitialAlleles {
    fn default() -> Self {
        InitialAlleles {
            a0: 0.99,
            a1: 0.01,
            a2: 0.0,
        }
    }
}

/// Replaces the species list with a single fully specified species carrying the three-allele
/// resistance gene. `a0 <-> a1` mutate at `mutation_rate1`, anything to or from `a2` at
/// `mutation_rate2`.
pub fn change_vector_params(
    cb: &mut ConfigBuilder,
    species: &str,
    mutation_rate1: f64,
    mutation_rate2: f64,
    serialization_seed: i64,
    initial: InitialAlleles,
) -> Result<Tags, VgError> {
    let gene = Gene::new(
        [("a0", initial.a0), ("a1", initial.a1), ("a2", initial.a2)],
        [
            ("a0:a1", mutation_rate1),
            ("a1:a0", mutation_rate1),
            ("a2:a0", mutation_rate2),
            ("a0:a2", mutation_rate2),
            ("a1:a2", mutation_rate2),
            ("a2:a1", mutation_rate2),
        ],
    );
    cb.set_species(&[species]);
    cb.set_param(
        "Vector_Species_Params",
        json!([{
            "Name": species,
            "Genes": serde_json::to_value(vec![gene])?,
            "Acquire_Modifier": 0.8,
            "Adult_Life_Expectancy": 20,
            "Male_Life_Expectancy": 10,
            "Anthropophily": 0.65,
            "Aquatic_Arrhenius_1": 84_200_000_000_i64,
            "Aquatic_Arrhenius_2": 8328,
            "Aquatic_Mortality_Rate": 0.1,
            "Cycle_Arrhenius_1": 0,
            "Cycle_Arrhenius_2": 0,
            "Cycle_Arrhenius_Reduction_Factor": 0,
            "Days_Between_Feeds": 3,
            "Egg_Batch_Size": 100,
            "Immature_Duration": 2,
            "Indoor_Feeding_Fraction": 0.9,
            "Infected_Arrhenius_1": 117_000_000_000_i64,
            "Infected_Arrhenius_2": 8336,
            "Infected_Egg_Batch_Factor": 0.8,
            "Infectious_Human_Feed_Mortality_Factor": 1.5,
            "Larval_Habitat_Types": linear_spline_habitat(10f64.powf(8.6)),
            "Transmission_Rate": 0.9,
            "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE",
        }]),
    );
    Ok(tags([
        ("Mutation_Rate1", mutation_rate1.into()),
        ("Mutation_Rate2", mutation_rate2.into()),
        ("Serialization_seed", serialization_seed.into()),
        ("a0_initial", initial.a0.into()),
        ("a1_initial", initial.a1.into()),
    ]))
}

/// Gambiae's seasonal larval habitat: a 12-point monthly linear spline scaled to
/// `max_larval_capacity`.
#[must_use]
pub fn linear_spline_habitat(max_larval_capacity: f64) -> Value {
    json!({
        "LINEAR_SPLINE": {
            "Capacity_Distribution_Over_Time": {
                "Times": [0.0, 30.417, 60.833, 91.25, 121.667, 152.083,
                          182.5, 212.917, 243.333, 273.75, 304.167, 334.583],
                "Values": [3.0, 0.8, 1.25, 0.1, 2.7, 10.0, 6.0, 35.0, 2.8, 1.5, 1.6, 2.1],
            },
            "Capacity_Distribution_Number_Of_Years": 1,
            "Max_Larval_Capacity": max_larval_capacity,
        }
    })
}

/// Pyrethroid resistance on `a1` (homozygous at `pyrethroid_killing`, heterozygous at twice that)
/// and carbamate resistance on any genome carrying `a2`.
pub fn add_insecticides(
    cb: &mut ConfigBuilder,
    pyrethroid_killing: f64,
    carbamate_killing: f64,
) -> Result<Tags, VgError> {
    let insecticides = vec![
        Insecticide::with_resistance("pyrethroid", "gambiae", ["a1", "a1"], pyrethroid_killing),
        Insecticide::with_resistance(
            "pyrethroid",
            "gambiae",
            ["a1", "a0"],
            pyrethroid_killing * 2.0,
        ),
        Insecticide::with_resistance("carbamate", "gambiae", ["a2", "*"], carbamate_killing),
    ];
    cb.set_param("Insecticides", serde_json::to_value(insecticides)?);
    Ok(tags([
        ("Pyrethroid_Killing", pyrethroid_killing.into()),
        ("Carbamate_Killing", carbamate_killing.into()),
    ]))
}

/// Who seeks treatment after a triggering event, and how quickly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSeekingTarget {
    pub trigger: String,
    pub coverage: f64,
    pub age_min: f64,
    pub age_max: f64,
    pub seek: f64,
    /// Daily probability of seeking care; the delay is exponential with mean `1 / rate`.
    pub rate: f64,
}

impl HealthSeekingTarget {
    /// Clinical cases seek care at 50% coverage, severe cases at 80%.
    #[must_use]
    pub fn standard() -> Vec<HealthSeekingTarget> {
        vec![
            HealthSeekingTarget {
                trigger: "NewClinicalCase".to_string(),
                coverage: 0.5,
                age_min: 0.0,
                age_max: 100.0,
                seek: 1.0,
                rate: 0.3,
            },
            HealthSeekingTarget {
                trigger: "NewSevereCase".to_string(),
                coverage: 0.8,
                age_min: 0.0,
                age_max: 100.0,
                seek: 1.0,
                rate: 0.5,
            },
        ]
    }
}

pub fn add_health_seeking(
    cb: &mut ConfigBuilder,
    targets: &[HealthSeekingTarget],
    drugs: &[&str],
    start_day: f64,
    broadcast_event: &str,
) {
    for target in targets {
        let delay = if target.rate > 0.0 { 1.0 / target.rate } else { 0.0 };
        cb.add_event(
            CampaignEvent::new("NodeLevelHealthTriggeredIV", start_day)
                .with("Trigger_Condition_List", json!([target.trigger]))
                .with("Demographic_Coverage", target.coverage * target.seek)
                .with("Target_Demographic", "ExplicitAgeRanges")
                .with("Target_Age_Min", target.age_min)
                .with("Target_Age_Max", target.age_max)
                .with("Delay_Period_Exponential", delay)
                .with("Drug_Types", json!(drugs))
                .with("Broadcast_Event", broadcast_event)
                .with("Nodeset_Config", nodeset(None)),
        );
    }
    let events = match cb.get_param("Custom_Individual_Events") {
        Some(Value::Array(list)) => list.clone(),
        _ => Vec::new(),
    };
    if !events.iter().any(|e| e == broadcast_event) {
        let mut events = events;
        events.push(json!(broadcast_event));
        cb.set_param("Custom_Individual_Events", Value::Array(events));
    }
}

/// A monthly malaria summary report restricted to `node_ids`.
pub fn add_summary_report(
    cb: &mut ConfigBuilder,
    start_day: f64,
    description: &str,
    node_ids: &[u32],
) {
    let infection_bins: Vec<f64> = (0..=20).map(|i| f64::from(i) * 5.0).collect();
    cb.add_report(
        CustomReport::new("MalariaSummaryReport")
            .with("Start_Day", start_day + 1.0)
            .with("Reporting_Interval", 30.0)
            .with("Description", format!("Monthly_Report_{description}"))
            .with("Age_Bins", json!([5.0, 15.0, 100.0]))
            .with(
                "Parasitemia_Bins",
                json!([0.0, 0.01, 0.1, 4.0, 40.0, 4_000_000.0]),
            )
            .with("Infection_Bins", json!(infection_bins))
            .with("Nodeset_Config", nodeset(Some(node_ids))),
    );
}

/// Settings of a `ReportVectorGenetics` custom report.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorGeneticsReport {
    pub species: String,
    pub gender: String,
    pub include_vector_state_columns: bool,
    pub stratify_by: String,
    pub combine_similar_genomes: bool,
    pub specific_genome_combinations: Vec<Genome>,
}

impl VectorGeneticsReport {
    /// A female report stratified by the given genome combinations.
    #[must_use]
    pub fn specific_genomes(species: &str, combinations: Vec<Genome>) -> Self {
        VectorGeneticsReport {
            species: species.to_string(),
            gender: "VECTOR_FEMALE".to_string(),
            include_vector_state_columns: false,
            stratify_by: "SPECIFIC_GENOME".to_string(),
            combine_similar_genomes: true,
            specific_genome_combinations: combinations,
        }
    }

    /// The file name this report is written to in a simulation's output directory.
    #[must_use]
    pub fn filename(&self) -> String {
        let gender = match self.gender.as_str() {
            "VECTOR_FEMALE" => "Female",
            "VECTOR_MALE" => "Male",
            _ => "Both",
        };
        genetics_report_filename(&self.species, gender, &self.stratify_by)
    }
}

/// `output/`-relative name of a vector genetics report, e.g.
/// `ReportVectorGenetics_gambiae_Female_SPECIFIC_GENOME.csv`.
#[must_use]
pub fn genetics_report_filename(species: &str, gender: &str, stratify_by: &str) -> String {
    format!("ReportVectorGenetics_{species}_{gender}_{stratify_by}.csv")
}

pub fn add_vector_genetics_report(cb: &mut ConfigBuilder, report: &VectorGeneticsReport) {
    let combinations: Vec<Value> = report
        .specific_genome_combinations
        .iter()
        .map(|g| json!({ "Allele_Combination": g }))
        .collect();
    cb.add_report(
        CustomReport::new("ReportVectorGenetics")
            .with("Species", report.species.as_str())
            .with("Gender", report.gender.as_str())
            .with(
                "Include_Vector_State_Columns",
                u8::from(report.include_vector_state_columns),
            )
            .with("Stratify_By", report.stratify_by.as_str())
            .with(
                "Combine_Similar_Genomes",
                u8::from(report.combine_similar_genomes),
            )
            .with(
                "Specific_Genome_Combinations_For_Stratification",
                Value::Array(combinations),
            ),
    );
}

pub fn add_vector_stats_report(cb: &mut ConfigBuilder) {
    cb.add_report(CustomReport::new("ReportVectorStats").with("Stratify_By_Species", 1));
}

/// A daily spatial report of `channels` between `start` and `end`. The simulator writes one
/// `SpatialReportMalariaFiltered_<channel>.bin` per channel.
pub fn add_filtered_spatial_report<S: AsRef<str>>(
    cb: &mut ConfigBuilder,
    start: f64,
    end: f64,
    channels: &[S],
) {
    let channels: Vec<&str> = channels.iter().map(AsRef::as_ref).collect();
    cb.add_report(
        CustomReport::new("SpatialReportMalariaFiltered")
            .with("Start_Day", start)
            .with("End_Day", end)
            .with("Reporting_Interval", 1)
            .with("Spatial_Output_Channels", json!(channels))
            .with("Node_IDs_Of_Interest", json!([])),
    );
}

/// Serializes the population at each of `steps`. With `end_at_final` the simulation stops at
/// the last serialization step.
pub fn add_serialization_timesteps(cb: &mut ConfigBuilder, steps: &[u32], end_at_final: bool) {
    let mut steps = steps.to_vec();
    steps.sort_unstable();
    cb.set_param("Serialization_Type", "TIMESTEP");
    cb.set_param("Serialization_Time_Steps", json!(steps));
    if end_at_final {
        if let Some(last) = steps.last() {
            let start = cb
                .get_param("Start_Time")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            cb.set_param("Simulation_Duration", start + f64::from(*last));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimType;
    use crate::sweep::TagValue;

    fn base() -> ConfigBuilder {
        ConfigBuilder::from_defaults(SimType::MalariaSim)
    }

    #[test]
    fn add_nets_distributes_twice() {
        let mut cb = base();
        let t = add_nets(&mut cb, 0.8, 1000, 6, 180.0);
        assert_eq!(cb.campaign().len(), 2);
        assert_eq!(cb.campaign()[1].start_day, 180.0 + 1095.0);
        assert_eq!(t["ITN_Coverage"], TagValue::from(0.8));
        assert_eq!(t["Num_Nodes"], TagValue::from(6));
    }

    #[test]
    fn add_release_targets_nodes() {
        let mut cb = base();
        let t = add_release(&mut cb, 1000, 2, 180.0, Some(vec![7, 3]));
        let event = &cb.campaign()[0];
        assert_eq!(event.params["Released_Genome"], json!([["X", "Y"], ["a1", "a1"]]));
        assert_eq!(event.params["Nodeset_Config"]["Node_List"], json!([7, 3]));
        assert_eq!(t.len(), 3);
        assert_eq!(t["Release_Number"], TagValue::from(1000));
    }

    #[test]
    fn change_vector_params_replaces_species() {
        let mut cb = base();
        cb.set_species(&["arabiensis", "funestus"]);
        let t =
            change_vector_params(&mut cb, "gambiae", 0.01, 0.001, 0, InitialAlleles::default())
                .unwrap();
        assert_eq!(cb.species_names(), vec!["gambiae"]);
        let genes = cb.species_param("gambiae", "Genes").unwrap();
        assert_eq!(genes[0]["Mutations"]["a2:a1"], json!(0.001));
        assert_eq!(genes[0]["Alleles"]["a0"], json!(0.99));
        assert_eq!(t["Mutation_Rate2"], TagValue::from(0.001));
        assert_eq!(t["a1_initial"], TagValue::from(0.01));
    }

    #[test]
    fn insecticides_double_heterozygous_killing() {
        let mut cb = base();
        add_insecticides(&mut cb, 0.125, 0.25).unwrap();
        let insecticides = cb.get_param("Insecticides").unwrap();
        assert_eq!(insecticides[1]["Resistances"][0]["Killing_Modifier"], json!(0.25));
        assert_eq!(
            insecticides[2]["Resistances"][0]["Allele_Combinations"],
            json!([["a2", "*"]])
        );
    }

    #[test]
    fn add_itns_tags_label() {
        let mut cb = base();
        let t = add_itns(&mut cb, 180.0, 0.6, "carbamate", "No_resistance", 0.9);
        assert_eq!(t["Label"], TagValue::from("No_resistance"));
        assert_eq!(cb.get_param("Report_Event_Recorder"), Some(&json!(1)));
        assert_eq!(
            cb.campaign()[0].params["Insecticide_Name"],
            json!("carbamate")
        );
    }

    #[test]
    fn health_seeking_registers_broadcast_event() {
        let mut cb = base();
        let targets = HealthSeekingTarget::standard();
        add_health_seeking(
            &mut cb,
            &targets,
            &["Artemether", "Lumefantrine"],
            0.0,
            "Received_Treatment",
        );
        add_health_seeking(&mut cb, &targets, &["Artemether"], 0.0, "Received_Treatment");
        assert_eq!(cb.campaign().len(), 4);
        assert_eq!(
            cb.get_param("Custom_Individual_Events"),
            Some(&json!(["Received_Treatment"]))
        );
    }

    #[test]
    fn serialization_ends_simulation() {
        let mut cb = base();
        add_serialization_timesteps(&mut cb, &[3650, 365], true);
        assert_eq!(
            cb.get_param("Serialization_Time_Steps"),
            Some(&json!([365, 3650]))
        );
        assert_eq!(cb.get_param("Simulation_Duration"), Some(&json!(3650.0)));
    }

    #[test]
    fn genetics_report_filename() {
        let report = VectorGeneticsReport::specific_genomes(
            "gambiae",
            vec![genome(&[["X", "X"], ["a1", "*"]])],
        );
        assert_eq!(
            report.filename(),
            "ReportVectorGenetics_gambiae_Female_SPECIFIC_GENOME.csv"
        );
    }
}
