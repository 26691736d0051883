use crate::config::species::{Driver, Gene, TraitModifier};
use crate::error::VgError;
use crate::log::trace;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::Path;

/// The simulation type a configuration starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimType {
    VectorSim,
    MalariaSim,
}

impl SimType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SimType::VectorSim => "VECTOR_SIM",
            SimType::MalariaSim => "MALARIA_SIM",
        }
    }
}

/// A campaign event: an intervention class, the day it is distributed, and the parameters the
/// scenario functions control. The remaining intervention settings are left to the simulator's
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignEvent {
    #[serde(rename = "class")]
    pub class: String,
    #[serde(rename = "Start_Day")]
    pub start_day: f64,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl CampaignEvent {
    #[must_use]
    pub fn new(class: &str, start_day: f64) -> Self {
        CampaignEvent {
            class: class.to_string(),
            start_day,
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// A custom report the simulator should write, e.g. `ReportVectorGenetics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomReport {
    pub report_type: String,
    pub params: Map<String, Value>,
}

impl CustomReport {
    #[must_use]
    pub fn new(report_type: &str) -> Self {
        CustomReport {
            report_type: report_type.to_string(),
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// Builds the configuration of one simulation.
///
/// A `ConfigBuilder` holds three documents: the flat parameter map (`config.json`), the list of
/// campaign events (`campaign.json`) and the custom reports (`custom_reports.json`). Sweeps clone
/// a base builder and apply each sweep point's update functions to the clone.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    params: Map<String, Value>,
    events: Vec<CampaignEvent>,
    reports: Vec<CustomReport>,
}

impl ConfigBuilder {
    /// A builder holding the default parameters for `sim_type`.
    #[must_use]
    pub fn from_defaults(sim_type: SimType) -> Self {
        let mut params = match default_params() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        params.insert("Simulation_Type".to_string(), json!(sim_type.as_str()));
        if sim_type == SimType::MalariaSim {
            if let Value::Object(malaria) = malaria_params() {
                params.extend(malaria);
            }
        }
        ConfigBuilder {
            params,
            events: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Like [`from_defaults`](Self::from_defaults), then overrides the given parameters.
    #[must_use]
    pub fn from_defaults_with<const N: usize>(
        sim_type: SimType,
        overrides: [(&str, Value); N],
    ) -> Self {
        let mut cb = Self::from_defaults(sim_type);
        for (name, value) in overrides {
            cb.set_param(name, value);
        }
        cb
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        trace!("set_param {} = {}", name, value);
        self.params.insert(name.to_string(), value);
    }

    /// Shallow update: every key in `values` overwrites the existing parameter.
    pub fn update_params(&mut self, values: Value) {
        if let Value::Object(map) = values {
            for (name, value) in map {
                self.set_param(&name, value);
            }
        }
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Replaces the species list, creating a default parameter block for each species.
    pub fn set_species<S: AsRef<str>>(&mut self, species: &[S]) {
        let names: Vec<Value> = species.iter().map(|s| json!(s.as_ref())).collect();
        let blocks: Vec<Value> = species
            .iter()
            .map(|s| default_species_block(s.as_ref()))
            .collect();
        self.set_param("Vector_Species_Names", Value::Array(names));
        self.set_param("Vector_Species_Params", Value::Array(blocks));
    }

    /// Sets one parameter of a species' block. Creates the block, and adds the species to
    /// `Vector_Species_Names`, if needed.
    pub fn set_species_param(&mut self, species: &str, name: &str, value: impl Into<Value>) {
        let block = self.species_block_mut(species);
        block.insert(name.to_string(), value.into());
    }

    #[must_use]
    pub fn species_param(&self, species: &str, name: &str) -> Option<&Value> {
        self.species_blocks()
            .iter()
            .find(|block| block["Name"] == json!(species))
            .and_then(|block| block.get(name))
    }

    #[must_use]
    pub fn species_names(&self) -> Vec<String> {
        match self.params.get("Vector_Species_Names") {
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_species_genes(&mut self, genes: IndexMap<String, Vec<Gene>>) -> Result<(), VgError> {
        for (species, species_genes) in genes {
            let value = serde_json::to_value(species_genes)?;
            self.set_species_param(&species, "Genes", value);
        }
        Ok(())
    }

    pub fn set_species_drivers(
        &mut self,
        drivers: IndexMap<String, Vec<Driver>>,
    ) -> Result<(), VgError> {
        for (species, species_drivers) in drivers {
            let value = serde_json::to_value(species_drivers)?;
            self.set_species_param(&species, "Drivers", value);
        }
        Ok(())
    }

    pub fn set_species_trait_modifiers(
        &mut self,
        traits: IndexMap<String, Vec<TraitModifier>>,
    ) -> Result<(), VgError> {
        for (species, modifiers) in traits {
            let value = serde_json::to_value(modifiers)?;
            self.set_species_param(&species, "Gene_To_Trait_Modifiers", value);
        }
        Ok(())
    }

    pub fn add_event(&mut self, event: CampaignEvent) {
        trace!("add_event {} on day {}", event.class, event.start_day);
        self.events.push(event);
    }

    #[must_use]
    pub fn campaign(&self) -> &[CampaignEvent] {
        &self.events
    }

    pub fn add_report(&mut self, report: CustomReport) {
        self.reports.push(report);
    }

    #[must_use]
    pub fn reports(&self) -> &[CustomReport] {
        &self.reports
    }

    /// The `config.json` document.
    #[must_use]
    pub fn config_json(&self) -> Value {
        json!({ "parameters": Value::Object(self.params.clone()) })
    }

    /// The `campaign.json` document.
    pub fn campaign_json(&self) -> Result<Value, VgError> {
        Ok(json!({
            "Events": serde_json::to_value(&self.events)?,
            "Use_Defaults": 1,
        }))
    }

    /// The `custom_reports.json` document. Reports of the same type are grouped together.
    #[must_use]
    pub fn reports_json(&self) -> Value {
        let mut grouped: Map<String, Value> = Map::new();
        for report in &self.reports {
            let entry = grouped
                .entry(report.report_type.clone())
                .or_insert_with(|| json!({ "Enabled": 1, "Reports": [] }));
            if let Some(Value::Array(list)) = entry.get_mut("Reports") {
                list.push(Value::Object(report.params.clone()));
            }
        }
        json!({ "Custom_Reports": Value::Object(grouped), "Use_Explicit_Dlls": 1 })
    }

    /// Writes `config.json`, `campaign.json` and `custom_reports.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), VgError> {
        create_dir_all(dir)?;
        write_json(&dir.join("config.json"), &self.config_json())?;
        write_json(&dir.join("campaign.json"), &self.campaign_json()?)?;
        write_json(&dir.join("custom_reports.json"), &self.reports_json())?;
        Ok(())
    }

    fn species_blocks(&self) -> &[Value] {
        match self.params.get("Vector_Species_Params") {
            Some(Value::Array(blocks)) => blocks,
            _ => &[],
        }
    }

    fn species_block_mut(&mut self, species: &str) -> &mut Map<String, Value> {
        if !self.species_names().iter().any(|n| n == species) {
            let names = self
                .params
                .entry("Vector_Species_Names".to_string())
                .or_insert_with(|| json!([]));
            if !names.is_array() {
                *names = json!([]);
            }
            if let Value::Array(list) = names {
                list.push(json!(species));
            }
        }

        let blocks = self
            .params
            .entry("Vector_Species_Params".to_string())
            .or_insert_with(|| json!([]));
        if !blocks.is_array() {
            *blocks = json!([]);
        }
        let Value::Array(list) = blocks else {
            unreachable!("species params were just made an array")
        };
        let index = match list.iter().position(|b| b["Name"] == json!(species)) {
            Some(index) => index,
            None => {
                list.push(default_species_block(species));
                list.len() - 1
            }
        };
        match &mut list[index] {
            Value::Object(map) => map,
            other => {
                *other = default_species_block(species);
                match other {
                    Value::Object(map) => map,
                    _ => unreachable!("default species block is an object"),
                }
            }
        }
    }
}

/// Writes `value` as pretty JSON to `path`.
pub fn write_json(path: &Path, value: &Value) -> Result<(), VgError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

fn default_params() -> Value {
    json!({
        "Simulation_Duration": 365,
        "Simulation_Timestep": 1,
        "Start_Time": 0,
        "Run_Number": 0,
        "Num_Cores": 1,
        "Geography": "",
        "Demographics_Filenames": [],
        "Enable_Demographics_Builtin": 1,
        "Default_Geography_Initial_Node_Population": 1000,
        "Default_Geography_Torus_Size": 10,
        "Enable_Vital_Dynamics": 1,
        "Enable_Natural_Mortality": 1,
        "Birth_Rate_Dependence": "FIXED_BIRTH_RATE",
        "Climate_Model": "CLIMATE_CONSTANT",
        "Base_Air_Temperature": 22.0,
        "Base_Land_Temperature": 26.0,
        "Base_Rainfall": 10.0,
        "Base_Relative_Humidity": 0.75,
        "Enable_Climate_Stochasticity": 0,
        "Vector_Sampling_Type": "TRACK_ALL_VECTORS",
        "Enable_Vector_Species_Report": 0,
        "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE",
        "Vector_Species_Names": [],
        "Vector_Species_Params": [],
        "Insecticides": [],
        "Enable_Vector_Aging": 0,
        "Enable_Vector_Migration": 0,
        "Enable_Local_Migration": 0,
        "Enable_Spatial_Output": 0,
        "Spatial_Output_Channels": [],
        "Custom_Individual_Events": [],
        "Listed_Events": [],
        "Report_Event_Recorder": 0,
        "Serialized_Population_Filenames": [],
        "Serialized_Population_Path": "",
        "Serialization_Time_Steps": [],
        "Config_Name": "",
        "logLevel_default": "INFO",
    })
}

fn malaria_params() -> Value {
    json!({
        "Malaria_Model": "MALARIA_MECHANISTIC_MODEL",
        "Malaria_Strain_Model": "FALCIPARUM_RANDOM_STRAIN",
        "Parasite_Smear_Sensitivity": 0.1,
        "New_Diagnostic_Sensitivity": 0.01,
        "Enable_Maternal_Protection": 1,
    })
}

fn default_species_block(species: &str) -> Value {
    json!({
        "Name": species,
        "Acquire_Modifier": 0.2,
        "Adult_Life_Expectancy": 10,
        "Male_Life_Expectancy": 10,
        "Anthropophily": 0.95,
        "Days_Between_Feeds": 3,
        "Egg_Batch_Size": 100,
        "Immature_Duration": 2,
        "Indoor_Feeding_Fraction": 0.5,
        "Infected_Egg_Batch_Factor": 0.8,
        "Larval_Habitat_Types": { "TEMPORARY_RAINFALL": 8e8 },
        "Transmission_Rate": 0.9,
        "Genes": [],
        "Drivers": [],
        "Gene_To_Trait_Modifiers": [],
    })
}
