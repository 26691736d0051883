//! Typed vector-genetics parameter blocks.
//!
//! These serialize to the field names the simulator expects inside a species' parameter block
//! (`Genes`, `Drivers`, `Gene_To_Trait_Modifiers`) and in the top-level `Insecticides` list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A gene with its initial allele frequencies and per-generation mutation rates.
///
/// Mutation keys are written `"from:to"`, e.g. `"a0:a1"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Gene {
    #[serde(rename = "Alleles")]
    pub alleles: IndexMap<String, f64>,
    #[serde(rename = "Mutations")]
    pub mutations: IndexMap<String, f64>,
}

impl Gene {
    #[must_use]
    pub fn new<const A: usize, const M: usize>(
        alleles: [(&str, f64); A],
        mutations: [(&str, f64); M],
    ) -> Self {
        Gene {
            alleles: alleles
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            mutations: mutations
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyLikelihood {
    #[serde(rename = "Copy_To_Allele")]
    pub copy_to_allele: String,
    #[serde(rename = "Likelihood")]
    pub likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlleleDriven {
    #[serde(rename = "Allele_To_Copy")]
    pub allele_to_copy: String,
    #[serde(rename = "Allele_To_Replace")]
    pub allele_to_replace: String,
    #[serde(rename = "Copy_To_Likelihood")]
    pub copy_to_likelihood: Vec<CopyLikelihood>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverType {
    Classic,
    IntegralAutonomous,
}

/// A gene drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(rename = "Driver_Type")]
    pub driver_type: DriverType,
    #[serde(rename = "Driving_Allele")]
    pub driving_allele: String,
    #[serde(rename = "Alleles_Driven")]
    pub alleles_driven: Vec<AlleleDriven>,
}

impl Driver {
    /// A classic drive where `driving` replaces `replaced` with probability `copy_to_likelihood`.
    #[must_use]
    pub fn classic(driving: &str, replaced: &str, copy_to_likelihood: f64) -> Self {
        Driver {
            driver_type: DriverType::Classic,
            driving_allele: driving.to_string(),
            alleles_driven: vec![AlleleDriven {
                allele_to_copy: driving.to_string(),
                allele_to_replace: replaced.to_string(),
                copy_to_likelihood: vec![
                    CopyLikelihood {
                        copy_to_allele: replaced.to_string(),
                        likelihood: 1.0 - copy_to_likelihood,
                    },
                    CopyLikelihood {
                        copy_to_allele: driving.to_string(),
                        likelihood: copy_to_likelihood,
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trait {
    TransmissionToHuman,
    InfectedByHuman,
    Mortality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "Trait")]
    pub trait_name: Trait,
    #[serde(rename = "Modifier")]
    pub modifier: f64,
}

/// Scales a vector trait for mosquitoes carrying a given allele combination.
///
/// Each allele combination is a pair of alleles, one per chromosome; `"*"` matches any allele and
/// `["X", "Y"]` selects by sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitModifier {
    #[serde(rename = "Allele_Combinations")]
    pub allele_combinations: Vec<[String; 2]>,
    #[serde(rename = "Trait_Modifiers")]
    pub trait_modifiers: Vec<Modifier>,
}

impl TraitModifier {
    #[must_use]
    pub fn new(combinations: &[[&str; 2]], trait_name: Trait, modifier: f64) -> Self {
        TraitModifier {
            allele_combinations: combinations
                .iter()
                .map(|[a, b]| [(*a).to_string(), (*b).to_string()])
                .collect(),
            trait_modifiers: vec![Modifier {
                trait_name,
                modifier,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resistance {
    #[serde(rename = "Allele_Combinations")]
    pub allele_combinations: Vec<[String; 2]>,
    #[serde(rename = "Blocking_Modifier")]
    pub blocking_modifier: f64,
    #[serde(rename = "Killing_Modifier")]
    pub killing_modifier: f64,
    #[serde(rename = "Species")]
    pub species: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insecticide {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Resistances")]
    pub resistances: Vec<Resistance>,
}

impl Insecticide {
    /// An insecticide with a single resistance entry against one allele pair.
    #[must_use]
    pub fn with_resistance(name: &str, species: &str, alleles: [&str; 2], killing: f64) -> Self {
        Insecticide {
            name: name.to_string(),
            resistances: vec![Resistance {
                allele_combinations: vec![[alleles[0].to_string(), alleles[1].to_string()]],
                blocking_modifier: 1.0,
                killing_modifier: killing,
                species: species.to_string(),
            }],
        }
    }
}
