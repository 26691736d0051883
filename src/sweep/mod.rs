//! Sweeps over scenario parameters.
//!
//! A sweep is a list of [`SweepPoint`]s. Each point is an ordered list of [`ModFn`]s; applying a
//! point to a clone of the base configuration yields one simulation's configuration together with
//! the tags identifying it. Points are usually generated as a Cartesian product over parameter
//! lists, one block per experiment arm:
//!
//! ```
//! use vgsweep::config::{ConfigBuilder, SimType};
//! use vgsweep::sweep::{cartesian, ModFn, SweepBuilder, TagValue};
//!
//! let points: Vec<Vec<ModFn>> = cartesian(&[vec![0, 1], vec![100, 1000]])
//!     .into_iter()
//!     .map(|axes| {
//!         vec![
//!             ModFn::set_param("Run_Number", axes[0]),
//!             ModFn::set_param("Released_Number", axes[1]),
//!         ]
//!     })
//!     .collect();
//! let builder = SweepBuilder::from_list(points);
//! assert_eq!(builder.len(), 4);
//!
//! let base = ConfigBuilder::from_defaults(SimType::VectorSim);
//! let configured = builder.points()[1].apply(&base).unwrap();
//! assert_eq!(configured.tags["Released_Number"], TagValue::from(1000));
//! ```

pub mod experiments;
pub mod plan;
mod tags;

use crate::config::ConfigBuilder;
use crate::error::VgError;
use crate::log::trace;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use tags::{tags, TagValue, Tags, RUN_NUMBER};

type ModFnBody = dyn Fn(&mut ConfigBuilder) -> Result<Tags, VgError> + Send + Sync;

/// A named configuration update that reports the tags it applied.
#[derive(Clone)]
pub struct ModFn {
    name: String,
    body: Arc<ModFnBody>,
}

impl ModFn {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut ConfigBuilder) -> Result<Tags, VgError> + Send + Sync + 'static,
    {
        ModFn {
            name: name.to_string(),
            body: Arc::new(body),
        }
    }

    /// A `ModFn` from an update that cannot fail.
    pub fn infallible<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut ConfigBuilder) -> Tags + Send + Sync + 'static,
    {
        Self::new(name, move |cb| Ok(body(cb)))
    }

    /// Sets `name` to `value`, tagging the simulation with it when the value is a scalar.
    pub fn set_param(name: &str, value: impl Into<Value>) -> Self {
        let param = name.to_string();
        let value: Value = value.into();
        Self::infallible(&format!("set_param({name})"), move |cb| {
            cb.set_param(&param, value.clone());
            match TagValue::from_json(&value) {
                Some(tag) => Tags::from([(param.clone(), tag)]),
                None => Tags::new(),
            }
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, cb: &mut ConfigBuilder) -> Result<Tags, VgError> {
        trace!("applying {}", self.name);
        (self.body)(cb)
    }
}

impl fmt::Debug for ModFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModFn").field("name", &self.name).finish()
    }
}

/// A simulation's configuration and the tags of the sweep point that produced it.
#[derive(Debug, Clone)]
pub struct ConfiguredPoint {
    pub config: ConfigBuilder,
    pub tags: Tags,
}

/// One point of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepPoint(pub Vec<ModFn>);

impl SweepPoint {
    /// Applies every update, in order, to a clone of `base`. Later tags overwrite earlier ones
    /// with the same name.
    pub fn apply(&self, base: &ConfigBuilder) -> Result<ConfiguredPoint, VgError> {
        let mut config = base.clone();
        let mut tags = Tags::new();
        for mod_fn in &self.0 {
            tags.extend(mod_fn.apply(&mut config)?);
        }
        Ok(ConfiguredPoint { config, tags })
    }
}

/// An ordered collection of sweep points.
#[derive(Debug, Clone, Default)]
pub struct SweepBuilder {
    points: Vec<SweepPoint>,
}

impl SweepBuilder {
    #[must_use]
    pub fn from_list(points: Vec<Vec<ModFn>>) -> Self {
        SweepBuilder {
            points: points.into_iter().map(SweepPoint).collect(),
        }
    }

    /// One point per combination of the given parameter values, each a `set_param`. The first
    /// parameter varies slowest.
    pub fn from_dict(params: IndexMap<String, Vec<Value>>) -> Result<Self, VgError> {
        if params.values().any(Vec::is_empty) {
            return Err(VgError::InvalidSweep(
                "every swept parameter needs at least one value".to_string(),
            ));
        }
        let names: Vec<&String> = params.keys().collect();
        let axes: Vec<Vec<Value>> = params.values().cloned().collect();
        let points = cartesian(&axes)
            .into_iter()
            .map(|values| {
                names
                    .iter()
                    .zip(values)
                    .map(|(name, value)| ModFn::set_param(name, value))
                    .collect()
            })
            .collect();
        Ok(Self::from_list(points))
    }

    /// Appends the points of `other` after this builder's points.
    #[must_use]
    pub fn concat(mut self, other: SweepBuilder) -> Self {
        self.points.extend(other.points);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SweepPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a SweepBuilder {
    type Item = &'a SweepPoint;
    type IntoIter = std::slice::Iter<'a, SweepPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// The Cartesian product of `axes`, first axis outermost. No axes gives one empty combination;
/// any empty axis gives none.
#[must_use]
pub fn cartesian<T: Clone>(axes: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut combinations: Vec<Vec<T>> = vec![Vec::with_capacity(axes.len())];
    for axis in axes {
        let mut next = Vec::with_capacity(combinations.len() * axis.len());
        for prefix in &combinations {
            for value in axis {
                let mut combination = prefix.clone();
                combination.push(value.clone());
                next.push(combination);
            }
        }
        combinations = next;
    }
    combinations
}

/// A `set_param("Run_Number", seed)` for each seed in `0..n`.
#[must_use]
pub fn seeds(n: u32) -> Vec<ModFn> {
    (0..n).map(|seed| ModFn::set_param(RUN_NUMBER, seed)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimType;
    use serde_json::json;

    #[test]
    fn cartesian_first_axis_outermost() {
        let product = cartesian(&[vec!['a', 'b'], vec!['x', 'y', 'z']]);
        assert_eq!(product.len(), 6);
        assert_eq!(product[0], vec!['a', 'x']);
        assert_eq!(product[1], vec!['a', 'y']);
        assert_eq!(product[3], vec!['b', 'x']);
    }

    #[test]
    fn cartesian_edge_cases() {
        let none: Vec<Vec<u8>> = Vec::new();
        assert_eq!(cartesian(&none), vec![Vec::<u8>::new()]);
        assert!(cartesian(&[vec![1], vec![]]).is_empty());
    }

    #[test]
    fn set_param_tags_scalars_only() {
        let mut cb = ConfigBuilder::from_defaults(SimType::VectorSim);
        let tags = ModFn::set_param("Serialized_Population_Path", "").apply(&mut cb).unwrap();
        assert_eq!(tags["Serialized_Population_Path"], TagValue::from(""));

        let tags = ModFn::set_param("Listed_Events", json!(["Immigrating"]))
            .apply(&mut cb)
            .unwrap();
        assert!(tags.is_empty());
        assert_eq!(cb.get_param("Listed_Events"), Some(&json!(["Immigrating"])));
    }

    #[test]
    fn apply_leaves_base_untouched() {
        let base = ConfigBuilder::from_defaults(SimType::VectorSim);
        let point = SweepPoint(vec![
            ModFn::set_param("Run_Number", 3),
            ModFn::infallible("label", |_| tags([("Label", "GM".into())])),
        ]);
        let configured = point.apply(&base).unwrap();
        assert_eq!(configured.config.get_param("Run_Number"), Some(&json!(3)));
        assert_eq!(base.get_param("Run_Number"), Some(&json!(0)));
        assert_eq!(configured.tags.len(), 2);
        assert_eq!(configured.tags[RUN_NUMBER], TagValue::from(3));
    }

    #[test]
    fn later_tags_win() {
        let base = ConfigBuilder::from_defaults(SimType::VectorSim);
        let point = SweepPoint(vec![
            ModFn::infallible("first", |_| tags([("Label", "3year".into())])),
            ModFn::infallible("second", |_| tags([("Label", "No_nets".into())])),
        ]);
        let configured = point.apply(&base).unwrap();
        assert_eq!(configured.tags["Label"], TagValue::from("No_nets"));
    }

    #[test]
    fn from_dict_builds_product() {
        let builder = SweepBuilder::from_dict(IndexMap::from([
            ("Run_Number".to_string(), vec![json!(0), json!(1), json!(2)]),
            ("x_Temporary_Larval_Habitat".to_string(), vec![json!(0.1), json!(1.0)]),
        ]))
        .unwrap();
        assert_eq!(builder.len(), 6);
        let base = ConfigBuilder::from_defaults(SimType::VectorSim);
        let last = builder.points()[5].apply(&base).unwrap();
        assert_eq!(last.tags[RUN_NUMBER], TagValue::from(2));
        assert_eq!(last.tags["x_Temporary_Larval_Habitat"], TagValue::from(1.0));

        let empty = SweepBuilder::from_dict(IndexMap::from([("Run_Number".to_string(), vec![])]));
        assert!(matches!(empty, Err(VgError::InvalidSweep(_))));
    }

    #[test]
    fn failing_mod_fn_propagates() {
        let base = ConfigBuilder::from_defaults(SimType::VectorSim);
        let point = SweepPoint(vec![ModFn::new("broken", |_| {
            Err(VgError::VgError("no such species".to_string()))
        })]);
        assert!(point.apply(&base).is_err());
    }

    #[test]
    fn seeds_and_concat() {
        let a = SweepBuilder::from_list(seeds(3).into_iter().map(|s| vec![s]).collect());
        let b = SweepBuilder::from_list(vec![vec![ModFn::set_param("Run_Number", 9)]]);
        let all = a.concat(b);
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().count(), 4);
        assert_eq!(all.points()[2].0[0].name(), "set_param(Run_Number)");
    }
}
