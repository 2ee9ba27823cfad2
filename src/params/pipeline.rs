//! Ordered validation of a whole experiment descriptor.
//!
//! Each [`Step`] names the parameter it produces, the parameters it reads
//! and the [`Rule`] its value must satisfy. Steps run in table order and a
//! step may only read parameters resolved by an earlier step, so the range
//! checks (`tx_range > dmin`, `dmax <= tx_range`, ...) always see the
//! already-validated values of their dependencies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use std::fmt;
use std::path::{Path, PathBuf};

use super::defaults::Defaults;
use super::descriptor::{Descriptor, Section};
use super::diagnostics::Diagnostic;
use super::validator::{get_list_parameter, get_parameter};
use crate::environment::Environment;
use crate::topology::PlacementBounds;

/// Errors in the validation machinery itself; bad values never end up here
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Step '{param}' reads '{dependency}' before it has been validated")]
    UnresolvedDependency { param: Param, dependency: Param },

    #[error("Step '{param}' declares {declared} dependencies but its rule needs {expected}")]
    DependencyArity { param: Param, declared: usize, expected: usize },

    #[error("Dependency '{dependency}' of '{param}' is not a number: {value}")]
    NonNumericDependency { param: Param, dependency: Param, value: Value },

    #[error("Invalid defaults: {0}")]
    InvalidDefaults(String),

    #[error("Malformed parameter set: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Role the malicious mote impersonates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaliciousRole {
    Root,
    Sensor,
}

/// Every parameter of an experiment descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    Title,
    Goal,
    Notes,
    Duration,
    NumberMotes,
    Repeat,
    Target,
    MaliciousType,
    BuildingBlocks,
    ExternalLibrary,
    MinDistance,
    TxRange,
    IntRange,
    MaxDistance,
    AreaSide,
    MaxRange,
}

impl Param {
    /// Key of the parameter inside its descriptor section
    pub const fn key(self) -> &'static str {
        match self {
            Param::Title => "title",
            Param::Goal => "goal",
            Param::Notes => "notes",
            Param::Duration => "duration",
            Param::NumberMotes => "number-motes",
            Param::Repeat => "repeat",
            Param::Target => "target",
            Param::MaliciousType => "type",
            Param::BuildingBlocks => "building-blocks",
            Param::ExternalLibrary => "external-library",
            Param::MinDistance => "minimum-distance-between-motes",
            Param::TxRange => "transmitting_range",
            Param::IntRange => "interference_range",
            Param::MaxDistance => "maximum-distance-between-motes",
            Param::AreaSide => "area-square-side",
            Param::MaxRange => "maximum-range-from-root",
        }
    }

    pub const fn section(self) -> Section {
        match self {
            Param::MaliciousType | Param::BuildingBlocks | Param::ExternalLibrary | Param::MaxRange => Section::Malicious,
            _ => Section::Simulation,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Predicate a parameter value must satisfy.
///
/// Range rules compare against the numeric values of the step's declared
/// dependencies, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Text,
    PositiveInteger,
    /// One of the platforms known to the environment
    Platform,
    OneOf(&'static [&'static str]),
    /// List whose entries each name a catalogued building block
    KnownBlocks,
    /// An existing filesystem path
    ExistingPath,
    PositiveNumber,
    /// `x > a`
    GreaterThan,
    /// `x >= a`
    AtLeast,
    /// `a < x <= b`
    AboveUpTo,
    /// `x >= k * a`
    ScaledAtLeast(f64),
    /// `a <= x <= b`
    Within,
}

impl Rule {
    /// Number of numeric dependencies the rule compares against
    pub const fn arity(&self) -> usize {
        match self {
            Rule::GreaterThan | Rule::AtLeast | Rule::ScaledAtLeast(_) => 1,
            Rule::AboveUpTo | Rule::Within => 2,
            _ => 0,
        }
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Rule::KnownBlocks)
    }

    /// Check a value (or a list entry for list rules)
    pub fn check(&self, value: &Value, deps: &[f64], env: &Environment) -> Result<(), String> {
        let number = value.as_f64();
        let ok = match *self {
            Rule::Text => value.is_string(),
            Rule::PositiveInteger => value.as_u64().map_or(false, |v| v > 0 && v <= u64::from(u32::MAX)),
            Rule::Platform => value.as_str().map_or(false, |p| env.has_platform(p)),
            Rule::OneOf(options) => value.as_str().map_or(false, |s| options.contains(&s)),
            Rule::KnownBlocks => value.as_str().map_or(false, |b| env.catalog().contains(b)),
            Rule::ExistingPath => match value {
                Value::Null => true,
                Value::String(path) => Path::new(path).exists(),
                _ => false,
            },
            Rule::PositiveNumber => number.map_or(false, |x| x > 0.0),
            Rule::GreaterThan => number.map_or(false, |x| x > deps[0]),
            Rule::AtLeast => number.map_or(false, |x| x >= deps[0]),
            Rule::AboveUpTo => number.map_or(false, |x| deps[0] < x && x <= deps[1]),
            Rule::ScaledAtLeast(k) => number.map_or(false, |x| x >= k * deps[0]),
            Rule::Within => number.map_or(false, |x| deps[0] <= x && x <= deps[1]),
        };
        if ok {
            Ok(())
        } else {
            Err(self.reason(deps))
        }
    }

    fn reason(&self, deps: &[f64]) -> String {
        match *self {
            Rule::Text => "is not a string".to_string(),
            Rule::PositiveInteger => "is not an integer greater than 0".to_string(),
            Rule::Platform => "is not a valid platform".to_string(),
            Rule::OneOf(options) => {
                let quoted: Vec<String> = options.iter().map(|o| format!("'{}'", o)).collect();
                format!("is not one of {}", quoted.join(", "))
            }
            Rule::KnownBlocks => "is not a known building block".to_string(),
            Rule::ExistingPath => "does not exist".to_string(),
            Rule::PositiveNumber => "is not a number greater than 0".to_string(),
            Rule::GreaterThan => format!("is not a number greater than {}", deps[0]),
            Rule::AtLeast => format!("is not a number greater than or equal to {}", deps[0]),
            Rule::AboveUpTo => format!("is not a number greater than {} and at most {}", deps[0], deps[1]),
            Rule::ScaledAtLeast(k) => format!("is not a number greater than or equal to {:.4}*{}", k, deps[0]),
            Rule::Within => format!("is not a number between {} and {}", deps[0], deps[1]),
        }
    }
}

/// One validation step: `param` must satisfy `rule` given the values of `reads`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub param: Param,
    pub reads: &'static [Param],
    pub rule: Rule,
}

impl Step {
    pub const fn new(param: Param, reads: &'static [Param], rule: Rule) -> Self {
        Self { param, reads, rule }
    }

    /// Numeric values of the declared dependencies
    fn dependencies(&self, resolved: &BTreeMap<Param, Value>) -> Result<Vec<f64>, ValidationError> {
        if self.reads.len() != self.rule.arity() {
            return Err(ValidationError::DependencyArity {
                param: self.param,
                declared: self.reads.len(),
                expected: self.rule.arity(),
            });
        }
        self.reads
            .iter()
            .map(|&dependency| {
                let value = resolved
                    .get(&dependency)
                    .ok_or(ValidationError::UnresolvedDependency { param: self.param, dependency })?;
                value.as_f64().ok_or_else(|| ValidationError::NonNumericDependency {
                    param: self.param,
                    dependency,
                    value: value.clone(),
                })
            })
            .collect()
    }
}

/// The validation order for a campaign experiment
pub const STEPS: &[Step] = &[
    Step::new(Param::Title, &[], Rule::Text),
    Step::new(Param::Goal, &[], Rule::Text),
    Step::new(Param::Notes, &[], Rule::Text),
    Step::new(Param::Duration, &[], Rule::PositiveInteger),
    Step::new(Param::NumberMotes, &[], Rule::PositiveInteger),
    Step::new(Param::Repeat, &[], Rule::PositiveInteger),
    Step::new(Param::Target, &[], Rule::Platform),
    Step::new(Param::MaliciousType, &[], Rule::OneOf(&["root", "sensor"])),
    Step::new(Param::BuildingBlocks, &[], Rule::KnownBlocks),
    Step::new(Param::ExternalLibrary, &[], Rule::ExistingPath),
    Step::new(Param::MinDistance, &[], Rule::PositiveNumber),
    Step::new(Param::TxRange, &[Param::MinDistance], Rule::GreaterThan),
    Step::new(Param::IntRange, &[Param::TxRange], Rule::AtLeast),
    Step::new(Param::MaxDistance, &[Param::MinDistance, Param::TxRange], Rule::AboveUpTo),
    Step::new(Param::AreaSide, &[Param::MinDistance], Rule::ScaledAtLeast(SQRT_2)),
    Step::new(Param::MaxRange, &[Param::MinDistance, Param::AreaSide], Rule::Within),
];

/// Fully validated parameters of one experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedParameters {
    pub title: String,
    pub goal: String,
    pub notes: String,
    pub duration: u32,
    #[serde(rename = "number-motes")]
    pub n: u32,
    pub repeat: u32,
    pub target: String,
    #[serde(rename = "type")]
    pub mtype: MaliciousRole,
    #[serde(rename = "building-blocks")]
    pub blocks: Vec<String>,
    #[serde(rename = "external-library")]
    pub ext_lib: Option<PathBuf>,
    #[serde(rename = "minimum-distance-between-motes")]
    pub dmin: f64,
    #[serde(rename = "transmitting_range")]
    pub tx_range: f64,
    #[serde(rename = "interference_range")]
    pub int_range: f64,
    #[serde(rename = "maximum-distance-between-motes")]
    pub dmax: f64,
    #[serde(rename = "area-square-side")]
    pub area_side: f64,
    #[serde(rename = "maximum-range-from-root")]
    pub max_range: f64,
}

impl ValidatedParameters {
    fn from_resolved(resolved: BTreeMap<Param, Value>) -> Result<Self, ValidationError> {
        let map: Map<String, Value> = resolved
            .into_iter()
            .map(|(param, value)| (param.key().to_string(), value))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Rebuild a descriptor holding exactly these values
    pub fn to_descriptor(&self) -> Result<Descriptor, ValidationError> {
        let flat = serde_json::to_value(self)?;
        let mut descriptor = Descriptor::default();
        for step in STEPS {
            let key = step.param.key();
            if let Some(value) = flat.get(key) {
                descriptor.set(step.param.section(), key, value.clone());
            }
        }
        Ok(descriptor)
    }

    /// Placement bounds for the topology: a disk inscribed in the area square
    pub fn placement_bounds(&self) -> PlacementBounds {
        PlacementBounds::for_area(self.area_side, self.dmin, self.dmax)
    }
}

/// Outcome of validating one descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub parameters: ValidatedParameters,
    pub diagnostics: Vec<Diagnostic>,
}

impl Validation {
    /// Diagnostics for values that were provided but rejected
    pub fn corrections(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_correction())
    }

    pub fn diagnostics_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.key == key)
    }
}

/// Run `steps` in order over `descriptor`
pub fn run_steps(
    steps: &[Step],
    descriptor: &Descriptor,
    defaults: &Defaults,
    env: &Environment,
) -> Result<(BTreeMap<Param, Value>, Vec<Diagnostic>), ValidationError> {
    let table = defaults.table()?;
    let mut resolved = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for step in steps {
        let deps = step.dependencies(&resolved)?;
        let section = step.param.section();
        let key = step.param.key();
        let check = |value: &Value| step.rule.check(value, &deps, env);

        let resolution = if step.rule.is_list() {
            get_list_parameter(descriptor, section, key, &table, check)
        } else {
            get_parameter(descriptor, section, key, &table, check)
        };

        diagnostics.extend(resolution.diagnostics);
        resolved.insert(step.param, resolution.value);
    }

    Ok((resolved, diagnostics))
}

/// Validate every parameter of an experiment descriptor.
///
/// Bad or missing values are replaced by `defaults` and reported in the
/// returned diagnostics. An `Err` means the step table or the defaults are
/// broken, never that the descriptor was.
pub fn validate_all(descriptor: &Descriptor, defaults: &Defaults, env: &Environment) -> Result<Validation, ValidationError> {
    let (resolved, diagnostics) = run_steps(STEPS, descriptor, defaults, env)?;
    let parameters = ValidatedParameters::from_resolved(resolved)?;
    Ok(Validation { parameters, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BuildingBlockCatalog;
    use crate::params::diagnostics::DiagnosticKind;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn env() -> Environment {
        let catalog: BuildingBlockCatalog = serde_json::from_value(json!({
            "hello-flood": { "HELLO_FLOOD": 1 },
            "increased-version": { "RPL_CONF_DIO_INTERVAL_MIN": 8 }
        }))
        .unwrap();
        Environment::new().with_platforms(["z1", "sky", "wismote"]).with_catalog(catalog)
    }

    fn full_descriptor() -> Descriptor {
        Descriptor::new(json!({
            "simulation": {
                "title": "Flooding",
                "goal": "Observe DIO storms",
                "notes": "baseline",
                "duration": 120,
                "number-motes": 5,
                "repeat": 2,
                "target": "sky",
                "minimum-distance-between-motes": 10,
                "transmitting_range": 50,
                "interference_range": 50,
                "maximum-distance-between-motes": 40,
                "area-square-side": 100
            },
            "malicious": {
                "type": "root",
                "building-blocks": ["hello-flood"],
                "maximum-range-from-root": 60
            }
        }))
    }

    #[test]
    fn test_steps_only_read_earlier_parameters() {
        for (i, step) in STEPS.iter().enumerate() {
            assert_eq!(step.reads.len(), step.rule.arity(), "arity of {}", step.param);
            for dep in step.reads {
                assert!(
                    STEPS[..i].iter().any(|s| s.param == *dep),
                    "{} reads {} which is not validated earlier",
                    step.param,
                    dep
                );
            }
        }
    }

    #[test]
    fn test_valid_descriptor_is_kept() {
        let validation = validate_all(&full_descriptor(), &Defaults::default(), &env()).unwrap();
        let p = &validation.parameters;

        assert_eq!(p.dmin, 10.0);
        assert_eq!(p.tx_range, 50.0);
        assert_eq!(p.int_range, 50.0);
        assert_eq!(p.dmax, 40.0);
        assert_eq!(p.area_side, 100.0);
        assert_eq!(p.n, 5);
        assert_eq!(p.max_range, 60.0);
        assert_eq!(p.target, "sky");
        assert_eq!(p.mtype, MaliciousRole::Root);
        assert_eq!(p.blocks, vec!["hello-flood".to_string()]);

        // only the absent external library falls back
        assert_eq!(validation.diagnostics.len(), 1);
        assert_eq!(validation.diagnostics[0].key, "external-library");
        assert_eq!(validation.corrections().count(), 0);
    }

    #[test]
    fn test_missing_dmin_defaults_with_single_diagnostic() {
        let mut value = full_descriptor().into_value();
        value["simulation"].as_object_mut().unwrap().remove("minimum-distance-between-motes");
        let descriptor = Descriptor::new(value);

        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        assert_eq!(validation.parameters.dmin, 20.0);
        let for_key: Vec<_> = validation.diagnostics_for("minimum-distance-between-motes").collect();
        assert_eq!(for_key.len(), 1);
        assert!(matches!(for_key[0].kind, DiagnosticKind::Defaulted { .. }));
    }

    #[test]
    fn test_dependent_ranges_use_validated_values() {
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Simulation, "minimum-distance-between-motes", json!(-5));
        descriptor.set(Section::Simulation, "transmitting_range", json!(15));

        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        let p = &validation.parameters;
        // dmin falls back to 20, so a transmitting range of 15 is no longer valid
        assert_eq!(p.dmin, 20.0);
        assert_eq!(p.tx_range, 50.0);
        assert_eq!(validation.corrections().count(), 2);
    }

    #[test]
    fn test_range_rules_reject_boundaries() {
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Simulation, "transmitting_range", json!(10));
        descriptor.set(Section::Simulation, "maximum-distance-between-motes", json!(10));
        descriptor.set(Section::Simulation, "area-square-side", json!(14));
        descriptor.set(Section::Malicious, "maximum-range-from-root", json!(150));

        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        let p = &validation.parameters;
        assert_eq!(p.tx_range, 50.0);
        assert_eq!(p.dmax, 50.0);
        assert_eq!(p.area_side, 200.0);
        // the area fell back to 200, which puts 150 back in range
        assert_eq!(p.max_range, 150.0);
    }

    #[test]
    fn test_max_range_checked_against_resolved_area() {
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Malicious, "maximum-range-from-root", json!(100));
        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        assert_eq!(validation.parameters.max_range, 100.0);

        descriptor.set(Section::Malicious, "maximum-range-from-root", json!(100.5));
        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        assert_eq!(validation.parameters.max_range, 100.0);
        assert_eq!(validation.corrections().count(), 1);
    }

    #[test]
    fn test_typed_rules() {
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Simulation, "title", json!(42));
        descriptor.set(Section::Simulation, "duration", json!(1.5));
        descriptor.set(Section::Simulation, "number-motes", json!(-4));
        descriptor.set(Section::Simulation, "target", json!("cooja-native"));
        descriptor.set(Section::Malicious, "type", json!("malicious"));
        descriptor.set(Section::Malicious, "building-blocks", json!(["hello-flood", "wormhole"]));

        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        let p = &validation.parameters;
        assert_eq!(p.title, "Default title");
        assert_eq!(p.duration, 300);
        assert_eq!(p.n, 10);
        assert_eq!(p.target, "z1");
        assert_eq!(p.mtype, MaliciousRole::Sensor);
        assert_eq!(p.blocks, vec!["hello-flood".to_string()]);
        assert_eq!(validation.corrections().count(), 6);
    }

    #[test]
    fn test_external_library_must_exist() {
        let lib = NamedTempFile::new().unwrap();
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Malicious, "external-library", json!(lib.path().to_string_lossy()));
        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        assert_eq!(validation.parameters.ext_lib.as_deref(), Some(lib.path()));

        descriptor.set(Section::Malicious, "external-library", json!("/definitely/not/here.c"));
        let validation = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        assert_eq!(validation.parameters.ext_lib, None);
        assert_eq!(validation.corrections().count(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Simulation, "interference_range", json!(20));
        descriptor.set(Section::Simulation, "notes", json!(""));

        let first = validate_all(&descriptor, &Defaults::default(), &env()).unwrap();
        let again = validate_all(&first.parameters.to_descriptor().unwrap(), &Defaults::default(), &env()).unwrap();
        assert_eq!(first.parameters, again.parameters);
        assert_eq!(again.corrections().count(), 0);
    }

    #[test]
    fn test_rejected_blocks_are_idempotent_with_block_default() {
        let defaults = Defaults {
            building_blocks: vec!["hello-flood".to_string()],
            ..Defaults::default()
        };
        let mut descriptor = full_descriptor();
        descriptor.set(Section::Malicious, "building-blocks", json!(["bogus"]));

        let first = validate_all(&descriptor, &defaults, &env()).unwrap();
        assert_eq!(first.parameters.blocks, vec!["hello-flood".to_string()]);
        assert_eq!(first.diagnostics_for("building-blocks").count(), 1);

        let again = validate_all(&first.parameters.to_descriptor().unwrap(), &defaults, &env()).unwrap();
        assert_eq!(first.parameters, again.parameters);
        assert_eq!(again.corrections().count(), 0);
    }

    #[test]
    fn test_out_of_order_step_table_is_an_error() {
        let steps = [
            Step::new(Param::TxRange, &[Param::MinDistance], Rule::GreaterThan),
            Step::new(Param::MinDistance, &[], Rule::PositiveNumber),
        ];
        let err = run_steps(&steps, &full_descriptor(), &Defaults::default(), &env()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnresolvedDependency { param: Param::TxRange, dependency: Param::MinDistance }
        ));
    }

    #[test]
    fn test_arity_mismatch_is_an_error() {
        let steps = [Step::new(Param::MaxRange, &[Param::MinDistance], Rule::Within)];
        let err = run_steps(&steps, &full_descriptor(), &Defaults::default(), &env()).unwrap_err();
        assert!(matches!(err, ValidationError::DependencyArity { declared: 1, expected: 2, .. }));
    }
}
