//! Scenario orchestrator.
//!
//! This module coordinates scenario generation for a campaign, managing the
//! flow from descriptor validation through topology generation to the
//! scenario files consumed by the renderer.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::campaign::Campaign;
use crate::environment::{ConstantCollision, Environment};
use crate::params::{validate_all, Defaults, Descriptor, Diagnostic, ValidatedParameters, Validation};
use crate::topology::{generate_topology, Mote};

/// File written for each experiment
pub const SCENARIO_FILE: &str = "scenario.json";

/// Everything the renderer needs for one experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub experiment: String,
    pub seed: u64,
    pub parameters: ValidatedParameters,
    /// Root first, malicious mote last
    pub motes: Vec<Mote>,
    /// Same topology without the malicious mote, for the baseline run
    pub motes_without_malicious: Vec<Mote>,
    /// `#define` lines for the malicious mote
    pub malicious_constants: Vec<String>,
    pub constant_collisions: Vec<ConstantCollision>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Log every diagnostic and summarize the corrections
pub fn log_diagnostics(experiment: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        diagnostic.log();
    }
    let corrections = diagnostics.iter().filter(|d| d.is_correction()).count();
    if corrections > 0 {
        warn!("Experiment '{}': {} parameter(s) corrected", experiment, corrections);
    }
}

/// Validate one experiment descriptor and log what was corrected
pub fn validate_experiment(experiment: &str, descriptor: &Descriptor, defaults: &Defaults, env: &Environment) -> Result<Validation> {
    let validation = validate_all(descriptor, defaults, env)
        .wrap_err_with(|| format!("Validation of experiment '{}' failed", experiment))?;
    log_diagnostics(experiment, &validation.diagnostics);
    Ok(validation)
}

/// Build the scenario of one experiment
pub fn prepare_scenario<R: Rng + ?Sized>(
    rng: &mut R,
    experiment: &str,
    descriptor: &Descriptor,
    defaults: &Defaults,
    env: &Environment,
    seed: u64,
) -> Result<Scenario> {
    let Validation { parameters, diagnostics } = validate_experiment(experiment, descriptor, defaults, env)?;

    let topology = generate_topology(rng, parameters.n, Some(parameters.max_range), &parameters.placement_bounds())
        .wrap_err_with(|| format!("Topology generation for experiment '{}' failed", experiment))?;
    info!("Experiment '{}': placed {} motes", experiment, topology.len());

    let constants = env.catalog().constants(&parameters.blocks);

    Ok(Scenario {
        experiment: experiment.to_string(),
        seed,
        motes_without_malicious: topology.without_malicious().to_vec(),
        motes: topology.into_motes(),
        malicious_constants: constants.render_defines(),
        constant_collisions: constants.collisions,
        parameters,
        diagnostics,
    })
}

/// Directory of an experiment under `output_dir`.
///
/// The name must be a single plain path component so that nothing is
/// written outside `output_dir`.
pub fn experiment_dir(output_dir: &Path, experiment: &str) -> Result<PathBuf> {
    let mut components = Path::new(experiment).components();
    let single = matches!((components.next(), components.next()), (Some(Component::Normal(_)), None));
    if !single || experiment.contains(['/', '\\']) {
        return Err(eyre!(
            "Invalid experiment name '{}': it must be a plain directory name",
            experiment
        ));
    }
    Ok(output_dir.join(experiment))
}

/// Write a scenario to `<output_dir>/<experiment>/scenario.json`
pub fn write_scenario(scenario: &Scenario, output_dir: &Path) -> Result<PathBuf> {
    let dir = experiment_dir(output_dir, &scenario.experiment)?;
    fs::create_dir_all(&dir).wrap_err_with(|| format!("Failed to create experiment directory '{}'", dir.display()))?;

    let path = dir.join(SCENARIO_FILE);
    let content = serde_json::to_string_pretty(scenario)?;
    fs::write(&path, content).wrap_err_with(|| format!("Failed to write scenario file '{}'", path.display()))?;
    Ok(path)
}

/// Generate and write the scenarios of every experiment of a campaign.
///
/// One RNG drives the whole campaign; experiments are processed in name
/// order so a given seed reproduces the same scenarios.
pub fn generate_campaign(
    campaign: &Campaign,
    defaults: &Defaults,
    env: &Environment,
    output_dir: &Path,
    seed: Option<u64>,
) -> Result<Vec<PathBuf>> {
    for experiment in campaign.experiments.keys() {
        experiment_dir(output_dir, experiment)
            .wrap_err("Campaign contains an experiment name unusable as a directory")?;
    }

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("Using seed {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut written = Vec::with_capacity(campaign.len());
    for (experiment, descriptor) in &campaign.experiments {
        info!("Preparing experiment '{}'", experiment);
        let scenario = prepare_scenario(&mut rng, experiment, descriptor, defaults, env, seed)?;
        let path = write_scenario(&scenario, output_dir)?;
        info!("Scenario written to: {:?}", path);
        written.push(path);
    }

    Ok(written)
}
