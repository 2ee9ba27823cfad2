//! # MoteSim - Scenario generator for wireless sensor network simulations
//!
//! This library prepares randomized WSN simulation scenarios: it validates
//! the parameters of a campaign descriptor and places the motes of a
//! topology under geometric constraints.
//!
//! ## Overview
//!
//! A campaign groups experiments. Each experiment describes a network of
//! one root mote, `n` sensor motes and one malicious mote used to study an
//! attack. MoteSim turns each experiment into a scenario file that a
//! renderer turns into simulator configuration.
//!
//! ## Key Features
//!
//! - **Fail-soft validation**: bad or missing parameters fall back to named
//!   defaults and are reported as diagnostics
//! - **Dependency-aware ranges**: `tx_range > dmin`, `dmin < dmax <= tx_range`,
//!   `area_side >= sqrt(2) * dmin`, ... checked against already-validated values
//! - **Constrained placement**: every pair of motes farther apart than `dmin`,
//!   every new mote within `dmax` of an earlier one
//! - **Bounded sampling**: infeasible bounds produce an error instead of a hang
//! - **Reproducible**: all randomness comes from a seedable RNG
//!
//! ## Architecture
//!
//! - `params`: descriptor access, defaults, single-parameter validators and
//!   the ordered validation pipeline
//! - `topology`: mote types, rejection sampling and topology generation
//! - `environment`: target platforms and the building-block catalog
//! - `campaign`: campaign file loading
//! - `orchestrator`: per-experiment validation, generation and output
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use motesim::{campaign, environment::Environment, orchestrator, params::Defaults};
//! use std::path::Path;
//!
//! let campaign = campaign::load_campaign(Path::new("campaigns/flooding.json"))?;
//! let env = Environment::new().with_platforms(["z1", "sky"]);
//!
//! // Writes experiments/<experiment>/scenario.json for every experiment
//! orchestrator::generate_campaign(&campaign, &Defaults::default(), &env, Path::new("experiments"), Some(42))?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Campaign Format
//!
//! ```json
//! {
//!   "flooding": {
//!     "simulation": {
//!       "title": "Hello flood",
//!       "number-motes": 10,
//!       "target": "z1",
//!       "minimum-distance-between-motes": 20,
//!       "transmitting_range": 50,
//!       "interference_range": 50,
//!       "maximum-distance-between-motes": 50,
//!       "area-square-side": 200
//!     },
//!     "malicious": {
//!       "type": "sensor",
//!       "building-blocks": ["hello-flood"],
//!       "maximum-range-from-root": 100
//!     }
//!   }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library components report typed errors (`thiserror`); application-level
//! flows (loading, orchestration) return `color_eyre` results with context.

pub mod campaign;
pub mod environment;
pub mod orchestrator;
pub mod params;
pub mod topology;
