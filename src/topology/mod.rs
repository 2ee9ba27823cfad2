//! Mote topology module.
//!
//! This module contains the mote placement logic: rejection sampling of
//! single positions under distance bounds, and the generation of a full
//! topology around a root mote.

pub mod types;
pub mod placement;
pub mod generator;

// Re-export key types and functions for easier access
pub use types::{Mote, MoteType, PlacementBounds, Topology, DEFAULT_MAX_PLACEMENT_ATTEMPTS};
pub use placement::{place_single_mote, TopologyError};
pub use generator::generate_topology;
