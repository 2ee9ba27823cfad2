//! Topology type definitions.
//!
//! This file contains the mote and topology types produced by the
//! generator and consumed by the scenario writer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a mote inside a generated topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoteType {
    /// Base station, always at the origin
    Root,
    /// Legitimate sensor node
    Sensor,
    /// Adversarial node injected for the attack scenario
    Malicious,
}

impl fmt::Display for MoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoteType::Root => "root",
            MoteType::Sensor => "sensor",
            MoteType::Malicious => "malicious",
        };
        f.write_str(name)
    }
}

/// A placed network node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mote {
    pub id: u32,
    #[serde(rename = "type")]
    pub mote_type: MoteType,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Mote {
    /// Create a mote on the z = 0 plane
    pub fn new(id: u32, mote_type: MoteType, x: f64, y: f64) -> Self {
        Self { id, mote_type, x, y, z: 0.0 }
    }

    /// The root mote, id 0 at the origin
    pub fn root() -> Self {
        Self::new(0, MoteType::Root, 0.0, 0.0)
    }

    /// Euclidean distance to a point in the placement plane
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }

    /// Euclidean distance to another mote
    pub fn distance_to(&self, other: &Mote) -> f64 {
        self.distance_to_point(other.x, other.y)
    }
}

/// Geometric bounds shared by every placement of one topology
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBounds {
    /// Radius of the sampling disk (half the area side)
    pub max_extent: f64,
    /// Every pair of motes must be strictly farther apart than this
    pub dmin: f64,
    /// Each new mote must be strictly closer than this to its nearest neighbour
    pub dmax: f64,
    /// Rejection sampling gives up after this many candidates
    pub max_attempts: u32,
}

/// Default cap on rejected candidates for a single mote
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 100_000;

impl PlacementBounds {
    pub fn new(max_extent: f64, dmin: f64, dmax: f64) -> Self {
        Self {
            max_extent,
            dmin,
            dmax,
            max_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }

    /// Bounds for a square area of the given side, sampled inside its inscribed disk
    pub fn for_area(area_side: f64, dmin: f64, dmax: f64) -> Self {
        Self::new(area_side / 2.0, dmin, dmax)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Ordered sequence of motes: root first, malicious mote last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    motes: Vec<Mote>,
}

impl Topology {
    pub(crate) fn from_motes(motes: Vec<Mote>) -> Self {
        Self { motes }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    pub fn len(&self) -> usize {
        self.motes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motes.is_empty()
    }

    pub fn root(&self) -> Option<&Mote> {
        self.motes.first()
    }

    pub fn malicious(&self) -> Option<&Mote> {
        self.motes.last().filter(|m| m.mote_type == MoteType::Malicious)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Mote> {
        self.motes.iter().filter(|m| m.mote_type == MoteType::Sensor)
    }

    /// All motes except the trailing malicious one, for the attack-free baseline run
    pub fn without_malicious(&self) -> &[Mote] {
        match self.malicious() {
            Some(_) => &self.motes[..self.motes.len() - 1],
            None => &self.motes,
        }
    }

    /// Smallest pairwise distance, `None` with fewer than two motes
    pub fn min_pairwise_distance(&self) -> Option<f64> {
        let mut min: Option<f64> = None;
        for (i, a) in self.motes.iter().enumerate() {
            for b in &self.motes[i + 1..] {
                let d = a.distance_to(b);
                min = Some(min.map_or(d, |m| m.min(d)));
            }
        }
        min
    }

    pub fn into_motes(self) -> Vec<Mote> {
        self.motes
    }
}
