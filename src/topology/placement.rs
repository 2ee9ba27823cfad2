//! Rejection sampling of a single mote position.
//!
//! Candidates are drawn inside the disk of radius `max_extent` and kept
//! only when they respect the distance bounds against the motes already
//! placed. Sampling is capped; a constraint set that cannot be met is
//! reported as [`TopologyError::InfeasibleConstraints`].

use log::debug;
use rand::Rng;

use super::types::{Mote, MoteType, PlacementBounds};

/// Errors raised while placing motes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error(
        "Infeasible constraints for mote {mote_id} after {attempts} attempts \
         (extent {max_extent}, dmin {dmin}, dmax {dmax}, root proximity {root_proximity:?})"
    )]
    InfeasibleConstraints {
        mote_id: u32,
        attempts: u32,
        max_extent: f64,
        dmin: f64,
        dmax: f64,
        root_proximity: Option<f64>,
    },

    #[error("Cannot place mote {mote_id}: no mote placed yet to anchor it")]
    NoAnchor { mote_id: u32 },

    #[error("Too many sensor motes: {n} leaves no id for the malicious mote")]
    TooManyMotes { n: u32 },
}

/// Draw a candidate uniformly over x, then a radius in `[|x|, extent]`.
///
/// The resulting point lies inside the disk of radius `extent`.
fn sample_candidate<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> (f64, f64) {
    let x = rng.gen_range(-extent..=extent);
    let r = rng.gen_range(x.abs()..=extent);
    let magnitude = (r * r - x * x).max(0.0).sqrt();
    let y = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    (x, y)
}

/// Acceptance test for a candidate.
///
/// `nearest` is the distance to the closest placed mote and `from_root` the
/// distance to the root. Both distance bounds are strict.
pub fn accepts(nearest: f64, from_root: f64, bounds: &PlacementBounds, root_proximity: Option<f64>) -> bool {
    if !(bounds.dmin < nearest && nearest < bounds.dmax) {
        return false;
    }
    match root_proximity {
        Some(limit) => from_root <= limit && nearest <= limit,
        None => true,
    }
}

/// Reject bound combinations no candidate can ever satisfy
fn check_feasible(mote_id: u32, bounds: &PlacementBounds, root_proximity: Option<f64>) -> Result<(), TopologyError> {
    let infeasible = !bounds.max_extent.is_finite()
        || bounds.max_extent <= 0.0
        || !bounds.dmin.is_finite()
        || bounds.dmin < 0.0
        || bounds.dmin >= bounds.dmax
        || bounds.max_attempts == 0
        || root_proximity.map_or(false, |limit| limit.is_nan() || limit <= bounds.dmin);

    if infeasible {
        return Err(TopologyError::InfeasibleConstraints {
            mote_id,
            attempts: 0,
            max_extent: bounds.max_extent,
            dmin: bounds.dmin,
            dmax: bounds.dmax,
            root_proximity,
        });
    }
    Ok(())
}

/// Place one new mote against the already placed `existing` motes.
///
/// The root is the mote of type [`MoteType::Root`] when present, otherwise
/// the origin is used for the root-proximity check.
///
/// # Errors
/// * [`TopologyError::NoAnchor`] when `existing` is empty
/// * [`TopologyError::InfeasibleConstraints`] when the bounds are
///   contradictory or `max_attempts` candidates were all rejected
pub fn place_single_mote<R: Rng + ?Sized>(
    rng: &mut R,
    existing: &[Mote],
    mote_id: u32,
    mote_type: MoteType,
    bounds: &PlacementBounds,
    root_proximity: Option<f64>,
) -> Result<Mote, TopologyError> {
    if existing.is_empty() {
        return Err(TopologyError::NoAnchor { mote_id });
    }
    check_feasible(mote_id, bounds, root_proximity)?;

    let root = existing
        .iter()
        .find(|m| m.mote_type == MoteType::Root)
        .map_or((0.0, 0.0), |m| (m.x, m.y));

    for attempt in 1..=bounds.max_attempts {
        let (x, y) = sample_candidate(rng, bounds.max_extent);
        let nearest = existing
            .iter()
            .map(|m| m.distance_to_point(x, y))
            .fold(f64::INFINITY, f64::min);
        let from_root = ((x - root.0).powi(2) + (y - root.1).powi(2)).sqrt();

        if accepts(nearest, from_root, bounds, root_proximity) {
            debug!("Placed {} mote {} at ({:.2}, {:.2}) after {} attempt(s)", mote_type, mote_id, x, y, attempt);
            return Ok(Mote::new(mote_id, mote_type, x, y));
        }
    }

    Err(TopologyError::InfeasibleConstraints {
        mote_id,
        attempts: bounds.max_attempts,
        max_extent: bounds.max_extent,
        dmin: bounds.dmin,
        dmax: bounds.dmax,
        root_proximity,
    })
}
