//! Topology generation.
//!
//! Builds a topology of one root, `n` sensors and one malicious mote. The
//! malicious mote is inserted at a random point of the sensor sequence,
//! with earlier insertion more likely for larger `n`, then moved to the
//! end of the returned sequence.

use log::{debug, info};
use rand::Rng;

use super::placement::{place_single_mote, TopologyError};
use super::types::{Mote, MoteType, PlacementBounds, Topology};

/// Generate a topology with `n` sensor motes.
///
/// Sensors get ids `1..=n`, the malicious mote gets `n + 1`. When
/// `root_proximity` is set, the malicious mote is placed within that
/// distance of the root.
///
/// # Errors
/// * [`TopologyError::TooManyMotes`] when `n + 1` does not fit a mote id
/// * otherwise the [`TopologyError`] of the first mote that cannot be placed
pub fn generate_topology<R: Rng + ?Sized>(
    rng: &mut R,
    n: u32,
    root_proximity: Option<f64>,
    bounds: &PlacementBounds,
) -> Result<Topology, TopologyError> {
    info!(
        "Generating topology: {} sensor motes, dmin {}, dmax {}, extent {}",
        n, bounds.dmin, bounds.dmax, bounds.max_extent
    );

    let malicious_id = n.checked_add(1).ok_or(TopologyError::TooManyMotes { n })?;
    let mut motes = Vec::new();
    motes.push(Mote::root());
    let mut malicious_index: Option<usize> = None;

    for i in 0..n {
        if malicious_index.is_none() && rng.gen_range(1..=n / (i + 1)) == 1 {
            let malicious = place_single_mote(rng, &motes, malicious_id, MoteType::Malicious, bounds, root_proximity)?;
            debug!("Malicious mote inserted before sensor {}", i + 1);
            malicious_index = Some(motes.len());
            motes.push(malicious);
        }
        let sensor = place_single_mote(rng, &motes, i + 1, MoteType::Sensor, bounds, None)?;
        motes.push(sensor);
    }

    let malicious = match malicious_index {
        Some(index) => motes.remove(index),
        None => place_single_mote(rng, &motes, malicious_id, MoteType::Malicious, bounds, root_proximity)?,
    };
    motes.push(malicious);

    Ok(Topology::from_motes(motes))
}
