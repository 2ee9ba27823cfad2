use rand::rngs::StdRng;
use rand::SeedableRng;

use motesim::topology::{generate_topology, Mote, MoteType, PlacementBounds, Topology, TopologyError};

/// Check every structural and geometric invariant of a generated topology
fn assert_invariants(topology: &Topology, n: u32, bounds: &PlacementBounds, root_proximity: Option<f64>) {
    let motes = topology.motes();
    assert_eq!(motes.len(), n as usize + 2);

    let root = &motes[0];
    assert_eq!(root.mote_type, MoteType::Root);
    assert_eq!((root.id, root.x, root.y), (0, 0.0, 0.0));

    let malicious = motes.last().unwrap();
    assert_eq!(malicious.mote_type, MoteType::Malicious);
    assert_eq!(malicious.id, n + 1);

    assert_eq!(motes.iter().filter(|m| m.mote_type == MoteType::Root).count(), 1);
    assert_eq!(motes.iter().filter(|m| m.mote_type == MoteType::Malicious).count(), 1);
    assert_eq!(topology.sensors().count(), n as usize);
    assert!(motes.iter().all(|m| m.z == 0.0));

    for (i, a) in motes.iter().enumerate() {
        for b in &motes[i + 1..] {
            assert!(a.distance_to(b) > bounds.dmin, "motes {} and {} too close", a.id, b.id);
        }
    }

    // The malicious mote may have been placed before some sensors, so it
    // counts as a possible earlier neighbour for every sensor.
    let last = motes.len() - 1;
    for (k, mote) in motes.iter().enumerate().skip(1) {
        let earlier: Vec<&Mote> = if k == last {
            motes[..last].iter().collect()
        } else {
            motes[..k].iter().chain(std::iter::once(malicious)).collect()
        };
        assert!(
            earlier.iter().any(|other| mote.distance_to(other) < bounds.dmax),
            "mote {} is isolated",
            mote.id
        );
    }

    if let Some(limit) = root_proximity {
        assert!(malicious.distance_to(root) <= limit);
    }
}

#[test]
fn test_invariants_across_seeds_and_sizes() {
    let bounds = PlacementBounds::for_area(200.0, 20.0, 50.0);
    for seed in 0..20 {
        for n in [1, 2, 5, 10, 25] {
            let mut rng = StdRng::seed_from_u64(seed);
            let topology = generate_topology(&mut rng, n, Some(100.0), &bounds).unwrap();
            assert_invariants(&topology, n, &bounds, Some(100.0));
        }
    }
}

#[test]
fn test_tight_root_proximity() {
    let bounds = PlacementBounds::for_area(200.0, 20.0, 50.0);
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let topology = generate_topology(&mut rng, 8, Some(40.0), &bounds).unwrap();
        assert_invariants(&topology, 8, &bounds, Some(40.0));
    }
}

#[test]
fn test_reference_scenario() {
    let bounds = PlacementBounds::for_area(100.0, 10.0, 40.0);
    let mut rng = StdRng::seed_from_u64(123);
    let topology = generate_topology(&mut rng, 5, None, &bounds).unwrap();
    assert_invariants(&topology, 5, &bounds, None);
}

#[test]
fn test_different_seeds_give_different_topologies() {
    let bounds = PlacementBounds::for_area(200.0, 20.0, 50.0);
    let topologies: Vec<Topology> = (0..5)
        .map(|seed| generate_topology(&mut StdRng::seed_from_u64(seed), 10, Some(100.0), &bounds).unwrap())
        .collect();
    assert!(topologies.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_dmin_above_dmax_returns_error() {
    let bounds = PlacementBounds::for_area(200.0, 100.0, 50.0);
    let mut rng = StdRng::seed_from_u64(0);
    match generate_topology(&mut rng, 5, None, &bounds) {
        Err(TopologyError::InfeasibleConstraints { dmin, dmax, .. }) => {
            assert_eq!(dmin, 100.0);
            assert_eq!(dmax, 50.0);
        }
        other => panic!("expected infeasibility error, got {:?}", other),
    }
}

#[test]
fn test_overcrowded_area_returns_error() {
    // 200 motes cannot keep 20 apart inside a disk of radius 50
    let bounds = PlacementBounds::for_area(100.0, 20.0, 50.0).with_max_attempts(2_000);
    let mut rng = StdRng::seed_from_u64(0);
    let err = generate_topology(&mut rng, 200, Some(50.0), &bounds).unwrap_err();
    assert!(matches!(err, TopologyError::InfeasibleConstraints { attempts: 2_000, .. }));
}
