//! VoxelSpace contract test helpers.
//!
//! These functions verify that a backend satisfies the geometric and
//! occupancy invariants of the trait contract. Reused by every backend
//! test module and by the random-walk integration tests.

use cpvox_core::PoolId;
use indexmap::IndexSet;

use crate::space::VoxelSpace;

/// Assert that `b in neighbors(a)` implies `a in neighbors(b)`.
pub fn assert_neighbors_symmetric(space: &dyn VoxelSpace) {
    for coord in 0..space.size() {
        for nb in space.neighbors(coord) {
            assert!(
                space.neighbors(nb).contains(&coord),
                "neighbor symmetry violated: {nb} in N({coord}) but {coord} not in N({nb})"
            );
        }
    }
}

/// Assert that every unwrapped neighbor sits at contact distance `2r`.
pub fn assert_contact_distance(space: &dyn VoxelSpace) {
    let contact = 2.0 * space.voxel_radius();
    for coord in 0..space.size() {
        let here = space.coordinate2position(coord);
        for nrand in 0..space.num_neighbors(coord) {
            let Some(nb) = space.get_neighbor(coord, nrand) else {
                continue;
            };
            let d = (space.coordinate2position(nb) - here).length();
            assert!(
                (d - contact).abs() < 1e-9 * contact,
                "neighbor {nrand} of {coord} ({nb}) at distance {d}, expected {contact}"
            );
        }
    }
}

/// Assert that interior neighbors are distinct and never the site itself.
pub fn assert_neighbors_distinct(space: &dyn VoxelSpace) {
    for coord in 0..space.size() {
        let unwrapped: Vec<_> = (0..space.num_neighbors(coord))
            .filter_map(|nrand| space.get_neighbor(coord, nrand))
            .collect();
        let unique: IndexSet<_> = unwrapped.iter().collect();
        assert_eq!(unique.len(), unwrapped.len(), "duplicate neighbors of {coord}");
        assert!(!unique.contains(&coord), "{coord} is its own neighbor");
    }
}

/// Assert that `position2coordinate(coordinate2position(c)) == c`.
pub fn assert_position_roundtrip(space: &dyn VoxelSpace) {
    for inner in 0..space.inner_size() {
        let coord = space.inner2coordinate(inner);
        let pos = space.coordinate2position(coord);
        assert_eq!(
            space.position2coordinate(&pos),
            Some(coord),
            "position {pos} of {coord} does not map back"
        );
    }
}

/// Assert that the site table and the pool registry agree.
///
/// Every site is owned by exactly one pool, per-pool counts add up to
/// `inner_size`, every molecule entry points at a site whose owner is its
/// pool, and every structural site set matches the site table.
pub fn assert_occupancy_consistent(space: &dyn VoxelSpace) {
    let reg = space.base().registry();
    let mut owned = vec![0usize; reg.len()];
    for inner in 0..space.inner_size() {
        let coord = space.inner2coordinate(inner);
        let id = space
            .get_voxel_pool_at(coord)
            .unwrap_or_else(|| panic!("inner site {coord} has no pool"));
        owned[id.index()] += 1;
    }

    let mut total = 0;
    for (i, &n) in owned.iter().enumerate() {
        let id = PoolId(i as u32);
        assert_eq!(space.count_voxels(id), n, "count_voxels({id}) disagrees with the site table");
        total += space.count_voxels(id);
    }
    assert_eq!(total, space.inner_size(), "pool counts do not cover the lattice");

    for (id, mp) in reg.molecule_pools() {
        for entry in mp.iter() {
            assert_eq!(
                space.get_voxel_pool_at(entry.coordinate),
                Some(id),
                "particle {} of pool {id} sits on a site owned by another pool",
                entry.pid
            );
            assert_eq!(mp.find_at(entry.coordinate), Some(entry.pid));
        }
    }
    for (id, vp) in reg.voxel_pools() {
        for coord in vp.sites() {
            assert_eq!(space.get_voxel_pool_at(coord), Some(id));
        }
    }
}

/// Run every geometric and occupancy check on a space.
pub fn run_full_compliance(space: &dyn VoxelSpace) {
    assert_neighbors_symmetric(space);
    assert_contact_distance(space);
    assert_neighbors_distinct(space);
    assert_position_roundtrip(space);
    assert_occupancy_consistent(space);
}
