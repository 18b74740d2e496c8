//! Test fixtures and seeded drivers for cpvox development.
//!
//! Provides small prebuilt lattices, deterministic molecule placement,
//! a [`RandomWalk`] driver that steps every molecule of a species once per
//! sweep, and [`assert_conserved`] for checking the occupancy invariants
//! after arbitrary mutation sequences.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod walk;

pub use walk::RandomWalk;

use cpvox_core::{Integer3, ParticleId, ParticleIdGenerator, PoolId, Real3, Species, Voxel};
use cpvox_space::{EdgeBehavior, HcpLatticeSpace, PlanarSurface, VoxelSpace};
use rand::Rng;

/// Voxel radius used by every fixture.
pub const FIXTURE_RADIUS: f64 = 0.01;

/// An `n x n x n` lattice of radius [`FIXTURE_RADIUS`].
///
/// # Panics
///
/// Panics if `n` is zero, or odd under `Wrap`.
pub fn cube_lattice(n: i64, edge: EdgeBehavior) -> HcpLatticeSpace {
    HcpLatticeSpace::from_shape(Integer3::new(n, n, n), FIXTURE_RADIUS, edge)
        .expect("fixture lattice extent is valid")
}

/// A lattice with a flat membrane `"M"` across the middle row and a
/// molecule type `"B"` confined to it.
pub fn membrane_lattice(n: i64) -> HcpLatticeSpace {
    let mut space = cube_lattice(n, EdgeBehavior::Absorb);
    let mid = (n as f64 - 0.5) * FIXTURE_RADIUS;
    let plane = PlanarSurface::new(Real3::new(0.0, 0.0, mid), Real3::new(0.0, 0.0, 1.0));
    let membrane = Species::new("M");
    space
        .add_structure(&membrane, &plane, None)
        .expect("membrane fits the lattice");
    space
        .make_molecule_type(&Species::new("B"), FIXTURE_RADIUS, 1e-12, Some(&membrane))
        .expect("membrane is a structural location");
    space
}

/// Place `n` molecules of `sp` on random sites owned by the species'
/// location, returning their ids.
///
/// # Panics
///
/// Panics if fewer than `n` free sites exist.
pub fn populate<R: Rng>(
    space: &mut dyn VoxelSpace,
    sp: &Species,
    n: usize,
    ids: &mut ParticleIdGenerator,
    rng: &mut R,
) -> Vec<ParticleId> {
    let loc = space
        .find_voxel_pool(sp)
        .map_or(PoolId::VACANT, |p| p.location().unwrap_or(PoolId::VACANT));
    assert!(
        space.count_voxels(loc) >= n,
        "only {} free sites for {n} molecules",
        space.count_voxels(loc)
    );

    let mut placed = Vec::with_capacity(n);
    let mut pid = ids.next_id();
    while placed.len() < n {
        let coord = space.inner2coordinate(rng.random_range(0..space.inner_size()));
        if space
            .update_voxel(pid, Voxel::new(sp.clone(), coord))
            .expect("coordinate comes from the lattice")
        {
            placed.push(pid);
            if placed.len() < n {
                pid = ids.next_id();
            }
        }
    }
    placed
}

/// Assert the occupancy invariants through the public API.
///
/// Pool counts must cover every inner site exactly once, every listed
/// molecule must be found at its own site, and every pid must be unique.
pub fn assert_conserved(space: &dyn VoxelSpace) {
    let pools = space.base().registry().len();
    let total: usize = (0..pools)
        .map(|i| space.count_voxels(PoolId(i as u32)))
        .sum();
    assert_eq!(total, space.inner_size(), "pool counts do not cover the lattice");

    let listed = space.list_voxels();
    assert_eq!(listed.len(), space.num_particles());
    let mut pids: Vec<ParticleId> = listed.iter().map(|(pid, _)| *pid).collect();
    pids.sort_unstable();
    pids.dedup();
    assert_eq!(pids.len(), listed.len(), "duplicate particle ids");

    for (pid, voxel) in listed {
        let (at, here) = space
            .get_voxel_at(voxel.coordinate)
            .expect("listed coordinate is on the lattice");
        assert_eq!(at, Some(pid), "site {} does not hold {pid}", voxel.coordinate);
        assert_eq!(here.species, voxel.species);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn membrane_fixture_is_one_row() {
        let space = membrane_lattice(6);
        assert_eq!(space.num_voxels_exact(&Species::new("M")), 36);
        assert!(space.has_molecule_pool(&Species::new("B")));
        assert_conserved(&space);
    }

    #[test]
    fn populate_places_exactly_n() {
        let mut space = cube_lattice(6, EdgeBehavior::Absorb);
        let mut ids = ParticleIdGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let a = Species::new("A");
        let pids = populate(&mut space, &a, 40, &mut ids, &mut rng);
        assert_eq!(pids.len(), 40);
        assert_eq!(space.num_voxels_exact(&a), 40);
        assert!(pids.iter().all(|&pid| space.has_voxel(pid)));
        assert_conserved(&space);
    }

    #[test]
    fn populate_respects_location() {
        let mut space = membrane_lattice(6);
        let mut ids = ParticleIdGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let b = Species::new("B");
        let pids = populate(&mut space, &b, 10, &mut ids, &mut rng);
        assert_eq!(pids, (1..=10).map(ParticleId).collect::<Vec<_>>());
        // The membrane occupies the sites at z = 4r and z = 5r.
        for (_, v) in space.list_voxels_exact(&b) {
            assert_eq!(v.location, Some(Species::new("M")));
            let z = space.coordinate2position(v.coordinate).z;
            assert!((z - 4.5 * FIXTURE_RADIUS).abs() <= 0.5 * FIXTURE_RADIUS + 1e-12);
        }
        assert_eq!(space.num_voxels_exact(&Species::new("M")), 26);
    }
}
