//! Seeded random-walk driver.

use cpvox_core::{PoolId, Species};
use cpvox_space::{CoordinateId, VoxelSpace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Steps every molecule of a species once per sweep towards a uniformly
/// chosen neighbor, the way a diffusion event would.
pub struct RandomWalk {
    rng: ChaCha8Rng,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One attempt per molecule of `sp`. Returns how many were accepted.
    ///
    /// Molecules only step onto sites owned by their pool's location, so a
    /// species located in a structure never leaves it.
    pub fn sweep(&mut self, space: &mut dyn VoxelSpace, sp: &Species) -> usize {
        let Some(pool) = space.find_molecule_pool(sp) else {
            return 0;
        };
        let loc = pool.location().unwrap_or(PoolId::VACANT);
        let walkers: Vec<CoordinateId> = pool.iter().collect();
        let Some(from) = space.base().registry().pool_id(sp) else {
            return 0;
        };

        let mut accepted = 0;
        for mut info in walkers {
            let nrand = self.rng.random_range(0..space.num_neighbors(info.coordinate));
            let (_, moved) = space.move_to_neighbor(from, loc, &mut info, nrand);
            if moved {
                accepted += 1;
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_conserved, cube_lattice, membrane_lattice, populate};
    use cpvox_core::ParticleIdGenerator;
    use cpvox_space::EdgeBehavior;

    #[test]
    fn unknown_species_is_a_no_op() {
        let mut space = cube_lattice(4, EdgeBehavior::Absorb);
        let mut walk = RandomWalk::new(0);
        assert_eq!(walk.sweep(&mut space, &Species::new("A")), 0);
    }

    #[test]
    fn sweeps_move_molecules_and_conserve() {
        let mut space = cube_lattice(8, EdgeBehavior::Wrap);
        let mut ids = ParticleIdGenerator::new();
        let mut walk = RandomWalk::new(7);
        let a = Species::new("A");
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        populate(&mut space, &a, 20, &mut ids, &mut rng);

        let accepted: usize = (0..10).map(|_| walk.sweep(&mut space, &a)).sum();
        assert!(accepted > 0);
        assert_eq!(space.num_voxels_exact(&a), 20);
        assert_conserved(&space);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed| {
            let mut space = cube_lattice(6, EdgeBehavior::Absorb);
            let mut ids = ParticleIdGenerator::new();
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let a = Species::new("A");
            populate(&mut space, &a, 15, &mut ids, &mut rng);
            let mut walk = RandomWalk::new(seed);
            for _ in 0..5 {
                walk.sweep(&mut space, &a);
            }
            let mut sites: Vec<_> = space
                .list_voxels_exact(&a)
                .into_iter()
                .map(|(pid, v)| (pid, v.coordinate))
                .collect();
            sites.sort_unstable();
            sites
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn membrane_molecules_stay_on_membrane() {
        let mut space = membrane_lattice(6);
        let mut ids = ParticleIdGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let b = Species::new("B");
        let m = Species::new("M");
        populate(&mut space, &b, 8, &mut ids, &mut rng);

        let mut walk = RandomWalk::new(5);
        for _ in 0..20 {
            walk.sweep(&mut space, &b);
            assert_eq!(space.num_voxels_exact(&b), 8);
            assert_eq!(space.num_voxels_exact(&m), 36 - 8);
            for (_, v) in space.list_voxels_exact(&b) {
                assert_eq!(v.location, Some(m.clone()));
            }
        }
        assert_conserved(&space);
    }
}
