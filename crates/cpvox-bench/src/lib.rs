//! Benchmark profiles for the cpvox voxel-lattice store.
//!
//! - [`reference_profile`]: 32x32x32 lattice (~33K sites), 10% occupied
//! - [`stress_profile`]: 64x64x64 lattice (~262K sites), 25% occupied
//! - [`membrane_profile`]: one membrane row with located molecules

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cpvox_core::{ParticleIdGenerator, Species};
use cpvox_space::{EdgeBehavior, HcpLatticeSpace, VoxelSpace};
use cpvox_test_utils::{cube_lattice, membrane_lattice, populate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Species every profile places.
pub const BENCH_SPECIES: &str = "A";

/// A periodic `n^3` lattice with `fraction` of its sites holding
/// [`BENCH_SPECIES`], placed deterministically from `seed`.
pub fn populated_lattice(n: i64, fraction: f64, seed: u64) -> HcpLatticeSpace {
    let mut space = cube_lattice(n, EdgeBehavior::Wrap);
    let count = (space.inner_size() as f64 * fraction) as usize;
    let mut ids = ParticleIdGenerator::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    populate(&mut space, &Species::new(BENCH_SPECIES), count, &mut ids, &mut rng);
    space
}

/// Build the reference profile: 32^3 sites, 10% occupied.
pub fn reference_profile(seed: u64) -> HcpLatticeSpace {
    populated_lattice(32, 0.1, seed)
}

/// Build the stress profile: 64^3 sites, 25% occupied.
pub fn stress_profile(seed: u64) -> HcpLatticeSpace {
    populated_lattice(64, 0.25, seed)
}

/// A 32^3 lattice whose membrane row holds `"B"` molecules on half of its
/// sites.
pub fn membrane_profile(seed: u64) -> HcpLatticeSpace {
    let mut space = membrane_lattice(32);
    let b = Species::new("B");
    let sites = space.num_voxels_exact(&Species::new("M"));
    let mut ids = ParticleIdGenerator::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    populate(&mut space, &b, sites / 2, &mut ids, &mut rng);
    space
}
