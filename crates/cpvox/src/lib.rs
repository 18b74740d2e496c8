//! cpvox: a voxel-lattice spatial store for stochastic reaction-diffusion
//! simulation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the cpvox sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use cpvox::prelude::*;
//!
//! // A 10x10x10 lattice of 10 nm sites with absorbing edges.
//! let mut space =
//!     HcpLatticeSpace::from_shape(Integer3::new(10, 10, 10), 1e-8, EdgeBehavior::Absorb).unwrap();
//! let a = Species::new("A");
//! let pid = ParticleId(1);
//! let coord = space.join(Integer3::new(5, 5, 5)).unwrap();
//! assert!(space.update_voxel(pid, Voxel::new(a.clone(), coord)).unwrap());
//!
//! // Diffuse one step towards a vacant neighbor.
//! let pool = space.base().registry().pool_id(&a).unwrap();
//! let mut info = CoordinateId::new(pid, coord);
//! let (to, moved) = space.move_to_neighbor(pool, PoolId::VACANT, &mut info, 0);
//! assert!(moved);
//! assert_eq!(space.get_voxel(pid).unwrap().coordinate, to);
//! assert_eq!(space.num_voxels_exact(&a), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cpvox-core` | Species, ids, coordinates, vectors, matching |
//! | [`space`] | `cpvox-space` | Pool registry, `VoxelSpace`, HCP backend, config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and identifiers (`cpvox-core`).
///
/// Contains [`types::Species`], [`types::ParticleId`], [`types::PoolId`],
/// the [`types::Real3`] vector type, and the [`types::SpeciesMatcher`] seam.
pub use cpvox_core as types;

/// Pool registry and lattice backends (`cpvox-space`).
///
/// Provides the [`space::VoxelSpace`] trait, [`space::PoolRegistry`], the
/// [`space::HcpLatticeSpace`] backend and [`space::LatticeConfig`].
pub use cpvox_space as space;

/// Common imports for typical cpvox usage.
///
/// ```rust
/// use cpvox::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cpvox_core::{
        Coordinate, ExactMatcher, Integer3, Particle, ParticleId, ParticleIdGenerator, PoolId,
        Real3, Species, SpeciesMatcher, Voxel,
    };

    // Errors
    pub use cpvox_space::{ConfigError, SpaceError};

    // Space
    pub use cpvox_space::{
        CoordinateId, EdgeBehavior, HcpLatticeSpace, LatticeConfig, PlanarSurface, Shape, Sphere,
        VoxelSpace,
    };
}
