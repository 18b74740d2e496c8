//! Core types and traits for the cpvox voxel-lattice store.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the registry, the lattice backends, and any
//! downstream consumer (reaction engine, observers): species and particle
//! identifiers, pool handles, coordinates, the continuous-space vector
//! types, and the species-matching seam.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod matcher;
pub mod particle;
pub mod real3;

pub use id::{Coordinate, ParticleId, ParticleIdGenerator, PoolId, Species};
pub use matcher::{ExactMatcher, SpeciesMatcher};
pub use particle::{Particle, Voxel};
pub use real3::{Integer3, Real3};
