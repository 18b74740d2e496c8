//! Voxel-lattice spatial store for cpvox.
//!
//! This crate defines the [`VoxelSpace`] trait, the occupancy contract
//! a stochastic reaction-diffusion stepper drives, along with the pool
//! registry that tracks which species owns which site and a reference
//! close-packed backend.
//!
//! # Layers
//!
//! - [`geometry`]: pure sizing functions (lattice shape, volumes).
//! - [`PoolRegistry`]: arena of [`VoxelPool`]s and [`MoleculePool`]s
//!   keyed by species, with a location forest between them.
//! - [`VoxelSpace`]: queries, stepping primitives and the particle view.
//! - [`HcpLatticeSpace`]: dense hexagonal close-packed lattice with
//!   configurable [`EdgeBehavior`].
//! - [`LatticeConfig`]: validated construction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod hcp;
pub mod pool;
pub mod registry;
pub mod shape;
pub mod space;

#[cfg(test)]
pub(crate) mod compliance;

pub use config::{ConfigError, LatticeConfig};
pub use edge::EdgeBehavior;
pub use error::SpaceError;
pub use hcp::HcpLatticeSpace;
pub use pool::{CoordinateId, Dimension, MoleculePool, PoolKind, VoxelPool};
pub use registry::PoolRegistry;
pub use shape::{Aabb, PlanarSurface, Shape, Sphere, SphericalSurface};
pub use space::{Capabilities, SpaceBase, VoxelSpace};
