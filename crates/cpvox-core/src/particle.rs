//! Transient occupant records: [`Voxel`] (lattice view) and [`Particle`]
//! (continuous-space view).
//!
//! Neither is stored by the space. Both are materialized on demand from
//! pool metadata, so they can never drift from the authoritative site
//! table.

use crate::id::{Coordinate, Species};
use crate::real3::Real3;

/// One lattice occupant as seen by the stepping algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    /// Species of the owning pool.
    pub species: Species,
    /// Site address.
    pub coordinate: Coordinate,
    /// Occupant radius.
    pub radius: f64,
    /// Diffusion coefficient.
    pub d: f64,
    /// Species of the pool this occupant is embedded in; `None` for
    /// occupants living directly in vacant space.
    pub location: Option<Species>,
}

impl Voxel {
    /// A voxel with zero radius and diffusion, located in vacant space.
    pub fn new(species: Species, coordinate: Coordinate) -> Self {
        Self {
            species,
            coordinate,
            radius: 0.0,
            d: 0.0,
            location: None,
        }
    }

    /// Set the radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the diffusion coefficient.
    pub fn with_d(mut self, d: f64) -> Self {
        self.d = d;
        self
    }

    /// Set the embedding structure.
    pub fn with_location(mut self, location: Species) -> Self {
        self.location = Some(location);
        self
    }
}

/// One occupant as seen by observers and the reaction engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Species of the owning pool.
    pub species: Species,
    /// Centre of the occupied site.
    pub position: Real3,
    /// Occupant radius.
    pub radius: f64,
    /// Diffusion coefficient.
    pub d: f64,
}
