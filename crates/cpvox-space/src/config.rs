//! Lattice configuration, validation, and error types.
//!
//! [`LatticeConfig`] is the builder-input for an [`HcpLatticeSpace`].
//! [`validate()`](LatticeConfig::validate) checks every parameter before
//! any site table is allocated; [`build()`](LatticeConfig::build)
//! validates and constructs.

use std::error::Error;
use std::fmt;

use cpvox_core::Real3;

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::geometry;
use crate::hcp::HcpLatticeSpace;
use crate::space::VoxelSpace;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`LatticeConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Voxel radius is NaN, infinite, zero, or negative.
    InvalidVoxelRadius {
        /// The invalid value.
        value: f64,
    },
    /// An edge length is NaN, infinite, or negative.
    InvalidEdgeLength {
        /// Axis name (`"x"`, `"y"` or `"z"`).
        axis: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The lattice would have more sites than `max_sites`.
    CellCountOverflow {
        /// Site count the configuration asks for.
        value: u128,
        /// Configured ceiling.
        max: usize,
    },
    /// The space constructor rejected the configuration.
    Space(SpaceError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVoxelRadius { value } => {
                write!(f, "voxel_radius must be finite and positive, got {value}")
            }
            Self::InvalidEdgeLength { axis, value } => {
                write!(f, "edge length along {axis} must be finite and non-negative, got {value}")
            }
            Self::CellCountOverflow { value, max } => {
                write!(f, "lattice needs {value} sites, exceeding max_sites {max}")
            }
            Self::Space(e) => write!(f, "space: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

// ── LatticeConfig ──────────────────────────────────────────────────

/// Complete configuration for constructing a lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeConfig {
    /// Physical extent to cover. Default: 1 µm cube.
    pub edge_lengths: Real3,
    /// Radius of one site. Default: 5 nm.
    pub voxel_radius: f64,
    /// Boundary rule. Default: [`EdgeBehavior::Absorb`].
    pub edge: EdgeBehavior,
    /// Upper bound on the number of sites. Default: 2²⁸.
    pub max_sites: usize,
    /// Initial simulation time. Default: 0.
    pub t: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            edge_lengths: Real3::new(1e-6, 1e-6, 1e-6),
            voxel_radius: 5e-9,
            edge: EdgeBehavior::Absorb,
            max_sites: 1 << 28,
            t: 0.0,
        }
    }
}

impl LatticeConfig {
    /// Validate every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Radius must be finite and positive.
        let r = self.voxel_radius;
        if !r.is_finite() || r <= 0.0 {
            return Err(ConfigError::InvalidVoxelRadius { value: r });
        }
        // 2. Edge lengths must be finite and non-negative.
        let e = &self.edge_lengths;
        for (axis, value) in [("x", e.x), ("y", e.y), ("z", e.z)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidEdgeLength { axis, value });
            }
        }
        // 3. Site count must stay under the ceiling. Computed in u128 so a
        //    tiny radius reports the real count instead of wrapping.
        let value = self.site_count();
        if value > self.max_sites as u128 {
            return Err(ConfigError::CellCountOverflow {
                value,
                max: self.max_sites,
            });
        }
        // 4. Time must be a valid simulation time.
        crate::space::SpaceBase::new(r).set_t(self.t)?;
        Ok(())
    }

    /// Number of sites this configuration produces, saturating at
    /// `u128::MAX` when the extent itself does not fit.
    pub fn site_count(&self) -> u128 {
        let Some(shape) =
            geometry::shape(&self.edge_lengths, self.voxel_radius, self.edge.is_periodic())
        else {
            return u128::MAX;
        };
        [shape.col, shape.row, shape.layer]
            .into_iter()
            .map(|n| n.max(0) as u128)
            .fold(1u128, |acc, n| acc.saturating_mul(n))
    }

    /// Validate and construct the lattice.
    pub fn build(&self) -> Result<HcpLatticeSpace, ConfigError> {
        self.validate()?;
        let mut space = HcpLatticeSpace::new(self.edge_lengths, self.voxel_radius, self.edge)?;
        space.set_t(self.t)?;
        Ok(space)
    }
}
