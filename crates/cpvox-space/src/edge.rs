//! Lattice boundary behavior.

/// How a lattice treats neighbors that fall outside its extent.
///
/// # Examples
///
/// ```
/// use cpvox_core::Real3;
/// use cpvox_space::{EdgeBehavior, HcpLatticeSpace, VoxelSpace};
///
/// let edges = Real3::new(1e-7, 1e-7, 1e-7);
/// let walled = HcpLatticeSpace::new(edges, 1e-8, EdgeBehavior::Absorb).unwrap();
/// let torus = HcpLatticeSpace::new(edges, 1e-8, EdgeBehavior::Wrap).unwrap();
///
/// // The origin has no neighbor at row -1 behind a wall...
/// assert!(walled.get_neighbor_boundary(0, 0).is_none());
/// // ...but wraps around on a periodic lattice.
/// assert!(torus.get_neighbor_boundary(0, 0).is_some());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EdgeBehavior {
    /// Out-of-bounds neighbors wrap to the opposite side (periodic).
    /// Requires an even extent on every axis.
    Wrap,
    /// Out-of-bounds neighbors do not exist; boundary sites simply have
    /// fewer reachable neighbors (closed walls).
    #[default]
    Absorb,
}

impl EdgeBehavior {
    /// Whether the lattice is periodic.
    pub fn is_periodic(self) -> bool {
        self == Self::Wrap
    }
}

impl From<bool> for EdgeBehavior {
    fn from(periodic: bool) -> Self {
        if periodic {
            Self::Wrap
        } else {
            Self::Absorb
        }
    }
}
