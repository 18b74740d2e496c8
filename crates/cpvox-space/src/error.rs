//! Error types for space operations.
//!
//! Only hard failures live here. Occupancy conflicts (a rejected move, a
//! destination held by the wrong pool) are ordinary outcomes of a
//! diffusion step and are reported through `bool` results instead.

use cpvox_core::Coordinate;
use std::fmt;

/// Errors arising from space construction, configuration of pools, or
/// precondition violations.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// A caller-supplied argument violates a precondition.
    InvalidArgument {
        /// What went wrong.
        reason: String,
    },
    /// A coordinate is outside the lattice.
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coordinate,
        /// Number of sites in the lattice.
        size: usize,
    },
    /// The backend will never provide this capability.
    NotSupported {
        /// Name of the unavailable operation.
        operation: &'static str,
    },
    /// The backend does not provide this capability yet.
    NotImplemented {
        /// Name of the unavailable operation.
        operation: &'static str,
    },
    /// Attempted to construct a space with zero sites.
    EmptySpace,
}

impl SpaceError {
    /// Whether retrying against the same backend can never succeed.
    ///
    /// `NotSupported` is permanent; `NotImplemented` marks a capability
    /// that a later version of the backend may add.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::CoordOutOfBounds { coord, size } => {
                write!(f, "coordinate {coord} out of bounds: lattice has {size} sites")
            }
            Self::NotSupported { operation } => {
                write!(f, "{operation} is not supported by this space")
            }
            Self::NotImplemented { operation } => write!(f, "{operation} is not implemented"),
            Self::EmptySpace => write!(f, "space must have at least one site"),
        }
    }
}

impl std::error::Error for SpaceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanence() {
        assert!(SpaceError::NotSupported { operation: "save" }.is_permanent());
        assert!(!SpaceError::NotImplemented { operation: "save" }.is_permanent());
        assert!(!SpaceError::EmptySpace.is_permanent());
    }

    #[test]
    fn display() {
        let e = SpaceError::CoordOutOfBounds { coord: 12, size: 10 };
        assert_eq!(e.to_string(), "coordinate 12 out of bounds: lattice has 10 sites");
        let e = SpaceError::invalid("the time must be positive");
        assert_eq!(e.to_string(), "invalid argument: the time must be positive");
    }
}
