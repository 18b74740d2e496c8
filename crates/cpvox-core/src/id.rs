//! Strongly-typed identifiers and the [`Coordinate`] type alias.

use std::fmt;

/// Names a chemical species.
///
/// A species is identified by its serial string (e.g. `"A"`,
/// `"MinD(state=ATP)"`). Two species are the same key iff their serials
/// are byte-equal; any richer pattern semantics live behind
/// [`SpeciesMatcher`](crate::SpeciesMatcher).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Species {
    serial: String,
}

impl Species {
    /// Create a species from its serial string.
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
        }
    }

    /// The serial string identifying this species.
    pub fn serial(&self) -> &str {
        &self.serial
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serial)
    }
}

impl From<&str> for Species {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl From<String> for Species {
    fn from(v: String) -> Self {
        Self::new(v)
    }
}

/// Identifies one mobile occupant of the lattice.
///
/// Stable across moves; an id is retired when its occupant is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Mints fresh [`ParticleId`]s.
///
/// Ids are handed out in increasing order starting at 1. Each store (or
/// each caller driving a store) owns its own generator; uniqueness is
/// per generator.
#[derive(Clone, Debug)]
pub struct ParticleIdGenerator {
    next: u64,
}

impl ParticleIdGenerator {
    /// Create a generator whose first id is `ParticleId(1)`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return a fresh id that this generator has never returned before.
    pub fn next_id(&mut self) -> ParticleId {
        let pid = ParticleId(self.next);
        self.next += 1;
        pid
    }
}

impl Default for ParticleIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of a pool inside a space's pool registry.
///
/// Handles are small integers minted by the registry in creation order.
/// `PoolId::VACANT` always names the vacant pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub u32);

impl PoolId {
    /// The distinguished pool owning every unoccupied site.
    pub const VACANT: PoolId = PoolId(0);

    /// Index of this handle in the registry arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this handle names the vacant pool.
    pub fn is_vacant(self) -> bool {
        self == Self::VACANT
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one lattice site.
///
/// The meaning of a coordinate is backend-defined; backends guarantee
/// that the valid range is dense (`0..size`) so per-site tables can be
/// plain vectors.
pub type Coordinate = usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_monotonic() {
        let mut ids = ParticleIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, ParticleId(1));
        assert!(b > a);
    }

    #[test]
    fn species_keys_by_serial() {
        assert_eq!(Species::new("A"), Species::from("A"));
        assert_ne!(Species::new("A"), Species::new("B"));
        assert_eq!(Species::new("MinD").to_string(), "MinD");
    }

    #[test]
    fn vacant_handle() {
        assert!(PoolId::VACANT.is_vacant());
        assert!(!PoolId(3).is_vacant());
        assert_eq!(PoolId(3).index(), 3);
    }
}
