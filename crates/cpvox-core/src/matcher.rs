//! Species-matching seam used by the non-exact query family.

use crate::id::Species;

/// Relation deciding whether a registered species satisfies a query
/// pattern.
///
/// The `*_exact` queries never consult a matcher; they compare species
/// keys literally. The general queries (`num_voxels_of`,
/// `list_voxels_of`, `num_molecules`) aggregate every pool whose species
/// the matcher accepts, so a rule-based model can plug its own pattern
/// semantics in here.
pub trait SpeciesMatcher: Send + Sync {
    /// Whether `candidate` satisfies `pattern`.
    fn matches(&self, pattern: &Species, candidate: &Species) -> bool;

    /// How many times `pattern` occurs in `candidate`.
    ///
    /// Used for molecule counts, where one complex may contain several
    /// copies of the queried unit. Default: 1 on a match, else 0.
    fn count(&self, pattern: &Species, candidate: &Species) -> usize {
        usize::from(self.matches(pattern, candidate))
    }
}

/// Literal identity: a species only matches itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactMatcher;

impl SpeciesMatcher for ExactMatcher {
    fn matches(&self, pattern: &Species, candidate: &Species) -> bool {
        pattern == candidate
    }
}
