//! The pool registry: an arena of pools keyed by species.
//!
//! Pools live in a `Vec` indexed by [`PoolId`]; slot 0 is always the
//! vacant pool. Two keyed maps (structural pools and molecule pools)
//! resolve a [`Species`] to its handle. Locations are handles into the
//! same arena, and a pool can only be located in a pool that already
//! exists, so the location relation is a forest by construction.
//!
//! Pools are never removed from the arena. Emptying a pool is an explicit
//! [`drain`](PoolRegistry::drain) that the owning space pairs with a
//! rewrite of its site table.

use std::fmt;
use std::sync::Arc;

use cpvox_core::{Coordinate, ExactMatcher, ParticleId, PoolId, Species, SpeciesMatcher, Voxel};
use indexmap::IndexMap;

use crate::error::SpaceError;
use crate::pool::{CoordinateId, Dimension, MoleculePool, PoolKind, VoxelPool};

#[derive(Clone, Debug)]
enum PoolEntry {
    Voxel(VoxelPool),
    Molecule(MoleculePool),
}

impl PoolEntry {
    fn as_voxel_pool(&self) -> &VoxelPool {
        match self {
            Self::Voxel(vp) => vp,
            Self::Molecule(mp) => mp.as_voxel_pool(),
        }
    }
}

/// Arena of pools with species-keyed lookup.
///
/// All lookups return `Option` and never allocate. Mutating methods are
/// low-level bookkeeping for backends: they keep each pool's own tables
/// consistent, and the calling backend keeps its per-site table in step.
#[derive(Clone)]
pub struct PoolRegistry {
    pools: Vec<PoolEntry>,
    voxel_pools: IndexMap<Species, PoolId>,
    molecule_pools: IndexMap<Species, PoolId>,
    matcher: Arc<dyn SpeciesMatcher>,
}

impl PoolRegistry {
    /// A registry holding only the vacant pool.
    pub fn new(voxel_radius: f64) -> Self {
        let vacant = VoxelPool::new(
            Species::default(),
            PoolKind::Vacant,
            Dimension::Three,
            voxel_radius,
            0.0,
            None,
        );
        Self {
            pools: vec![PoolEntry::Voxel(vacant)],
            voxel_pools: IndexMap::new(),
            molecule_pools: IndexMap::new(),
            matcher: Arc::new(ExactMatcher),
        }
    }

    /// Replace the relation used by the non-exact query family.
    pub fn set_matcher(&mut self, matcher: Arc<dyn SpeciesMatcher>) {
        self.matcher = matcher;
    }

    /// The relation used by the non-exact query family.
    pub fn matcher(&self) -> &dyn SpeciesMatcher {
        self.matcher.as_ref()
    }

    /// Number of pools in the arena, vacant included.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Always `false`: the vacant pool is created with the registry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The vacant pool.
    pub fn vacant(&self) -> &VoxelPool {
        self.pool(PoolId::VACANT)
    }

    /// Descriptor of pool `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this registry.
    pub fn pool(&self, id: PoolId) -> &VoxelPool {
        self.pools[id.index()].as_voxel_pool()
    }

    /// Pool `id` as a molecule pool, if it is one.
    pub fn molecule_pool(&self, id: PoolId) -> Option<&MoleculePool> {
        match self.pools.get(id.index())? {
            PoolEntry::Molecule(mp) => Some(mp),
            PoolEntry::Voxel(_) => None,
        }
    }

    /// Handle of the pool storing `sp`.
    pub fn pool_id(&self, sp: &Species) -> Option<PoolId> {
        self.voxel_pools
            .get(sp)
            .or_else(|| self.molecule_pools.get(sp))
            .copied()
    }

    /// Descriptor of the pool storing `sp`, structural or molecular.
    pub fn find_voxel_pool(&self, sp: &Species) -> Option<&VoxelPool> {
        self.pool_id(sp).map(|id| self.pool(id))
    }

    /// The molecule pool storing `sp`.
    pub fn find_molecule_pool(&self, sp: &Species) -> Option<&MoleculePool> {
        let &id = self.molecule_pools.get(sp)?;
        self.molecule_pool(id)
    }

    /// Whether `sp` has a molecule pool.
    pub fn has_molecule_pool(&self, sp: &Species) -> bool {
        self.molecule_pools.contains_key(sp)
    }

    /// Every species with a registered pool, vacant excluded.
    pub fn list_species(&self) -> Vec<Species> {
        self.voxel_pools
            .keys()
            .chain(self.molecule_pools.keys())
            .cloned()
            .collect()
    }

    /// Structural pools (structures and interfaces), in declaration order.
    pub fn voxel_pools(&self) -> impl Iterator<Item = (PoolId, &VoxelPool)> + '_ {
        self.voxel_pools.values().map(|&id| (id, self.pool(id)))
    }

    /// Molecule pools, in creation order.
    pub fn molecule_pools(&self) -> impl Iterator<Item = (PoolId, &MoleculePool)> + '_ {
        self.molecule_pools
            .values()
            .filter_map(|&id| self.molecule_pool(id).map(|mp| (id, mp)))
    }

    /// Location of pool `id`; vacant is its own location.
    pub fn location_of(&self, id: PoolId) -> PoolId {
        self.pool(id).location().unwrap_or(PoolId::VACANT)
    }

    /// Chain of locations above `id`, nearest first, ending at vacant.
    pub fn ancestors(&self, id: PoolId) -> impl Iterator<Item = PoolId> + '_ {
        std::iter::successors(self.pool(id).location(), move |&p| self.pool(p).location())
    }

    /// Resolve an optional location species to a handle. `None` means
    /// vacant space; an unknown species resolves to `None`.
    pub fn resolve_location(&self, loc: Option<&Species>) -> Option<PoolId> {
        match loc {
            None => Some(PoolId::VACANT),
            Some(sp) => self.pool_id(sp),
        }
    }

    /// Materialize the occupant record of `coord`, owned by pool `id`.
    pub fn voxel(&self, id: PoolId, coord: Coordinate) -> Voxel {
        let pool = self.pool(id);
        let location = pool
            .location()
            .filter(|loc| !loc.is_vacant())
            .map(|loc| self.pool(loc).species().clone());
        Voxel {
            species: pool.species().clone(),
            coordinate: coord,
            radius: pool.radius(),
            d: pool.d(),
            location,
        }
    }

    /// Pool and site of particle `pid`.
    pub fn find_particle(&self, pid: ParticleId) -> Option<(PoolId, Coordinate)> {
        self.molecule_pools()
            .find_map(|(id, mp)| mp.find(pid).map(|coord| (id, coord)))
    }

    /// Number of sites pool `id` tracks itself. Vacant and unknown
    /// handles track none.
    pub fn owned_sites(&self, id: PoolId) -> usize {
        match self.pools.get(id.index()) {
            Some(PoolEntry::Voxel(vp)) => vp.site_count(),
            Some(PoolEntry::Molecule(mp)) => mp.size(),
            None => 0,
        }
    }

    /// Total sites owned by every non-vacant pool.
    pub fn occupied_sites(&self) -> usize {
        (1..self.pools.len())
            .map(|i| self.owned_sites(PoolId(i as u32)))
            .sum()
    }

    /// Declare a structural pool.
    ///
    /// Returns `Ok(false)` if `sp` already is a structural pool, and
    /// `InvalidArgument` if it is a molecule pool or `location` is not a
    /// pool of this registry.
    pub fn declare_structure(
        &mut self,
        sp: &Species,
        kind: PoolKind,
        dimension: Dimension,
        radius: f64,
        location: PoolId,
    ) -> Result<bool, SpaceError> {
        check_species(sp)?;
        if self.voxel_pools.contains_key(sp) {
            return Ok(false);
        }
        if self.molecule_pools.contains_key(sp) {
            return Err(SpaceError::invalid(format!(
                "species '{sp}' is already assigned to a molecule pool"
            )));
        }
        if !matches!(kind, PoolKind::Structure | PoolKind::Interface) {
            return Err(SpaceError::invalid(format!(
                "{kind:?} is not a structural pool kind"
            )));
        }
        self.check_location(location)?;

        let id = self.next_id();
        self.pools.push(PoolEntry::Voxel(VoxelPool::new(
            sp.clone(),
            kind,
            dimension,
            radius,
            0.0,
            Some(location),
        )));
        self.voxel_pools.insert(sp.clone(), id);
        log::debug!(
            "declared {kind:?} pool {id} for '{sp}' ({dimension:?}) located in pool {location}"
        );
        Ok(true)
    }

    /// Get or create the molecule pool for `sp`.
    ///
    /// An existing molecule pool is returned unchanged, whatever the
    /// arguments. `InvalidArgument` if `sp` is structural or `location`
    /// is not a pool of this registry.
    pub fn declare_molecule(
        &mut self,
        sp: &Species,
        radius: f64,
        d: f64,
        location: PoolId,
    ) -> Result<PoolId, SpaceError> {
        check_species(sp)?;
        if let Some(&id) = self.molecule_pools.get(sp) {
            return Ok(id);
        }
        if self.voxel_pools.contains_key(sp) {
            return Err(SpaceError::invalid(format!(
                "species '{sp}' is a structural type, not a molecule"
            )));
        }
        self.check_location(location)?;

        let id = self.next_id();
        self.pools.push(PoolEntry::Molecule(MoleculePool::new(
            sp.clone(),
            radius,
            d,
            location,
        )));
        self.molecule_pools.insert(sp.clone(), id);
        log::debug!("created molecule pool {id} for '{sp}' located in pool {location}");
        Ok(id)
    }

    /// Record that pool `id` now owns `coord`.
    ///
    /// Molecule pools need the occupant's `pid`. Returns `false` if the
    /// pool refused the entry (duplicate pid or site, or a missing pid).
    pub fn attach(&mut self, id: PoolId, coord: Coordinate, pid: Option<ParticleId>) -> bool {
        match &mut self.pools[id.index()] {
            PoolEntry::Voxel(vp) if vp.is_vacant() => true,
            PoolEntry::Voxel(vp) => vp.insert_site(coord),
            PoolEntry::Molecule(mp) => match pid {
                Some(pid) => mp.add(CoordinateId::new(pid, coord)),
                None => false,
            },
        }
    }

    /// Record that pool `id` no longer owns `coord`, returning the
    /// particle that sat there for molecule pools.
    pub fn detach(&mut self, id: PoolId, coord: Coordinate) -> Option<ParticleId> {
        match &mut self.pools[id.index()] {
            PoolEntry::Voxel(vp) => {
                vp.remove_site(coord);
                None
            }
            PoolEntry::Molecule(mp) => mp.remove_at(coord),
        }
    }

    /// Move pool `id`'s ownership of `from` to `to`.
    ///
    /// For molecule pools the occupant keeps its id and `candidate` is a
    /// position hint into the particle table.
    pub fn relocate(&mut self, id: PoolId, from: Coordinate, to: Coordinate, candidate: usize) -> bool {
        match &mut self.pools[id.index()] {
            PoolEntry::Voxel(vp) if vp.is_vacant() => true,
            PoolEntry::Voxel(vp) => {
                if !vp.remove_site(from) {
                    return false;
                }
                vp.insert_site(to)
            }
            PoolEntry::Molecule(mp) => mp.relocate(from, to, candidate),
        }
    }

    /// Empty pool `id`, returning the sites it owned.
    pub fn drain(&mut self, id: PoolId) -> Vec<Coordinate> {
        let sites: Vec<Coordinate> = match &mut self.pools[id.index()] {
            PoolEntry::Voxel(vp) => vp.take_sites(),
            PoolEntry::Molecule(mp) => mp.take_all().into_iter().map(|e| e.coordinate).collect(),
        };
        if !sites.is_empty() {
            log::debug!("drained {} sites from pool {id}", sites.len());
        }
        sites
    }

    fn next_id(&self) -> PoolId {
        PoolId(self.pools.len() as u32)
    }

    fn check_location(&self, location: PoolId) -> Result<(), SpaceError> {
        match self.pools.get(location.index()) {
            None => Err(SpaceError::invalid(format!(
                "location pool {location} does not exist"
            ))),
            Some(PoolEntry::Molecule(mp)) => Err(SpaceError::invalid(format!(
                "molecule species '{}' cannot be a location",
                mp.species()
            ))),
            Some(PoolEntry::Voxel(_)) => Ok(()),
        }
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools)
            .field("voxel_pools", &self.voxel_pools)
            .field("molecule_pools", &self.molecule_pools)
            .finish_non_exhaustive()
    }
}

/// The empty serial names the vacant pool and cannot be declared.
fn check_species(sp: &Species) -> Result<(), SpaceError> {
    if sp.serial().is_empty() {
        Err(SpaceError::invalid("the empty species is reserved for vacant space"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(s: &str) -> Species {
        Species::new(s)
    }

    #[test]
    fn starts_with_vacant_only() {
        let reg = PoolRegistry::new(0.005);
        assert_eq!(reg.len(), 1);
        assert!(reg.vacant().is_vacant());
        assert!(reg.list_species().is_empty());
        assert!(reg.find_voxel_pool(&sp("A")).is_none());
        assert!(!reg.has_molecule_pool(&sp("A")));
    }

    #[test]
    fn lookups_cover_both_maps() {
        let mut reg = PoolRegistry::new(0.005);
        reg.declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT)
            .unwrap();
        let m = reg.pool_id(&sp("M")).unwrap();
        let a = reg.declare_molecule(&sp("A"), 0.005, 1e-12, m).unwrap();

        assert_eq!(reg.find_voxel_pool(&sp("M")).unwrap().kind(), PoolKind::Structure);
        // Molecule pools are visible through the descriptor lookup too.
        assert_eq!(reg.find_voxel_pool(&sp("A")).unwrap().kind(), PoolKind::Molecule);
        assert!(reg.find_molecule_pool(&sp("M")).is_none());
        assert!(reg.has_molecule_pool(&sp("A")));
        assert_eq!(reg.location_of(a), m);

        let mut species = reg.list_species();
        species.sort();
        assert_eq!(species, vec![sp("A"), sp("M")]);
    }

    #[test]
    fn redeclaration_rules() {
        let mut reg = PoolRegistry::new(0.005);
        let a = reg.declare_molecule(&sp("A"), 0.005, 1e-12, PoolId::VACANT).unwrap();
        assert_eq!(reg.declare_molecule(&sp("A"), 1.0, 1.0, PoolId::VACANT).unwrap(), a);
        assert!(reg
            .declare_structure(&sp("A"), PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT)
            .is_err());

        assert!(reg
            .declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT)
            .unwrap());
        assert!(!reg
            .declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT)
            .unwrap());
        assert!(reg.declare_molecule(&sp("M"), 0.005, 0.0, PoolId::VACANT).is_err());
    }

    #[test]
    fn empty_species_is_reserved() {
        let mut reg = PoolRegistry::new(0.005);
        let empty = Species::default();
        assert!(matches!(
            reg.declare_molecule(&empty, 0.005, 0.0, PoolId::VACANT),
            Err(SpaceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            reg.declare_structure(&empty, PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT),
            Err(SpaceError::InvalidArgument { .. })
        ));
        assert_eq!(reg.len(), 1);
        assert!(reg.list_species().is_empty());
    }

    #[test]
    fn unknown_location_rejected() {
        let mut reg = PoolRegistry::new(0.005);
        assert!(matches!(
            reg.declare_molecule(&sp("A"), 0.005, 0.0, PoolId(7)),
            Err(SpaceError::InvalidArgument { .. })
        ));
        assert!(reg.resolve_location(Some(&sp("nowhere"))).is_none());
        assert_eq!(reg.resolve_location(None), Some(PoolId::VACANT));
    }

    #[test]
    fn molecules_cannot_host_molecules() {
        let mut reg = PoolRegistry::new(0.005);
        let a = reg.declare_molecule(&sp("A"), 0.005, 0.0, PoolId::VACANT).unwrap();
        assert!(reg.declare_molecule(&sp("B"), 0.005, 0.0, a).is_err());
        assert!(reg
            .declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, a)
            .is_err());
    }

    #[test]
    fn voxel_reports_location_species() {
        let mut reg = PoolRegistry::new(0.005);
        reg.declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, PoolId::VACANT)
            .unwrap();
        let m = reg.pool_id(&sp("M")).unwrap();
        let a = reg.declare_molecule(&sp("A"), 0.004, 1e-12, m).unwrap();
        let b = reg.declare_molecule(&sp("B"), 0.005, 0.0, PoolId::VACANT).unwrap();

        let v = reg.voxel(a, 9);
        assert_eq!(v.species, sp("A"));
        assert_eq!(v.coordinate, 9);
        assert_eq!(v.radius, 0.004);
        assert_eq!(v.d, 1e-12);
        assert_eq!(v.location, Some(sp("M")));
        assert_eq!(reg.voxel(b, 0).location, None);
    }

    #[test]
    fn location_relation_is_a_forest() {
        let mut reg = PoolRegistry::new(0.005);
        reg.declare_structure(&sp("C"), PoolKind::Structure, Dimension::Three, 0.005, PoolId::VACANT)
            .unwrap();
        let c = reg.pool_id(&sp("C")).unwrap();
        reg.declare_structure(&sp("M"), PoolKind::Structure, Dimension::Two, 0.005, c)
            .unwrap();
        let m = reg.pool_id(&sp("M")).unwrap();
        let a = reg.declare_molecule(&sp("A"), 0.005, 0.0, m).unwrap();

        let chain: Vec<PoolId> = reg.ancestors(a).collect();
        assert_eq!(chain, vec![m, c, PoolId::VACANT]);
        assert_eq!(reg.ancestors(PoolId::VACANT).count(), 0);
        for id in [c, m, a] {
            assert!(reg.ancestors(id).all(|p| p < id));
        }
    }

    #[test]
    fn bookkeeping_and_drain() {
        let mut reg = PoolRegistry::new(0.005);
        let a = reg.declare_molecule(&sp("A"), 0.005, 0.0, PoolId::VACANT).unwrap();
        assert!(reg.attach(a, 3, Some(ParticleId(1))));
        assert!(reg.attach(a, 4, Some(ParticleId(2))));
        assert!(!reg.attach(a, 5, None), "molecule pools need a pid");
        assert_eq!(reg.find_particle(ParticleId(2)), Some((a, 4)));
        assert!(reg.relocate(a, 4, 6, 0));
        assert_eq!(reg.find_particle(ParticleId(2)), Some((a, 6)));
        assert_eq!(reg.detach(a, 3), Some(ParticleId(1)));
        assert_eq!(reg.occupied_sites(), 1);

        let mut drained = reg.drain(a);
        drained.sort();
        assert_eq!(drained, vec![6]);
        assert_eq!(reg.owned_sites(a), 0);
        assert!(reg.find_particle(ParticleId(2)).is_none());
    }
}
