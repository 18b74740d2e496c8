//! Per-species site owners: [`VoxelPool`] and [`MoleculePool`].
//!
//! A [`VoxelPool`] is the descriptor every pool carries (species, kind,
//! radius, diffusion coefficient, location). Structural pools also keep
//! the set of sites they own. A [`MoleculePool`] wraps a descriptor and
//! tracks one [`ParticleId`] per owned site; the table is a bijection at
//! all times.

use std::collections::HashMap;

use cpvox_core::{Coordinate, ParticleId, PoolId, Species};
use indexmap::{IndexMap, IndexSet};

/// What a pool represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// The distinguished owner of every unoccupied site.
    Vacant,
    /// An immobile structure (membrane, compartment filler).
    Structure,
    /// The boundary between two structures.
    Interface,
    /// Mobile, individually tracked molecules.
    Molecule,
}

/// Topological dimension of a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    /// A filamentous structure.
    One,
    /// A surface (membrane).
    Two,
    /// A volume.
    Three,
    /// Not declared; molecules and vacant space.
    #[default]
    Undefined,
}

/// A `(ParticleId, Coordinate)` entry of a [`MoleculePool`].
///
/// The stepping algorithm holds copies of these while it walks a pool and
/// hands them back to
/// [`move_to_neighbor`](crate::VoxelSpace::move_to_neighbor), which
/// rewrites `coordinate` on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordinateId {
    /// The occupant.
    pub pid: ParticleId,
    /// The site it occupies.
    pub coordinate: Coordinate,
}

impl CoordinateId {
    /// Pair a particle with its site.
    pub fn new(pid: ParticleId, coordinate: Coordinate) -> Self {
        Self { pid, coordinate }
    }
}

/// Descriptor shared by every pool.
#[derive(Clone, Debug)]
pub struct VoxelPool {
    species: Species,
    kind: PoolKind,
    dimension: Dimension,
    radius: f64,
    d: f64,
    location: Option<PoolId>,
    /// Owned sites. Only populated for `Structure` and `Interface` pools:
    /// vacant owns the complement of all other pools, molecule pools keep
    /// their sites in the particle table.
    sites: IndexSet<Coordinate>,
}

impl VoxelPool {
    pub(crate) fn new(
        species: Species,
        kind: PoolKind,
        dimension: Dimension,
        radius: f64,
        d: f64,
        location: Option<PoolId>,
    ) -> Self {
        Self {
            species,
            kind,
            dimension,
            radius,
            d,
            location,
            sites: IndexSet::new(),
        }
    }

    /// Species this pool stores.
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// What the pool represents.
    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Declared dimension.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Occupant radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Diffusion coefficient.
    pub fn d(&self) -> f64 {
        self.d
    }

    /// Pool this one is embedded in; `None` only for vacant.
    pub fn location(&self) -> Option<PoolId> {
        self.location
    }

    /// Whether this is the vacant pool.
    pub fn is_vacant(&self) -> bool {
        self.kind == PoolKind::Vacant
    }

    /// Whether this pool is a structure or interface.
    pub fn is_structure(&self) -> bool {
        matches!(self.kind, PoolKind::Structure | PoolKind::Interface)
    }

    /// Sites owned by a structural pool. Empty for vacant and molecule
    /// pools.
    pub fn sites(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.sites.iter().copied()
    }

    /// Whether a structural pool owns `coord`.
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.sites.contains(&coord)
    }

    pub(crate) fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub(crate) fn insert_site(&mut self, coord: Coordinate) -> bool {
        self.sites.insert(coord)
    }

    pub(crate) fn remove_site(&mut self, coord: Coordinate) -> bool {
        self.sites.swap_remove(&coord)
    }

    pub(crate) fn take_sites(&mut self) -> Vec<Coordinate> {
        std::mem::take(&mut self.sites).into_iter().collect()
    }
}

/// A pool of individually tracked molecules.
///
/// `occupants` maps each particle to its site and `by_coord` maps each
/// site back to its particle; both tables always hold the same pairs.
#[derive(Clone, Debug)]
pub struct MoleculePool {
    pool: VoxelPool,
    occupants: IndexMap<ParticleId, Coordinate>,
    by_coord: HashMap<Coordinate, ParticleId>,
}

impl MoleculePool {
    pub(crate) fn new(species: Species, radius: f64, d: f64, location: PoolId) -> Self {
        Self {
            pool: VoxelPool::new(
                species,
                PoolKind::Molecule,
                Dimension::Undefined,
                radius,
                d,
                Some(location),
            ),
            occupants: IndexMap::new(),
            by_coord: HashMap::new(),
        }
    }

    /// The pool descriptor.
    pub fn as_voxel_pool(&self) -> &VoxelPool {
        &self.pool
    }

    /// Species this pool stores.
    pub fn species(&self) -> &Species {
        self.pool.species()
    }

    /// Pool the molecules are embedded in.
    pub fn location(&self) -> Option<PoolId> {
        self.pool.location()
    }

    /// Number of molecules.
    pub fn size(&self) -> usize {
        self.occupants.len()
    }

    /// Whether the pool holds no molecules.
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Site of `pid`, if it lives in this pool.
    pub fn find(&self, pid: ParticleId) -> Option<Coordinate> {
        self.occupants.get(&pid).copied()
    }

    /// Particle occupying `coord`, if it belongs to this pool.
    pub fn find_at(&self, coord: Coordinate) -> Option<ParticleId> {
        self.by_coord.get(&coord).copied()
    }

    /// Entry at table position `index`.
    pub fn get_index(&self, index: usize) -> Option<CoordinateId> {
        self.occupants
            .get_index(index)
            .map(|(&pid, &coordinate)| CoordinateId { pid, coordinate })
    }

    /// All entries in table order.
    ///
    /// The order is stable as long as the pool is not mutated.
    pub fn iter(&self) -> impl Iterator<Item = CoordinateId> + '_ {
        self.occupants
            .iter()
            .map(|(&pid, &coordinate)| CoordinateId { pid, coordinate })
    }

    /// Insert an entry. Returns `false` (and changes nothing) if either
    /// the particle or the site is already present.
    pub(crate) fn add(&mut self, entry: CoordinateId) -> bool {
        if self.occupants.contains_key(&entry.pid) || self.by_coord.contains_key(&entry.coordinate) {
            return false;
        }
        self.occupants.insert(entry.pid, entry.coordinate);
        self.by_coord.insert(entry.coordinate, entry.pid);
        true
    }

    /// Remove the entry at `coord`, returning its particle.
    pub(crate) fn remove_at(&mut self, coord: Coordinate) -> Option<ParticleId> {
        let pid = self.by_coord.remove(&coord)?;
        self.occupants.swap_remove(&pid);
        Some(pid)
    }

    /// Move the particle at `from` to `to`, keeping its id.
    ///
    /// `candidate` is a position hint into the table: if the entry at that
    /// index sits at `from` it is used directly, otherwise the site index
    /// is consulted. Returns `false` if nothing sits at `from` or `to` is
    /// already taken.
    pub(crate) fn relocate(&mut self, from: Coordinate, to: Coordinate, candidate: usize) -> bool {
        if self.by_coord.contains_key(&to) {
            return false;
        }
        let pid = match self.occupants.get_index(candidate) {
            Some((&pid, &coord)) if coord == from => pid,
            _ => match self.by_coord.get(&from) {
                Some(&pid) => pid,
                None => return false,
            },
        };
        self.by_coord.remove(&from);
        self.by_coord.insert(to, pid);
        if let Some(slot) = self.occupants.get_mut(&pid) {
            *slot = to;
        }
        true
    }

    /// Empty the pool, returning every entry.
    pub(crate) fn take_all(&mut self) -> Vec<CoordinateId> {
        self.by_coord.clear();
        std::mem::take(&mut self.occupants)
            .into_iter()
            .map(|(pid, coordinate)| CoordinateId { pid, coordinate })
            .collect()
    }
}
