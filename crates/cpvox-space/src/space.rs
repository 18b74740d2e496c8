//! The core [`VoxelSpace`] trait and the shared [`SpaceBase`] state.

use std::path::Path;

use cpvox_core::{Coordinate, Integer3, Particle, ParticleId, PoolId, Real3, Species, Voxel};
use smallvec::SmallVec;

use crate::error::SpaceError;
use crate::geometry;
use crate::pool::{CoordinateId, Dimension, MoleculePool, VoxelPool};
use crate::registry::PoolRegistry;
use crate::shape::Shape;

/// State every backend carries: the simulation time, the voxel radius
/// and the pool registry.
#[derive(Clone, Debug)]
pub struct SpaceBase {
    t: f64,
    voxel_radius: f64,
    registry: PoolRegistry,
}

impl SpaceBase {
    /// Fresh state at `t = 0` with only the vacant pool registered.
    pub fn new(voxel_radius: f64) -> Self {
        Self {
            t: 0.0,
            voxel_radius,
            registry: PoolRegistry::new(voxel_radius),
        }
    }

    /// Current simulation time.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Set the simulation time.
    ///
    /// Negative and non-finite values are rejected and leave the time
    /// unchanged. Decreasing the time is allowed.
    pub fn set_t(&mut self, t: f64) -> Result<(), SpaceError> {
        if !t.is_finite() || t < 0.0 {
            return Err(SpaceError::invalid(format!(
                "the time must be a non-negative finite value, got {t}"
            )));
        }
        self.t = t;
        Ok(())
    }

    /// Radius of one lattice site.
    pub fn voxel_radius(&self) -> f64 {
        self.voxel_radius
    }

    /// The pool registry.
    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Mutable access to the pool registry.
    pub fn registry_mut(&mut self) -> &mut PoolRegistry {
        &mut self.registry
    }
}

/// Optional features a backend provides.
///
/// Callers branch on these instead of probing with calls that would fail
/// with [`SpaceError::NotSupported`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `make_structure_type` and `update_structure`.
    pub structures: bool,
    /// `make_interface_type`.
    pub interfaces: bool,
    /// `save` and `load`.
    pub persistence: bool,
}

/// A discrete close-packed lattice store.
///
/// Backends supply geometry (addressing, positions, neighbors) and the
/// occupancy mutations that must keep their per-site table and the pool
/// registry in step. Everything else (counting, listing, particle views,
/// accounting, structure filling) is provided on top of those.
///
/// # Occupancy contract
///
/// - Every site belongs to exactly one pool; vacant owns every site no
///   other pool claims.
/// - A molecule pool's particle table is a bijection between ids and the
///   sites it owns.
/// - A mutation either applies completely or leaves the state untouched.
///   Contention (a move onto a taken site) is a `false` result, never an
///   error.
///
/// # Examples
///
/// ```
/// use cpvox_core::{ParticleId, Real3, Species, Voxel};
/// use cpvox_space::{EdgeBehavior, HcpLatticeSpace, VoxelSpace};
///
/// let mut space =
///     HcpLatticeSpace::new(Real3::new(0.1, 0.1, 0.1), 0.01, EdgeBehavior::Absorb).unwrap();
/// let a = Species::new("A");
/// assert!(space.update_voxel(ParticleId(1), Voxel::new(a.clone(), 0)).unwrap());
/// assert_eq!(space.num_voxels_exact(&a), 1);
/// assert_eq!(space.get_voxel(ParticleId(1)).unwrap().coordinate, 0);
/// ```
pub trait VoxelSpace {
    /// Shared state.
    fn base(&self) -> &SpaceBase;

    /// Mutable shared state.
    fn base_mut(&mut self) -> &mut SpaceBase;

    // -- Geometry -----------------------------------------------------------

    /// Number of addressable coordinates, padding included.
    fn size(&self) -> usize;

    /// Lattice extent in columns, rows and layers.
    fn shape(&self) -> Integer3;

    /// Number of sites that belong to the simulated volume.
    fn inner_size(&self) -> usize;

    /// Physical extent of the lattice.
    fn actual_lengths(&self) -> Real3;

    /// Centre of site `coord`.
    fn coordinate2position(&self, coord: Coordinate) -> Real3;

    /// Site whose centre is nearest to `pos`; `None` outside the lattice.
    fn position2coordinate(&self, pos: &Real3) -> Option<Coordinate>;

    /// Map an index in `0..inner_size()` to a coordinate.
    fn inner2coordinate(&self, inner: usize) -> Coordinate;

    /// Number of neighbor directions of `coord`.
    fn num_neighbors(&self, coord: Coordinate) -> usize;

    /// Neighbor `nrand` of `coord`, or `None` if it leaves the lattice.
    fn get_neighbor(&self, coord: Coordinate, nrand: usize) -> Option<Coordinate>;

    /// Neighbor `nrand` of `coord`, applying the backend's boundary rule
    /// (wrapping on periodic lattices).
    fn get_neighbor_boundary(&self, coord: Coordinate, nrand: usize) -> Option<Coordinate>;

    // -- Occupancy (backend) -------------------------------------------------

    /// Pool owning `coord`; `None` out of range.
    fn get_voxel_pool_at(&self, coord: Coordinate) -> Option<PoolId>;

    /// Place (or move) molecule `pid` at `voxel.coordinate`.
    ///
    /// The pool for `voxel.species` is created on success if it does not
    /// exist yet, using the voxel's radius, diffusion coefficient and
    /// location. The destination must currently be owned by that pool's
    /// location. If `pid` already exists elsewhere, its old site returns
    /// to its old pool's location.
    ///
    /// Returns `Ok(false)` on an occupancy conflict,
    /// [`SpaceError::CoordOutOfBounds`] for a bad coordinate, and
    /// [`SpaceError::InvalidArgument`] if the species is structural or
    /// its location is not a structural pool.
    fn update_voxel(&mut self, pid: ParticleId, voxel: Voxel) -> Result<bool, SpaceError>;

    /// Assign `voxel.coordinate` to the declared structural pool of
    /// `voxel.species`, under the same location rule as
    /// [`update_voxel`](Self::update_voxel).
    fn update_structure(&mut self, voxel: &Voxel) -> Result<bool, SpaceError>;

    /// Remove molecule `pid`, handing its site to its pool's location.
    fn remove_voxel(&mut self, pid: ParticleId) -> bool;

    /// Vacate `coord`, handing it to its pool's location. `false` for
    /// vacant or out-of-range sites.
    fn remove_voxel_at(&mut self, coord: Coordinate) -> bool;

    /// Whether [`move_voxel`](Self::move_voxel) from `src` to `dest` would
    /// succeed.
    fn can_move(&self, src: Coordinate, dest: Coordinate) -> bool;

    /// Move the occupant of `src` to `dest`, keeping its id; `dest`'s pool
    /// takes `src`. `candidate` is a hint for the occupant's position in
    /// its pool's particle table.
    fn move_voxel(&mut self, src: Coordinate, dest: Coordinate, candidate: usize) -> bool;

    /// Random-walk step: move `info` towards neighbor `nrand` if that site
    /// is owned by `loc` and `info.coordinate` is owned by `from`.
    ///
    /// Returns the new coordinate and `true` on success (and rewrites
    /// `info.coordinate`), or the original coordinate and `false`.
    fn move_to_neighbor(
        &mut self,
        from: PoolId,
        loc: PoolId,
        info: &mut CoordinateId,
        nrand: usize,
    ) -> (Coordinate, bool);

    /// Number of sites owned by `pool`. For vacant this is every inner
    /// site no other pool owns.
    fn count_voxels(&self, pool: PoolId) -> usize;

    /// Whether the site of `voxel` is held by anything but vacant.
    fn on_structure(&self, voxel: &Voxel) -> bool;

    /// Empty the pool of `sp`, handing every site to the pool's location.
    /// Returns the number of sites released.
    fn drain_species(&mut self, sp: &Species) -> usize;

    // -- Type declaration ------------------------------------------------------

    /// Declare `sp` as a structure of `dimension` located in `loc`
    /// (`None` for vacant space). `Ok(false)` if already declared.
    fn make_structure_type(
        &mut self,
        sp: &Species,
        dimension: Dimension,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        let _ = (sp, dimension, loc);
        Err(SpaceError::NotSupported {
            operation: "make_structure_type",
        })
    }

    /// Declare `sp` as an interface between structures.
    fn make_interface_type(
        &mut self,
        sp: &Species,
        dimension: Dimension,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        let _ = (sp, dimension, loc);
        Err(SpaceError::NotSupported {
            operation: "make_interface_type",
        })
    }

    /// Declare a molecule pool with explicit attributes. `Ok(false)` if
    /// the pool already exists (its attributes are left unchanged).
    fn make_molecule_type(
        &mut self,
        sp: &Species,
        radius: f64,
        d: f64,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        let _ = (sp, radius, d, loc);
        Err(SpaceError::NotSupported {
            operation: "make_molecule_type",
        })
    }

    /// Persist the space to `path`.
    fn save(&self, path: &Path) -> Result<(), SpaceError> {
        let _ = path;
        Err(SpaceError::NotSupported { operation: "save" })
    }

    /// Restore the space from `path`.
    fn load(&mut self, path: &Path) -> Result<(), SpaceError> {
        let _ = path;
        Err(SpaceError::NotSupported { operation: "load" })
    }

    /// Optional features of this backend.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    // -- Time and accounting -------------------------------------------------

    /// Current simulation time.
    fn t(&self) -> f64 {
        self.base().t()
    }

    /// Set the simulation time; see [`SpaceBase::set_t`].
    fn set_t(&mut self, t: f64) -> Result<(), SpaceError> {
        self.base_mut().set_t(t)
    }

    /// Radius of one site.
    fn voxel_radius(&self) -> f64 {
        self.base().voxel_radius()
    }

    /// Volume of one site.
    fn voxel_volume(&self) -> f64 {
        geometry::voxel_volume(self.voxel_radius())
    }

    /// Area of one site of a close-packed surface.
    fn unit_area(&self) -> f64 {
        geometry::unit_area(self.voxel_radius())
    }

    /// Volume of the simulated region.
    fn actual_volume(&self) -> f64 {
        self.inner_size() as f64 * self.voxel_volume()
    }

    /// Volume occupied by `sp`.
    fn get_volume(&self, sp: &Species) -> f64 {
        self.voxel_volume() * self.num_voxels_exact(sp) as f64
    }

    // -- Registry views --------------------------------------------------------

    /// Every registered species, vacant excluded.
    fn list_species(&self) -> Vec<Species> {
        self.base().registry().list_species()
    }

    /// Descriptor of the pool storing `sp`.
    fn find_voxel_pool(&self, sp: &Species) -> Option<&VoxelPool> {
        self.base().registry().find_voxel_pool(sp)
    }

    /// Molecule pool storing `sp`.
    fn find_molecule_pool(&self, sp: &Species) -> Option<&MoleculePool> {
        self.base().registry().find_molecule_pool(sp)
    }

    /// Whether `sp` has a molecule pool.
    fn has_molecule_pool(&self, sp: &Species) -> bool {
        self.base().registry().has_molecule_pool(sp)
    }

    /// Neighbors of `coord` reachable under the boundary rule.
    fn neighbors(&self, coord: Coordinate) -> SmallVec<[Coordinate; 12]> {
        (0..self.num_neighbors(coord))
            .filter_map(|nrand| self.get_neighbor_boundary(coord, nrand))
            .collect()
    }

    // -- Counting ------------------------------------------------------------

    /// Number of sites held by any pool but vacant.
    fn num_voxels(&self) -> usize {
        self.base().registry().occupied_sites()
    }

    /// Number of sites held by pools whose species matches `sp`.
    fn num_voxels_of(&self, sp: &Species) -> usize {
        let reg = self.base().registry();
        let matcher = reg.matcher();
        reg.voxel_pools()
            .map(|(id, vp)| (id, vp.species()))
            .chain(reg.molecule_pools().map(|(id, mp)| (id, mp.species())))
            .filter(|(_, species)| matcher.matches(sp, species))
            .map(|(id, _)| self.count_voxels(id))
            .sum()
    }

    /// Number of sites held by the pool of exactly `sp`.
    fn num_voxels_exact(&self, sp: &Species) -> usize {
        self.base()
            .registry()
            .pool_id(sp)
            .map_or(0, |id| self.count_voxels(id))
    }

    /// Matcher-weighted molecule count: a molecule whose species contains
    /// `sp` `k` times counts `k` times.
    fn num_molecules(&self, sp: &Species) -> usize {
        let reg = self.base().registry();
        let matcher = reg.matcher();
        reg.molecule_pools()
            .map(|(_, mp)| matcher.count(sp, mp.species()) * mp.size())
            .sum()
    }

    /// Number of molecules of exactly `sp`.
    fn num_molecules_exact(&self, sp: &Species) -> usize {
        self.num_voxels_exact(sp)
    }

    // -- Voxel lookups -------------------------------------------------------

    /// Whether molecule `pid` is on the lattice.
    fn has_voxel(&self, pid: ParticleId) -> bool {
        self.base().registry().find_particle(pid).is_some()
    }

    /// Occupant record of molecule `pid`.
    fn get_voxel(&self, pid: ParticleId) -> Option<Voxel> {
        let reg = self.base().registry();
        reg.find_particle(pid).map(|(id, coord)| reg.voxel(id, coord))
    }

    /// Occupant record of `coord`, with its particle id when the site is
    /// held by a molecule pool.
    fn get_voxel_at(&self, coord: Coordinate) -> Option<(Option<ParticleId>, Voxel)> {
        let id = self.get_voxel_pool_at(coord)?;
        let reg = self.base().registry();
        let pid = reg.molecule_pool(id).and_then(|mp| mp.find_at(coord));
        Some((pid, reg.voxel(id, coord)))
    }

    /// Every molecule on the lattice.
    fn list_voxels(&self) -> Vec<(ParticleId, Voxel)> {
        let reg = self.base().registry();
        reg.molecule_pools()
            .flat_map(|(id, mp)| mp.iter().map(move |e| (e.pid, reg.voxel(id, e.coordinate))))
            .collect()
    }

    /// Every molecule whose species matches `sp`.
    fn list_voxels_of(&self, sp: &Species) -> Vec<(ParticleId, Voxel)> {
        let reg = self.base().registry();
        let matcher = reg.matcher();
        reg.molecule_pools()
            .filter(|(_, mp)| matcher.matches(sp, mp.species()))
            .flat_map(|(id, mp)| mp.iter().map(move |e| (e.pid, reg.voxel(id, e.coordinate))))
            .collect()
    }

    /// Every molecule of exactly `sp`.
    fn list_voxels_exact(&self, sp: &Species) -> Vec<(ParticleId, Voxel)> {
        let reg = self.base().registry();
        let Some(id) = reg.pool_id(sp) else {
            return Vec::new();
        };
        match reg.molecule_pool(id) {
            Some(mp) => mp
                .iter()
                .map(|e| (e.pid, reg.voxel(id, e.coordinate)))
                .collect(),
            None => Vec::new(),
        }
    }

    // -- Particle views --------------------------------------------------------

    /// Continuous-space view of `coord`'s occupant (vacant included).
    fn particle_at(&self, coord: Coordinate) -> Option<Particle> {
        let id = self.get_voxel_pool_at(coord)?;
        let pool = self.base().registry().pool(id);
        Some(Particle {
            species: pool.species().clone(),
            position: self.coordinate2position(coord),
            radius: pool.radius(),
            d: pool.d(),
        })
    }

    /// Number of molecules on the lattice.
    ///
    /// Structure sites are not particles, so unlike
    /// [`num_voxels`](Self::num_voxels) this agrees with
    /// [`list_particles`](Self::list_particles).
    fn num_particles(&self) -> usize {
        self.base()
            .registry()
            .molecule_pools()
            .map(|(_, mp)| mp.size())
            .sum()
    }

    /// Number of molecules whose species matches `sp`.
    fn num_particles_of(&self, sp: &Species) -> usize {
        let reg = self.base().registry();
        let matcher = reg.matcher();
        reg.molecule_pools()
            .filter(|(_, mp)| matcher.matches(sp, mp.species()))
            .map(|(_, mp)| mp.size())
            .sum()
    }

    /// Number of molecules of exactly `sp`.
    fn num_particles_exact(&self, sp: &Species) -> usize {
        self.find_molecule_pool(sp).map_or(0, MoleculePool::size)
    }

    /// Whether molecule `pid` is on the lattice.
    fn has_particle(&self, pid: ParticleId) -> bool {
        self.has_voxel(pid)
    }

    /// Continuous-space view of molecule `pid`.
    fn get_particle(&self, pid: ParticleId) -> Option<Particle> {
        let (_, coord) = self.base().registry().find_particle(pid)?;
        self.particle_at(coord)
    }

    /// Every molecule as a particle.
    fn list_particles(&self) -> Vec<(ParticleId, Particle)> {
        to_particles(self, self.list_voxels())
    }

    /// Every molecule whose species matches `sp`, as particles.
    fn list_particles_of(&self, sp: &Species) -> Vec<(ParticleId, Particle)> {
        to_particles(self, self.list_voxels_of(sp))
    }

    /// Every molecule of exactly `sp`, as particles.
    fn list_particles_exact(&self, sp: &Species) -> Vec<(ParticleId, Particle)> {
        to_particles(self, self.list_voxels_exact(sp))
    }

    /// Remove molecule `pid`.
    fn remove_particle(&mut self, pid: ParticleId) -> bool {
        self.remove_voxel(pid)
    }

    // -- Structures ------------------------------------------------------------

    /// Declare `sp` with the shape's dimension and assign it every site
    /// the shape covers. Returns the number of sites assigned.
    ///
    /// A 3D shape claims every site with `is_inside <= 0`. A 2D shape
    /// claims the one-site-thick shell of sites with
    /// `-2r <= is_inside <= 0` that touch at least one site strictly
    /// outside. Sites not owned by `loc` are skipped.
    fn add_structure(
        &mut self,
        sp: &Species,
        shape: &dyn Shape,
        loc: Option<&Species>,
    ) -> Result<usize, SpaceError> {
        let dimension = shape.dimension();
        if !matches!(dimension, Dimension::Two | Dimension::Three) {
            return Err(SpaceError::NotSupported {
                operation: "add_structure for this dimension",
            });
        }
        self.make_structure_type(sp, dimension, loc)?;

        let shell = 2.0 * self.voxel_radius();
        let mut placed = 0;
        for inner in 0..self.inner_size() {
            let coord = self.inner2coordinate(inner);
            let l = shape.is_inside(&self.coordinate2position(coord));
            let claim = match dimension {
                Dimension::Three => l <= 0.0,
                _ => {
                    (-shell..=0.0).contains(&l)
                        && (0..self.num_neighbors(coord))
                            .filter_map(|nrand| self.get_neighbor(coord, nrand))
                            .any(|n| shape.is_inside(&self.coordinate2position(n)) > 0.0)
                }
            };
            if !claim {
                continue;
            }
            let mut voxel = Voxel::new(sp.clone(), coord);
            voxel.location = loc.cloned();
            if self.update_structure(&voxel)? {
                placed += 1;
            }
        }
        if placed == 0 {
            log::warn!("structure '{sp}' covers no free site of the lattice");
        } else {
            log::debug!("added structure '{sp}' ({dimension:?}) on {placed} sites");
        }
        Ok(placed)
    }
}

fn to_particles<S: VoxelSpace + ?Sized>(
    space: &S,
    voxels: Vec<(ParticleId, Voxel)>,
) -> Vec<(ParticleId, Particle)> {
    voxels
        .into_iter()
        .map(|(pid, v)| {
            let particle = Particle {
                position: space.coordinate2position(v.coordinate),
                species: v.species,
                radius: v.radius,
                d: v.d,
            };
            (pid, particle)
        })
        .collect()
}
