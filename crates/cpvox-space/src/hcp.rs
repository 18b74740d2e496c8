//! Dense hexagonal close-packed lattice with 12-connected neighborhood.
//!
//! Every site is a sphere of radius `r` touching exactly 12 others, which
//! gives the random walk no preferred direction beyond the lattice
//! symmetry.
//!
//! # Coordinate System
//!
//! A site is addressed by `(col, row, layer)` and flattened as
//! `coord = row + rows * (col + cols * layer)`. There is no padding:
//! every coordinate in `0..size()` is an inner site.
//!
//! Site centres:
//!
//! ```text
//! x = col * HCP_X
//! y = (col % 2) * HCP_L + layer * HCP_Y
//! z = (2 * row + (layer + col) % 2) * r
//! ```
//!
//! # Edge Behavior
//!
//! - **Absorb**: neighbors outside the lattice do not exist.
//! - **Wrap**: neighbors wrap on every axis. The row offset of a neighbor
//!   depends on the parity of `layer + col` and the layer offset on the
//!   parity of `col`, so both extents must be even for the wrap to stay
//!   close-packed.

use cpvox_core::{Coordinate, Integer3, ParticleId, PoolId, Real3, Species, Voxel};

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::geometry;
use crate::pool::{CoordinateId, Dimension, PoolKind};
use crate::space::{Capabilities, SpaceBase, VoxelSpace};

/// A hexagonal close-packed lattice backed by one pool handle per site.
#[derive(Clone, Debug)]
pub struct HcpLatticeSpace {
    base: SpaceBase,
    edge: EdgeBehavior,
    /// `(HCP_L, HCP_X, HCP_Y)` for the voxel radius.
    hcp: Real3,
    cols: i64,
    rows: i64,
    layers: i64,
    /// Owning pool of every site.
    voxels: Vec<PoolId>,
}

impl HcpLatticeSpace {
    /// Number of neighbor directions of every site.
    pub const NUM_NEIGHBORS: usize = 12;

    /// Create a lattice covering `edge_lengths` with voxels of radius
    /// `voxel_radius`.
    ///
    /// The extent comes from [`geometry::shape`], so a `Wrap` lattice is
    /// always even on every axis. Returns `InvalidArgument` for a
    /// non-positive radius or negative edge length.
    pub fn new(
        edge_lengths: Real3,
        voxel_radius: f64,
        edge: EdgeBehavior,
    ) -> Result<Self, SpaceError> {
        check_radius(voxel_radius)?;
        for (axis, len) in [("x", edge_lengths.x), ("y", edge_lengths.y), ("z", edge_lengths.z)] {
            if !len.is_finite() || len < 0.0 {
                return Err(SpaceError::invalid(format!(
                    "edge length along {axis} must be finite and non-negative, got {len}"
                )));
            }
        }
        let shape = geometry::shape(&edge_lengths, voxel_radius, edge.is_periodic())
            .ok_or_else(|| {
                SpaceError::invalid(format!(
                    "radius {voxel_radius} is too small to tile {edge_lengths}"
                ))
            })?;
        Self::from_shape(shape, voxel_radius, edge)
    }

    /// Create a lattice with an explicit `cols x rows x layers` extent.
    ///
    /// Returns `EmptySpace` if any extent is zero or negative, and
    /// `InvalidArgument` for an odd extent under `Wrap` or a site count
    /// that does not fit in memory addressing.
    pub fn from_shape(
        shape: Integer3,
        voxel_radius: f64,
        edge: EdgeBehavior,
    ) -> Result<Self, SpaceError> {
        check_radius(voxel_radius)?;
        if shape.col <= 0 || shape.row <= 0 || shape.layer <= 0 {
            return Err(SpaceError::EmptySpace);
        }
        if edge.is_periodic() && (shape.col % 2 != 0 || shape.row % 2 != 0 || shape.layer % 2 != 0)
        {
            return Err(SpaceError::invalid(format!(
                "a periodic hcp lattice needs even extents, got {shape}"
            )));
        }
        let size = site_count_checked(&shape).ok_or_else(|| {
            SpaceError::invalid(format!("hcp lattice {shape} exceeds the addressable site count"))
        })?;

        log::debug!("hcp lattice {shape} ({size} sites), r = {voxel_radius}, {edge:?}");

        Ok(Self {
            base: SpaceBase::new(voxel_radius),
            edge,
            hcp: geometry::hcp_lengths(voxel_radius),
            cols: shape.col,
            rows: shape.row,
            layers: shape.layer,
            voxels: vec![PoolId::VACANT; size],
        })
    }

    /// Edge behavior.
    pub fn edge_behavior(&self) -> EdgeBehavior {
        self.edge
    }

    /// Whether neighbors wrap around the lattice.
    pub fn is_periodic(&self) -> bool {
        self.edge.is_periodic()
    }

    /// Split a coordinate into `(col, row, layer)`.
    pub fn split(&self, coord: Coordinate) -> Integer3 {
        let coord = coord as i64;
        let row = coord % self.rows;
        let rest = coord / self.rows;
        Integer3::new(rest % self.cols, row, rest / self.cols)
    }

    /// Flatten `(col, row, layer)`; `None` outside the lattice.
    pub fn join(&self, g: Integer3) -> Option<Coordinate> {
        let inside = (0..self.cols).contains(&g.col)
            && (0..self.rows).contains(&g.row)
            && (0..self.layers).contains(&g.layer);
        inside.then(|| (g.row + self.rows * (g.col + self.cols * g.layer)) as Coordinate)
    }

    fn check_coord(&self, coord: Coordinate) -> Result<(), SpaceError> {
        if coord < self.voxels.len() {
            Ok(())
        } else {
            Err(SpaceError::CoordOutOfBounds {
                coord,
                size: self.voxels.len(),
            })
        }
    }

    fn neighbor(&self, coord: Coordinate, nrand: usize, wrap: bool) -> Option<Coordinate> {
        if coord >= self.voxels.len() {
            return None;
        }
        let g = self.split(coord);
        let (dc, dr, dl) = neighbor_offset(g.col, g.layer, nrand)?;
        let target = Integer3::new(g.col + dc, g.row + dr, g.layer + dl);
        if wrap {
            self.join(Integer3::new(
                target.col.rem_euclid(self.cols),
                target.row.rem_euclid(self.rows),
                target.layer.rem_euclid(self.layers),
            ))
        } else {
            self.join(target)
        }
    }

    /// Resolve a location species for a new pool. `None` is vacant
    /// space; anything but a structural pool is rejected.
    fn resolve_location(&self, loc: Option<&Species>) -> Result<PoolId, SpaceError> {
        let reg = self.base.registry();
        match reg.resolve_location(loc) {
            Some(id) if reg.molecule_pool(id).is_none() => Ok(id),
            _ => Err(SpaceError::invalid(format!(
                "location '{}' is not a structural pool",
                loc.map(Species::serial).unwrap_or_default()
            ))),
        }
    }

    /// Hand `coord`, owned by `from`, to pool `to`.
    fn transfer(&mut self, coord: Coordinate, from: PoolId, to: PoolId, pid: Option<ParticleId>) {
        let reg = self.base.registry_mut();
        reg.detach(from, coord);
        reg.attach(to, coord, pid);
        self.voxels[coord] = to;
    }

    /// Return `coord`, owned by `id`, to `id`'s location.
    fn release(&mut self, coord: Coordinate, id: PoolId) {
        let loc = self.base.registry().location_of(id);
        self.transfer(coord, id, loc, None);
    }

    /// Swap the owners of `src` and `dest`; the occupant of `src` keeps
    /// its identity.
    fn swap_sites(&mut self, src: Coordinate, dest: Coordinate, candidate: usize) -> bool {
        let (moving, displaced) = (self.voxels[src], self.voxels[dest]);
        let reg = self.base.registry_mut();
        if !reg.relocate(moving, src, dest, candidate) {
            return false;
        }
        reg.relocate(displaced, dest, src, 0);
        self.voxels[src] = displaced;
        self.voxels[dest] = moving;
        true
    }

    fn declare_structural(
        &mut self,
        sp: &Species,
        kind: PoolKind,
        dimension: Dimension,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        if self.base.registry().find_voxel_pool(sp).is_some_and(|p| p.is_structure()) {
            return Ok(false);
        }
        let location = self.resolve_location(loc)?;
        let radius = self.base.voxel_radius();
        self.base
            .registry_mut()
            .declare_structure(sp, kind, dimension, radius, location)
    }
}

impl VoxelSpace for HcpLatticeSpace {
    fn base(&self) -> &SpaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SpaceBase {
        &mut self.base
    }

    fn size(&self) -> usize {
        self.voxels.len()
    }

    fn shape(&self) -> Integer3 {
        Integer3::new(self.cols, self.rows, self.layers)
    }

    fn inner_size(&self) -> usize {
        self.voxels.len()
    }

    fn actual_lengths(&self) -> Real3 {
        let r = self.base.voxel_radius();
        Real3::new(
            self.cols as f64 * self.hcp.y,
            self.layers as f64 * self.hcp.z,
            self.rows as f64 * 2.0 * r,
        )
    }

    fn coordinate2position(&self, coord: Coordinate) -> Real3 {
        let r = self.base.voxel_radius();
        let (hcp_l, hcp_x, hcp_y) = (self.hcp.x, self.hcp.y, self.hcp.z);
        let g = self.split(coord);
        Real3::new(
            g.col as f64 * hcp_x,
            (g.col % 2) as f64 * hcp_l + g.layer as f64 * hcp_y,
            (2 * g.row + (g.layer + g.col) % 2) as f64 * r,
        )
    }

    fn position2coordinate(&self, pos: &Real3) -> Option<Coordinate> {
        if !(pos.x.is_finite() && pos.y.is_finite() && pos.z.is_finite()) {
            return None;
        }
        let r = self.base.voxel_radius();
        let (hcp_l, hcp_x, hcp_y) = (self.hcp.x, self.hcp.y, self.hcp.z);

        let col = (pos.x / hcp_x).round() as i64;
        if !(0..self.cols).contains(&col) {
            return None;
        }
        let layer = ((pos.y - (col % 2) as f64 * hcp_l) / hcp_y).round() as i64;
        if !(0..self.layers).contains(&layer) {
            return None;
        }
        let row = ((pos.z / r - ((layer + col) % 2) as f64) / 2.0).round() as i64;
        self.join(Integer3::new(col, row, layer))
    }

    fn inner2coordinate(&self, inner: usize) -> Coordinate {
        inner
    }

    fn num_neighbors(&self, _coord: Coordinate) -> usize {
        Self::NUM_NEIGHBORS
    }

    fn get_neighbor(&self, coord: Coordinate, nrand: usize) -> Option<Coordinate> {
        self.neighbor(coord, nrand, false)
    }

    fn get_neighbor_boundary(&self, coord: Coordinate, nrand: usize) -> Option<Coordinate> {
        self.neighbor(coord, nrand, self.is_periodic())
    }

    fn get_voxel_pool_at(&self, coord: Coordinate) -> Option<PoolId> {
        self.voxels.get(coord).copied()
    }

    fn update_voxel(&mut self, pid: ParticleId, voxel: Voxel) -> Result<bool, SpaceError> {
        let coord = voxel.coordinate;
        self.check_coord(coord)?;
        if voxel.species.serial().is_empty() {
            return Err(SpaceError::invalid(
                "the empty species is reserved for vacant space",
            ));
        }

        let reg = self.base.registry();
        let existing = match reg.pool_id(&voxel.species) {
            Some(id) if reg.molecule_pool(id).is_some() => Some(id),
            Some(_) => {
                return Err(SpaceError::invalid(format!(
                    "species '{}' is a structural type; use update_structure",
                    voxel.species
                )))
            }
            None => None,
        };
        let new_loc = match existing {
            Some(id) => reg.location_of(id),
            None => self.resolve_location(voxel.location.as_ref())?,
        };
        let dest = self.voxels[coord];
        let previous = reg
            .find_particle(pid)
            .map(|(id, at)| (id, at, reg.location_of(id)));

        match previous {
            Some((old_id, old_coord, _)) if old_coord == coord && existing == Some(old_id) => {
                Ok(true)
            }
            Some((old_id, old_coord, old_loc)) if old_coord == coord => {
                // Same site, new species: both pools must share a location.
                if old_loc != new_loc {
                    return Ok(false);
                }
                let new_id = match existing {
                    Some(id) => id,
                    None => self.base.registry_mut().declare_molecule(
                        &voxel.species,
                        voxel.radius,
                        voxel.d,
                        new_loc,
                    )?,
                };
                self.transfer(coord, old_id, new_id, Some(pid));
                Ok(true)
            }
            _ => {
                if dest != new_loc {
                    return Ok(false);
                }
                let new_id = match existing {
                    Some(id) => id,
                    None => self.base.registry_mut().declare_molecule(
                        &voxel.species,
                        voxel.radius,
                        voxel.d,
                        new_loc,
                    )?,
                };
                if let Some((old_id, old_coord, old_loc)) = previous {
                    self.transfer(old_coord, old_id, old_loc, None);
                }
                self.transfer(coord, dest, new_id, Some(pid));
                Ok(true)
            }
        }
    }

    fn update_structure(&mut self, voxel: &Voxel) -> Result<bool, SpaceError> {
        let coord = voxel.coordinate;
        self.check_coord(coord)?;

        let reg = self.base.registry();
        let id = match reg.pool_id(&voxel.species) {
            Some(id) if reg.pool(id).is_structure() => id,
            _ => {
                return Err(SpaceError::invalid(format!(
                    "species '{}' is not a declared structure",
                    voxel.species
                )))
            }
        };
        let dest = self.voxels[coord];
        if dest != reg.location_of(id) {
            return Ok(false);
        }
        self.transfer(coord, dest, id, None);
        Ok(true)
    }

    fn remove_voxel(&mut self, pid: ParticleId) -> bool {
        match self.base.registry().find_particle(pid) {
            Some((id, coord)) => {
                self.release(coord, id);
                true
            }
            None => false,
        }
    }

    fn remove_voxel_at(&mut self, coord: Coordinate) -> bool {
        match self.voxels.get(coord).copied() {
            Some(id) if !id.is_vacant() => {
                self.release(coord, id);
                true
            }
            _ => false,
        }
    }

    fn can_move(&self, src: Coordinate, dest: Coordinate) -> bool {
        if src == dest {
            return false;
        }
        let (Some(&moving), Some(&target)) = (self.voxels.get(src), self.voxels.get(dest)) else {
            return false;
        };
        !moving.is_vacant() && target == self.base.registry().location_of(moving)
    }

    fn move_voxel(&mut self, src: Coordinate, dest: Coordinate, candidate: usize) -> bool {
        self.can_move(src, dest) && self.swap_sites(src, dest, candidate)
    }

    fn move_to_neighbor(
        &mut self,
        from: PoolId,
        loc: PoolId,
        info: &mut CoordinateId,
        nrand: usize,
    ) -> (Coordinate, bool) {
        let origin = info.coordinate;
        let Some(target) = self.get_neighbor_boundary(origin, nrand) else {
            return (origin, false);
        };
        if from.is_vacant() || self.voxels[origin] != from || self.voxels[target] != loc {
            return (origin, false);
        }
        if !self.swap_sites(origin, target, 0) {
            return (origin, false);
        }
        info.coordinate = target;
        (target, true)
    }

    fn count_voxels(&self, pool: PoolId) -> usize {
        let reg = self.base.registry();
        if pool.is_vacant() {
            self.inner_size().saturating_sub(reg.occupied_sites())
        } else {
            reg.owned_sites(pool)
        }
    }

    fn on_structure(&self, voxel: &Voxel) -> bool {
        self.voxels
            .get(voxel.coordinate)
            .is_some_and(|id| !id.is_vacant())
    }

    fn drain_species(&mut self, sp: &Species) -> usize {
        let Some(id) = self.base.registry().pool_id(sp) else {
            return 0;
        };
        let loc = self.base.registry().location_of(id);
        let sites = self.base.registry_mut().drain(id);
        for &coord in &sites {
            self.base.registry_mut().attach(loc, coord, None);
            self.voxels[coord] = loc;
        }
        sites.len()
    }

    fn make_structure_type(
        &mut self,
        sp: &Species,
        dimension: Dimension,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        self.declare_structural(sp, PoolKind::Structure, dimension, loc)
    }

    fn make_interface_type(
        &mut self,
        sp: &Species,
        dimension: Dimension,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        self.declare_structural(sp, PoolKind::Interface, dimension, loc)
    }

    fn make_molecule_type(
        &mut self,
        sp: &Species,
        radius: f64,
        d: f64,
        loc: Option<&Species>,
    ) -> Result<bool, SpaceError> {
        if self.base.registry().has_molecule_pool(sp) {
            return Ok(false);
        }
        let location = self.resolve_location(loc)?;
        self.base
            .registry_mut()
            .declare_molecule(sp, radius, d, location)?;
        Ok(true)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            structures: true,
            interfaces: true,
            persistence: false,
        }
    }
}

/// The 12 neighbor offsets `(dcol, drow, dlayer)` of a site in column
/// `col` and layer `layer`.
///
/// Same-column layer neighbors and same-layer column neighbors sit half a
/// row up or down depending on the parity of `layer + col`; the two
/// remaining column neighbors sit one layer over, towards lower layers on
/// even columns.
fn neighbor_offset(col: i64, layer: i64, nrand: usize) -> Option<(i64, i64, i64)> {
    let s = if (layer + col).rem_euclid(2) == 1 { 1 } else { -1 };
    let t = if col.rem_euclid(2) == 0 { -1 } else { 1 };
    let offset = match nrand {
        0 => (0, -1, 0),
        1 => (0, 1, 0),
        2 => (0, 0, -1),
        3 => (0, s, -1),
        4 => (0, 0, 1),
        5 => (0, s, 1),
        6 => (-1, 0, 0),
        7 => (-1, s, 0),
        8 => (1, 0, 0),
        9 => (1, s, 0),
        10 => (-1, 0, t),
        11 => (1, 0, t),
        _ => return None,
    };
    Some(offset)
}

fn check_radius(r: f64) -> Result<(), SpaceError> {
    if r.is_finite() && r > 0.0 {
        Ok(())
    } else {
        Err(SpaceError::invalid(format!(
            "voxel radius must be finite and positive, got {r}"
        )))
    }
}

fn site_count_checked(shape: &Integer3) -> Option<usize> {
    let cols = usize::try_from(shape.col).ok()?;
    let rows = usize::try_from(shape.row).ok()?;
    let layers = usize::try_from(shape.layer).ok()?;
    let n = cols.checked_mul(rows)?.checked_mul(layers)?;
    // Coordinates round-trip through i64 in `split`.
    i64::try_from(n).ok()?;
    Some(n)
}
