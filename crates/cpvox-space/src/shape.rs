//! Continuous shapes used to fill structural pools.
//!
//! A [`Shape`] is a signed inside test: negative (or zero) inside, positive
//! outside, with the magnitude roughly the distance to the boundary.
//! [`VoxelSpace::add_structure`](crate::VoxelSpace::add_structure) turns a
//! 3D shape into a filled region and a 2D shape into a one-site-thick
//! shell.

use cpvox_core::Real3;

use crate::pool::Dimension;

/// A region of continuous space.
pub trait Shape {
    /// Signed inside test at `pos`: `<= 0` inside or on the boundary.
    fn is_inside(&self, pos: &Real3) -> f64;

    /// Topological dimension of the structure this shape describes.
    fn dimension(&self) -> Dimension;
}

/// A solid ball.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    /// Centre.
    pub center: Real3,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// A ball of `radius` around `center`.
    pub fn new(center: Real3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The bounding surface of this ball.
    pub fn surface(&self) -> SphericalSurface {
        SphericalSurface {
            center: self.center,
            radius: self.radius,
        }
    }
}

impl Shape for Sphere {
    fn is_inside(&self, pos: &Real3) -> f64 {
        (*pos - self.center).length() - self.radius
    }

    fn dimension(&self) -> Dimension {
        Dimension::Three
    }
}

/// The surface of a ball.
///
/// Shares its inside test with [`Sphere`]; only the declared dimension
/// differs, which makes `add_structure` keep a shell instead of the
/// whole ball.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalSurface {
    /// Centre.
    pub center: Real3,
    /// Radius.
    pub radius: f64,
}

impl SphericalSurface {
    /// The sphere of `radius` around `center`.
    pub fn new(center: Real3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Shape for SphericalSurface {
    fn is_inside(&self, pos: &Real3) -> f64 {
        (*pos - self.center).length() - self.radius
    }

    fn dimension(&self) -> Dimension {
        Dimension::Two
    }
}

/// An axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub lower: Real3,
    /// Maximum corner.
    pub upper: Real3,
}

impl Aabb {
    /// The box spanning `a` and `b`, in either order.
    pub fn new(a: Real3, b: Real3) -> Self {
        Self {
            lower: a.min(&b),
            upper: a.max(&b),
        }
    }
}

impl Shape for Aabb {
    fn is_inside(&self, pos: &Real3) -> f64 {
        // Largest per-axis excess: negative only when inside on every axis.
        (0..3)
            .map(|i| (self.lower[i] - pos[i]).max(pos[i] - self.upper[i]))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn dimension(&self) -> Dimension {
        Dimension::Three
    }
}

/// An infinite plane through `origin`.
///
/// The side the normal points to is outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarSurface {
    origin: Real3,
    normal: Real3,
}

impl PlanarSurface {
    /// Plane through `origin` with outward `normal` (normalized here).
    pub fn new(origin: Real3, normal: Real3) -> Self {
        Self {
            origin,
            normal: normal.normalized(),
        }
    }

    /// A point on the plane.
    pub fn origin(&self) -> Real3 {
        self.origin
    }

    /// Unit outward normal.
    pub fn normal(&self) -> Real3 {
        self.normal
    }
}

impl Shape for PlanarSurface {
    fn is_inside(&self, pos: &Real3) -> f64 {
        (*pos - self.origin).dot(&self.normal)
    }

    fn dimension(&self) -> Dimension {
        Dimension::Two
    }
}
