//! Continuous-space vectors and integer lattice extents.

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};

/// A point or displacement in continuous 3D space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Real3 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl Real3 {
    /// Construct from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    pub fn dot(&self, other: &Real3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. Zero vectors stay zero.
    pub fn normalized(&self) -> Real3 {
        let len = self.length();
        if len == 0.0 {
            *self
        } else {
            *self * (1.0 / len)
        }
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Real3) -> Real3 {
        Real3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Real3) -> Real3 {
        Real3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Product of the three components.
    pub fn product(&self) -> f64 {
        self.x * self.y * self.z
    }
}

impl Add for Real3 {
    type Output = Real3;

    fn add(self, rhs: Real3) -> Real3 {
        Real3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Real3 {
    type Output = Real3;

    fn sub(self, rhs: Real3) -> Real3 {
        Real3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Real3 {
    type Output = Real3;

    fn mul(self, rhs: f64) -> Real3 {
        Real3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Index<usize> for Real3 {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Real3 axis {axis} out of range"),
        }
    }
}

impl fmt::Display for Real3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Integer extent of a close-packed lattice: columns, rows, layers.
///
/// Columns advance along x, layers along y, rows along z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Integer3 {
    /// Number of columns (x axis).
    pub col: i64,
    /// Number of rows (z axis).
    pub row: i64,
    /// Number of layers (y axis).
    pub layer: i64,
}

impl Integer3 {
    /// Construct from `(col, row, layer)`.
    pub const fn new(col: i64, row: i64, layer: i64) -> Self {
        Self { col, row, layer }
    }

    /// `col * row * layer`, or `None` on overflow.
    pub fn checked_product(&self) -> Option<i64> {
        self.col.checked_mul(self.row)?.checked_mul(self.layer)
    }
}

impl fmt::Display for Integer3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.col, self.row, self.layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Real3::new(1.0, 2.0, 3.0);
        let b = Real3::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Real3::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Real3::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Real3::new(2.0, 4.0, 6.0));
        assert_eq!(a.dot(&b), 3.0);
        assert_eq!(a[2], 3.0);
    }

    #[test]
    fn normalized_keeps_zero() {
        assert_eq!(Real3::default().normalized(), Real3::default());
        let n = Real3::new(0.0, 3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn integer3_product() {
        assert_eq!(Integer3::new(2, 3, 4).checked_product(), Some(24));
        assert_eq!(Integer3::new(1 << 32, 1 << 32, 2).checked_product(), None);
        assert_eq!(Integer3::new(2, 3, 4).to_string(), "2x3x4");
    }
}
