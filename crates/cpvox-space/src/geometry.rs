//! Hexagonal close-packed sizing functions.
//!
//! Backends size their site tables from [`shape`], so these functions
//! must stay bit-for-bit stable: rounding is round-half-to-even (`rint`),
//! never truncation or round-half-away-from-zero.
//!
//! # Lattice Axes
//!
//! Columns advance along x with spacing `HCP_X`, layers along y with
//! spacing `HCP_Y`, and rows along z with spacing `2r`. Odd columns are
//! shifted by `HCP_L` in y, and every other (layer + column) parity is
//! shifted by `r` in z, which packs spheres of radius `r` so that each
//! touches exactly 12 others.

use cpvox_core::{Integer3, Real3};

/// Volume of one close-packed cell: `4·√2·r³`.
pub fn voxel_volume(r: f64) -> f64 {
    4.0 * 2.0_f64.sqrt() * r * r * r
}

/// The three characteristic spacings `(HCP_L, HCP_X, HCP_Y)`:
/// `(r/√3, r·√(8/3), r·√3)`.
pub fn hcp_lengths(r: f64) -> Real3 {
    Real3::new(r / 3.0_f64.sqrt(), r * (8.0_f64 / 3.0).sqrt(), r * 3.0_f64.sqrt())
}

/// Largest per-axis count [`shape`] produces.
pub const MAX_EXTENT: i64 = 1 << 62;

/// Integer lattice extent covering `edge_lengths` with voxels of radius `r`.
///
/// `periodic` bumps every odd count to the next even integer, because
/// the column and layer stagger only tiles consistently across a wrap
/// when each extent is even.
///
/// Returns `None` if a count is not finite or exceeds [`MAX_EXTENT`],
/// e.g. for a vanishingly small radius.
pub fn shape(edge_lengths: &Real3, r: f64, periodic: bool) -> Option<Integer3> {
    let hcp = hcp_lengths(r);

    let mut col = rint(edge_lengths.x / hcp.y)? + 1;
    let mut layer = rint(edge_lengths.y / hcp.z)? + 1;
    let mut row = rint((edge_lengths.z / 2.0) / r)? + 1;

    if periodic {
        col = round_up_even(col);
        layer = round_up_even(layer);
        row = round_up_even(row);
    }

    Some(Integer3::new(col, row, layer))
}

/// Total lattice volume: site count times [`voxel_volume`].
///
/// The site count is multiplied out in `f64`, so extents whose product
/// overflows `i64` still give a finite volume. Infinite when [`shape`]
/// has no answer.
pub fn volume(edge_lengths: &Real3, r: f64, periodic: bool) -> f64 {
    shape(edge_lengths, r, periodic).map_or(f64::INFINITY, |s| {
        s.col as f64 * s.row as f64 * s.layer as f64 * voxel_volume(r)
    })
}

/// Area covered by one voxel of a close-packed surface: `2·√3·r²`.
pub fn unit_area(r: f64) -> f64 {
    2.0 * 3.0_f64.sqrt() * r * r
}

fn rint(v: f64) -> Option<i64> {
    let v = v.round_ties_even();
    // Leaves room for the `+ 1` and the even bump.
    (v.is_finite() && v.abs() < (MAX_EXTENT - 2) as f64).then_some(v as i64)
}

fn round_up_even(n: i64) -> i64 {
    if n % 2 == 0 {
        n
    } else {
        n + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn voxel_volume_formula() {
        let r = 0.5;
        assert!((voxel_volume(r) - 4.0 * 2.0_f64.sqrt() * 0.125).abs() < 1e-15);
    }

    #[test]
    fn hcp_lengths_order() {
        let h = hcp_lengths(1.0);
        assert!((h.x - 1.0 / 3.0_f64.sqrt()).abs() < 1e-15);
        assert!((h.y - (8.0_f64 / 3.0).sqrt()).abs() < 1e-15);
        assert!((h.z - 3.0_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn shape_cube() {
        // r = 0.01, L = 1: cols = rint(1/0.016330) + 1 = 61 + 1,
        // layers = rint(1/0.017321) + 1 = 58 + 1, rows = rint(50) + 1.
        let s = shape(&Real3::new(1.0, 1.0, 1.0), 0.01, false).unwrap();
        assert_eq!(s, Integer3::new(62, 51, 59));
    }

    #[test]
    fn shape_periodic_bumps_odd() {
        let s = shape(&Real3::new(1.0, 1.0, 1.0), 0.01, true).unwrap();
        assert_eq!(s, Integer3::new(62, 52, 60));
    }

    #[test]
    fn rint_is_half_to_even() {
        // (Lz / 2) / r = 2.5 exactly: rint gives 2, round() would give 3.
        let s = shape(&Real3::new(0.0, 0.0, 5.0), 1.0, false).unwrap();
        assert_eq!(s.row, 3);
        // 3.5 rounds up to 4.
        let s = shape(&Real3::new(0.0, 0.0, 7.0), 1.0, false).unwrap();
        assert_eq!(s.row, 5);
    }

    #[test]
    fn zero_edges_give_single_site() {
        let s = shape(&Real3::default(), 1.0, false).unwrap();
        assert_eq!(s, Integer3::new(1, 1, 1));
        assert_eq!(volume(&Real3::default(), 1.0, false), voxel_volume(1.0));
    }

    #[test]
    fn tiny_radius_has_no_shape() {
        let edges = Real3::new(1e-6, 1e-6, 1e-6);
        assert_eq!(shape(&edges, 1e-30, false), None);
        assert_eq!(shape(&edges, 1e-30, true), None);
        assert_eq!(volume(&edges, 1e-30, false), f64::INFINITY);
        assert_eq!(shape(&Real3::new(f64::INFINITY, 0.0, 0.0), 1.0, false), None);
    }

    #[test]
    fn volume_beyond_i64_site_count() {
        // Each count is about 5e6, so the product (~1.3e20) overflows i64.
        let edges = Real3::new(1.0, 1.0, 1.0);
        let s = shape(&edges, 2e-7, false).unwrap();
        assert_eq!(s.checked_product(), None);
        let v = volume(&edges, 2e-7, false);
        assert!(v.is_finite());
        let expected = s.col as f64 * s.row as f64 * s.layer as f64 * voxel_volume(2e-7);
        assert_eq!(v, expected);
    }

    #[test]
    fn unit_area_formula() {
        assert!((unit_area(1.0) - 2.0 * 3.0_f64.sqrt()).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn periodic_shape_is_even(
            lx in 0.0f64..2.0, ly in 0.0f64..2.0, lz in 0.0f64..2.0,
            r in 0.005f64..0.2,
        ) {
            let s = shape(&Real3::new(lx, ly, lz), r, true).unwrap();
            prop_assert_eq!(s.col % 2, 0);
            prop_assert_eq!(s.row % 2, 0);
            prop_assert_eq!(s.layer % 2, 0);
        }

        #[test]
        fn volume_is_sites_times_voxel_volume(
            lx in 0.0f64..2.0, ly in 0.0f64..2.0, lz in 0.0f64..2.0,
            r in 0.005f64..0.2,
            periodic in any::<bool>(),
        ) {
            let edges = Real3::new(lx, ly, lz);
            let s = shape(&edges, r, periodic).unwrap();
            let expected = (s.col * s.row * s.layer) as f64 * (4.0 * 2.0_f64.sqrt() * r * r * r);
            prop_assert_eq!(volume(&edges, r, periodic), expected);
        }
    }
}
