//! Synthetic sampling grids for exercising the transforms.

use crate::points::PointSet;

/// `n` evenly spaced values from `lo` to `hi` inclusive.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|k| lo + step * k as f64).collect()
        }
    }
}

/// Cross-hatched grid on `[-sidelen, sidelen]²`.
///
/// Lines of `ncoarse` columns sampled at `nfine` points each, plus, when
/// `ncoarse != nfine`, the same pattern transposed so both axes are finely
/// sampled. With `ll_zero` the lower-left corner is moved to the origin.
pub fn grid_xieta(sidelen: f64, ncoarse: usize, nfine: usize, ll_zero: bool) -> PointSet {
    let mut xv = linspace(-sidelen, sidelen, ncoarse);
    let mut yv = linspace(-sidelen, sidelen, nfine);
    if ll_zero {
        for v in [&mut xv, &mut yv] {
            let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
            v.iter_mut().for_each(|x| *x -= lo);
        }
    }

    // meshgrid order: y varies slowest
    let mut coords = Vec::with_capacity(2 * xv.len() * yv.len());
    for &y in &yv {
        for &x in &xv {
            coords.push((x, y));
        }
    }
    if ncoarse != nfine {
        for &y in &yv {
            for &x in &xv {
                coords.push((y, x));
            }
        }
    }
    PointSet::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_grid() {
        let g = grid_xieta(1.0, 3, 3, false);
        assert_eq!(g.len(), 9);
        assert_eq!(g.coords[0], (-1.0, -1.0));
        assert_eq!(g.coords[1], (0.0, -1.0));
        assert_eq!(g.coords[8], (1.0, 1.0));
    }

    #[test]
    fn test_cross_hatched_grid() {
        let g = grid_xieta(2.1, 11, 41, false);
        assert_eq!(g.len(), 2 * 11 * 41);
        let (xmin, xmax, ymin, ymax) = g.bounds().unwrap();
        assert!((xmin + 2.1).abs() < 1e-12 && (xmax - 2.1).abs() < 1e-12);
        assert!((ymin + 2.1).abs() < 1e-12 && (ymax - 2.1).abs() < 1e-12);
        // the second half is the transpose of the first
        let half = 11 * 41;
        assert_eq!(g.coords[half + 5].0, g.coords[5].1);
        assert_eq!(g.coords[half + 5].1, g.coords[5].0);
    }

    #[test]
    fn test_lower_left_zero() {
        let g = grid_xieta(1.5, 4, 4, true);
        let (xmin, xmax, ymin, _) = g.bounds().unwrap();
        assert_eq!(xmin, 0.0);
        assert_eq!(ymin, 0.0);
        assert!((xmax - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_counts() {
        assert!(grid_xieta(1.0, 0, 5, false).is_empty());
        assert_eq!(grid_xieta(1.0, 1, 1, false).coords, vec![(-1.0, -1.0)]);
    }
}
