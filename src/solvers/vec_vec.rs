//! Reductions and element-wise updates over the interior of grid arrays.
//!
//! Reductions always run sequentially in storage order, so repeated solves of
//! the same system give bit-identical residual histories. Element-wise updates
//! go through rayon once the array is large enough to pay for it.
use crate::error::{SolverError, check_shape};
use ndarray::{Array3, Zip};

/// arrays with at least this many cells are updated in parallel
pub const PAR_THRESHOLD: usize = 32 * 32 * 32;

/// Inner product of two grid arrays
pub fn vec_vec(a: &Array3<f64>, b: &Array3<f64>) -> Result<f64, SolverError> {
    check_shape("inner product operand", a.dim(), b.dim())?;
    let mut sum = 0.0;
    Zip::from(a).and(b).for_each(|&x, &y| sum += x * y);
    Ok(sum)
}

/// Euclidean norm; a (round-off) negative square sum is clamped to zero,
/// NaN propagates.
pub fn norm(a: &Array3<f64>) -> f64 {
    let sum: f64 = a.iter().map(|x| x * x).sum();
    if sum < 0.0 { 0.0 } else { sum.sqrt() }
}

/// y += alpha * x
pub fn axpy(y: &mut Array3<f64>, alpha: f64, x: &Array3<f64>) -> Result<(), SolverError> {
    check_shape("axpy operand", y.dim(), x.dim())?;
    let zip = Zip::from(y).and(x);
    if zip.size() >= PAR_THRESHOLD {
        zip.par_for_each(|y, &x| *y += alpha * x);
    } else {
        zip.for_each(|y, &x| *y += alpha * x);
    }
    Ok(())
}

/// p = z + beta * p
pub fn xpby(p: &mut Array3<f64>, z: &Array3<f64>, beta: f64) -> Result<(), SolverError> {
    check_shape("direction update operand", p.dim(), z.dim())?;
    let zip = Zip::from(p).and(z);
    if zip.size() >= PAR_THRESHOLD {
        zip.par_for_each(|p, &z| *p = z + beta * *p);
    } else {
        zip.for_each(|p, &z| *p = z + beta * *p);
    }
    Ok(())
}

/// z = r / d, the Jacobi (diagonal) preconditioner
pub fn precondition(
    z: &mut Array3<f64>,
    r: &Array3<f64>,
    d: &Array3<f64>,
) -> Result<(), SolverError> {
    check_shape("preconditioner input", z.dim(), r.dim())?;
    check_shape("preconditioner diagonal", z.dim(), d.dim())?;
    let zip = Zip::from(z).and(r).and(d);
    if zip.size() >= PAR_THRESHOLD {
        zip.par_for_each(|z, &r, &d| *z = r / d);
    } else {
        zip.for_each(|z, &r, &d| *z = r / d);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;

    fn random(shape: (usize, usize, usize)) -> Array3<f64> {
        let mut rng = rand::rng();
        Array3::from_shape_fn(shape, |_| rng.random_range(-1.0..1.0))
    }

    #[test]
    fn inner_product_and_norm() {
        let a = Array3::from_elem((2, 2, 2), 2.0);
        let b = Array3::from_elem((2, 2, 2), 0.5);
        assert_relative_eq!(vec_vec(&a, &b).unwrap(), 8.0);
        assert_relative_eq!(norm(&a), 32.0_f64.sqrt());
    }

    #[test]
    fn reductions_are_repeatable() {
        let a = random((5, 4, 3));
        let b = random((5, 4, 3));
        let first = vec_vec(&a, &b).unwrap();
        let second = vec_vec(&a, &b).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(norm(&a).to_bits(), norm(&a).to_bits());
        assert_relative_eq!(vec_vec(&a, &b).unwrap(), vec_vec(&b, &a).unwrap());
    }

    #[test]
    fn empty_arrays_reduce_to_zero() {
        let a = Array3::<f64>::zeros((0, 3, 3));
        assert_eq!(vec_vec(&a, &a).unwrap(), 0.0);
        assert_eq!(norm(&a), 0.0);
    }

    #[test]
    fn nan_propagates_through_norm() {
        let mut a = Array3::<f64>::zeros((2, 1, 1));
        a[(1, 0, 0)] = f64::NAN;
        assert!(norm(&a).is_nan());
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let a = Array3::<f64>::zeros((2, 2, 2));
        let b = Array3::<f64>::zeros((2, 2, 3));
        assert!(matches!(vec_vec(&a, &b), Err(SolverError::ShapeMismatch { .. })));
        let mut y = a.clone();
        assert!(axpy(&mut y, 1.0, &b).is_err());
    }

    #[test]
    fn updates_match_between_serial_and_parallel_sizes() {
        for shape in [(4, 4, 4), (40, 32, 32)] {
            let x = random(shape);
            let mut y = Array3::from_elem(shape, 1.0);
            axpy(&mut y, 2.0, &x).unwrap();
            let expected = x.mapv(|v| 1.0 + 2.0 * v);
            assert_eq!(y, expected);

            let mut p = Array3::from_elem(shape, 2.0);
            xpby(&mut p, &x, 0.5).unwrap();
            assert_eq!(p, x.mapv(|v| v + 1.0));

            let d = Array3::from_elem(shape, 4.0);
            let mut z = Array3::zeros(shape);
            precondition(&mut z, &x, &d).unwrap();
            assert_eq!(z, x.mapv(|v| v / 4.0));
        }
    }
}
