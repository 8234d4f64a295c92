//! Matrix-vector product with boundary conditions folded in.
//!
//! Cells strictly inside the domain couple to their neighbours through the
//! stencil coefficients. Cells next to a face couple to the value seen across
//! that face (see `GridField::ghost_layer`), so callers never special-case
//! boundary loops. Faces are handled one at a time and summed; a corner cell
//! gets one contribution per face it touches and no cross terms.
use crate::constants::{Face, FACES};
use crate::discretization::matrix::StencilOperator;
use crate::discretization::unknown::GridField;
use crate::error::SolverError;
use ndarray::{Array3, Slice, Zip};

/// Returns `A * phi` over the interior of `phi`. Pure: neither argument is
/// modified. Boundary arrays that do not fit the interior are a
/// `ShapeMismatch`.
pub fn mat_vec_bnd(a: &StencilOperator, phi: &GridField) -> Result<Array3<f64>, SolverError> {
    phi.check_shape()?;
    a.check_shape(phi.shape())?;
    let mut y = &a.center * &phi.value;
    for face in FACES {
        add_neighbour(&mut y, a, phi, face);
    }
    Ok(y)
}

fn add_neighbour(y: &mut Array3<f64>, a: &StencilOperator, phi: &GridField, face: Face) {
    let axis = face.axis().nd();
    let n = phi.value.len_of(axis);
    if n == 0 {
        return;
    }
    let coef = a.coefficient(face);
    let x = &phi.value;
    // couplings inside the domain
    if n > 1 {
        let (own, other) = if face.is_low() {
            (Slice::from(1..), Slice::from(..n - 1))
        } else {
            (Slice::from(..n - 1), Slice::from(1..))
        };
        Zip::from(y.slice_axis_mut(axis, own))
            .and(coef.slice_axis(axis, own))
            .and(x.slice_axis(axis, other))
            .for_each(|y, &c, &v| *y += c * v);
    }
    // couplings across the face
    let layer = face.adjacent_layer(n);
    let ghost = phi.ghost_layer(face);
    Zip::from(y.index_axis_mut(axis, layer))
        .and(coef.index_axis(axis, layer))
        .and(&ghost)
        .for_each(|y, &c, &v| *y += c * v);
}
