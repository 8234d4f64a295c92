//! Seven-point stencil operator ("matrix") on a structured grid.
//!
//! The operator is never assembled as a sparse matrix: every interior cell
//! keeps a central coefficient and one coefficient per neighbour direction,
//! each stored in an array shaped like the field the operator acts on.
//! The action on a field `x` is
//! ```text
//!   (A x)_c = C_c x_c + W_c x_w + E_c x_e + S_c x_s + N_c x_n + B_c x_b + T_c x_t
//! ```
//! so for a diffusion operator the neighbour coefficients are negative.
//! Conjugate gradient requires `E` at cell `i` to equal `W` at cell `i+1`
//! (and likewise along y and z); this is the caller's responsibility.
use crate::constants::{Axis, BcKind, FACES, Face, TINY};
use crate::discretization::unknown::GridField;
use crate::error::{SolverError, check_shape};
use log::{debug, warn};
use ndarray::{Array3, Slice, Zip};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq)]
pub struct StencilOperator {
    pub center: Array3<f64>,
    pub west: Array3<f64>,
    pub east: Array3<f64>,
    pub south: Array3<f64>,
    pub north: Array3<f64>,
    pub bottom: Array3<f64>,
    pub top: Array3<f64>,
}

impl StencilOperator {
    /// all coefficients zero
    pub fn zeros(shape: (usize, usize, usize)) -> Self {
        Self {
            center: Array3::zeros(shape),
            west: Array3::zeros(shape),
            east: Array3::zeros(shape),
            south: Array3::zeros(shape),
            north: Array3::zeros(shape),
            bottom: Array3::zeros(shape),
            top: Array3::zeros(shape),
        }
    }
    /// unit diagonal, no coupling
    pub fn identity(shape: (usize, usize, usize)) -> Self {
        let mut a = Self::zeros(shape);
        a.center.fill(1.0);
        a
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.center.dim()
    }

    pub fn coefficient(&self, face: Face) -> &Array3<f64> {
        match face {
            Face::West => &self.west,
            Face::East => &self.east,
            Face::South => &self.south,
            Face::North => &self.north,
            Face::Bottom => &self.bottom,
            Face::Top => &self.top,
        }
    }

    pub fn coefficient_mut(&mut self, face: Face) -> &mut Array3<f64> {
        match face {
            Face::West => &mut self.west,
            Face::East => &mut self.east,
            Face::South => &mut self.south,
            Face::North => &mut self.north,
            Face::Bottom => &mut self.bottom,
            Face::Top => &mut self.top,
        }
    }

    /// Checks that all seven arrays share the shape of the central one
    /// and that it matches `expected`.
    pub fn check_shape(&self, expected: (usize, usize, usize)) -> Result<(), SolverError> {
        check_shape("operator center", expected, self.center.dim())?;
        for face in Face::iter() {
            check_shape("operator neighbour", expected, self.coefficient(face).dim())?;
        }
        Ok(())
    }

    /// Adds `term` to the diagonal, e.g. the unsteady term `rho V / dt`
    pub fn add_to_center(&mut self, term: &Array3<f64>) -> Result<(), SolverError> {
        check_shape("diagonal term", self.shape(), term.dim())?;
        self.center += term;
        Ok(())
    }

    /// First diagonal entry with magnitude below `TINY`, if any
    pub fn find_zero_diagonal(&self) -> Option<((usize, usize, usize), f64)> {
        self.center
            .indexed_iter()
            .find(|(_, c)| !(c.abs() >= TINY))
            .map(|(idx, c)| (idx, *c))
    }

    pub fn has_zero_diagonal(&self) -> bool {
        self.find_zero_diagonal().is_some()
    }

    /// Fails with `ZeroDiagonal` if the Jacobi preconditioner cannot be formed
    pub fn check_diagonal(&self) -> Result<(), SolverError> {
        match self.find_zero_diagonal() {
            Some((index, value)) => {
                warn!("zero diagonal at {:?}: {:e}", index, value);
                Err(SolverError::ZeroDiagonal { index, value })
            }
            None => Ok(()),
        }
    }

    /// Largest mismatch between the coupling of a cell to its high-side
    /// neighbour and the coupling of that neighbour back to the cell.
    /// Periodic wrap-around couplings are not covered.
    pub fn symmetry_defect(&self) -> f64 {
        let mut defect: f64 = 0.0;
        for axis in Axis::iter() {
            let (low, high) = axis.faces();
            let n = self.center.len_of(axis.nd());
            if n < 2 {
                continue;
            }
            let forward = self.coefficient(high).slice_axis(axis.nd(), Slice::from(..n - 1));
            let backward = self.coefficient(low).slice_axis(axis.nd(), Slice::from(1..));
            Zip::from(&forward).and(&backward).for_each(|&f, &b| {
                defect = defect.max((f - b).abs());
            });
        }
        defect
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.symmetry_defect() <= tol
    }

    /// Uniform-grid diffusion operator `-div(k grad phi) * V` for the
    /// boundary kinds of `phi`. Cells next to a Dirichlet face see the
    /// boundary value at half a cell, which doubles that coupling; Neumann
    /// and Outlet faces keep the plain coupling, which the boundary-aware
    /// product cancels against the centre (zero flux).
    pub fn diffusion(phi: &GridField, conductivity: f64, spacing: (f64, f64, f64)) -> Self {
        let shape = phi.shape();
        let mut a = Self::zeros(shape);
        let (dx, dy, dz) = spacing;
        let volume = dx * dy * dz;
        for face in FACES {
            let axis = face.axis();
            let h = match axis {
                Axis::X => dx,
                Axis::Y => dy,
                Axis::Z => dz,
            };
            let g = conductivity * volume / (h * h);
            a.coefficient_mut(face).fill(-g);
            a.center += g;
            let n = shape_len(shape, axis);
            if n == 0 || phi.is_periodic(axis) {
                continue;
            }
            let layer = face.adjacent_layer(n);
            let kinds = &phi.boundary(face).kind;
            let mut coef_layer = a.coefficient_mut(face).index_axis_mut(axis.nd(), layer);
            Zip::from(&mut coef_layer).and(kinds).for_each(|c, kind| {
                if *kind == BcKind::Dirichlet {
                    *c = -2.0 * g;
                }
            });
            let mut center_layer = a.center.index_axis_mut(axis.nd(), layer);
            Zip::from(&mut center_layer).and(kinds).for_each(|c, kind| {
                if *kind == BcKind::Dirichlet {
                    *c += g;
                }
            });
        }
        debug!(
            "diffusion operator for {}: shape {:?}, k = {}, h = {:?}",
            phi.name, shape, conductivity, spacing
        );
        a
    }
}

fn shape_len(shape: (usize, usize, usize), axis: Axis) -> usize {
    match axis {
        Axis::X => shape.0,
        Axis::Y => shape.1,
        Axis::Z => shape.2,
    }
}
