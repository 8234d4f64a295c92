//! Grid field ("unknown"): values inside the computational domain plus the
//! boundary data on each of the six faces.
//!
//! Interior values live in a full three-dimensional array shaped by the
//! variable position. Each face keeps a two-dimensional array of boundary
//! condition kinds and one of boundary values, both shaped as the
//! cross-section orthogonal to the face axis:
//!
//! ```text
//!   West/East     -> (ny', nz')
//!   South/North   -> (nx', nz')
//!   Bottom/Top    -> (nx', ny')
//! ```
//! where `(nx', ny', nz')` is the interior shape of the field.
//!
//! Example for a two-dimensional section with nx = 6, ny = 4:
//! ```text
//!                          [N]
//!   +-------+-------+-------+-------+-------+-------+
//!   |   o  ---  o  ---  o  ---  o  ---  o  ---  o   | j=ny-1
//!   +---|---+---|---+---|---+---|---+---|---+---|---+
//!   |   o  ---  o  ---  o  ---  o  ---  o  ---  o   |
//! [W]---|---+---|---+---|---+---|---+---|---+---|---+ [E]
//!   |   o  ---  o  ---  o  ---  o  ---  o  ---  o   | j=0
//!   +-------+-------+-------+-------+-------+-------+
//!      i=0     i=1                           i=nx-1      (cells, o)
//!          i=0     i=1                   i=nx-2          (faces X, ---)
//!                          [S]
//! ```
use crate::constants::{Axis, BcKind, FACES, Face, Position};
use crate::error::SolverError;
use log::{debug, info};
use ndarray::{Array2, Array3, Zip};
use strum::IntoEnumIterator;

/// Boundary data of one face
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub kind: Array2<BcKind>,
    pub value: Array2<f64>,
}

impl Boundary {
    fn new(shape: (usize, usize), kind: BcKind) -> Self {
        Self {
            kind: Array2::from_elem(shape, kind),
            value: Array2::zeros(shape),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.value.dim()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub name: String,
    pub position: Position,
    /// interior values, both initial guess and solution of a solve
    pub value: Array3<f64>,
    /// values of the previous time step, written only by `store_previous`
    pub previous: Array3<f64>,
    /// periodicity in x, y and z
    pub periodic: [bool; 3],
    boundary: [Boundary; 6],
}

/// shape of the boundary cross-section for `face` of an interior array of `shape`
pub fn face_shape(face: Face, shape: (usize, usize, usize)) -> (usize, usize) {
    let (nx, ny, nz) = shape;
    match face.axis() {
        Axis::X => (ny, nz),
        Axis::Y => (nx, nz),
        Axis::Z => (nx, ny),
    }
}

impl GridField {
    /// Creates a field at `position` for a grid of `resolution` cells.
    /// Faces of periodic axes are flagged `Periodic`, all others get `default_bc`.
    pub fn new(
        name: &str,
        position: Position,
        resolution: (usize, usize, usize),
        default_bc: BcKind,
        periodic: [bool; 3],
    ) -> Self {
        let shape = position.shape(resolution);
        let boundary: [Boundary; 6] = std::array::from_fn(|i| {
            let face = FACES[i];
            let kind = if periodic[face.axis().index()] {
                BcKind::Periodic
            } else {
                default_bc
            };
            Boundary::new(face_shape(face, shape), kind)
        });
        debug!("created unknown {} at {} with shape {:?}", name, position, shape);
        Self {
            name: name.to_string(),
            position,
            value: Array3::zeros(shape),
            previous: Array3::zeros(shape),
            periodic,
            boundary,
        }
    }

    /// interior array shape
    pub fn shape(&self) -> (usize, usize, usize) {
        self.value.dim()
    }
    /// number of interior cells, the dimension of the linear system
    pub fn interior_cells(&self) -> usize {
        self.value.len()
    }

    pub fn boundary(&self, face: Face) -> &Boundary {
        &self.boundary[face.index()]
    }

    pub fn boundary_mut(&mut self, face: Face) -> &mut Boundary {
        &mut self.boundary[face.index()]
    }

    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// Prescribes a uniform condition over a whole face
    pub fn set_boundary(&mut self, face: Face, kind: BcKind, value: f64) {
        let bnd = self.boundary_mut(face);
        bnd.kind.fill(kind);
        bnd.value.fill(value);
    }

    /// Prescribes per-cell boundary values on a face
    pub fn set_boundary_values(
        &mut self,
        face: Face,
        kind: BcKind,
        values: Array2<f64>,
    ) -> Result<(), SolverError> {
        let expected = face_shape(face, self.shape());
        if values.dim() != expected {
            return Err(SolverError::ShapeMismatch {
                what: "boundary values",
                expected: vec![expected.0, expected.1],
                found: vec![values.dim().0, values.dim().1],
            });
        }
        let bnd = self.boundary_mut(face);
        bnd.kind.fill(kind);
        bnd.value = values;
        Ok(())
    }

    /// Checks that the boundary kind and value arrays of every face match
    /// the cross-section of the interior array.
    pub fn check_shape(&self) -> Result<(), SolverError> {
        let shape = self.shape();
        for face in FACES {
            let expected = face_shape(face, shape);
            let bnd = self.boundary(face);
            for (what, found) in [
                ("boundary kinds", bnd.kind.dim()),
                ("boundary values", bnd.value.dim()),
            ] {
                if found != expected {
                    return Err(SolverError::ShapeMismatch {
                        what,
                        expected: vec![expected.0, expected.1],
                        found: vec![found.0, found.1],
                    });
                }
            }
        }
        Ok(())
    }

    /// Sets the interior values, checking the shape
    pub fn set_value(&mut self, value: Array3<f64>) -> Result<(), SolverError> {
        crate::error::check_shape("field value", self.shape(), value.dim())?;
        self.value = value;
        Ok(())
    }

    /// Copies the current values into the previous time level
    pub fn store_previous(&mut self) {
        self.previous.assign(&self.value);
    }

    /// A field with the same position, periodicity and boundary kinds but
    /// zero values everywhere, boundary values included. Search directions of
    /// the Krylov solvers live in such fields, so that applying the operator
    /// to them is linear.
    pub fn homogeneous_like(&self, name: &str) -> Self {
        let boundary = self.boundary.clone().map(|b| Boundary {
            value: Array2::zeros(b.value.dim()),
            kind: b.kind,
        });
        Self {
            name: name.to_string(),
            position: self.position,
            value: Array3::zeros(self.shape()),
            previous: Array3::zeros(self.shape()),
            periodic: self.periodic,
            boundary,
        }
    }

    /// Refreshes boundary buffers of periodic axes: the value stored on a
    /// face becomes the interior layer adjacent to the opposite face.
    pub fn exchange(&mut self) {
        for axis in Axis::iter() {
            if !self.is_periodic(axis) {
                continue;
            }
            let n = self.value.len_of(axis.nd());
            if n == 0 {
                continue;
            }
            let (low, high) = axis.faces();
            let last = self.value.index_axis(axis.nd(), n - 1).to_owned();
            let first = self.value.index_axis(axis.nd(), 0).to_owned();
            self.boundary[low.index()].value.assign(&last);
            self.boundary[high.index()].value.assign(&first);
        }
    }

    /// Value seen across `face` by each interior cell of the adjacent layer:
    /// the prescribed value for Dirichlet, the adjacent interior value for
    /// Neumann and Outlet, the opposite layer for periodic axes.
    pub fn ghost_layer(&self, face: Face) -> Array2<f64> {
        let axis = face.axis();
        let n = self.value.len_of(axis.nd());
        let shape = face_shape(face, self.shape());
        if n == 0 {
            return Array2::zeros(shape);
        }
        let adjacent = self.value.index_axis(axis.nd(), face.adjacent_layer(n));
        let opposite = self
            .value
            .index_axis(axis.nd(), face.opposite().adjacent_layer(n));
        if self.is_periodic(axis) {
            return opposite.to_owned();
        }
        let bnd = self.boundary(face);
        Zip::from(&bnd.kind)
            .and(&bnd.value)
            .and(&adjacent)
            .and(&opposite)
            .map_collect(|kind, &prescribed, &inside, &across| match kind {
                BcKind::Dirichlet => prescribed,
                BcKind::Neumann | BcKind::Outlet => inside,
                BcKind::Periodic => across,
            })
    }

    /// prints a short description of the field
    pub fn describe(&self) {
        info!(
            "unknown {}: position {}, shape {:?}, periodic {:?}",
            self.name,
            self.position,
            self.shape(),
            self.periodic
        );
        for face in Face::iter() {
            let bnd = self.boundary(face);
            let first = bnd.kind.iter().next().copied();
            info!("  {:>6}: {:?} {:?}", face, first, bnd.shape());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, array};

    #[test]
    fn boundaries_have_cross_section_shapes() {
        let phi = GridField::new("u", Position::FaceX, (6, 4, 3), BcKind::Dirichlet, [false; 3]);
        assert_eq!(phi.shape(), (5, 4, 3));
        assert_eq!(phi.boundary(Face::West).shape(), (4, 3));
        assert_eq!(phi.boundary(Face::North).shape(), (5, 3));
        assert_eq!(phi.boundary(Face::Top).shape(), (5, 4));
        assert_eq!(phi.interior_cells(), 60);
    }

    #[test]
    fn periodic_axes_skip_the_default_condition() {
        let phi = GridField::new("p", Position::Cell, (4, 4, 2), BcKind::Neumann, [true, false, false]);
        assert!(phi.boundary(Face::West).kind.iter().all(|k| *k == BcKind::Periodic));
        assert!(phi.boundary(Face::East).kind.iter().all(|k| *k == BcKind::Periodic));
        assert!(phi.boundary(Face::South).kind.iter().all(|k| *k == BcKind::Neumann));
    }

    #[test]
    fn store_previous_copies_values() {
        let mut phi = GridField::new("t", Position::Cell, (2, 2, 2), BcKind::Dirichlet, [false; 3]);
        phi.value.fill(3.0);
        assert_relative_eq!(phi.previous.sum(), 0.0);
        phi.store_previous();
        assert_relative_eq!(phi.previous.sum(), 24.0);
        phi.value.fill(1.0);
        assert_relative_eq!(phi.previous.sum(), 24.0);
    }

    #[test]
    fn ghost_layer_follows_boundary_kind() {
        let mut phi = GridField::new("t", Position::Cell, (3, 1, 1), BcKind::Dirichlet, [false; 3]);
        phi.value = Array::from_shape_vec((3, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        phi.set_boundary(Face::West, BcKind::Dirichlet, 5.0);
        phi.set_boundary(Face::East, BcKind::Neumann, 99.0);
        assert_eq!(phi.ghost_layer(Face::West), array![[5.0]]);
        assert_eq!(phi.ghost_layer(Face::East), array![[3.0]]);
        phi.set_boundary(Face::East, BcKind::Periodic, 0.0);
        assert_eq!(phi.ghost_layer(Face::East), array![[1.0]]);
    }

    #[test]
    fn exchange_wraps_periodic_layers() {
        let mut phi = GridField::new("u", Position::Cell, (4, 1, 1), BcKind::Dirichlet, [true, false, false]);
        phi.value = Array::from_shape_vec((4, 1, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        phi.exchange();
        assert_eq!(phi.boundary(Face::West).value, array![[4.0]]);
        assert_eq!(phi.boundary(Face::East).value, array![[1.0]]);
        // non-periodic faces untouched
        assert_eq!(phi.boundary(Face::South).value.sum(), 0.0);
    }

    #[test]
    fn homogeneous_copy_keeps_kinds_and_zeroes_values() {
        let mut phi = GridField::new("t", Position::Cell, (3, 3, 3), BcKind::Dirichlet, [false; 3]);
        phi.set_boundary(Face::Top, BcKind::Neumann, 7.0);
        phi.set_boundary(Face::West, BcKind::Dirichlet, 2.0);
        phi.value.fill(1.0);
        let p = phi.homogeneous_like("p");
        assert_eq!(p.boundary(Face::Top).kind, phi.boundary(Face::Top).kind);
        assert_eq!(p.boundary(Face::West).value.sum(), 0.0);
        assert_eq!(p.value.sum(), 0.0);
    }

    #[test]
    fn inconsistent_boundary_arrays_are_detected() {
        let mut phi = GridField::new("t", Position::Cell, (3, 3, 3), BcKind::Dirichlet, [false; 3]);
        assert!(phi.check_shape().is_ok());
        phi.boundary_mut(Face::West).value = Array2::zeros((2, 2));
        assert!(matches!(
            phi.check_shape(),
            Err(SolverError::ShapeMismatch { what: "boundary values", .. })
        ));

        let mut phi = GridField::new("t", Position::Cell, (3, 3, 3), BcKind::Dirichlet, [false; 3]);
        phi.value = Array3::zeros((4, 3, 3));
        assert!(matches!(
            phi.check_shape(),
            Err(SolverError::ShapeMismatch { what: "boundary kinds", .. })
        ));
    }

    #[test]
    fn shape_checked_setters() {
        let mut phi = GridField::new("t", Position::Cell, (3, 2, 2), BcKind::Dirichlet, [false; 3]);
        assert!(phi.set_value(Array3::zeros((3, 2, 1))).is_err());
        assert!(phi.set_value(Array3::ones((3, 2, 2))).is_ok());
        assert!(phi.set_boundary_values(Face::South, BcKind::Dirichlet, Array2::ones((3, 2))).is_ok());
        let err = phi
            .set_boundary_values(Face::South, BcKind::Dirichlet, Array2::ones((2, 2)))
            .unwrap_err();
        assert!(matches!(err, SolverError::ShapeMismatch { .. }));
    }
}
