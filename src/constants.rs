//! closed enumerations shared by fields, operators and solvers: grid axes,
//! the six boundary faces, the variable position on the staggered grid and
//! the kinds of boundary conditions
use ndarray::Axis as NdAxis;
use strum_macros::{Display, EnumIter, EnumString};

/// smallest magnitude treated as nonzero by the solvers
pub const TINY: f64 = 1.0e-20;

/// Coordinate axis of a structured grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
    /// the same axis as seen by ndarray
    pub fn nd(self) -> NdAxis {
        NdAxis(self.index())
    }
    /// the two faces bounding the domain along this axis, low side first
    pub fn faces(self) -> (Face, Face) {
        match self {
            Axis::X => (Face::West, Face::East),
            Axis::Y => (Face::South, Face::North),
            Axis::Z => (Face::Bottom, Face::Top),
        }
    }
}

/// Boundary face of the computational box. The declaration order is also the
/// storage order of per-face data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Face {
    West,
    East,
    South,
    North,
    Bottom,
    Top,
}

/// all faces in storage order
pub const FACES: [Face; 6] = [
    Face::West,
    Face::East,
    Face::South,
    Face::North,
    Face::Bottom,
    Face::Top,
];

impl Face {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> Axis {
        match self {
            Face::West | Face::East => Axis::X,
            Face::South | Face::North => Axis::Y,
            Face::Bottom | Face::Top => Axis::Z,
        }
    }
    /// true for West, South and Bottom
    pub fn is_low(self) -> bool {
        matches!(self, Face::West | Face::South | Face::Bottom)
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::West => Face::East,
            Face::East => Face::West,
            Face::South => Face::North,
            Face::North => Face::South,
            Face::Bottom => Face::Top,
            Face::Top => Face::Bottom,
        }
    }
    /// index of the interior layer touching this face, for `n` layers along the face axis
    pub fn adjacent_layer(self, n: usize) -> usize {
        if self.is_low() { 0 } else { n - 1 }
    }
}

/// Where a variable lives on the staggered grid.
/// The interior array shape follows from the position and the cell counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Position {
    /// cell centres: (nx, ny, nz)
    Cell,
    /// faces normal to x: (nx-1, ny, nz)
    FaceX,
    /// faces normal to y: (nx, ny-1, nz)
    FaceY,
    /// faces normal to z: (nx, ny, nz-1)
    FaceZ,
    /// interior nodes: (nx-1, ny-1, nz-1)
    Node,
}

impl Position {
    /// interior array shape for a grid of `resolution` cells
    pub fn shape(self, resolution: (usize, usize, usize)) -> (usize, usize, usize) {
        let (nx, ny, nz) = resolution;
        match self {
            Position::Cell => (nx, ny, nz),
            Position::FaceX => (nx.saturating_sub(1), ny, nz),
            Position::FaceY => (nx, ny.saturating_sub(1), nz),
            Position::FaceZ => (nx, ny, nz.saturating_sub(1)),
            Position::Node => (
                nx.saturating_sub(1),
                ny.saturating_sub(1),
                nz.saturating_sub(1),
            ),
        }
    }
    /// true if the variable is staggered along `axis`
    pub fn is_staggered_along(self, axis: Axis) -> bool {
        match self {
            Position::Cell => false,
            Position::FaceX => axis == Axis::X,
            Position::FaceY => axis == Axis::Y,
            Position::FaceZ => axis == Axis::Z,
            Position::Node => true,
        }
    }
}

/// Kind of boundary condition prescribed at one boundary cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BcKind {
    /// prescribed value
    Dirichlet,
    /// zero gradient
    Neumann,
    /// convective outflow; the operator treats it as zero gradient
    Outlet,
    /// wraps to the opposite face
    Periodic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn faces_are_stored_in_declaration_order() {
        let indices: Vec<usize> = Face::iter().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn opposite_faces_share_the_axis() {
        for face in Face::iter() {
            assert_eq!(face.axis(), face.opposite().axis());
            assert_ne!(face.is_low(), face.opposite().is_low());
            assert_eq!(face.opposite().opposite(), face);
        }
        for axis in Axis::iter() {
            let (low, high) = axis.faces();
            assert!(low.is_low());
            assert_eq!(low.opposite(), high);
            assert_eq!(low.axis(), axis);
        }
    }

    #[test]
    fn shapes_follow_position() {
        let res = (6, 4, 3);
        assert_eq!(Position::Cell.shape(res), (6, 4, 3));
        assert_eq!(Position::FaceX.shape(res), (5, 4, 3));
        assert_eq!(Position::FaceY.shape(res), (6, 3, 3));
        assert_eq!(Position::FaceZ.shape(res), (6, 4, 2));
        assert_eq!(Position::Node.shape(res), (5, 3, 2));
        // degenerate grids never underflow
        assert_eq!(Position::Node.shape((0, 1, 0)), (0, 0, 0));
        assert!(Position::FaceY.is_staggered_along(Axis::Y));
        assert!(!Position::FaceY.is_staggered_along(Axis::Z));
        assert!(Axis::iter().all(|a| Position::Node.is_staggered_along(a)));
        assert!(!Axis::iter().any(|a| Position::Cell.is_staggered_along(a)));
    }

    #[test]
    fn bc_kind_parses_lowercase_names() {
        assert_eq!(BcKind::from_str("dirichlet").unwrap(), BcKind::Dirichlet);
        assert_eq!(BcKind::from_str("outlet").unwrap(), BcKind::Outlet);
        assert!(BcKind::from_str("robin").is_err());
        assert_eq!(BcKind::Neumann.to_string(), "neumann");
    }
}
