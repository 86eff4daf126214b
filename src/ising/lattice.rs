use crate::error::{IsingError, Result};
use itertools::iproduct;
use nalgebra::Vector2;

/// Axial coordinate of a lattice site, both components in `[-N, N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub i: i32,
    pub j: i32,
}

impl Coordinate {
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

/// Basis vectors placing axial coordinates in the plane.
///
/// Only used for laying sites out (e.g. snapshot export); the physics never
/// looks at Cartesian positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeBasis {
    pub a1: Vector2<f64>,
    pub a2: Vector2<f64>,
}

impl LatticeBasis {
    /// Build `a1 = (l, 0)` and `a2 = (l cos θ, l sin θ)`
    pub fn new(lattice_constant: f64, angle_degrees: f64) -> Self {
        let angle = angle_degrees.to_radians();
        Self {
            a1: Vector2::new(lattice_constant, 0.0),
            a2: Vector2::new(
                lattice_constant * angle.cos(),
                lattice_constant * angle.sin(),
            ),
        }
    }
}

impl Default for LatticeBasis {
    fn default() -> Self {
        // bcc iron lattice constant in Angstrom, square layout
        Self::new(2.866, 90.0)
    }
}

/// Neighbor slots in the order returned by [`Lattice::neighbors_of`]
pub const UP: usize = 0;
pub const DOWN: usize = 1;
pub const RIGHT: usize = 2;
pub const LEFT: usize = 3;

/// Largest supported half width; side 2049, about 4.2 million sites
pub const MAX_HALF_WIDTH: i32 = 1024;

/// All `(2N+1)^2` coordinates of the lattice, row-major over `i` then `j`.
///
/// The position of a coordinate in this list is its site index.
pub fn enumerate(half_width: i32) -> Vec<Coordinate> {
    iproduct!(-half_width..=half_width, -half_width..=half_width)
        .map(|(i, j)| Coordinate::new(i, j))
        .collect()
}

/// Periodic square lattice over `[-N, N]^2` with a precomputed neighbor table.
///
/// The coordinate/index bijection is fixed by [`enumerate`] when the lattice
/// is built; neighbor lookups afterwards are plain table reads.
#[derive(Debug, Clone)]
pub struct Lattice {
    half_width: i32,
    side: usize,
    coords: Vec<Coordinate>,
    /// `neighbors[index] = [up, down, right, left]`
    neighbors: Vec<[usize; 4]>,
}

impl Lattice {
    /// Build the lattice of half width `N` (side `2N+1`).
    ///
    /// `N = 0` is accepted: a single site that is its own periodic image in
    /// all four directions.
    pub fn new(half_width: i32) -> Result<Self> {
        if half_width < 0 {
            return Err(IsingError::Config(format!(
                "lattice half width must be non-negative, got {half_width}"
            )));
        }
        if half_width > MAX_HALF_WIDTH {
            return Err(IsingError::Config(format!(
                "lattice half width {half_width} exceeds the maximum of {MAX_HALF_WIDTH}"
            )));
        }

        let side = (2 * half_width + 1) as usize;
        let mut lattice = Self {
            half_width,
            side,
            coords: enumerate(half_width),
            neighbors: Vec::new(),
        };

        if lattice.coords.len() != side * side {
            return Err(IsingError::Invariant(format!(
                "enumerated {} sites, expected {}",
                lattice.coords.len(),
                side * side
            )));
        }
        for (index, &coord) in lattice.coords.iter().enumerate() {
            let resolved = lattice.index_of(coord)?;
            if resolved != index {
                return Err(IsingError::Invariant(format!(
                    "site ({}, {}) enumerated at {index} but resolves to {resolved}",
                    coord.i, coord.j
                )));
            }
        }

        lattice.neighbors = lattice
            .coords
            .iter()
            .map(|&coord| lattice.resolve_neighbors(coord))
            .collect::<Result<Vec<_>>>()?;

        Ok(lattice)
    }

    /// Periodic image of a coordinate component one step out of range.
    ///
    /// Precondition: `x` is at most one unit outside `[-N, N]`. This is not a
    /// modulo; larger displacements give wrong sites.
    #[inline]
    pub fn wrap(&self, x: i32) -> i32 {
        let n = self.half_width;
        debug_assert!(
            (-n - 1..=n + 1).contains(&x),
            "wrap expects a unit displacement, got {x} for N = {n}"
        );
        if x > n {
            -n
        } else if x < -n {
            n
        } else {
            x
        }
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        let n = self.half_width;
        (-n..=n).contains(&coord.i) && (-n..=n).contains(&coord.j)
    }

    /// Site index of an in-range coordinate
    pub fn index_of(&self, coord: Coordinate) -> Result<usize> {
        if !self.contains(coord) {
            let n = self.half_width;
            return Err(IsingError::Invariant(format!(
                "coordinate ({}, {}) lies outside [-{n}, {n}]^2",
                coord.i, coord.j
            )));
        }
        let row = (coord.i + self.half_width) as usize;
        let col = (coord.j + self.half_width) as usize;
        Ok(row * self.side + col)
    }

    fn resolve_neighbors(&self, c: Coordinate) -> Result<[usize; 4]> {
        Ok([
            self.index_of(Coordinate::new(self.wrap(c.i + 1), c.j))?,
            self.index_of(Coordinate::new(self.wrap(c.i - 1), c.j))?,
            self.index_of(Coordinate::new(c.i, self.wrap(c.j + 1)))?,
            self.index_of(Coordinate::new(c.i, self.wrap(c.j - 1)))?,
        ])
    }

    /// Indices of `(i+1, j)`, `(i-1, j)`, `(i, j+1)`, `(i, j-1)` under wraparound
    pub fn neighbors_of(&self, coord: Coordinate) -> Result<[usize; 4]> {
        Ok(self.neighbors[self.index_of(coord)?])
    }

    /// Same as [`Lattice::neighbors_of`], keyed by site index
    #[inline]
    pub fn neighbors_at(&self, index: usize) -> &[usize; 4] {
        &self.neighbors[index]
    }

    pub fn coordinate(&self, index: usize) -> Coordinate {
        self.coords[index]
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coords
    }

    /// `N`
    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    /// `2N + 1`
    pub fn side(&self) -> usize {
        self.side
    }

    /// `(2N + 1)^2`
    pub fn n_sites(&self) -> usize {
        self.coords.len()
    }

    /// Cartesian position of a site, `i * a1 + j * a2`
    pub fn position(&self, index: usize, basis: &LatticeBasis) -> Vector2<f64> {
        let c = self.coords[index];
        basis.a1 * c.i as f64 + basis.a2 * c.j as f64
    }
}
