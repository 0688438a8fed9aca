use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::Float;

/// Discrete velocity model: directions, weights and their opposites.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocitySet {
    name: &'static str,
    dimensions: usize,
    directions: Vec<[i32; 3]>,
    /// One column per direction, one row per spatial dimension
    velocities: DMatrix<Float>,
    weights: DVector<Float>,
    opposite: Vec<usize>,
}

impl VelocitySet {
    /// Speed of sound squared
    pub const CS2: Float = 1.0 / 3.0;

    fn new(name: &'static str, dimensions: usize, directions: &[[i32; 3]], weights: &[Float]) -> Self {
        let q = directions.len();
        let velocities = DMatrix::from_fn(dimensions, q, |d, i| directions[i][d] as Float);
        let opposite = directions
            .iter()
            .map(|c| {
                directions
                    .iter()
                    .position(|o| o[0] == -c[0] && o[1] == -c[1] && o[2] == -c[2])
                    .unwrap_or_else(|| panic!("{name}: direction {c:?} has no opposite"))
            })
            .collect();

        Self {
            name,
            dimensions,
            directions: directions.to_vec(),
            velocities,
            weights: DVector::from_column_slice(weights),
            opposite,
        }
    }

    pub fn d2q9() -> Self {
        const W0: Float = 4.0 / 9.0;
        const W1: Float = 1.0 / 9.0;
        const W2: Float = 1.0 / 36.0;
        Self::new(
            "D2Q9",
            2,
            &[
                // Rest
                [0, 0, 0],
                // Axis neighbors (4)
                [1, 0, 0], [0, 1, 0], [-1, 0, 0], [0, -1, 0],
                // Diagonal neighbors (4)
                [1, 1, 0], [-1, 1, 0], [-1, -1, 0], [1, -1, 0],
            ],
            &[W0, W1, W1, W1, W1, W2, W2, W2, W2],
        )
    }

    pub fn d3q27() -> Self {
        const W0: Float = 8.0 / 27.0;
        const W1: Float = 2.0 / 27.0;
        const W2: Float = 1.0 / 54.0;
        const W3: Float = 1.0 / 216.0;
        Self::new(
            "D3Q27",
            3,
            &[
                // Center
                [0, 0, 0],
                // Face neighbors (6)
                [1, 0, 0], [-1, 0, 0], [0, 1, 0], [0, -1, 0], [0, 0, 1], [0, 0, -1],
                // Edge neighbors (12)
                [1, 1, 0], [1, -1, 0], [-1, 1, 0], [-1, -1, 0],
                [1, 0, 1], [1, 0, -1], [-1, 0, 1], [-1, 0, -1],
                [0, 1, 1], [0, 1, -1], [0, -1, 1], [0, -1, -1],
                // Corner neighbors (8)
                [1, 1, 1], [1, 1, -1], [1, -1, 1], [1, -1, -1],
                [-1, 1, 1], [-1, 1, -1], [-1, -1, 1], [-1, -1, -1],
            ],
            &[
                W0,
                W1, W1, W1, W1, W1, W1,
                W2, W2, W2, W2, W2, W2, W2, W2, W2, W2, W2, W2,
                W3, W3, W3, W3, W3, W3, W3, W3,
            ],
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of discrete velocities
    pub fn q(&self) -> usize {
        self.directions.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn direction(&self, i: usize) -> [i32; 3] {
        self.directions[i]
    }

    pub fn velocities(&self) -> &DMatrix<Float> {
        &self.velocities
    }

    pub fn weights(&self) -> &DVector<Float> {
        &self.weights
    }

    pub fn opposite(&self, i: usize) -> usize {
        self.opposite[i]
    }
}

/// Handle the local kernel uses to reach the lattice: its velocity model and
/// the neighbor of a site along a direction.
pub trait Lattice {
    fn velocity_set(&self) -> &VelocitySet;

    fn site_count(&self) -> usize;

    fn direction_count(&self) -> usize;

    fn neighbor(&self, site: usize, direction: usize) -> usize;
}

#[derive(Debug, Error, PartialEq)]
pub enum LatticeError {
    #[error("domain {nx}x{ny}x{nz} has no sites")]
    EmptyDomain { nx: usize, ny: usize, nz: usize },
    #[error("{name} is a {dimensions}D model but the domain has nz = {nz}")]
    DimensionMismatch { name: &'static str, dimensions: usize, nz: usize },
}

/// Regular grid whose faces wrap around. Sites are numbered `i + j*nx + k*nx*ny`.
#[derive(Debug, Clone)]
pub struct PeriodicLattice {
    velocity_set: VelocitySet,
    nx: usize,
    ny: usize,
    nz: usize,
}

impl PeriodicLattice {
    pub fn new(velocity_set: VelocitySet, nx: usize, ny: usize, nz: usize) -> Result<Self, LatticeError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(LatticeError::EmptyDomain { nx, ny, nz });
        }
        if velocity_set.dimensions() == 2 && nz != 1 {
            return Err(LatticeError::DimensionMismatch {
                name: velocity_set.name(),
                dimensions: 2,
                nz,
            });
        }
        Ok(Self { velocity_set, nx, ny, nz })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.nx + k * self.nx * self.ny
    }

    pub fn coordinates(&self, site: usize) -> (usize, usize, usize) {
        let i = site % self.nx;
        let j = (site / self.nx) % self.ny;
        let k = site / (self.nx * self.ny);
        (i, j, k)
    }
}

fn wrap(x: usize, dx: i32, n: usize) -> usize {
    (x as i64 + dx as i64).rem_euclid(n as i64) as usize
}

impl Lattice for PeriodicLattice {
    fn velocity_set(&self) -> &VelocitySet {
        &self.velocity_set
    }

    fn site_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    fn direction_count(&self) -> usize {
        self.velocity_set.q()
    }

    fn neighbor(&self, site: usize, direction: usize) -> usize {
        let (i, j, k) = self.coordinates(site);
        let c = self.velocity_set.direction(direction);
        self.index(
            wrap(i, c[0], self.nx),
            wrap(j, c[1], self.ny),
            wrap(k, c[2], self.nz),
        )
    }
}
