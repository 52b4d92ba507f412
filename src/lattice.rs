//! D2Q9 lattice constants.
//!
//! Nine discrete velocities per cell, `x` along columns and `y` along rows:
//! ```text
//!   7   4   8        row - 1
//!    \  |  /
//!   3 - 0 - 1        row
//!    /  |  \
//!   6   2   5        row + 1
//! ```

/// Number of lattice directions.
pub const Q: usize = 9;

/// Discrete velocities `[dx, dy]`: rest, four axis-aligned, four diagonal.
pub const DIRECTIONS: [[i32; 2]; Q] = [
    [0, 0],   // 0: rest
    [1, 0],   // 1: east
    [0, 1],   // 2: north
    [-1, 0],  // 3: west
    [0, -1],  // 4: south
    [1, 1],   // 5: north-east
    [-1, 1],  // 6: north-west
    [-1, -1], // 7: south-west
    [1, -1],  // 8: south-east
];

/// Weights paired with [`DIRECTIONS`].
pub const WEIGHTS: [f64; Q] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// Index of the geometric reverse of each direction (full bounce-back).
pub const OPPOSITE: [usize; Q] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

/// Directions pointing against the inflow (negative x).
pub const INFLOW_AGAINST: [usize; 3] = [3, 6, 7];

/// Directions perpendicular to the inflow.
pub const INFLOW_PERPENDICULAR: [usize; 2] = [2, 4];

/// Populations of one cell.
pub type Cell = [f64; Q];

/// Index relabelling applied on the top and bottom rows: `k -> 8 - k`.
///
/// Only indices 1..=7 are relabelled; the rest population and index 8
/// (whose mirror would be the rest population) keep their own slot.
#[inline]
pub const fn edge_mirror(k: usize) -> usize {
    if k == 0 || k == Q - 1 {
        k
    } else {
        Q - 1 - k
    }
}

/// Populations of a cell at density 1 and zero velocity.
#[inline]
pub const fn rest_populations() -> Cell {
    WEIGHTS
}

/// Equilibrium population for direction `k`.
///
/// f_k^eq = w_k ρ [1 + 3(e_k·u) + 9/2(e_k·u)² - 3/2(u·u)]
#[inline]
pub fn equilibrium(k: usize, density: f64, velocity: [f64; 2]) -> f64 {
    let ex = DIRECTIONS[k][0] as f64;
    let ey = DIRECTIONS[k][1] as f64;
    let eu = ex * velocity[0] + ey * velocity[1];
    let uu = velocity[0] * velocity[0] + velocity[1] * velocity[1];
    WEIGHTS[k] * density * (1.0 + 3.0 * eu + 4.5 * eu * eu - 1.5 * uu)
}

/// Relaxation time for a lattice viscosity.
#[inline]
pub fn relaxation_time(viscosity: f64) -> f64 {
    3.0 * viscosity + 0.5
}
