use crate::error::{Result, SolverError};
use crate::lattice::{
    edge_mirror, equilibrium, relaxation_time, rest_populations, Cell, DIRECTIONS,
    INFLOW_AGAINST, INFLOW_PERPENDICULAR, OPPOSITE, Q,
};
use crate::obstacles::ObstacleMap;

use rayon::prelude::*;
use std::time::Instant;

/// Densities at or below this are treated as degenerate.
const DENSITY_FLOOR: f64 = 1e-12;

/// Largest accepted grid side. A run holds 2·N²·9 populations.
pub const MAX_GRID_SIZE: usize = 1000;

/// Inputs of one solver run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Cells per side of the square grid.
    pub grid_size: usize,
    /// Horizontal speed imposed on the left-most column (lattice units).
    pub inlet_speed: f64,
    /// Lattice kinematic viscosity.
    pub viscosity: f64,
    pub iterations: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            grid_size: 100,
            inlet_speed: 0.1,
            viscosity: 0.02,
            iterations: 100,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(SolverError::InvalidParameter(
                "grid size must be positive".to_string(),
            ));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(SolverError::InvalidParameter(format!(
                "grid size must be at most {MAX_GRID_SIZE}, got {}",
                self.grid_size
            )));
        }
        if self.iterations == 0 {
            return Err(SolverError::InvalidParameter(
                "iteration count must be positive".to_string(),
            ));
        }
        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "viscosity must be finite and non-negative, got {}",
                self.viscosity
            )));
        }
        // The inlet density reconstruction divides by 1 - u.
        if !self.inlet_speed.is_finite() || self.inlet_speed.abs() >= 1.0 {
            return Err(SolverError::InvalidParameter(format!(
                "inlet speed must be finite with magnitude below 1, got {}",
                self.inlet_speed
            )));
        }
        Ok(())
    }

    pub fn relaxation_time(&self) -> f64 {
        relaxation_time(self.viscosity)
    }
}

/// Row-major velocity components on an N×N grid.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityField {
    pub n: usize,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
}

impl VelocityField {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            vx: vec![0.0; n * n],
            vy: vec![0.0; n * n],
        }
    }

    #[inline]
    pub fn velocity(&self, row: usize, col: usize) -> [f64; 2] {
        let idx = row * self.n + col;
        [self.vx[idx], self.vy[idx]]
    }

    #[inline]
    pub fn speed(&self, row: usize, col: usize) -> f64 {
        let [u, v] = self.velocity(row, col);
        (u * u + v * v).sqrt()
    }

    pub fn max_speed(&self) -> f64 {
        self.vx
            .iter()
            .zip(&self.vy)
            .map(|(u, v)| (u * u + v * v).sqrt())
            .fold(0.0, f64::max)
    }

    pub fn is_finite(&self) -> bool {
        self.vx.iter().chain(&self.vy).all(|v| v.is_finite())
    }

    /// Both components as nested rows, the wire representation.
    pub fn to_rows(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let rows = |field: &[f64]| -> Vec<Vec<f64>> {
            field.chunks(self.n.max(1)).map(<[f64]>::to_vec).collect()
        };
        (rows(self.vx.as_slice()), rows(self.vy.as_slice()))
    }
}

/// Summary of the macroscopic state after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Diagnostics {
    pub iteration: usize,
    pub min_density: f64,
    pub max_density: f64,
    pub max_speed: f64,
}

/// D2Q9 lattice Boltzmann model of channel flow past obstacles.
///
/// Every step runs, in order:
/// 1. macroscopic extraction (density, velocity),
/// 2. boundary enforcement: inlet, obstacle bounce-back, top/bottom index mirror,
/// 3. BGK collision,
/// 4. zero-padded streaming,
/// 5. macroscopic extraction and outlet clamp.
pub struct Model {
    n: usize,
    inlet_speed: f64,
    /// Relaxation time τ = 3ν + 0.5
    tau: f64,
    obstacles: ObstacleMap,
    /// Populations per cell, row-major.
    f: Vec<Cell>,
    /// Streaming destination, swapped with `f` after every step.
    f_temp: Vec<Cell>,
    density: Vec<f64>,
    velocity: Vec<[f64; 2]>,
    iteration: usize,
    diagnostics: Diagnostics,
}

impl Model {
    /// Validate the inputs and allocate the rest state (density 1, velocity 0).
    pub fn new(params: &SimulationParams, obstacles: &ObstacleMap) -> Result<Self> {
        params.validate()?;
        let n = params.grid_size;
        if obstacles.size() != n {
            return Err(SolverError::ShapeMismatch {
                expected: n,
                rows: obstacles.size(),
                cols: obstacles.size(),
            });
        }

        let size = n * n;
        Ok(Self {
            n,
            inlet_speed: params.inlet_speed,
            tau: params.relaxation_time(),
            obstacles: obstacles.clone(),
            f: vec![rest_populations(); size],
            f_temp: vec![[0.0; Q]; size],
            density: vec![1.0; size],
            velocity: vec![[0.0; 2]; size],
            iteration: 0,
            diagnostics: Diagnostics {
                iteration: 0,
                min_density: 1.0,
                max_density: 1.0,
                max_speed: 0.0,
            },
        })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn populations(&self) -> &[Cell] {
        &self.f
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.f[row * self.n + col]
    }

    /// Advance one iteration. The post-step field is read with [`Model::velocity_field`].
    pub fn step(&mut self) -> Result<()> {
        let iteration = self.iteration + 1;

        self.extract_macroscopic(iteration)?;
        self.enforce_boundaries();
        self.collide();
        self.stream();
        self.extract_macroscopic(iteration)?;
        self.clamp_outlet();

        self.iteration = iteration;
        self.diagnostics = self.compute_diagnostics();
        log::debug!("{:?}", self.diagnostics);
        Ok(())
    }

    /// Run `iterations` steps and return the final velocity field with obstacle cells zeroed.
    pub fn run(&mut self, iterations: usize) -> Result<VelocityField> {
        let start = Instant::now();
        log::debug!(
            "running {} iterations on {}x{} grid (tau = {:.4}, {} solid cells)",
            iterations,
            self.n,
            self.n,
            self.tau,
            self.obstacles.solid_count()
        );

        for _ in 0..iterations {
            if let Err(err) = self.step() {
                log::warn!("solver aborted: {err}");
                return Err(err);
            }
        }

        self.extract_macroscopic(self.iteration)?;
        if self.iteration > 0 {
            self.clamp_outlet();
        }

        let mut field = self.velocity_field();
        for (idx, _) in self
            .obstacles
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, &solid)| solid)
        {
            field.vx[idx] = 0.0;
            field.vy[idx] = 0.0;
        }

        log::debug!(
            "finished {} iterations in {:?}, max speed {:.4}",
            iterations,
            start.elapsed(),
            field.max_speed()
        );
        Ok(field)
    }

    /// Current macroscopic velocity, without obstacle masking.
    pub fn velocity_field(&self) -> VelocityField {
        let (vx, vy): (Vec<f64>, Vec<f64>) = self.velocity.iter().map(|&[u, v]| (u, v)).unzip();
        VelocityField { n: self.n, vx, vy }
    }

    /// Density and velocity of every cell from its populations.
    fn extract_macroscopic(&mut self, iteration: usize) -> Result<()> {
        self.density
            .par_iter_mut()
            .zip(self.velocity.par_iter_mut())
            .zip(self.f.par_iter())
            .for_each(|((rho, u), cell)| {
                let mut sum = 0.0;
                let mut mx = 0.0;
                let mut my = 0.0;
                for (k, e) in DIRECTIONS.iter().enumerate() {
                    sum += cell[k];
                    mx += e[0] as f64 * cell[k];
                    my += e[1] as f64 * cell[k];
                }
                *rho = sum;
                *u = [mx / sum, my / sum];
            });

        let degenerate = self
            .density
            .par_iter()
            .position_first(|&rho| !(rho.is_finite() && rho > DENSITY_FLOOR));
        match degenerate {
            Some(idx) => Err(SolverError::NumericalDegeneracy {
                iteration,
                row: idx / self.n,
                col: idx % self.n,
                density: self.density[idx],
            }),
            None => Ok(()),
        }
    }

    /// Inlet, then obstacle bounce-back, then the top/bottom mirror.
    fn enforce_boundaries(&mut self) {
        self.apply_inlet();
        self.bounce_back_obstacles();
        self.mirror_edges();
    }

    /// Prescribed velocity on the left-most column; density reconstructed from the
    /// populations that are known at an open inflow boundary.
    fn apply_inlet(&mut self) {
        let u_in = self.inlet_speed;
        for row in 0..self.n {
            let idx = row * self.n;
            let c = &self.f[idx];
            let perpendicular: f64 = INFLOW_PERPENDICULAR.iter().map(|&k| c[k]).sum();
            let against: f64 = INFLOW_AGAINST.iter().map(|&k| c[k]).sum();
            self.velocity[idx] = [u_in, 0.0];
            self.density[idx] = (c[0] + perpendicular + 2.0 * against) / (1.0 - u_in);
        }
    }

    /// Full bounce-back on every solid cell.
    fn bounce_back_obstacles(&mut self) {
        self.f
            .par_iter_mut()
            .zip(self.obstacles.as_slice().par_iter())
            .filter(|(_, &solid)| solid)
            .for_each(|(cell, _)| {
                let old = *cell;
                *cell = std::array::from_fn(|k| old[OPPOSITE[k]]);
            });
    }

    /// `k <- 8 - k` relabelling on the top and bottom rows.
    fn mirror_edges(&mut self) {
        let n = self.n;
        for row in [0, n - 1] {
            for cell in &mut self.f[row * n..(row + 1) * n] {
                let old = *cell;
                *cell = std::array::from_fn(|k| old[edge_mirror(k)]);
            }
        }
    }

    /// BGK relaxation towards equilibrium, uniformly over all cells.
    fn collide(&mut self) {
        let tau = self.tau;
        self.f
            .par_iter_mut()
            .zip(self.density.par_iter())
            .zip(self.velocity.par_iter())
            .for_each(|((cell, &rho), &u)| {
                for (k, f) in cell.iter_mut().enumerate() {
                    let feq = equilibrium(k, rho, u);
                    *f -= (*f - feq) / tau;
                }
            });
    }

    /// Shift every direction by its offset; cells fed from outside the grid get zero.
    fn stream(&mut self) {
        let n = self.n as isize;
        let src = &self.f;
        self.f_temp
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, dest)| {
                *dest = [0.0; Q];
                let row = idx as isize / n;
                let col = idx as isize % n;
                for (k, e) in DIRECTIONS.iter().enumerate() {
                    let from_row = row - e[1] as isize;
                    let from_col = col - e[0] as isize;
                    if (0..n).contains(&from_row) && (0..n).contains(&from_col) {
                        dest[k] = src[(from_row * n + from_col) as usize][k];
                    }
                }
            });
        std::mem::swap(&mut self.f, &mut self.f_temp);
    }

    /// Zero velocity on the right-most column.
    fn clamp_outlet(&mut self) {
        let n = self.n;
        for row in 0..n {
            self.velocity[row * n + n - 1] = [0.0, 0.0];
        }
    }

    fn compute_diagnostics(&self) -> Diagnostics {
        let min_density = self.density.par_iter().copied().reduce(|| f64::INFINITY, f64::min);
        let max_density = self
            .density
            .par_iter()
            .copied()
            .reduce(|| f64::NEG_INFINITY, f64::max);
        let max_speed = self
            .velocity
            .par_iter()
            .map(|&[u, v]| (u * u + v * v).sqrt())
            .reduce(|| 0.0, f64::max);
        Diagnostics {
            iteration: self.iteration,
            min_density,
            max_density,
            max_speed,
        }
    }

    #[cfg(test)]
    fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.f[row * self.n + col] = cell;
    }
}

/// Run a fresh model for `params.iterations` steps.
pub fn simulate(params: &SimulationParams, obstacles: &ObstacleMap) -> Result<VelocityField> {
    let mut model = Model::new(params, obstacles)?;
    model.run(params.iterations)
}
