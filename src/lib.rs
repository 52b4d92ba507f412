//! Lattice Boltzmann (D2Q9) channel flow past user-painted obstacles.
//!
//! The solver is a pure function of its inputs: a square grid, an inlet speed, a
//! viscosity, an iteration count and an obstacle map produce one velocity field.
//!
//! ```
//! use lattice_playground::{simulate, ObstacleMap, SimulationParams};
//!
//! let params = SimulationParams { grid_size: 32, iterations: 3, ..Default::default() };
//! let mut obstacles = ObstacleMap::empty(32);
//! obstacles.paint(15, 8);
//!
//! let field = simulate(&params, &obstacles).unwrap();
//! assert_eq!(field.velocity(15, 8), [0.0, 0.0]);
//! ```

pub mod api;
pub mod app;
pub mod error;
pub mod lattice;
pub mod model;
pub mod obstacles;
pub mod utils;
pub mod views;
pub mod worker;

pub use app::App;
pub use error::{ApiError, Result, SolverError};
pub use model::{simulate, Diagnostics, Model, SimulationParams, VelocityField};
pub use obstacles::ObstacleMap;
