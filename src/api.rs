//! JSON request contract for callers that drive the solver over a wire.
//!
//! A request carries the grid size, inlet speed, viscosity, iteration count and the
//! obstacle grid; a successful response carries the two velocity grids. Every error
//! response carries only a message.

use crate::error::{ApiError, SolverError};
use crate::model::{simulate, SimulationParams};
use crate::obstacles::ObstacleMap;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    #[serde(
        rename = "N",
        default = "default_grid_size",
        deserialize_with = "whole_number"
    )]
    pub grid_size: usize,
    #[serde(default = "default_inlet_speed")]
    pub u_in: f64,
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,
    #[serde(default = "default_steps", deserialize_with = "whole_number")]
    pub steps: usize,
    #[serde(default)]
    pub obstacles: Vec<Vec<u8>>,
}

fn default_grid_size() -> usize {
    SimulationParams::default().grid_size
}

fn default_inlet_speed() -> f64 {
    SimulationParams::default().inlet_speed
}

fn default_viscosity() -> f64 {
    SimulationParams::default().viscosity
}

fn default_steps() -> usize {
    SimulationParams::default().iterations
}

/// Counts arrive as JSON numbers: integers, or floats truncated toward zero (`50.0`
/// and `50.9` both mean 50). Negative and non-finite values are rejected.
fn whole_number<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(de::Error::custom(format!(
            "expected a non-negative number, got {value}"
        )));
    }
    Ok(value.trunc() as usize)
}

impl FlowRequest {
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            grid_size: self.grid_size,
            inlet_speed: self.u_in,
            viscosity: self.viscosity,
            iterations: self.steps,
        }
    }

    /// Validate parameters, then the obstacle shape, then run the solver.
    pub fn solve(&self) -> Result<FlowResponse, SolverError> {
        let params = self.params();
        params.validate()?;
        let obstacles = ObstacleMap::from_rows(params.grid_size, &self.obstacles)?;
        let field = simulate(&params, &obstacles)?;
        let (vx, vy) = field.to_rows();
        Ok(FlowResponse { vx, vy })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub vx: Vec<Vec<f64>>,
    pub vy: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn error(status: u16, message: impl Into<String>) -> Self {
        let body = ErrorResponse {
            error: message.into(),
        };
        Self {
            status,
            // Serializing a single string field cannot fail.
            body: serde_json::to_string(&body).unwrap_or_default(),
        }
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::Json(_) => 400,
            ApiError::Solver(SolverError::NumericalDegeneracy { .. }) => 422,
            ApiError::Solver(_) => 400,
        };
        let message = match err {
            ApiError::Solver(SolverError::ShapeMismatch { expected, .. }) => {
                format!("obstacles must be {expected}x{expected}")
            }
            other => other.to_string(),
        };
        ApiResponse::error(status, message)
    }
}

pub fn parse_request(body: &str) -> Result<FlowRequest, ApiError> {
    Ok(serde_json::from_str(body)?)
}

fn respond(body: &str) -> Result<ApiResponse, ApiError> {
    let request = parse_request(body)?;
    let response = request.solve()?;
    Ok(ApiResponse {
        status: 200,
        body: serde_json::to_string(&response)?,
    })
}

/// Handle one flow request. Only `POST` is accepted.
pub fn handle_flow_request(method: &str, body: &str) -> ApiResponse {
    if !method.eq_ignore_ascii_case("POST") {
        return ApiResponse::error(405, "POST only");
    }
    match respond(body) {
        Ok(response) => response,
        Err(err) => {
            log::info!("rejected flow request: {err}");
            err.into()
        }
    }
}
