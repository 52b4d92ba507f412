use eframe::egui;
use crate::model::{SimulationParams, VelocityField};
use crate::obstacles::ObstacleMap;
use crate::views::flow_view::FlowView;
use crate::worker::{SolveOutcome, SolverHandle};
use std::time::{Duration, Instant};

const GRID_SIZES: [usize; 4] = [50, 100, 200, 500];
/// Period of automatic re-solves, like the browser client's polling.
const REFRESH_PERIOD: Duration = Duration::from_secs(1);
/// Iterations on launch. Default inflow stays non-degenerate up to 4.
const START_ITERATIONS: usize = 4;
const MAX_ITERATIONS: usize = 10;

/// Parameters the window opens with.
fn initial_params() -> SimulationParams {
    SimulationParams {
        iterations: START_ITERATIONS,
        ..Default::default()
    }
}

/// Interactive caller: paint obstacles, tune parameters, watch the solved field.
pub struct App {
    params: SimulationParams,
    obstacles: ObstacleMap,
    solver: SolverHandle,
    view: FlowView,
    field: Option<VelocityField>,
    last_outcome: Option<SolveOutcome>,
    auto_refresh: bool,
    last_request: Option<Instant>,
    pending: bool,
}

impl Default for App {
    fn default() -> Self {
        let params = initial_params();
        Self {
            obstacles: ObstacleMap::empty(params.grid_size),
            params,
            solver: SolverHandle::spawn(),
            view: FlowView::default(),
            field: None,
            last_outcome: None,
            auto_refresh: true,
            last_request: None,
            pending: false,
        }
    }
}

impl App {
    pub fn new(_cc: &eframe::CreationContext) -> Self {
        Self::default()
    }

    fn request_solve(&mut self) {
        if self.solver.request(self.params, self.obstacles.clone()) {
            self.pending = true;
        } else {
            log::error!("solver thread is not running");
        }
        self.last_request = Some(Instant::now());
    }

    fn resize_grid(&mut self, n: usize) {
        self.params.grid_size = n;
        self.obstacles = ObstacleMap::empty(n);
        self.field = None;
    }

    fn collect_outcome(&mut self) {
        let Some(outcome) = self.solver.latest_outcome() else {
            return;
        };
        self.pending = false;
        match &outcome.result {
            Ok(field) => {
                if field.n == self.params.grid_size {
                    self.field = Some(field.clone());
                }
            }
            Err(err) => log::warn!("solve failed: {err}"),
        }
        self.last_outcome = Some(outcome);
    }

    fn status_text(&self) -> String {
        match &self.last_outcome {
            None => "No solution yet.".to_string(),
            Some(outcome) => match &outcome.result {
                Ok(field) => format!(
                    "N: {}, iterations: {}, time: {:.3} s, max speed: {:.4}",
                    outcome.params.grid_size,
                    outcome.params.iterations,
                    outcome.elapsed.as_secs_f32(),
                    field.max_speed(),
                ),
                Err(err) => format!(
                    "N: {}, iterations: {}, error: {}",
                    outcome.params.grid_size, outcome.params.iterations, err
                ),
            },
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_outcome();

        // --- LEFT CONTROL PANEL: Simulation Controls ---
        egui::SidePanel::left("control_panel").show(ctx, |ui| {
            ui.vertical(|ui| {
                let mut grid_size = self.params.grid_size;
                egui::ComboBox::from_label("Grid Size")
                    .selected_text(format!("{grid_size}x{grid_size}"))
                    .show_ui(ui, |ui| {
                        for n in GRID_SIZES {
                            ui.selectable_value(&mut grid_size, n, format!("{n}x{n}"));
                        }
                    });
                if grid_size != self.params.grid_size {
                    self.resize_grid(grid_size);
                }

                ui.label("Simulation Parameters");
                ui.add(
                    egui::Slider::new(&mut self.params.inlet_speed, 0.0..=0.5)
                        .text("Inlet Speed"),
                );
                ui.add(egui::Slider::new(&mut self.params.viscosity, 0.0..=1.0).text("Viscosity"));
                ui.add(
                    egui::Slider::new(&mut self.params.iterations, 1..=MAX_ITERATIONS)
                        .text("Iterations"),
                );
                ui.label(format!("tau = {:.3}", self.params.relaxation_time()));

                ui.checkbox(&mut self.auto_refresh, "Auto Refresh");
                if ui.button("Solve").clicked() {
                    self.request_solve();
                }
                if ui.button("Clear Obstacles").clicked() {
                    self.obstacles.clear();
                }
            });
        });

        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.separator();
            let busy = if self.pending { " (solving...)" } else { "" };
            ui.label(format!("{}{}", self.status_text(), busy));
        });

        // --- CENTRAL PANEL: Visualization ---
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some((row, col)) =
                self.view
                    .show(ui, ctx, &self.obstacles, self.field.as_ref())
            {
                self.obstacles.paint(row, col);
            }
        });

        let due = self
            .last_request
            .map_or(true, |at| at.elapsed() >= REFRESH_PERIOD);
        if self.auto_refresh && due && !self.pending {
            self.request_solve();
        }

        if self.auto_refresh || self.pending {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simulate;

    #[test]
    fn test_launch_parameters_solve_on_every_grid_size() {
        let mut params = initial_params();
        assert_eq!(params.iterations, START_ITERATIONS);
        for n in GRID_SIZES {
            params.grid_size = n;
            let field = simulate(&params, &ObstacleMap::empty(n)).unwrap();
            assert!(field.is_finite());
            assert!(field.max_speed() > 0.0);
        }
        assert!(START_ITERATIONS <= MAX_ITERATIONS);
        assert_eq!(SimulationParams::default().iterations, 100);
    }
}
