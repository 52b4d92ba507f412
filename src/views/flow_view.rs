use crate::model::VelocityField;
use crate::obstacles::ObstacleMap;
use crate::utils::drawing::{draw_arrow, speed_color};

/// Target edge length of the rendered grid, in pixels.
const CANVAS_SIZE: usize = 600;

const OBSTACLE_COLOR: egui::Color32 = egui::Color32::from_rgb(34, 34, 34);
const ARROW_COLOR: egui::Color32 = egui::Color32::BLACK;

/// Renders the obstacle map and the last velocity field, and reports which cell the
/// pointer is painting.
#[derive(Default)]
pub struct FlowView {
    texture: Option<egui::TextureHandle>,
}

impl FlowView {
    /// Draw into `ui`. Returns the (row, col) under the primary pointer while it is held down.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        obstacles: &ObstacleMap,
        field: Option<&VelocityField>,
    ) -> Option<(usize, usize)> {
        let n = obstacles.size();
        if n == 0 {
            return None;
        }

        let image = rasterize_flow(obstacles, field, pixels_per_cell(n));
        let options = egui::TextureOptions {
            magnification: egui::TextureFilter::Nearest,
            minification: egui::TextureFilter::Nearest,
            mipmap_mode: Some(egui::TextureFilter::Nearest),
            wrap_mode: egui::TextureWrapMode::ClampToEdge,
        };
        if let Some(texture) = &mut self.texture {
            texture.set(image, options);
        } else {
            self.texture = Some(ctx.load_texture("flow", image, options));
        }
        let texture = self.texture.as_ref()?;

        // Keep the grid square inside the available space.
        let available = ui.available_rect_before_wrap().size();
        let side = available.x.min(available.y).max(1.0);
        let response = ui.add(
            egui::Image::new((texture.id(), egui::Vec2::splat(side))).sense(egui::Sense::drag()),
        );

        if !response.is_pointer_button_down_on() {
            return None;
        }
        let pos = response.interact_pointer_pos()?;
        let rel = (pos - response.rect.min) / response.rect.size();
        if !(0.0..1.0).contains(&rel.x) || !(0.0..1.0).contains(&rel.y) {
            return None;
        }
        let col = (rel.x * n as f32) as usize;
        let row = (rel.y * n as f32) as usize;
        Some((row.min(n - 1), col.min(n - 1)))
    }
}

pub fn pixels_per_cell(n: usize) -> usize {
    (CANVAS_SIZE / n.max(1)).max(1)
}

/// Cells between two arrows.
pub fn arrow_stride(n: usize) -> usize {
    if n > 200 {
        10
    } else {
        4
    }
}

/// Solid cells dark, fluid cells coloured by speed relative to the fastest cell,
/// plus a sparse lattice of direction arrows.
pub fn rasterize_flow(
    obstacles: &ObstacleMap,
    field: Option<&VelocityField>,
    scale: usize,
) -> egui::ColorImage {
    let n = obstacles.size();
    let width = n * scale;
    let height = n * scale;
    let mut pixels = vec![egui::Color32::WHITE; width * height];

    let field = field.filter(|field| field.n == n);
    let max_speed = field.map_or(0.0, VelocityField::max_speed);

    for row in 0..n {
        for col in 0..n {
            let color = if obstacles.is_solid(row, col) {
                OBSTACLE_COLOR
            } else if let Some(field) = field {
                let t = if max_speed > 0.0 {
                    field.speed(row, col) / max_speed
                } else {
                    0.0
                };
                speed_color(t as f32)
            } else {
                egui::Color32::WHITE
            };
            for y in row * scale..(row + 1) * scale {
                pixels[y * width + col * scale..y * width + (col + 1) * scale].fill(color);
            }
        }
    }

    if let Some(field) = field {
        let stride = arrow_stride(n);
        let length = (0.8 * (stride * scale) as f32).max(3.0);
        for row in (0..n).step_by(stride) {
            for col in (0..n).step_by(stride) {
                if obstacles.is_solid(row, col) {
                    continue;
                }
                let [u, v] = field.velocity(row, col);
                if u == 0.0 && v == 0.0 {
                    continue;
                }
                let cx = (col * scale) as f32 + scale as f32 / 2.0;
                let cy = (row * scale) as f32 + scale as f32 / 2.0;
                let angle = (v as f32).atan2(u as f32);
                draw_arrow(
                    &mut pixels,
                    width,
                    height,
                    cx,
                    cy,
                    angle,
                    length,
                    ARROW_COLOR,
                );
            }
        }
    }

    egui::ColorImage {
        size: [width, height],
        pixels,
    }
}
