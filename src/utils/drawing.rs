pub fn draw_line(
    pixels: &mut [egui::Color32],
    width: usize,
    height: usize,
    x0: isize,
    y0: isize,
    x1: isize,
    y1: isize,
    color: egui::Color32,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error term

    let mut x = x0;
    let mut y = y0;

    loop {
        // Set pixel if within bounds.
        if x >= 0 && x < width as isize && y >= 0 && y < height as isize {
            let idx = x as usize + y as usize * width;
            pixels[idx] = color;
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Arrow from (x, y) pointing at `angle` (radians, screen y down) with a two-stroke head.
pub fn draw_arrow(
    pixels: &mut [egui::Color32],
    width: usize,
    height: usize,
    x: f32,
    y: f32,
    angle: f32,
    length: f32,
    color: egui::Color32,
) {
    let (sin, cos) = angle.sin_cos();
    // Point along the arrow at `along`, offset sideways by `across`.
    let at = |along: f32, across: f32| -> (isize, isize) {
        (
            (x + along * cos - across * sin).round() as isize,
            (y + along * sin + across * cos).round() as isize,
        )
    };

    let (x0, y0) = at(0.0, 0.0);
    let (tip_x, tip_y) = at(length, 0.0);
    let (left_x, left_y) = at(0.75 * length, 0.25 * length);
    let (right_x, right_y) = at(0.75 * length, -0.25 * length);

    draw_line(pixels, width, height, x0, y0, tip_x, tip_y, color);
    draw_line(pixels, width, height, tip_x, tip_y, left_x, left_y, color);
    draw_line(pixels, width, height, tip_x, tip_y, right_x, right_y, color);
}

/// Hue ramp from blue (slow) to red (fast); `t` is clamped to [0, 1].
pub fn speed_color(t: f32) -> egui::Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    let hue = (1.0 - t) * 240.0 / 360.0;
    egui::Color32::from(egui::ecolor::Hsva::new(hue, 1.0, 1.0, 1.0))
}
