use crate::braille::BrailleCanvas;
use glam::DVec2;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        canvas.set_pixel_signed(x, y);
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

/// Draw a closed ring of screen points.
///
/// Segments longer than `max_jump` pixels are skipped: they come from rings
/// that wrap around the antimeridian and would streak across the map.
pub fn draw_ring(canvas: &mut BrailleCanvas, ring: &[DVec2], max_jump: f64) {
    let (w, h) = canvas.pixel_size();
    let (w, h) = (w as f64, h as f64);

    for pair in ring.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (b.x - a.x).abs() > max_jump {
            continue;
        }
        // Cull segments entirely off canvas
        if a.x.max(b.x) < 0.0 || a.x.min(b.x) >= w || a.y.max(b.y) < 0.0 || a.y.min(b.y) >= h {
            continue;
        }
        draw_line(
            canvas,
            a.x.round() as i32,
            a.y.round() as i32,
            b.x.round() as i32,
            b.y.round() as i32,
        );
    }
}

/// Draw a circle outline (midpoint algorithm)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    if radius <= 0 {
        canvas.set_pixel_signed(cx, cy);
        return;
    }
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            canvas.set_pixel_signed(cx + px, cy + py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Draw a filled circle
pub fn fill_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}
