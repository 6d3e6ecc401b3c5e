use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a connected polyline through the given points
pub fn draw_polyline(canvas: &mut BrailleCanvas, points: &[(i32, i32)]) {
    for pair in points.windows(2) {
        draw_line(canvas, pair[0].0, pair[0].1, pair[1].0, pair[1].1);
    }
}

/// Draw a point marker (small cross)
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x, y + i);
    }
}

/// Draw a filled circle (markers, bubbles)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Fill an axis-aligned rectangle (bars, sankey bands)
pub fn fill_rect(canvas: &mut BrailleCanvas, x: i32, y: i32, w: i32, h: i32) {
    for py in y..y + h {
        for px in x..x + w {
            canvas.set_pixel_signed(px, py);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn test_fill_rect_covers_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        fill_rect(&mut canvas, 0, 0, 2, 4);
        assert_eq!(canvas.to_string(), "⣿");
    }

    #[test]
    fn test_polyline_connects_segments() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_polyline(&mut canvas, &[(0, 0), (4, 4), (7, 0)]);
        assert!(!canvas.is_blank());
    }
}
