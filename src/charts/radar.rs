use crate::braille::{draw_line, draw_polyline};
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::RadarAxis;

const LEVELS: usize = 4;
const MAX_VALUE: f64 = 100.0;

/// Radar chart: ring grid plus one value polygon over the axes.
pub struct RadarChart {
    id: String,
    data: Vec<RadarAxis>,
}

impl RadarChart {
    pub fn new(id: &str, data: Vec<RadarAxis>) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }

    fn vertex(cx: f64, cy: f64, r: f64, i: usize, n: usize) -> (i32, i32) {
        let angle = (i as f64 / n as f64) * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2;
        (
            (cx + r * angle.cos()).round() as i32,
            // Braille pixels are taller than wide; flatten vertically
            (cy + r * angle.sin() * 0.85).round() as i32,
        )
    }
}

impl ChartRenderer for RadarChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        let n = self.data.len();
        if n < 3 || width < 8 || height < 5 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as f64;
        let ph = layer.canvas.pixel_height() as f64;
        let (cx, cy) = (pw / 2.0, ph / 2.0);
        let radius = (pw.min(ph) / 2.0 - 2.0).max(4.0);

        // Ring grid
        for level in 1..=LEVELS {
            let r = radius * level as f64 / LEVELS as f64;
            let mut ring: Vec<(i32, i32)> = (0..=n).map(|i| Self::vertex(cx, cy, r, i % n, n)).collect();
            ring.push(ring[0]);
            draw_polyline(&mut layer.canvas, &ring);
        }

        // Axis spokes and end labels
        for (i, axis) in self.data.iter().enumerate() {
            let (ex, ey) = Self::vertex(cx, cy, radius, i, n);
            draw_line(&mut layer.canvas, cx as i32, cy as i32, ex, ey);

            let short: String = axis.axis.chars().take(8).collect();
            let lx = ((ex / 2).max(0) as u16).min(width.saturating_sub(short.len()) as u16);
            layer.labels.push((lx, ((ey / 4).max(0) as u16).min(height as u16 - 1), short));
        }

        // Value polygon
        let mut poly: Vec<(i32, i32)> = self
            .data
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let r = radius * (a.value / MAX_VALUE).clamp(0.0, 1.0);
                Self::vertex(cx, cy, r, i, n)
            })
            .collect();
        poly.push(poly[0]);
        draw_polyline(&mut layer.canvas, &poly);

        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<RadarAxis> {
        ["off-target", "mosaicism", "immunity", "germline", "access"]
            .iter()
            .enumerate()
            .map(|(i, a)| RadarAxis {
                axis: a.to_string(),
                value: 20.0 * (i + 1) as f64,
            })
            .collect()
    }

    #[test]
    fn test_render_with_axes() {
        let mut chart = RadarChart::new("radar", axes());
        let layer = chart.render(30, 14);
        assert!(!layer.canvas.is_blank());
        assert_eq!(layer.labels.len(), 5);
    }

    #[test]
    fn test_too_few_axes_is_placeholder() {
        let mut chart = RadarChart::new("radar", axes().into_iter().take(2).collect());
        assert!(chart.render(30, 14).canvas.is_blank());
    }

    #[test]
    fn test_vertex_top_at_zero() {
        // Axis 0 points straight up
        let (x, y) = RadarChart::vertex(50.0, 50.0, 10.0, 0, 4);
        assert_eq!(x, 50);
        assert!(y < 50);
    }
}
