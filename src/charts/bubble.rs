use crate::braille::draw_circle;
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::CategoryValue;

/// Bubble chart with a hand-rolled radial/spiral packing:
/// largest bubble in the center, the rest walk an Archimedean spiral
/// outward until they stop overlapping anything already placed.
pub struct BubbleChart {
    id: String,
    data: Vec<CategoryValue>,
}

struct Placed {
    x: f64,
    y: f64,
    r: f64,
}

impl BubbleChart {
    pub fn new(id: &str, data: Vec<CategoryValue>) -> Self {
        let mut data = data;
        data.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self {
            id: id.to_string(),
            data,
        }
    }

    /// Spiral packing in pixel space. Deterministic, no iteration budget
    /// blowups: the spiral is walked in fixed angular increments.
    fn pack(&self, pw: f64, ph: f64) -> Vec<Placed> {
        let max = self
            .data
            .iter()
            .map(|d| d.value)
            .fold(f64::MIN, f64::max)
            .max(1.0);
        let r_max = (pw.min(ph) / 5.0).max(2.0);

        let mut placed: Vec<Placed> = Vec::with_capacity(self.data.len());
        let (cx, cy) = (pw / 2.0, ph / 2.0);

        for d in &self.data {
            let r = ((d.value / max).sqrt() * r_max).max(1.5);

            if placed.is_empty() {
                placed.push(Placed { x: cx, y: cy, r });
                continue;
            }

            let mut theta: f64 = 0.0;
            let (mut x, mut y) = (cx, cy);
            while theta < 40.0 * std::f64::consts::PI {
                let clear = placed.iter().all(|p| {
                    let dx = p.x - x;
                    let dy = p.y - y;
                    (dx * dx + dy * dy).sqrt() >= p.r + r + 1.0
                });
                if clear {
                    break;
                }
                theta += 0.35;
                let dist = 1.2 * theta;
                x = cx + dist * theta.cos();
                y = cy + dist * theta.sin() * 0.55; // squash to canvas aspect
            }
            placed.push(Placed { x, y, r });
        }
        placed
    }
}

impl ChartRenderer for BubbleChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.is_empty() || width < 6 || height < 4 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as f64;
        let ph = layer.canvas.pixel_height() as f64;

        let placed = self.pack(pw, ph);
        for (d, p) in self.data.iter().zip(&placed) {
            draw_circle(
                &mut layer.canvas,
                p.x.round() as i32,
                p.y.round() as i32,
                p.r.round() as i32,
            );
            // Label only the bubbles big enough to carry one
            if p.r >= 4.0 {
                let short: String = d.label.chars().take(10).collect();
                let lx = ((p.x / 2.0) as u16).saturating_sub(short.len() as u16 / 2);
                layer.labels.push((lx, (p.y / 4.0) as u16, short));
            }
        }
        layer
    }
}
