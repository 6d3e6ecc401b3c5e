use crate::braille::{draw_circle, draw_line};
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::NetworkData;
use crate::hash::{hash2, rand_simple};

const ITERATIONS: usize = 150;
const REPULSION: f64 = 0.12;
const SPRING: f64 = 0.04;
const GRAVITY: f64 = 0.015;

/// Force-directed interaction network. Layout is computed once per
/// dataset in unit space and rescaled to whatever canvas size is asked
/// for; seeding goes through the splitmix helper so two runs agree.
pub struct NetworkChart {
    id: String,
    data: NetworkData,
    layout: Option<Vec<(f64, f64)>>,
}

impl NetworkChart {
    pub fn new(id: &str, data: NetworkData) -> Self {
        Self {
            id: id.to_string(),
            data,
            layout: None,
        }
    }

    fn solve(&self) -> Vec<(f64, f64)> {
        let n = self.data.nodes.len();
        let mut pos: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                (
                    rand_simple(hash2(i as u64, 0xC0FFEE)) - 0.5,
                    rand_simple(hash2(i as u64, 0xBEEF)) - 0.5,
                )
            })
            .collect();

        for _ in 0..ITERATIONS {
            let mut force = vec![(0.0f64, 0.0f64); n];

            // Pairwise repulsion
            for i in 0..n {
                for j in i + 1..n {
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let d2 = (dx * dx + dy * dy).max(1e-4);
                    let f = REPULSION / d2;
                    let d = d2.sqrt();
                    force[i].0 += f * dx / d;
                    force[i].1 += f * dy / d;
                    force[j].0 -= f * dx / d;
                    force[j].1 -= f * dy / d;
                }
            }

            // Springs along links
            for &(a, b) in &self.data.links {
                if a >= n || b >= n {
                    continue;
                }
                let dx = pos[b].0 - pos[a].0;
                let dy = pos[b].1 - pos[a].1;
                force[a].0 += SPRING * dx;
                force[a].1 += SPRING * dy;
                force[b].0 -= SPRING * dx;
                force[b].1 -= SPRING * dy;
            }

            // Gravity toward the origin keeps disconnected nodes on screen
            for i in 0..n {
                force[i].0 -= GRAVITY * pos[i].0;
                force[i].1 -= GRAVITY * pos[i].1;
                pos[i].0 += force[i].0.clamp(-0.05, 0.05);
                pos[i].1 += force[i].1.clamp(-0.05, 0.05);
            }
        }
        pos
    }

    /// Rescale unit-space layout into pixel space with a small margin
    fn to_pixels(layout: &[(f64, f64)], pw: f64, ph: f64) -> Vec<(i32, i32)> {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(x, y) in layout {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let sx = (max_x - min_x).max(1e-6);
        let sy = (max_y - min_y).max(1e-6);
        layout
            .iter()
            .map(|&(x, y)| {
                (
                    (3.0 + (x - min_x) / sx * (pw - 7.0)) as i32,
                    (3.0 + (y - min_y) / sy * (ph - 7.0)) as i32,
                )
            })
            .collect()
    }
}

impl ChartRenderer for NetworkChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.nodes.is_empty() || width < 8 || height < 4 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as f64;
        let ph = layer.canvas.pixel_height() as f64;

        if self.layout.is_none() {
            self.layout = Some(self.solve());
        }
        let layout = self.layout.as_ref().unwrap().clone();
        let pixels = Self::to_pixels(&layout, pw, ph);

        for &(a, b) in &self.data.links {
            if let (Some(&(x0, y0)), Some(&(x1, y1))) = (pixels.get(a), pixels.get(b)) {
                draw_line(&mut layer.canvas, x0, y0, x1, y1);
            }
        }

        for (node, &(x, y)) in self.data.nodes.iter().zip(&pixels) {
            let r = if node.group == 0 { 3 } else { 2 };
            draw_circle(&mut layer.canvas, x, y, r);
            // Hub nodes get labels, leaves stay bare
            if node.group == 0 {
                let short: String = node.name.chars().take(10).collect();
                layer
                    .labels
                    .push(((x / 2 + 2) as u16, (y / 4) as u16, short));
            }
        }
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NetworkNode;

    fn net() -> NetworkData {
        NetworkData {
            nodes: vec![
                NetworkNode { name: "Cas9".into(), group: 0 },
                NetworkNode { name: "sgRNA".into(), group: 1 },
                NetworkNode { name: "PAM".into(), group: 1 },
                NetworkNode { name: "donor DNA".into(), group: 2 },
            ],
            links: vec![(0, 1), (0, 2), (1, 3)],
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = NetworkChart::new("net", net()).solve();
        let b = NetworkChart::new("net", net()).solve();
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(&b) {
            assert_eq!(p.0.to_bits(), q.0.to_bits());
            assert_eq!(p.1.to_bits(), q.1.to_bits());
        }
    }

    #[test]
    fn test_nodes_separated() {
        let layout = NetworkChart::new("net", net()).solve();
        for i in 0..layout.len() {
            for j in i + 1..layout.len() {
                let dx = layout[i].0 - layout[j].0;
                let dy = layout[i].1 - layout[j].1;
                assert!(dx * dx + dy * dy > 1e-6, "nodes {i},{j} collapsed");
            }
        }
    }

    #[test]
    fn test_render_caches_layout() {
        let mut chart = NetworkChart::new("net", net());
        let _ = chart.render(30, 12);
        assert!(chart.layout.is_some());
    }
}
