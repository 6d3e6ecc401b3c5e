use crate::braille::{draw_line, fill_rect};
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::SankeyData;

/// Sankey diagram with a manual band layout: nodes stacked per layer,
/// link thickness proportional to flow value.
pub struct SankeyChart {
    id: String,
    data: SankeyData,
}

struct NodePos {
    x: i32,
    y: i32,
    h: i32,
}

impl SankeyChart {
    pub fn new(id: &str, data: SankeyData) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }

    /// Total flow through a node (max of in/out so pass-through nodes
    /// keep a stable height)
    fn throughput(&self, node: usize) -> f64 {
        let inflow: f64 = self
            .data
            .links
            .iter()
            .filter(|l| l.target == node)
            .map(|l| l.value)
            .sum();
        let outflow: f64 = self
            .data
            .links
            .iter()
            .filter(|l| l.source == node)
            .map(|l| l.value)
            .sum();
        inflow.max(outflow)
    }

    fn layout(&self, pw: i32, ph: i32) -> Vec<NodePos> {
        let layers = self
            .data
            .nodes
            .iter()
            .map(|n| n.layer)
            .max()
            .unwrap_or(0) as i32
            + 1;
        let node_w = 4;
        let gap_x = if layers > 1 {
            (pw - node_w) / (layers - 1)
        } else {
            0
        };

        let max_throughput = (0..self.data.nodes.len())
            .map(|i| self.throughput(i))
            .fold(f64::MIN, f64::max)
            .max(1.0);

        let mut positions = Vec::with_capacity(self.data.nodes.len());
        let mut cursor_per_layer = vec![2i32; layers as usize];

        for (i, node) in self.data.nodes.iter().enumerate() {
            let h = ((self.throughput(i) / max_throughput) * (ph / 2) as f64).max(2.0) as i32;
            let layer = node.layer as usize;
            let y = cursor_per_layer[layer];
            cursor_per_layer[layer] = y + h + 4;
            positions.push(NodePos {
                x: node.layer as i32 * gap_x,
                y,
                h,
            });
        }
        positions
    }
}

impl ChartRenderer for SankeyChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.nodes.is_empty() || width < 10 || height < 5 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as i32;
        let ph = layer.canvas.pixel_height() as i32;
        let node_w = 4;

        let positions = self.layout(pw - node_w, ph);
        let max_link = self
            .data
            .links
            .iter()
            .map(|l| l.value)
            .fold(f64::MIN, f64::max)
            .max(1.0);

        // Links first so node bars overdraw their ends
        for link in &self.data.links {
            let (Some(src), Some(dst)) = (positions.get(link.source), positions.get(link.target))
            else {
                log::warn!("sankey link references missing node, skipping");
                continue;
            };
            let thickness = ((link.value / max_link) * 6.0).max(1.0) as i32;
            let x0 = src.x + node_w;
            let y0 = src.y + src.h / 2;
            let x1 = dst.x;
            let y1 = dst.y + dst.h / 2;
            for t in 0..thickness {
                draw_line(&mut layer.canvas, x0, y0 + t, x1, y1 + t);
            }
        }

        for (node, pos) in self.data.nodes.iter().zip(&positions) {
            fill_rect(&mut layer.canvas, pos.x, pos.y, node_w, pos.h);
            let short: String = node.name.chars().take(12).collect();
            let lx = (pos.x / 2) as u16;
            let ly = ((pos.y + pos.h + 2) / 4).min(height as i32 - 1) as u16;
            layer.labels.push((lx, ly, short));
        }

        layer
    }
}
