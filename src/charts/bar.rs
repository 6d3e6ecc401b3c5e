use crate::braille::fill_rect;
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::CategoryValue;

/// Vertical bar chart of approved therapies per category.
pub struct BloomChart {
    id: String,
    data: Vec<CategoryValue>,
}

impl BloomChart {
    pub fn new(id: &str, data: Vec<CategoryValue>) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }
}

impl ChartRenderer for BloomChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.is_empty() || width < 4 || height < 3 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as i32;
        // Bottom character row reserved for labels
        let ph = (layer.canvas.pixel_height() - 4) as i32;

        let max = self
            .data
            .iter()
            .map(|d| d.value)
            .fold(f64::MIN, f64::max)
            .max(1.0);

        let n = self.data.len() as i32;
        let slot = pw / n;
        let bar_w = (slot - 2).max(1);

        for (i, d) in self.data.iter().enumerate() {
            let h = ((d.value / max) * (ph - 1) as f64).round() as i32;
            let x = i as i32 * slot + 1;
            fill_rect(&mut layer.canvas, x, ph - h, bar_w, h.max(1));

            // Short label under the bar
            let cx = ((x + bar_w / 2) / 2).max(0) as u16;
            let short: String = d.label.chars().take((slot / 2).max(1) as usize).collect();
            layer
                .labels
                .push((cx.saturating_sub(short.len() as u16 / 2), height as u16 - 1, short));
        }

        // Scale hint in the top-left corner
        layer.labels.push((0, 0, format!("max {max:.0}")));
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<CategoryValue> {
        vec![
            CategoryValue { label: "blood".into(), value: 4.0 },
            CategoryValue { label: "eye".into(), value: 2.0 },
            CategoryValue { label: "liver".into(), value: 1.0 },
        ]
    }

    #[test]
    fn test_bars_drawn() {
        let mut chart = BloomChart::new("bloom", data());
        let layer = chart.render(30, 10);
        assert!(!layer.canvas.is_blank());
        // One label per bar plus the scale hint
        assert_eq!(layer.labels.len(), 4);
    }

    #[test]
    fn test_empty_data_renders_placeholder() {
        let mut chart = BloomChart::new("bloom", Vec::new());
        let layer = chart.render(30, 10);
        assert!(layer.canvas.is_blank());
    }
}
