use crate::braille::{draw_line, fill_rect};
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::BoxStats;

/// Box-and-whisker plot of editing outcome distributions per variant.
pub struct BoxPlotChart {
    id: String,
    data: Vec<BoxStats>,
}

impl BoxPlotChart {
    pub fn new(id: &str, data: Vec<BoxStats>) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }

    fn value_range(&self) -> (f64, f64) {
        let mut lo = f64::MAX;
        let mut hi = f64::MIN;
        for s in &self.data {
            lo = lo.min(s.min);
            hi = hi.max(s.max);
            for &o in &s.outliers {
                lo = lo.min(o);
                hi = hi.max(o);
            }
        }
        if hi <= lo {
            (lo, lo + 1.0)
        } else {
            (lo, hi)
        }
    }
}

impl ChartRenderer for BoxPlotChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.is_empty() || width < 6 || height < 4 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as i32;
        let ph = (layer.canvas.pixel_height() - 4) as i32; // label row

        let (lo, hi) = self.value_range();
        let scale = |v: f64| -> i32 { (ph - 1) - (((v - lo) / (hi - lo)) * (ph - 1) as f64) as i32 };

        let n = self.data.len() as i32;
        let slot = pw / n;
        let box_w = (slot / 2).clamp(2, 8);

        for (i, s) in self.data.iter().enumerate() {
            let cx = i as i32 * slot + slot / 2;
            let half = box_w / 2;

            // Whisker spine plus caps
            draw_line(&mut layer.canvas, cx, scale(s.min), cx, scale(s.max));
            draw_line(&mut layer.canvas, cx - half, scale(s.min), cx + half, scale(s.min));
            draw_line(&mut layer.canvas, cx - half, scale(s.max), cx + half, scale(s.max));

            // Interquartile box
            let y3 = scale(s.q3);
            let y1 = scale(s.q1);
            fill_rect(&mut layer.canvas, cx - half, y3, box_w, (y1 - y3).max(1));

            // Median tick, drawn wider than the box
            let ym = scale(s.median);
            draw_line(&mut layer.canvas, cx - half - 1, ym, cx + half + 1, ym);

            for &o in &s.outliers {
                layer.canvas.set_pixel_signed(cx, scale(o));
            }

            let short: String = s.label.chars().take((slot / 2).max(1) as usize).collect();
            layer
                .labels
                .push(((cx / 2).max(0) as u16, height as u16 - 1, short));
        }

        layer.labels.push((0, 0, format!("{hi:.1}")));
        layer
    }
}
