use crate::braille::{draw_line, draw_polyline};
use crate::charts::{ChartLayer, ChartRenderer};

/// Cumulative trials-per-year area chart (the exponential growth curve).
pub struct TimelineChart {
    id: String,
    /// Per-year counts, ascending by year
    counts: Vec<(i32, u32)>,
}

impl TimelineChart {
    pub fn new(id: &str, counts: Vec<(i32, u32)>) -> Self {
        let mut counts = counts;
        counts.sort_by_key(|&(year, _)| year);
        Self {
            id: id.to_string(),
            counts,
        }
    }

    fn cumulative(&self) -> Vec<(i32, u32)> {
        let mut total = 0u32;
        self.counts
            .iter()
            .map(|&(year, n)| {
                total += n;
                (year, total)
            })
            .collect()
    }
}

impl ChartRenderer for TimelineChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.counts.len() < 2 || width < 8 || height < 4 {
            return ChartLayer::placeholder(width, height);
        }

        let mut layer = ChartLayer::blank(width, height);
        let pw = layer.canvas.pixel_width() as f64;
        let ph = (layer.canvas.pixel_height() - 4) as f64; // label row

        let series = self.cumulative();
        let (y0, y1) = (series[0].0, series[series.len() - 1].0);
        let max = series.last().map(|&(_, t)| t).unwrap_or(1).max(1) as f64;

        let points: Vec<(i32, i32)> = series
            .iter()
            .map(|&(year, total)| {
                let fx = (year - y0) as f64 / (y1 - y0).max(1) as f64;
                let fy = total as f64 / max;
                (
                    (fx * (pw - 1.0)) as i32,
                    ((1.0 - fy) * (ph - 1.0)) as i32,
                )
            })
            .collect();

        // Area fill: vertical drop lines under the curve
        for &(x, y) in &points {
            draw_line(&mut layer.canvas, x, y, x, ph as i32 - 1);
        }
        draw_polyline(&mut layer.canvas, &points);

        layer.labels.push((0, height as u16 - 1, y0.to_string()));
        let end = y1.to_string();
        layer.labels.push((
            (width as u16).saturating_sub(end.len() as u16),
            height as u16 - 1,
            end,
        ));
        layer.labels.push((0, 0, format!("{} total", max as u32)));
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumulative_is_monotonic() {
        let chart = TimelineChart::new(
            "tl",
            vec![(2004, 2), (2002, 1), (2010, 7), (2006, 3)],
        );
        let series = chart.cumulative();
        // Sorted by year, running total never decreases
        assert_eq!(series.first().unwrap().0, 2002);
        for pair in series.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        assert_eq!(series.last().unwrap().1, 13);
    }

    #[test]
    fn test_render_labels_span_years() {
        let mut chart = TimelineChart::new("tl", vec![(2002, 1), (2024, 40)]);
        let layer = chart.render(30, 10);
        let texts: Vec<&str> = layer.labels.iter().map(|(_, _, s)| s.as_str()).collect();
        assert!(texts.contains(&"2002"));
        assert!(texts.contains(&"2024"));
    }

    #[test]
    fn test_single_year_is_placeholder() {
        let mut chart = TimelineChart::new("tl", vec![(2002, 1)]);
        assert!(chart.render(30, 10).canvas.is_blank());
    }
}
