use crate::braille::fill_rect;
use crate::charts::{ChartLayer, ChartRenderer};
use crate::data::PricePoint;

/// Horizontal bar chart of therapy price comparisons. Prices span five
/// orders of magnitude, so bars use a log scale. The layout is memoized
/// per canvas size and dropped by `invalidate()` when the widget's
/// container finishes its focus transition.
pub struct PriceChart {
    id: String,
    data: Vec<PricePoint>,
    cached: Option<CachedLayout>,
}

struct CachedLayout {
    width: usize,
    height: usize,
    bars: Vec<(i32, i32, i32)>, // y, bar height, bar length in px
}

impl PriceChart {
    pub fn new(id: &str, data: Vec<PricePoint>) -> Self {
        let mut data = data;
        data.sort_by(|a, b| b.price_usd.total_cmp(&a.price_usd));
        Self {
            id: id.to_string(),
            data,
            cached: None,
        }
    }

    fn compute(&self, width: usize, height: usize) -> CachedLayout {
        let pw = (width * 2) as f64;
        let ph = (height * 4) as f64;
        let n = self.data.len().max(1);
        let slot = (ph / n as f64).max(4.0) as i32;
        let bar_h = (slot - 3).clamp(1, 6);

        let max_log = self
            .data
            .iter()
            .map(|d| d.price_usd.max(1.0).log10())
            .fold(f64::MIN, f64::max)
            .max(1.0);

        let bars = self
            .data
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let len = (d.price_usd.max(1.0).log10() / max_log * (pw - 2.0)).max(1.0) as i32;
                (i as i32 * slot + 1, bar_h, len)
            })
            .collect();

        CachedLayout {
            width,
            height,
            bars,
        }
    }

    fn format_usd(price: f64) -> String {
        if price >= 1_000_000.0 {
            format!("${:.1}M", price / 1_000_000.0)
        } else if price >= 1_000.0 {
            format!("${:.0}k", price / 1_000.0)
        } else {
            format!("${price:.0}")
        }
    }
}

impl ChartRenderer for PriceChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, width: usize, height: usize) -> ChartLayer {
        if self.data.is_empty() || width < 10 || height < 3 {
            return ChartLayer::placeholder(width, height);
        }

        let stale = self
            .cached
            .as_ref()
            .is_none_or(|c| c.width != width || c.height != height);
        if stale {
            self.cached = Some(self.compute(width, height));
        }
        let layout = self.cached.as_ref().unwrap();

        let mut layer = ChartLayer::blank(width, height);
        for (d, &(y, h, len)) in self.data.iter().zip(&layout.bars) {
            fill_rect(&mut layer.canvas, 0, y, len, h);
            let text = format!(
                "{} {}",
                d.label.chars().take(14).collect::<String>(),
                Self::format_usd(d.price_usd)
            );
            let ly = (y / 4) as u16;
            if ly < height as u16 {
                layer.labels.push((1, ly, text));
            }
        }
        layer
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> Vec<PricePoint> {
        vec![
            PricePoint { label: "Casgevy".into(), price_usd: 2_200_000.0 },
            PricePoint { label: "insulin (year)".into(), price_usd: 7_200.0 },
            PricePoint { label: "aspirin".into(), price_usd: 8.0 },
        ]
    }

    #[test]
    fn test_log_scale_preserves_order() {
        let chart = PriceChart::new("price", prices());
        let layout = chart.compute(40, 12);
        assert!(layout.bars[0].2 > layout.bars[1].2);
        assert!(layout.bars[1].2 > layout.bars[2].2);
    }

    #[test]
    fn test_invalidate_drops_cache() {
        let mut chart = PriceChart::new("price", prices());
        let _ = chart.render(40, 12);
        assert!(chart.cached.is_some());
        chart.invalidate();
        assert!(chart.cached.is_none());
    }

    #[test]
    fn test_cache_rebuilt_on_resize() {
        let mut chart = PriceChart::new("price", prices());
        let _ = chart.render(40, 12);
        let _ = chart.render(20, 8);
        let cached = chart.cached.as_ref().unwrap();
        assert_eq!((cached.width, cached.height), (20, 8));
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(PriceChart::format_usd(2_200_000.0), "$2.2M");
        assert_eq!(PriceChart::format_usd(7_200.0), "$7k");
        assert_eq!(PriceChart::format_usd(8.0), "$8");
    }
}
