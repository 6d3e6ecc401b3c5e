//! Chart renderers, one per visualization type. Each takes character-cell
//! dimensions and produces a braille layer plus text labels; drawing is
//! idempotent and stateless apart from memoized layout caches.

mod bar;
mod boxplot;
mod bubble;
mod network;
mod price;
mod radar;
mod sankey;
mod timeline;

pub use bar::BloomChart;
pub use boxplot::BoxPlotChart;
pub use bubble::BubbleChart;
pub use network::NetworkChart;
pub use price::PriceChart;
pub use radar::RadarChart;
pub use sankey::SankeyChart;
pub use timeline::TimelineChart;

use crate::braille::BrailleCanvas;
use crate::data::Datasets;
use crate::story::WidgetDef;

/// Which renderer a widget declaration binds to
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChartKind {
    Bloom,
    BoxPlot,
    Bubble,
    Radar,
    Sankey,
    Timeline,
    Network,
    Price,
}

impl ChartKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bloom" | "bar" => Some(ChartKind::Bloom),
            "boxplot" => Some(ChartKind::BoxPlot),
            "bubble" => Some(ChartKind::Bubble),
            "radar" => Some(ChartKind::Radar),
            "sankey" => Some(ChartKind::Sankey),
            "timeline" => Some(ChartKind::Timeline),
            "network" => Some(ChartKind::Network),
            "price" => Some(ChartKind::Price),
            _ => None,
        }
    }
}

/// Output of one render call: a braille canvas plus text labels
/// in character coordinates relative to the widget's inner area.
pub struct ChartLayer {
    pub canvas: BrailleCanvas,
    pub labels: Vec<(u16, u16, String)>,
}

impl ChartLayer {
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            canvas: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        }
    }

    /// Placeholder for widgets whose dataset failed to load
    pub fn placeholder(width: usize, height: usize) -> Self {
        let mut layer = Self::blank(width, height);
        let y = (height / 2) as u16;
        layer.labels.push((1, y, "no data".to_string()));
        layer
    }
}

pub trait ChartRenderer {
    fn id(&self) -> &str;

    /// Clear and redraw at the given character dimensions
    fn render(&mut self, width: usize, height: usize) -> ChartLayer;

    /// Drop any memoized layout (deferred re-layout after a focus settle)
    fn invalidate(&mut self) {}
}

/// Bind each widget declaration to a renderer over the loaded datasets.
/// Order is parallel to the widget registry.
pub fn build_renderers(widgets: &[WidgetDef], data: &Datasets) -> Vec<Box<dyn ChartRenderer>> {
    widgets
        .iter()
        .map(|w| -> Box<dyn ChartRenderer> {
            match w.kind {
                ChartKind::Bloom => Box::new(BloomChart::new(&w.id, data.approvals.clone())),
                ChartKind::BoxPlot => {
                    Box::new(BoxPlotChart::new(&w.id, data.edit_outcomes.clone()))
                }
                ChartKind::Bubble => Box::new(BubbleChart::new(&w.id, data.trials.clone())),
                ChartKind::Radar => Box::new(RadarChart::new(&w.id, data.damage_axes.clone())),
                ChartKind::Sankey => Box::new(SankeyChart::new(&w.id, data.sankey.clone())),
                ChartKind::Timeline => {
                    Box::new(TimelineChart::new(&w.id, data.year_counts.clone()))
                }
                ChartKind::Network => Box::new(NetworkChart::new(&w.id, data.network.clone())),
                ChartKind::Price => Box::new(PriceChart::new(&w.id, data.prices.clone())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ChartKind::parse("bar"), Some(ChartKind::Bloom));
        assert_eq!(ChartKind::parse("sankey"), Some(ChartKind::Sankey));
        assert_eq!(ChartKind::parse("pie"), None);
    }

    #[test]
    fn test_placeholder_has_label() {
        let layer = ChartLayer::placeholder(10, 4);
        assert!(layer.canvas.is_blank());
        assert_eq!(layer.labels.len(), 1);
    }
}
