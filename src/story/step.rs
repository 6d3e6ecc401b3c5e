use crate::charts::ChartKind;

/// Where a focused widget sits on screen during a step.
/// `Text` keeps the chart on the left while narrative text takes the right.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Center,
    Left,
    Text,
}

impl Phase {
    /// Parse the `data-phase` attribute value. Unknown or absent values
    /// fall back to `Center`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("center") | None => Phase::Center,
            Some("left") => Phase::Left,
            Some("text") => Phase::Text,
            Some(other) => {
                log::warn!("unrecognized data-phase {other:?}, defaulting to center");
                Phase::Center
            }
        }
    }
}

/// Globe overlay mode. `None` shows the land particle cloud,
/// the other two are the full-bleed finale modes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OverlayMode {
    #[default]
    None,
    Choropleth,
    Temporal,
}

impl OverlayMode {
    /// Parse a finale marker value. Unknown markers get the choropleth
    /// overlay rather than failing the whole story load.
    pub fn parse_finale(raw: &str) -> Self {
        match raw {
            "choropleth" => OverlayMode::Choropleth,
            "temporal" => OverlayMode::Temporal,
            other => {
                log::warn!("unrecognized finale mode {other:?}, defaulting to choropleth");
                OverlayMode::Choropleth
            }
        }
    }
}

/// One scroll-trigger region of the story. Immutable after load.
#[derive(Clone, Debug)]
pub struct Step {
    pub id: String,
    /// Target widget id (`data-widget`), absent for narrative/spacer steps
    pub widget: Option<String>,
    /// Focus phase (`data-phase`), defaulted to center
    pub phase: Phase,
    /// Spacer steps reset everything to the rest state
    pub spacer: bool,
    /// Finale steps hand the whole stage to the globe in this overlay mode
    pub finale: Option<OverlayMode>,
}

impl Step {
    pub fn spacer(id: &str) -> Self {
        Self {
            id: id.to_string(),
            widget: None,
            phase: Phase::Center,
            spacer: true,
            finale: None,
        }
    }

    pub fn widget(id: &str, widget: &str, phase: Phase) -> Self {
        Self {
            id: id.to_string(),
            widget: Some(widget.to_string()),
            phase,
            spacer: false,
            finale: None,
        }
    }

    pub fn narrative(id: &str) -> Self {
        Self {
            id: id.to_string(),
            widget: None,
            phase: Phase::Center,
            spacer: false,
            finale: None,
        }
    }

    pub fn finale(id: &str, mode: OverlayMode) -> Self {
        Self {
            id: id.to_string(),
            widget: None,
            phase: Phase::Center,
            spacer: false,
            finale: Some(mode),
        }
    }
}

/// A chart widget declaration: one on-screen region per chart,
/// count fixed for the session.
#[derive(Clone, Debug)]
pub struct WidgetDef {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    /// Widgets whose layout must settle after the focus transition get a
    /// deferred re-layout scheduled by the controller.
    pub needs_deferred_relayout: bool,
}

/// The whole narrative: widget declarations plus the ordered step list.
#[derive(Clone, Debug)]
pub struct Story {
    pub widgets: Vec<WidgetDef>,
    pub steps: Vec<Step>,
}

impl Story {
    pub fn widget_index(&self, id: &str) -> Option<usize> {
        self.widgets.iter().position(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parse_known() {
        assert_eq!(Phase::parse(Some("center")), Phase::Center);
        assert_eq!(Phase::parse(Some("left")), Phase::Left);
        assert_eq!(Phase::parse(Some("text")), Phase::Text);
    }

    #[test]
    fn test_phase_parse_defaults_to_center() {
        assert_eq!(Phase::parse(None), Phase::Center);
        assert_eq!(Phase::parse(Some("wobble")), Phase::Center);
    }

    #[test]
    fn test_finale_mode_parse() {
        assert_eq!(OverlayMode::parse_finale("temporal"), OverlayMode::Temporal);
        assert_eq!(OverlayMode::parse_finale("choropleth"), OverlayMode::Choropleth);
        assert_eq!(OverlayMode::parse_finale("???"), OverlayMode::Choropleth);
    }
}
