use crate::app::App;
use crate::charts::ChartLayer;
use crate::globe::{GlobeFrame, LayerKind};
use crate::story::{Focus, OverlayMode, Visibility};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Split into stage and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Stage
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_stage(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_stage(frame: &mut Frame, app: &mut App, area: Rect) {
    let state = app.state();

    // Globe fills the whole stage, dimmed behind a focused widget
    let mut view = app.view.clone();
    view.set_size(area.width as usize * 2, area.height as usize * 4);
    let globe_frame = app
        .scene
        .render(&view, area.width as usize, area.height as usize);
    frame.render_widget(
        GlobeWidget {
            frame: globe_frame,
            dimmed: state.backdrop,
        },
        area,
    );

    // Widgets on top, focused one last so it overdraws corner slots
    let mut order: Vec<usize> = (0..state.widgets.len()).collect();
    if let Some(focused) = state.focused() {
        order.retain(|&i| i != focused);
        order.push(focused);
    }

    for i in order {
        let ws = state.widgets[i];
        if ws.visibility == Visibility::Hidden && ws.focus == Focus::None {
            continue;
        }
        let Some(slot) = widget_rect(i, ws.focus, area) else {
            continue;
        };
        render_chart(frame, app, i, ws.focus, slot);
    }
}

/// Screen slot for a widget: big centered or left rect when focused,
/// a small corner slot otherwise. `None` when the terminal is too small.
fn widget_rect(index: usize, focus: Focus, area: Rect) -> Option<Rect> {
    let rect = match focus {
        Focus::Center => Rect {
            x: area.x + area.width / 6,
            y: area.y + area.height / 10,
            width: area.width * 2 / 3,
            height: area.height * 4 / 5,
        },
        Focus::Left => Rect {
            x: area.x + 1,
            y: area.y + area.height / 10,
            width: area.width / 2,
            height: area.height * 4 / 5,
        },
        Focus::None => {
            // Corner slots: first four along the bottom, rest along the top
            let slot_w = area.width / 4;
            let slot_h = (area.height / 4).max(5);
            if slot_h + 2 > area.height {
                return None;
            }
            let col = (index % 4) as u16;
            let y = if index < 4 {
                area.y + area.height - slot_h
            } else {
                area.y
            };
            Rect {
                x: area.x + col * slot_w,
                y,
                width: slot_w,
                height: slot_h,
            }
        }
    };
    (rect.width >= 8 && rect.height >= 4).then_some(rect)
}

fn render_chart(frame: &mut Frame, app: &mut App, index: usize, focus: Focus, slot: Rect) {
    let focused = focus != Focus::None;
    let title = app.story.widgets[index].title.clone();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(Span::styled(
            format!(" {title} "),
            if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ));

    let inner = block.inner(slot);
    frame.render_widget(ratatui::widgets::Clear, slot);
    frame.render_widget(block, slot);

    let layer = app.charts[index].render(inner.width as usize, inner.height as usize);
    frame.render_widget(
        ChartWidget {
            layer,
            color: if focused { Color::White } else { Color::Gray },
        },
        inner,
    );
}

/// Braille chart layer plus its text labels
struct ChartWidget {
    layer: ChartLayer,
    color: Color,
}

impl Widget for ChartWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_canvas(&self.layer.canvas, self.color, area, buf);
        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layer.labels {
            draw_label(*lx, *ly, text, label_style, area, buf);
        }
    }
}

/// The globe with its per-kind layer colors
struct GlobeWidget {
    frame: GlobeFrame,
    dimmed: bool,
}

impl GlobeWidget {
    fn color_for(&self, kind: LayerKind) -> Color {
        if self.dimmed {
            return Color::DarkGray;
        }
        match kind {
            LayerKind::Graticule => Color::DarkGray,
            LayerKind::Land => Color::Green,
            LayerKind::ScoreBand(0) => Color::Red,
            LayerKind::ScoreBand(1) => Color::Magenta,
            LayerKind::ScoreBand(2) => Color::Yellow,
            LayerKind::ScoreBand(_) => Color::LightGreen,
            LayerKind::Borders => Color::Cyan,
            LayerKind::Studies => Color::White,
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layers arrive back-to-front
        for (kind, canvas) in &self.frame.layers {
            render_canvas(canvas, self.color_for(*kind), area, buf);
        }
        let label_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.frame.labels {
            draw_label(*lx, *ly, text, label_style, area, buf);
        }
    }
}

/// Render a braille canvas with a single color, skipping blank cells
fn render_canvas(canvas: &crate::braille::BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for (row_idx, row_str) in canvas.rows().enumerate() {
        if row_idx >= area.height as usize {
            break;
        }
        let y = area.y + row_idx as u16;

        for (col_idx, ch) in row_str.chars().enumerate() {
            if col_idx >= area.width as usize {
                break;
            }
            // Skip empty braille characters (U+2800)
            if ch == '\u{2800}' {
                continue;
            }
            let x = area.x + col_idx as u16;
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }
}

fn draw_label(lx: u16, ly: u16, text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    if ly >= area.height || lx >= area.width {
        return;
    }
    let y = area.y + ly;
    let max_len = (area.width - lx) as usize;
    for (i, ch) in text.chars().take(max_len).enumerate() {
        let x = area.x + lx + i as u16;
        buf[(x, y)].set_char(ch).set_style(style);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (pos, total) = app.step_position();
    let step_id = app
        .current_step()
        .map_or("start", |s| s.id.as_str())
        .to_string();

    let overlay = match app.scene.overlay() {
        OverlayMode::None => None,
        OverlayMode::Choropleth => Some("policy map"),
        OverlayMode::Temporal => Some("timeline sweep"),
    };

    let mut spans = vec![
        Span::styled(" Step: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{pos}/{total}"), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(step_id, Style::default().fg(Color::Cyan)),
    ];

    if let Some(name) = overlay {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(name, Style::default().fg(Color::Magenta)));
    }

    if let Some((country, score)) = app.hovered_country() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            country.to_string(),
            Style::default().fg(Color::Green),
        ));
        if let Some(score) = score {
            spans.push(Span::styled(
                format!(" {score:.0}"),
                Style::default().fg(Color::Green),
            ));
        }
    }

    let (lon, lat) = app.view.center_lonlat();
    spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
        format!("{lat:.0}°, {lon:.0}°"),
        Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
        " | j/space:next k:back drag:rotate q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
