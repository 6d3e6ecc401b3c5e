use std::time::{Duration, Instant};

use crate::charts::{build_renderers, ChartRenderer};
use crate::data::LoadedWorld;
use crate::globe::{build_land_particles, GlobeScene, GlobeView};
use crate::story::{ControllerState, Direction, Effect, Step, Story, ViewController};

/// How long a focus transition gets to settle before a deferred
/// re-layout fires
const RELAYOUT_SETTLE: Duration = Duration::from_millis(1200);
/// Land particle sampling step in degrees
const PARTICLE_STEP_DEG: f64 = 2.0;

struct PendingRelayout {
    widget: usize,
    token: u64,
    due: Instant,
}

/// Application state: the story, its controller, the globe, and the
/// chart renderers. Event handlers mutate it, `ui::render` reads it.
pub struct App {
    pub story: Story,
    pub controller: ViewController,
    pub view: GlobeView,
    pub scene: GlobeScene,
    pub charts: Vec<Box<dyn ChartRenderer>>,
    /// Index into `story.steps`; `None` before the first advance
    cursor: Option<usize>,
    pending_relayout: Option<PendingRelayout>,
    last_tick: Instant,
    /// Character cell of the last mouse event, for drag deltas and hover
    pub last_mouse: Option<(u16, u16)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(world: LoadedWorld, width: usize, height: usize) -> Self {
        let LoadedWorld {
            story,
            datasets,
            countries,
            scores,
        } = world;

        let controller = ViewController::new(&story.widgets);
        let charts = build_renderers(&story.widgets, &datasets);

        let view = GlobeView::new(0.0, 20.0, width * 2, height * 4);
        let mut scene = GlobeScene::new(countries, scores, datasets.studies.clone());
        scene.set_particles(build_land_particles(&scene.countries, PARTICLE_STEP_DEG));

        Self {
            story,
            controller,
            view,
            scene,
            charts,
            cursor: None,
            pending_relayout: None,
            last_tick: Instant::now(),
            last_mouse: None,
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn state(&self) -> ControllerState {
        self.controller.snapshot()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.story.steps.get(self.cursor?)
    }

    pub fn step_position(&self) -> (usize, usize) {
        (
            self.cursor.map_or(0, |c| c + 1),
            self.story.steps.len(),
        )
    }

    /// Advance to the next step: exit the current one downward, then
    /// enter the next. Parked at the last step.
    pub fn step_down(&mut self) {
        let next = match self.cursor {
            None => 0,
            Some(c) if c + 1 < self.story.steps.len() => c + 1,
            Some(_) => return,
        };
        if let Some(cur) = self.cursor {
            let step = self.story.steps[cur].clone();
            let fx = self.controller.exit(&step, Direction::Down);
            self.apply_effects(fx);
        }
        self.cursor = Some(next);
        let step = self.story.steps[next].clone();
        let fx = self.controller.enter(&step, Direction::Down);
        self.apply_effects(fx);
    }

    /// Go back one step: exit the current one upward (finales restore
    /// the rest state here), then enter the previous. Parked at the top.
    pub fn step_up(&mut self) {
        let Some(cur) = self.cursor else {
            return;
        };
        let step = self.story.steps[cur].clone();
        let fx = self.controller.exit(&step, Direction::Up);
        self.apply_effects(fx);

        if cur == 0 {
            return;
        }
        self.cursor = Some(cur - 1);
        let step = self.story.steps[cur - 1].clone();
        let fx = self.controller.enter(&step, Direction::Up);
        self.apply_effects(fx);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetOverlay(mode) => self.scene.set_overlay(mode),
                // The globe is redrawn every frame; nothing cached to drop
                Effect::RedrawGlobe => {}
                Effect::ScheduleRelayout { widget, token } => {
                    self.pending_relayout = Some(PendingRelayout {
                        widget,
                        token,
                        due: Instant::now() + RELAYOUT_SETTLE,
                    });
                }
                Effect::CancelRelayout => self.pending_relayout = None,
            }
        }
    }

    /// Per-frame update: globe rotation, overlay animation, and the
    /// deferred re-layout settle timer.
    pub fn tick(&mut self, now: Instant) {
        let dt_ms = now.duration_since(self.last_tick).as_secs_f64() * 1000.0;
        self.last_tick = now;
        self.view.advance(dt_ms.min(100.0));
        self.scene.tick();

        if let Some(pending) = &self.pending_relayout {
            if pending.due <= now {
                let (widget, token) = (pending.widget, pending.token);
                self.pending_relayout = None;
                if self.controller.relayout_still_valid(widget, token) {
                    if let Some(chart) = self.charts.get_mut(widget) {
                        chart.invalidate();
                    }
                } else {
                    log::debug!("stale re-layout for widget {widget} dropped");
                }
            }
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        if !self.view.dragging {
            self.last_mouse = Some((col, row));
        }
    }

    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.view.begin_drag();
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((lx, ly)) = self.last_mouse {
            let dx = (col as i32 - lx as i32) * 2;
            let dy = (row as i32 - ly as i32) * 4;
            self.view.rotate_drag(dx, dy);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.view.end_drag();
    }

    /// Country and score under the mouse, for the status bar readout
    pub fn hovered_country(&self) -> Option<(&str, Option<f64>)> {
        let (col, row) = self.last_mouse?;
        self.scene
            .country_at(&self.view, col as i32 * 2, row as i32 * 4)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.view.set_size(width * 2, height * 4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{builtin_datasets, builtin_scores, builtin_story, builtin_world};
    use crate::story::{Focus, OverlayMode, Visibility};

    fn app() -> App {
        let world = LoadedWorld {
            story: builtin_story(),
            datasets: builtin_datasets(),
            countries: builtin_world(),
            scores: builtin_scores(),
        };
        App::new(world, 80, 24)
    }

    fn advance_to(app: &mut App, step_id: &str) {
        for _ in 0..app.story.steps.len() {
            app.step_down();
            if app.current_step().map(|s| s.id.as_str()) == Some(step_id) {
                return;
            }
        }
        panic!("step {step_id} not reached");
    }

    #[test]
    fn test_first_step_down_enters_step_zero() {
        let mut app = app();
        app.step_down();
        assert_eq!(app.current_step().unwrap().id, app.story.steps[0].id);
    }

    #[test]
    fn test_step_down_parks_at_end() {
        let mut app = app();
        for _ in 0..app.story.steps.len() + 5 {
            app.step_down();
        }
        let (pos, total) = app.step_position();
        assert_eq!(pos, total);
        // Last builtin step is the temporal finale
        assert_eq!(app.scene.overlay(), OverlayMode::Temporal);
    }

    #[test]
    fn test_step_up_at_top_is_noop() {
        let mut app = app();
        app.step_up();
        assert_eq!(app.step_position().0, 0);
        app.step_down();
        app.step_up();
        assert_eq!(app.step_position().0, 1);
    }

    #[test]
    fn test_finale_overlay_applied_to_scene() {
        let mut app = app();
        advance_to(&mut app, "final-countries");
        assert_eq!(app.scene.overlay(), OverlayMode::Choropleth);
        let state = app.state();
        assert!(state
            .widgets
            .iter()
            .all(|w| w.visibility == Visibility::Hidden));
    }

    #[test]
    fn test_step_up_out_of_finale_restores_widgets() {
        let mut app = app();
        advance_to(&mut app, "final-countries");
        app.step_up();
        assert_eq!(app.scene.overlay(), OverlayMode::None);
        let state = app.state();
        assert!(state
            .widgets
            .iter()
            .all(|w| w.visibility == Visibility::Corner));
    }

    #[test]
    fn test_relayout_fires_after_settle() {
        let mut app = app();
        advance_to(&mut app, "price-center");
        assert!(app.pending_relayout.is_some());
        // Before the settle window nothing fires
        app.tick(Instant::now());
        assert!(app.pending_relayout.is_some());
        // After it the timer fires and disarms
        app.tick(Instant::now() + RELAYOUT_SETTLE + Duration::from_millis(10));
        assert!(app.pending_relayout.is_none());
    }

    #[test]
    fn test_relayout_cancelled_by_next_step() {
        let mut app = app();
        advance_to(&mut app, "price-center");
        assert!(app.pending_relayout.is_some());
        app.step_down(); // price-text, same widget, new token
        app.step_down(); // spacer
        assert!(app.pending_relayout.is_none());
    }

    #[test]
    fn test_focused_widget_matches_step() {
        let mut app = app();
        advance_to(&mut app, "radar-center");
        let state = app.state();
        let idx = app.story.widget_index("damage-radar").unwrap();
        assert_eq!(state.widgets[idx].focus, Focus::Center);
        assert_eq!(state.focused(), Some(idx));
        assert!(state.backdrop);
    }

    #[test]
    fn test_drag_updates_orientation() {
        let mut app = app();
        let before = app.view.center_lonlat();
        app.begin_drag(10, 10);
        app.handle_drag(20, 10);
        app.end_drag();
        let after = app.view.center_lonlat();
        assert!((before.0 - after.0).abs() > 1e-9);
    }
}
