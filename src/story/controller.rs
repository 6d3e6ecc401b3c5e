//! View-state controller: the one piece of real state machinery.
//!
//! Scroll-driven step enter/exit events come in, a single explicit
//! `ControllerState` comes out, plus a list of side-effect instructions for
//! the app layer to apply (overlay switches, deferred re-layout timers,
//! globe redraws). Renderers only ever see snapshots of the state, never
//! the controller itself.

use crate::story::step::{OverlayMode, Phase, Step, WidgetDef};

/// Scroll direction that produced a step transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
}

/// Whether a widget occupies its corner slot or is faded out entirely.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Visibility {
    #[default]
    Corner,
    Hidden,
}

/// Focus slot of a widget. At most one widget is focused at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Focus {
    #[default]
    None,
    Center,
    Left,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WidgetState {
    pub visibility: Visibility,
    pub focus: Focus,
}

/// The aggregate view state. One value, mutated only through `enter`/`exit`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ControllerState {
    /// Per-widget visibility/focus, parallel to the widget registry
    pub widgets: Vec<WidgetState>,
    pub overlay: OverlayMode,
    /// Dim the globe behind a focused widget.
    /// Invariant: true iff some widget is focused.
    pub backdrop: bool,
}

impl ControllerState {
    fn rest(count: usize) -> Self {
        Self {
            widgets: vec![WidgetState::default(); count],
            overlay: OverlayMode::None,
            backdrop: false,
        }
    }

    /// Index of the focused widget, if any
    pub fn focused(&self) -> Option<usize> {
        self.widgets.iter().position(|w| w.focus != Focus::None)
    }
}

/// Side-effect instruction emitted by a transition; applied by the app
/// layer before the next event is dispatched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    SetOverlay(OverlayMode),
    RedrawGlobe,
    /// Arm the settle timer for a deferred re-layout of `widget`.
    /// The token must still be current when the timer fires.
    ScheduleRelayout { widget: usize, token: u64 },
    /// Drop any armed settle timer
    CancelRelayout,
}

struct Slot {
    id: String,
    deferred_relayout: bool,
}

pub struct ViewController {
    slots: Vec<Slot>,
    state: ControllerState,
    active_step: Option<String>,
    /// Bumped on every transition; stale relayout tokens become no-ops
    relayout_token: u64,
}

impl ViewController {
    pub fn new(widgets: &[WidgetDef]) -> Self {
        let slots = widgets
            .iter()
            .map(|w| Slot {
                id: w.id.clone(),
                deferred_relayout: w.needs_deferred_relayout,
            })
            .collect::<Vec<_>>();
        let state = ControllerState::rest(slots.len());
        Self {
            slots,
            state,
            active_step: None,
            relayout_token: 0,
        }
    }

    /// Read-only snapshot for renderers
    pub fn snapshot(&self) -> ControllerState {
        self.state.clone()
    }

    pub fn active_step(&self) -> Option<&str> {
        self.active_step.as_deref()
    }

    fn widget_index(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    /// A scheduled re-layout fires only if no transition superseded it and
    /// its widget is still focused.
    pub fn relayout_still_valid(&self, widget: usize, token: u64) -> bool {
        token == self.relayout_token
            && self
                .state
                .widgets
                .get(widget)
                .is_some_and(|w| w.focus != Focus::None)
    }

    /// Handle a step activation. Completes synchronously; the returned
    /// effects must be applied before the next event is dispatched.
    pub fn enter(&mut self, step: &Step, _direction: Direction) -> Vec<Effect> {
        self.active_step = Some(step.id.clone());
        self.relayout_token = self.relayout_token.wrapping_add(1);

        let mut effects = vec![Effect::CancelRelayout];

        if step.spacer {
            self.apply_rest(&mut effects);
            return effects;
        }

        if let Some(mode) = step.finale {
            for w in &mut self.state.widgets {
                w.visibility = Visibility::Hidden;
                w.focus = Focus::None;
            }
            self.state.overlay = mode;
            self.state.backdrop = false;
            effects.push(Effect::SetOverlay(mode));
            effects.push(Effect::RedrawGlobe);
            return effects;
        }

        // Standard narrative/widget step: particles only on the globe
        self.state.overlay = OverlayMode::None;
        effects.push(Effect::SetOverlay(OverlayMode::None));

        match step.widget.as_deref() {
            Some(id) => match self.widget_index(id) {
                Some(target) => {
                    let focus = match step.phase {
                        Phase::Center => Focus::Center,
                        Phase::Left | Phase::Text => Focus::Left,
                    };
                    for (i, w) in self.state.widgets.iter_mut().enumerate() {
                        if i == target {
                            w.visibility = Visibility::Corner;
                            w.focus = focus;
                        } else {
                            w.visibility = Visibility::Hidden;
                            w.focus = Focus::None;
                        }
                    }
                    if self.slots[target].deferred_relayout {
                        effects.push(Effect::ScheduleRelayout {
                            widget: target,
                            token: self.relayout_token,
                        });
                    }
                }
                None => {
                    // Broken step attribute: degrade to defocus-all,
                    // keep current visibility
                    log::warn!("step {:?} names unknown widget {id:?}", step.id);
                    for w in &mut self.state.widgets {
                        w.focus = Focus::None;
                    }
                }
            },
            None => {
                // Pure narrative step: everything back to corners, unfocused
                for w in &mut self.state.widgets {
                    w.visibility = Visibility::Corner;
                    w.focus = Focus::None;
                }
            }
        }

        self.enforce_backdrop();
        effects.push(Effect::RedrawGlobe);
        effects
    }

    /// Handle a step deactivation. Downward exits are no-ops (the next
    /// `enter` fully determines the new state); upward exits matter only
    /// for finale steps, which must restore widget visibility before the
    /// preceding step's `enter` fires.
    pub fn exit(&mut self, step: &Step, direction: Direction) -> Vec<Effect> {
        if direction == Direction::Down || step.finale.is_none() {
            return Vec::new();
        }

        self.active_step = None;
        self.relayout_token = self.relayout_token.wrapping_add(1);

        let mut effects = vec![Effect::CancelRelayout];
        self.apply_rest(&mut effects);
        effects
    }

    fn apply_rest(&mut self, effects: &mut Vec<Effect>) {
        self.state = ControllerState::rest(self.slots.len());
        effects.push(Effect::SetOverlay(OverlayMode::None));
        effects.push(Effect::RedrawGlobe);
    }

    fn enforce_backdrop(&mut self) {
        self.state.backdrop = self.state.widgets.iter().any(|w| w.focus != Focus::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;

    fn widget(id: &str, relayout: bool) -> WidgetDef {
        WidgetDef {
            id: id.to_string(),
            title: id.to_string(),
            kind: ChartKind::Bloom,
            needs_deferred_relayout: relayout,
        }
    }

    fn controller() -> ViewController {
        ViewController::new(&[widget("a", false), widget("b", false), widget("c", true)])
    }

    fn assert_at_most_one_focus(state: &ControllerState) {
        let focused = state
            .widgets
            .iter()
            .filter(|w| w.focus != Focus::None)
            .count();
        assert!(focused <= 1, "focus budget exceeded: {focused}");
        assert_eq!(state.backdrop, focused == 1);
    }

    #[test]
    fn test_initial_state_is_rest() {
        let ctl = controller();
        let state = ctl.snapshot();
        assert!(state.widgets.iter().all(|w| *w == WidgetState::default()));
        assert_eq!(state.overlay, OverlayMode::None);
        assert!(!state.backdrop);
    }

    #[test]
    fn test_center_focus() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s", "b", Phase::Center), Direction::Down);
        let state = ctl.snapshot();
        assert_eq!(state.widgets[1].focus, Focus::Center);
        assert_eq!(state.widgets[1].visibility, Visibility::Corner);
        assert_eq!(state.widgets[0].visibility, Visibility::Hidden);
        assert_eq!(state.widgets[2].visibility, Visibility::Hidden);
        assert!(state.backdrop);
        assert_at_most_one_focus(&state);
    }

    #[test]
    fn test_left_and_text_phases_focus_left() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s", "a", Phase::Left), Direction::Down);
        assert_eq!(ctl.snapshot().widgets[0].focus, Focus::Left);
        ctl.enter(&Step::widget("s2", "a", Phase::Text), Direction::Down);
        assert_eq!(ctl.snapshot().widgets[0].focus, Focus::Left);
    }

    #[test]
    fn test_duplicate_enter_is_idempotent() {
        let mut ctl = controller();
        let step = Step::widget("s", "a", Phase::Center);
        ctl.enter(&step, Direction::Down);
        let first = ctl.snapshot();
        ctl.enter(&step, Direction::Down);
        assert_eq!(first, ctl.snapshot());
    }

    #[test]
    fn test_spacer_resets_from_any_state() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        ctl.enter(&Step::finale("s2", OverlayMode::Temporal), Direction::Down);
        ctl.enter(&Step::spacer("s3"), Direction::Down);
        assert_eq!(ctl.snapshot(), ControllerState::rest(3));
    }

    #[test]
    fn test_finale_hides_all_widgets() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        let fx = ctl.enter(&Step::finale("s2", OverlayMode::Choropleth), Direction::Down);
        let state = ctl.snapshot();
        assert!(state
            .widgets
            .iter()
            .all(|w| w.visibility == Visibility::Hidden && w.focus == Focus::None));
        assert_eq!(state.overlay, OverlayMode::Choropleth);
        assert!(!state.backdrop);
        assert!(fx.contains(&Effect::SetOverlay(OverlayMode::Choropleth)));
    }

    #[test]
    fn test_up_exit_from_finale_restores_visibility() {
        let mut ctl = controller();
        let finale = Step::finale("end", OverlayMode::Temporal);
        ctl.enter(&finale, Direction::Down);
        ctl.exit(&finale, Direction::Up);
        let state = ctl.snapshot();
        assert!(state
            .widgets
            .iter()
            .all(|w| w.visibility == Visibility::Corner));
        assert_eq!(state.overlay, OverlayMode::None);
    }

    #[test]
    fn test_down_exit_is_noop() {
        let mut ctl = controller();
        let step = Step::widget("s", "a", Phase::Center);
        ctl.enter(&step, Direction::Down);
        let before = ctl.snapshot();
        let fx = ctl.exit(&step, Direction::Down);
        assert!(fx.is_empty());
        assert_eq!(before, ctl.snapshot());
    }

    #[test]
    fn test_up_exit_from_normal_step_is_noop() {
        let mut ctl = controller();
        let step = Step::widget("s", "a", Phase::Center);
        ctl.enter(&step, Direction::Down);
        let before = ctl.snapshot();
        let fx = ctl.exit(&step, Direction::Up);
        assert!(fx.is_empty());
        assert_eq!(before, ctl.snapshot());
    }

    #[test]
    fn test_unknown_widget_defocuses_without_panic() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        ctl.enter(&Step::widget("s2", "unknown-id", Phase::Center), Direction::Down);
        let state = ctl.snapshot();
        assert!(state.widgets.iter().all(|w| w.focus == Focus::None));
        assert!(!state.backdrop);
        // Visibility is left as the previous step set it
        assert_eq!(state.widgets[0].visibility, Visibility::Corner);
        assert_eq!(state.widgets[1].visibility, Visibility::Hidden);
    }

    #[test]
    fn test_narrative_step_restores_corners() {
        let mut ctl = controller();
        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        ctl.enter(&Step::narrative("s2"), Direction::Down);
        let state = ctl.snapshot();
        assert!(state
            .widgets
            .iter()
            .all(|w| w.visibility == Visibility::Corner && w.focus == Focus::None));
        assert!(!state.backdrop);
    }

    #[test]
    fn test_scenario_round_trip_matches_spacer_state() {
        // S0(spacer) S1(A center) S2(A left) S3(finale), then back up out
        // of the finale: must equal the state after Enter(S0) alone.
        let mut ctl = controller();
        ctl.enter(&Step::spacer("s0"), Direction::Down);
        let rest = ctl.snapshot();

        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        ctl.enter(&Step::widget("s2", "a", Phase::Left), Direction::Down);
        let finale = Step::finale("s3", OverlayMode::Temporal);
        ctl.enter(&finale, Direction::Down);
        ctl.exit(&finale, Direction::Up);

        assert_eq!(ctl.snapshot(), rest);
    }

    #[test]
    fn test_focus_invariant_over_event_soup() {
        let steps = [
            Step::spacer("s0"),
            Step::widget("s1", "a", Phase::Center),
            Step::widget("s2", "b", Phase::Left),
            Step::narrative("s3"),
            Step::widget("s4", "missing", Phase::Center),
            Step::finale("s5", OverlayMode::Choropleth),
            Step::widget("s6", "c", Phase::Text),
            Step::finale("s7", OverlayMode::Temporal),
        ];
        let mut ctl = controller();
        for (i, step) in steps.iter().enumerate() {
            ctl.enter(step, Direction::Down);
            assert_at_most_one_focus(&ctl.snapshot());
            let dir = if i % 2 == 0 { Direction::Up } else { Direction::Down };
            ctl.exit(step, dir);
            assert_at_most_one_focus(&ctl.snapshot());
        }
    }

    #[test]
    fn test_relayout_scheduled_for_capable_widget_only() {
        let mut ctl = controller();
        let fx = ctl.enter(&Step::widget("s", "a", Phase::Center), Direction::Down);
        assert!(!fx
            .iter()
            .any(|e| matches!(e, Effect::ScheduleRelayout { .. })));

        let fx = ctl.enter(&Step::widget("s2", "c", Phase::Center), Direction::Down);
        let scheduled = fx.iter().find_map(|e| match e {
            Effect::ScheduleRelayout { widget, token } => Some((*widget, *token)),
            _ => None,
        });
        let (widget, token) = scheduled.expect("relayout should be scheduled for c");
        assert_eq!(widget, 2);
        assert!(ctl.relayout_still_valid(widget, token));
    }

    #[test]
    fn test_stale_relayout_token_rejected_after_supersede() {
        let mut ctl = controller();
        let fx = ctl.enter(&Step::widget("s", "c", Phase::Center), Direction::Down);
        let (widget, token) = fx
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleRelayout { widget, token } => Some((*widget, *token)),
                _ => None,
            })
            .unwrap();

        // Rapid scroll past: another enter supersedes the pending settle timer
        ctl.enter(&Step::widget("s2", "a", Phase::Center), Direction::Down);
        assert!(!ctl.relayout_still_valid(widget, token));
    }

    #[test]
    fn test_active_step_tracking() {
        let mut ctl = controller();
        assert_eq!(ctl.active_step(), None);
        ctl.enter(&Step::widget("s1", "a", Phase::Center), Direction::Down);
        assert_eq!(ctl.active_step(), Some("s1"));
        let finale = Step::finale("end", OverlayMode::Temporal);
        ctl.enter(&finale, Direction::Down);
        ctl.exit(&finale, Direction::Up);
        assert_eq!(ctl.active_step(), None);
    }
}
