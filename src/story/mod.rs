mod controller;
mod step;

pub use controller::{
    ControllerState, Direction, Effect, Focus, ViewController, Visibility, WidgetState,
};
pub use step::{OverlayMode, Phase, Step, Story, WidgetDef};
