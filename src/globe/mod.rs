mod particles;
mod scene;
mod view;

pub use particles::{build_land_particles, Particle};
pub use scene::{Country, GlobeFrame, GlobeScene, LayerKind, Ring};
pub use view::GlobeView;
