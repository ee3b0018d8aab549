use crate::core::Container;
use crate::render::Surface;

/// Vector-graphics library the capability core draws through.
///
/// Hosts must supply one when building a `ChartHost`; materialization asks it
/// for exactly one surface per chart object.
pub trait GraphicsLibrary {
    fn name(&self) -> &str;
    fn create_surface(&self, container: &dyn Container) -> Surface;
}

/// Default library backed by the in-memory scene graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneGraphics;

impl GraphicsLibrary for SceneGraphics {
    fn name(&self) -> &str {
        "scene"
    }

    fn create_surface(&self, _container: &dyn Container) -> Surface {
        Surface::new()
    }
}
