mod graphics;
mod null_renderer;
mod surface;
mod svg_markup;

pub use graphics::{GraphicsLibrary, SceneGraphics};
pub use null_renderer::NullRenderer;
pub use surface::{Node, NodeId, Selection, Surface, Transition};
pub use svg_markup::SvgMarkupRenderer;

use crate::error::ChartResult;

/// Contract implemented by any presentation backend.
///
/// Backends receive the chart's surface after every render cycle, including
/// cycles that only cleared it, so presentation stays in sync with the scene.
pub trait Renderer {
    fn render(&mut self, surface: &Surface) -> ChartResult<()>;
}
