use crate::error::ChartResult;
use crate::render::{Renderer, Surface};

/// No-op renderer used by tests and headless hosts.
///
/// It records what it was handed so tests can observe render cycles.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub last_node_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, surface: &Surface) -> ChartResult<()> {
        self.render_count += 1;
        self.last_node_count = surface.node_count();
        Ok(())
    }
}
