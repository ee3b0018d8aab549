use tracing::trace;

use crate::error::ChartResult;
use crate::render::{Renderer, Surface};

/// Renderer that keeps the SVG markup of the latest surface.
#[derive(Debug, Default)]
pub struct SvgMarkupRenderer {
    last_markup: String,
    frames: usize,
}

impl SvgMarkupRenderer {
    #[must_use]
    pub fn last_markup(&self) -> &str {
        &self.last_markup
    }

    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Renderer for SvgMarkupRenderer {
    fn render(&mut self, surface: &Surface) -> ChartResult<()> {
        self.last_markup = surface.to_svg_markup();
        self.frames += 1;
        trace!(bytes = self.last_markup.len(), frame = self.frames, "svg markup rendered");
        Ok(())
    }
}
