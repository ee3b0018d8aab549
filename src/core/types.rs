use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Global viewport dimensions observed by the render controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Host element a chart is mounted into.
///
/// The chart only references its container; layout is owned by the host,
/// which reports the element's current rendered size in pixels.
pub trait Container {
    fn offset_width(&self) -> f64;
    fn offset_height(&self) -> f64;
}

impl fmt::Debug for dyn Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("offset_width", &self.offset_width())
            .field("offset_height", &self.offset_height())
            .finish()
    }
}

/// Headless container with host-controlled dimensions.
#[derive(Debug, Default)]
pub struct ElementBox {
    width: Cell<f64>,
    height: Cell<f64>,
}

impl ElementBox {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
        }
    }

    /// Simulates a host relayout of the element.
    pub fn resize(&self, width: f64, height: f64) {
        self.width.set(width);
        self.height.set(height);
    }
}

impl Container for ElementBox {
    fn offset_width(&self) -> f64 {
        self.width.get()
    }

    fn offset_height(&self) -> f64 {
        self.height.get()
    }
}
