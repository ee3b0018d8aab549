use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::core::Container;
use crate::error::ChartResult;
use crate::render::GraphicsLibrary;

use super::{ChartObject, ChartTypeRegistry};

/// Turns a type identifier and a container into a composed chart object.
#[derive(Clone)]
pub struct Materializer {
    registry: Arc<ChartTypeRegistry>,
    graphics: Rc<dyn GraphicsLibrary>,
}

impl std::fmt::Debug for Materializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Materializer")
            .field("registry", &self.registry)
            .field("graphics", &self.graphics.name())
            .finish()
    }
}

impl Materializer {
    #[must_use]
    pub fn new(registry: Arc<ChartTypeRegistry>, graphics: Rc<dyn GraphicsLibrary>) -> Self {
        Self { registry, graphics }
    }

    #[must_use]
    pub fn registry(&self) -> &ChartTypeRegistry {
        &self.registry
    }

    /// Resolves `identifier`, constructs the chart type and runs `init` once.
    ///
    /// The chart type's defaults are captured right after construction, before
    /// redecoration gets a chance to touch the capability table.
    pub fn materialize(
        &self,
        container: Rc<dyn Container>,
        identifier: &str,
    ) -> ChartResult<ChartObject> {
        let (type_name, factory) = self.registry.resolve(identifier)?;
        let chart_type = factory();
        let defaults = chart_type.defaults();
        debug!(identifier, type_name = type_name.as_str(), "materializing chart object");
        Ok(ChartObject::init(
            type_name,
            chart_type,
            container,
            defaults,
            self.graphics.as_ref(),
        ))
    }
}
