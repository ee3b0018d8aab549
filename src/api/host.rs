use std::rc::Rc;
use std::sync::Arc;

use crate::core::Container;
use crate::error::{ChartError, ChartResult};
use crate::render::{GraphicsLibrary, NullRenderer, Renderer};

use super::{ChartDirective, ChartObject, ChartTypeRegistry, DirectiveBindings, Materializer};

/// Entry point a host application builds once at load time.
#[derive(Debug, Clone)]
pub struct ChartHost {
    materializer: Materializer,
}

/// Builder for [`ChartHost`]. The graphics library is mandatory.
#[derive(Default)]
pub struct ChartHostBuilder {
    registry: Option<Arc<ChartTypeRegistry>>,
    graphics: Option<Rc<dyn GraphicsLibrary>>,
}

impl std::fmt::Debug for ChartHostBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartHostBuilder")
            .field("registry", &self.registry)
            .field("graphics", &self.graphics.as_ref().map(|graphics| graphics.name().to_owned()))
            .finish()
    }
}

impl ChartHostBuilder {
    /// Uses an isolated registry instead of the global one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ChartTypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_graphics(mut self, graphics: Rc<dyn GraphicsLibrary>) -> Self {
        self.graphics = Some(graphics);
        self
    }

    /// Fails with `MissingLibrary` when no graphics library was supplied.
    pub fn build(self) -> ChartResult<ChartHost> {
        let graphics = self.graphics.ok_or_else(|| {
            ChartError::MissingLibrary(
                "a vector-graphics library must be supplied before charts can load".to_owned(),
            )
        })?;
        let registry = self.registry.unwrap_or_else(ChartTypeRegistry::global);
        Ok(ChartHost {
            materializer: Materializer::new(registry, graphics),
        })
    }
}

impl ChartHost {
    #[must_use]
    pub fn builder() -> ChartHostBuilder {
        ChartHostBuilder::default()
    }

    #[must_use]
    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    #[must_use]
    pub fn registry(&self) -> &ChartTypeRegistry {
        self.materializer.registry()
    }

    pub fn materialize(
        &self,
        container: Rc<dyn Container>,
        identifier: &str,
    ) -> ChartResult<ChartObject> {
        self.materializer.materialize(container, identifier)
    }

    /// Attaches a headless directive.
    pub fn attach(
        &self,
        container: Rc<dyn Container>,
        identifier: &str,
        bindings: DirectiveBindings,
    ) -> ChartResult<ChartDirective<NullRenderer>> {
        self.attach_with_renderer(container, identifier, bindings, NullRenderer::default())
    }

    pub fn attach_with_renderer<R: Renderer>(
        &self,
        container: Rc<dyn Container>,
        identifier: &str,
        bindings: DirectiveBindings,
        renderer: R,
    ) -> ChartResult<ChartDirective<R>> {
        ChartDirective::attach(&self.materializer, container, identifier, bindings, renderer)
    }
}
