use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::core::{
    BoundArg, Config, Container, DataFormat, Dataset, Datum, Keys, LoadedData, OptionMap, Props,
    Scale, ScaleArg,
};
use crate::error::ChartResult;
use crate::extensions::ChartType;
use crate::render::{GraphicsLibrary, Surface};

use super::{Capability, CapabilitySet};

/// Selector removing every child of the drawing surface.
pub const RESET_ALL: &str = "*";

/// Instance state of a materialized chart plus its capability table.
///
/// Every capability method dispatches through the table, so a chart type's
/// redecorated operations are seen by the shared ones that call them.
#[derive(Debug)]
pub struct ChartState {
    core: Rc<dyn Container>,
    config: Config,
    svg: Surface,
    data: Vec<Datum>,
    data_format: Option<DataFormat>,
    data_max: f64,
    capabilities: CapabilitySet,
}

impl ChartState {
    #[must_use]
    pub fn core(&self) -> &dyn Container {
        self.core.as_ref()
    }

    #[must_use]
    pub fn core_handle(&self) -> Rc<dyn Container> {
        Rc::clone(&self.core)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration is expected to be read-only once the pipeline has run.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn svg(&self) -> &Surface {
        &self.svg
    }

    pub fn svg_mut(&mut self) -> &mut Surface {
        &mut self.svg
    }

    #[must_use]
    pub fn data(&self) -> &[Datum] {
        &self.data
    }

    #[must_use]
    pub fn data_format(&self) -> Option<DataFormat> {
        self.data_format
    }

    #[must_use]
    pub fn data_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Replaces the loaded dataset and its summary in one step.
    pub fn assign_data(&mut self, loaded: LoadedData) {
        self.data = loaded.data;
        self.data_format = Some(loaded.format);
        self.data_max = loaded.max;
    }

    pub fn load_options(&mut self, source: &OptionMap) {
        let op = Rc::clone(&self.capabilities.load_options);
        op(self, source);
    }

    /// Removes every child of the drawing surface.
    pub fn svg_reset(&mut self) {
        self.svg_reset_matching(RESET_ALL);
    }

    pub fn svg_reset_matching(&mut self, selector: &str) {
        let op = Rc::clone(&self.capabilities.svg_reset);
        op(self, selector);
    }

    pub fn load_data(&mut self, dataset: &Dataset) -> ChartResult<()> {
        let op = Rc::clone(&self.capabilities.load_data);
        op(self, dataset)
    }

    pub fn validate_props(
        &self,
        props: Option<&Props>,
        required: impl Into<Keys>,
    ) -> ChartResult<bool> {
        self.dispatch_validate_props(props, &required.into())
    }

    pub fn filter_props(
        &self,
        props: Option<&Props>,
        required: impl Into<Keys>,
        optional: impl Into<Keys>,
    ) -> ChartResult<Props> {
        self.dispatch_filter_props(props, &required.into(), &optional.into())
    }

    /// `Ok(None)` means a required key was missing; callers report their own error.
    pub fn validate_and_filter_props(
        &self,
        props: Option<&Props>,
        required: impl Into<Keys>,
        optional: impl Into<Keys>,
    ) -> ChartResult<Option<Props>> {
        (self.capabilities.validate_and_filter_props)(
            self,
            props,
            &required.into(),
            &optional.into(),
        )
    }

    pub(crate) fn dispatch_validate_props(
        &self,
        props: Option<&Props>,
        required: &Keys,
    ) -> ChartResult<bool> {
        (self.capabilities.validate_props)(self, props, required)
    }

    pub(crate) fn dispatch_filter_props(
        &self,
        props: Option<&Props>,
        required: &Keys,
        optional: &Keys,
    ) -> ChartResult<Props> {
        (self.capabilities.filter_props)(self, props, required, optional)
    }

    #[must_use]
    pub fn get_width(&self, element: &dyn Container) -> f64 {
        (self.capabilities.get_width)(self, element)
    }

    #[must_use]
    pub fn get_height(&self, element: &dyn Container) -> f64 {
        (self.capabilities.get_height)(self, element)
    }

    /// Effective drawing width; chart types redecorate this to reserve space.
    #[must_use]
    pub fn core_width(&self) -> f64 {
        (self.capabilities.core_width)(self)
    }

    #[must_use]
    pub fn core_height(&self) -> f64 {
        (self.capabilities.core_height)(self)
    }

    pub fn set_scale(
        &self,
        first: impl Into<ScaleArg>,
        second: impl Into<ScaleArg>,
        third: impl Into<ScaleArg>,
    ) -> ChartResult<Scale> {
        (self.capabilities.set_scale)(self, first.into(), second.into(), third.into())
    }

    pub fn set_domain<'a>(
        &self,
        min: impl Into<BoundArg<'a>>,
        max: impl Into<BoundArg<'a>>,
        scale: impl Into<BoundArg<'a>>,
    ) -> ChartResult<()> {
        (self.capabilities.set_domain)(self, min.into(), max.into(), scale.into())
    }

    pub fn set_range<'a>(
        &self,
        min: impl Into<BoundArg<'a>>,
        max: impl Into<BoundArg<'a>>,
        scale: impl Into<BoundArg<'a>>,
    ) -> ChartResult<()> {
        (self.capabilities.set_range)(self, min.into(), max.into(), scale.into())
    }

    /// Applies `start` to every node matching `selector`, then animates to `end`.
    pub fn add_transition(
        &mut self,
        selector: &str,
        duration: Duration,
        start: &Props,
        end: &Props,
    ) -> ChartResult<usize> {
        let op = Rc::clone(&self.capabilities.add_transition);
        op(self, selector, duration, start, end)
    }
}

/// Materialized chart: a chart-type module composed with the capability core
/// and bound to one container.
pub struct ChartObject {
    type_name: String,
    chart_type: Box<dyn ChartType>,
    state: ChartState,
}

impl std::fmt::Debug for ChartObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartObject")
            .field("type_name", &self.type_name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ChartObject {
    /// Binds the container, copies the defaults, creates the single drawing
    /// surface and lets the chart type redecorate its capability table.
    pub(crate) fn init(
        type_name: String,
        mut chart_type: Box<dyn ChartType>,
        container: Rc<dyn Container>,
        defaults: Config,
        graphics: &dyn GraphicsLibrary,
    ) -> Self {
        let mut svg = graphics.create_surface(container.as_ref());
        svg.set_root_style("width", "100%");

        let mut capabilities = CapabilitySet::standard();
        chart_type.redecorate(&mut capabilities);
        let redecorated: Vec<&str> = Capability::ALL
            .into_iter()
            .filter(|cap| capabilities.is_overridden(*cap))
            .map(Capability::name)
            .collect();
        debug!(
            type_name = type_name.as_str(),
            graphics = graphics.name(),
            defaults = defaults.len(),
            ?redecorated,
            "chart object initialized"
        );

        Self {
            type_name,
            chart_type,
            state: ChartState {
                core: container,
                config: defaults,
                svg,
                data: Vec::new(),
                data_format: None,
                data_max: 0.0,
                capabilities,
            },
        }
    }

    /// Every operation available on a chart object, `init` first.
    #[must_use]
    pub fn operation_names() -> Vec<&'static str> {
        std::iter::once("init")
            .chain(Capability::ALL.into_iter().map(Capability::name))
            .collect()
    }

    /// Registered (namespaced) name of the chart type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ChartState {
        &mut self.state
    }

    /// Runs the chart type's drawing code against the loaded data.
    pub fn draw(&mut self) -> ChartResult<()> {
        self.chart_type.draw(&mut self.state)
    }

    /// One render cycle: reset, then load and draw when data is present.
    ///
    /// A load failure leaves the surface empty; the reset is not undone.
    /// Returns `false` when there was nothing to draw.
    pub fn render(&mut self, data: Option<&Dataset>) -> ChartResult<bool> {
        self.state.svg_reset();
        let Some(data) = data else {
            trace!(type_name = self.type_name.as_str(), "render cleared surface");
            return Ok(false);
        };
        self.state.load_data(data)?;
        self.draw()?;
        trace!(
            type_name = self.type_name.as_str(),
            data_count = self.state.data_count(),
            nodes = self.state.svg().node_count(),
            "render cycle drawn"
        );
        Ok(true)
    }
}
