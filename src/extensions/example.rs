use tracing::info;

use crate::api::{CapabilitySet, ChartState, ChartTypeRegistry};
use crate::core::{Attr, Props};
use crate::error::ChartResult;
use crate::render::Selection;

use super::ChartType;

/// Identifier the template chart registers under.
pub const EXAMPLE_TYPE: &str = "example";

pub const INITIAL_MESSAGE: &str = "I am initialized.";
pub const DRAWN_MESSAGE: &str = "I'm an example chart, drawn.";

pub fn register(registry: &ChartTypeRegistry) -> ChartResult<()> {
    registry.register(EXAMPLE_TYPE, create)
}

fn create() -> Box<dyn ChartType> {
    Box::new(ExampleChart::new())
}

/// Minimal chart type showing the module contract.
///
/// It reserves half of its container's width by redecorating `coreWidth`,
/// and its drawing is a single caption.
#[derive(Debug, Clone)]
pub struct ExampleChart {
    message: String,
}

impl Default for ExampleChart {
    fn default() -> Self {
        Self::new()
    }
}

impl ExampleChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: INITIAL_MESSAGE.to_owned(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn announce(&self, chart: &mut ChartState) -> ChartResult<Selection> {
        info!(message = self.message.as_str(), "example chart");
        let root = chart.svg().root();
        chart.svg_mut().append(root, "text")?;
        let selection = chart.svg().select_all("text");
        let props = Props::new()
            .with("x", 0.0)
            .with("y", 0.0)
            .with("width", chart.core_width());
        chart.svg_mut().set_attrs(&selection, &props)?;
        chart
            .svg_mut()
            .set_text(&selection, &Attr::from(self.message.as_str()))?;
        Ok(selection)
    }
}

impl ChartType for ExampleChart {
    fn redecorate(&mut self, capabilities: &mut CapabilitySet) {
        capabilities.override_core_width(|chart| chart.get_width(chart.core()) / 2.0);
    }

    fn draw(&mut self, chart: &mut ChartState) -> ChartResult<()> {
        DRAWN_MESSAGE.clone_into(&mut self.message);
        self.announce(chart)?;
        Ok(())
    }
}
