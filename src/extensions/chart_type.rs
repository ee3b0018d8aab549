use crate::api::{CapabilitySet, ChartState};
use crate::core::Config;
use crate::error::ChartResult;

/// Contract a chart-type module implements to plug into the materializer.
///
/// Construction happens through the factory registered for the type; the
/// capability core is composed afterwards and `draw` runs once per render,
/// after data has been loaded.
pub trait ChartType {
    /// Configuration copied into the chart before options are merged.
    fn defaults(&self) -> Config {
        Config::new()
    }

    /// Replaces capability operations. Called once during `init`, after the
    /// defaults are in place; the table is locked once this returns.
    fn redecorate(&mut self, _capabilities: &mut CapabilitySet) {}

    fn draw(&mut self, chart: &mut ChartState) -> ChartResult<()>;
}
