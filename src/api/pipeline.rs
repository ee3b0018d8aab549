use tracing::debug;

use crate::core::OptionMap;

use super::{Attributes, ChartObject};

/// Populates the configuration of a freshly materialized chart.
///
/// Static attributes are loaded first, then the bound options object; later
/// keys overwrite earlier ones.
pub fn configure(chart: &mut ChartObject, attributes: &Attributes, options: Option<&OptionMap>) {
    chart.state_mut().load_options(&attributes.to_option_map());
    if let Some(options) = options {
        chart.state_mut().load_options(options);
    }
    debug!(
        type_name = chart.type_name(),
        attributes = attributes.len(),
        options = options.map_or(0, OptionMap::len),
        config = chart.state().config().len(),
        "chart configured"
    );
}
