//! Composition and lifecycle engine: capability core, chart-type registry,
//! materializer, configuration pipeline and the reactive render controller.

mod bindings;
mod capability;
mod chart_object;
mod directive;
mod host;
mod materializer;
pub mod pipeline;
mod registry;

pub use bindings::{Attributes, DirectiveBindings};
pub use capability::{
    AddTransitionOp, Capability, CapabilitySet, CoreMeasureOp, FilterPropsOp, LoadDataOp,
    LoadOptionsOp, MeasureOp, SetBoundsOp, SetScaleOp, SvgResetOp, ValidateAndFilterPropsOp,
    ValidatePropsOp,
};
pub use chart_object::{ChartObject, ChartState, RESET_ALL};
pub use directive::{ChartDirective, RenderOutcome, Trigger};
pub use host::{ChartHost, ChartHostBuilder};
pub use materializer::Materializer;
pub use registry::{ChartTypeFactory, ChartTypeRegistry, NAMESPACE_PREFIX, registered_name};
