//! graphular: pluggable chart-type composition and reactive rendering.
//!
//! Chart-type modules register a constructor under a namespaced name. The
//! materializer composes each constructed module with a shared capability
//! core, lets it redecorate selected operations and binds it to a container;
//! a directive then re-renders it whenever its data or viewport changes.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{
    Attributes, ChartDirective, ChartHost, ChartObject, ChartState, ChartTypeRegistry,
    DirectiveBindings, RenderOutcome,
};
pub use error::{ChartError, ChartResult};
