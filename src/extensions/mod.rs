//! Chart-type modules built on the capability core.
//!
//! Each module exposes a `register` function the global registry calls once.

pub mod bar;
mod chart_type;
pub mod example;

pub use bar::{BarChart, HorizontalLayout};
pub use chart_type::ChartType;
pub use example::ExampleChart;
