pub mod config;
pub mod dataset;
pub mod palette;
pub mod props;
pub mod scale;
pub mod types;

pub use config::{Config, OptionMap, OptionValue, coerce_option, is_reserved_key};
pub use dataset::{DataFormat, Dataset, Datum, LoadedData, validate_dataset};
pub use palette::{CATEGORY20, category20};
pub use props::{Attr, AttrValue, Keys, Props};
pub use scale::{BoundArg, Scale, ScaleArg, ScaleAxis, ScaleKind, apply_bounds, build_scale};
pub use types::{Container, ElementBox, Viewport};
