use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("missing graphics library: {0}")]
    MissingLibrary(String),

    #[error("unknown chart type `{identifier}`: no constructor registered as `{registered_name}`")]
    UnknownChartType {
        identifier: String,
        registered_name: String,
    },

    #[error("chart type `{0}` is already registered")]
    DuplicateChartType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid data format: {0}")]
    InvalidDataFormat(String),

    #[error("incomplete properties: {0}")]
    IncompleteProperties(String),
}
