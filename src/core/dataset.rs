use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::config::parse_numeric;
use crate::error::{ChartError, ChartResult};

/// Raw dataset as bound by the host.
///
/// Datasets are replaced wholesale on change and shared by reference; the
/// render controller compares references, never contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    items: Vec<Value>,
}

impl Dataset {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// Flat sequence of numeric values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        Self::new(values.iter().map(|value| Value::from(*value)).collect())
    }

    /// Sequence of `{label, value}` records.
    #[must_use]
    pub fn from_records<L: Into<String>>(records: impl IntoIterator<Item = (L, f64)>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|(label, value)| {
                    let mut record = Map::new();
                    record.insert("label".to_owned(), Value::String(label.into()));
                    record.insert("value".to_owned(), Value::from(value));
                    Value::Object(record)
                })
                .collect(),
        )
    }

    /// Parses a JSON array. Element validation is deferred to load time.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let items: Vec<Value> = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidDataFormat(format!("failed to parse dataset json: {e}"))
        })?;
        Ok(Self::new(items))
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Dataset layout, locked by inspecting the first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    Values,
    Records,
}

/// One validated data element as seen by drawing code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub label: Option<String>,
    pub value: f64,
}

impl Datum {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { label: None, value }
    }

    #[must_use]
    pub fn labeled(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: Some(label.into()),
            value,
        }
    }
}

/// Validated dataset with its derived summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub format: DataFormat,
    pub data: Vec<Datum>,
    pub max: f64,
}

/// Validates `dataset` and derives its summary.
///
/// Nothing is returned unless every element conforms to the format implied
/// by the first one, so callers can assign the result atomically.
pub fn validate_dataset(dataset: &Dataset) -> ChartResult<LoadedData> {
    let Some(first) = dataset.items().first() else {
        return Err(ChartError::InvalidDataFormat(
            "dataset must contain at least one element".to_owned(),
        ));
    };

    let format = if numeric_scalar(first).is_some() {
        DataFormat::Values
    } else if record_value(first).is_some() {
        DataFormat::Records
    } else {
        return Err(ChartError::InvalidDataFormat(
            "first element must be numeric or carry a numeric `value` field".to_owned(),
        ));
    };

    let mut data = Vec::with_capacity(dataset.len());
    for (index, item) in dataset.items().iter().enumerate() {
        let datum = match format {
            DataFormat::Values => numeric_scalar(item).map(Datum::new),
            DataFormat::Records => record_value(item).map(|value| Datum {
                label: record_label(item),
                value,
            }),
        };
        let Some(datum) = datum else {
            return Err(ChartError::InvalidDataFormat(format!(
                "element {index} does not match the {format:?} format of the first element"
            )));
        };
        data.push(datum);
    }

    let max = data
        .iter()
        .map(|datum| OrderedFloat(datum.value))
        .max()
        .map_or(0.0, |max| max.0);

    Ok(LoadedData { format, data, max })
}

fn numeric_scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_numeric(text),
        _ => None,
    }
}

fn record_value(value: &Value) -> Option<f64> {
    value.as_object()?.get("value").and_then(numeric_scalar)
}

fn record_label(value: &Value) -> Option<String> {
    match value.as_object()?.get("label")? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
