use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::props::AttrValue;
use crate::error::{ChartError, ChartResult};

/// List conversions shared by the overloaded scale arguments.
macro_rules! impl_list_conversions {
    ($target:ty, $variant:ident) => {
        impl From<Vec<f64>> for $target {
            fn from(values: Vec<f64>) -> Self {
                Self::$variant(values.into_iter().map(AttrValue::Number).collect())
            }
        }

        impl From<&[f64]> for $target {
            fn from(values: &[f64]) -> Self {
                Self::$variant(values.iter().copied().map(AttrValue::Number).collect())
            }
        }

        impl<const N: usize> From<[f64; N]> for $target {
            fn from(values: [f64; N]) -> Self {
                Self::$variant(values.into_iter().map(AttrValue::Number).collect())
            }
        }

        impl From<Vec<&str>> for $target {
            fn from(values: Vec<&str>) -> Self {
                Self::$variant(values.into_iter().map(AttrValue::from).collect())
            }
        }

        impl<const N: usize> From<[&str; N]> for $target {
            fn from(values: [&str; N]) -> Self {
                Self::$variant(values.into_iter().map(AttrValue::from).collect())
            }
        }

        impl From<Vec<AttrValue>> for $target {
            fn from(values: Vec<AttrValue>) -> Self {
                Self::$variant(values)
            }
        }
    };
}

/// Supported scale transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Sqrt,
    Pow,
    Log,
    Quantize,
    Threshold,
    Quantile,
    Identity,
    Ordinal,
}

impl ScaleKind {
    pub const ALL: [Self; 9] = [
        Self::Linear,
        Self::Sqrt,
        Self::Pow,
        Self::Log,
        Self::Quantize,
        Self::Threshold,
        Self::Quantile,
        Self::Identity,
        Self::Ordinal,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Log => "log",
            Self::Quantize => "quantize",
            Self::Threshold => "threshold",
            Self::Quantile => "quantile",
            Self::Identity => "identity",
            Self::Ordinal => "ordinal",
        }
    }

    /// Case-insensitive lookup; unrecognized names select `Linear`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

/// Scale transform mapping an input domain onto an output range.
///
/// Continuous kinds (linear, sqrt, pow, log, identity) need numbers on both
/// sides. Quantize, threshold and quantile take a numeric domain and map onto
/// any range values, colors included. Ordinal accepts any domain values and
/// matches them by their text form, so `1` and `"1"` are the same member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    kind: ScaleKind,
    domain: Vec<AttrValue>,
    range: Vec<AttrValue>,
    exponent: f64,
}

impl Scale {
    #[must_use]
    pub fn new(kind: ScaleKind) -> Self {
        let (domain, range) = match kind {
            ScaleKind::Linear
            | ScaleKind::Sqrt
            | ScaleKind::Pow
            | ScaleKind::Identity
            | ScaleKind::Quantize => (vec![0.0, 1.0], vec![0.0, 1.0]),
            ScaleKind::Log => (vec![1.0, 10.0], vec![0.0, 1.0]),
            ScaleKind::Threshold => (vec![0.5], vec![0.0, 1.0]),
            ScaleKind::Quantile | ScaleKind::Ordinal => (Vec::new(), Vec::new()),
        };
        let exponent = if kind == ScaleKind::Sqrt { 0.5 } else { 1.0 };
        Self {
            kind,
            domain: domain.into_iter().map(AttrValue::Number).collect(),
            range: range.into_iter().map(AttrValue::Number).collect(),
            exponent,
        }
    }

    #[must_use]
    pub fn linear() -> Self {
        Self::new(ScaleKind::Linear)
    }

    #[must_use]
    pub fn with_domain<T>(mut self, domain: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<AttrValue>,
    {
        self.set_domain(domain.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_range<T>(mut self, range: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<AttrValue>,
    {
        self.set_range(range.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn domain(&self) -> &[AttrValue] {
        &self.domain
    }

    #[must_use]
    pub fn range(&self) -> &[AttrValue] {
        &self.range
    }

    #[must_use]
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Identity scales keep domain and range equal; ordinal domains drop
    /// repeated members, keeping the first occurrence.
    pub fn set_domain(&mut self, domain: Vec<AttrValue>) {
        let domain = if self.kind == ScaleKind::Ordinal {
            let mut seen = IndexSet::with_capacity(domain.len());
            domain
                .into_iter()
                .filter(|member| seen.insert(member.to_string()))
                .collect()
        } else {
            domain
        };
        if self.kind == ScaleKind::Identity {
            self.range = domain.clone();
        }
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: Vec<AttrValue>) {
        if self.kind == ScaleKind::Identity {
            self.domain = range.clone();
        }
        self.range = range;
    }

    /// Only meaningful for `Pow`; `Sqrt` is fixed at 0.5.
    pub fn set_exponent(&mut self, exponent: f64) {
        if self.kind == ScaleKind::Pow {
            self.exponent = exponent;
        }
    }

    /// Maps `input` through the scale; `None` when it falls outside what the
    /// scale can represent (non-numeric input to a numeric kind, non-positive
    /// log input, unknown ordinal member, empty range).
    #[must_use]
    pub fn map(&self, input: &AttrValue) -> Option<AttrValue> {
        match self.kind {
            ScaleKind::Ordinal => self.ordinal(input),
            ScaleKind::Quantize | ScaleKind::Threshold | ScaleKind::Quantile => {
                let index = self.bucket(input.as_number()?)?;
                self.range.get(index).cloned()
            }
            ScaleKind::Linear
            | ScaleKind::Sqrt
            | ScaleKind::Pow
            | ScaleKind::Log
            | ScaleKind::Identity => self.continuous(input.as_number()?).map(AttrValue::Number),
        }
    }

    /// Numeric shorthand for [`Scale::map`].
    #[must_use]
    pub fn apply(&self, value: f64) -> Option<f64> {
        self.map(&AttrValue::Number(value))?.as_number()
    }

    fn continuous(&self, value: f64) -> Option<f64> {
        if self.kind == ScaleKind::Identity {
            return Some(value);
        }
        let domain = numbers(&self.domain)?;
        let range = numbers(&self.range)?;
        match self.kind {
            ScaleKind::Sqrt | ScaleKind::Pow => {
                let exponent = self.exponent;
                let transformed: Vec<f64> = domain
                    .iter()
                    .map(|bound| signed_pow(*bound, exponent))
                    .collect();
                piecewise(&transformed, &range, signed_pow(value, exponent))
            }
            ScaleKind::Log => {
                if value <= 0.0 || domain.iter().any(|bound| *bound <= 0.0) {
                    return None;
                }
                let transformed: Vec<f64> = domain.iter().map(|bound| bound.ln()).collect();
                piecewise(&transformed, &range, value.ln())
            }
            _ => piecewise(&domain, &range, value),
        }
    }

    /// Range index for the discretizing kinds.
    fn bucket(&self, value: f64) -> Option<usize> {
        let buckets = self.range.len();
        if buckets == 0 {
            return None;
        }
        match self.kind {
            ScaleKind::Quantize => {
                let domain = numbers(&self.domain)?;
                let (first, last) = (*domain.first()?, *domain.last()?);
                let span = last - first;
                if span == 0.0 {
                    return Some(0);
                }
                let raw = ((value - first) / span * buckets as f64).floor();
                Some(raw.clamp(0.0, (buckets - 1) as f64) as usize)
            }
            ScaleKind::Threshold => Some(bisect_right(&numbers(&self.domain)?, value)),
            _ => {
                let samples: Vec<f64> = self
                    .domain
                    .iter()
                    .filter_map(AttrValue::as_number)
                    .collect();
                let thresholds = quantile_thresholds(&samples, buckets)?;
                Some(bisect_right(&thresholds, value))
            }
        }
    }

    fn ordinal(&self, input: &AttrValue) -> Option<AttrValue> {
        if self.range.is_empty() {
            return None;
        }
        let key = input.to_string();
        let position = self
            .domain
            .iter()
            .position(|member| member.to_string() == key)?;
        self.range.get(position % self.range.len()).cloned()
    }
}

/// All values as numbers, or `None` if any of them is text.
fn numbers(values: &[AttrValue]) -> Option<Vec<f64>> {
    values.iter().map(AttrValue::as_number).collect()
}

fn signed_pow(value: f64, exponent: f64) -> f64 {
    if value < 0.0 {
        -(-value).powf(exponent)
    } else {
        value.powf(exponent)
    }
}

/// Number of `sorted` values less than or equal to `value`.
fn bisect_right(sorted: &[f64], value: f64) -> usize {
    sorted.partition_point(|bound| *bound <= value)
}

/// Piecewise-linear interpolation over a monotonic domain, unclamped.
fn piecewise(domain: &[f64], range: &[f64], value: f64) -> Option<f64> {
    let points = domain.len().min(range.len());
    if points < 2 || !value.is_finite() {
        return None;
    }
    let (mut domain, mut range) = (domain[..points].to_vec(), range[..points].to_vec());
    if domain[points - 1] < domain[0] {
        domain.reverse();
        range.reverse();
    }
    let segment = bisect_right(&domain[1..points - 1], value);
    let (d0, d1) = (domain[segment], domain[segment + 1]);
    let (r0, r1) = (range[segment], range[segment + 1]);
    let span = d1 - d0;
    let t = if span == 0.0 { 0.0 } else { (value - d0) / span };
    Some(r0 + t * (r1 - r0))
}

/// R-7 quantile thresholds splitting `samples` into `buckets` groups.
fn quantile_thresholds(samples: &[f64], buckets: usize) -> Option<Vec<f64>> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() || buckets == 0 {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() - 1;
    let thresholds = (1..buckets)
        .map(|k| {
            let h = last as f64 * (k as f64 / buckets as f64);
            let lower = h.floor() as usize;
            let upper = (lower + 1).min(last);
            sorted[lower] + (h - lower as f64) * (sorted[upper] - sorted[lower])
        })
        .collect();
    Some(thresholds)
}

/// Loosely-typed `setScale` argument.
///
/// A bare string is a kind name; any list, including a list of strings, is
/// a set of bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleArg {
    Kind(String),
    Bounds(Vec<AttrValue>),
    Absent,
}

impl From<&str> for ScaleArg {
    fn from(kind: &str) -> Self {
        Self::Kind(kind.to_owned())
    }
}

impl From<String> for ScaleArg {
    fn from(kind: String) -> Self {
        Self::Kind(kind)
    }
}

impl From<ScaleKind> for ScaleArg {
    fn from(kind: ScaleKind) -> Self {
        Self::Kind(kind.name().to_owned())
    }
}

impl From<()> for ScaleArg {
    fn from((): ()) -> Self {
        Self::Absent
    }
}

impl_list_conversions!(ScaleArg, Bounds);

/// Builds a scale from overloaded arguments.
///
/// A first argument that is not a kind name is taken as the domain and the
/// second as the range, with the kind defaulting to linear; the third
/// argument is then ignored. Domain and range are applied only when given.
pub fn build_scale(first: ScaleArg, second: ScaleArg, third: ScaleArg) -> ChartResult<Scale> {
    let (kind, domain, range) = match first {
        ScaleArg::Kind(name) => (ScaleKind::from_name(&name), second, third),
        shifted => (ScaleKind::Linear, shifted, second),
    };
    let mut scale = Scale::new(kind);
    if let Some(domain) = scale_bounds(domain, ScaleAxis::Domain)? {
        scale.set_domain(domain);
    }
    if let Some(range) = scale_bounds(range, ScaleAxis::Range)? {
        scale.set_range(range);
    }
    Ok(scale)
}

fn scale_bounds(arg: ScaleArg, axis: ScaleAxis) -> ChartResult<Option<Vec<AttrValue>>> {
    match arg {
        ScaleArg::Bounds(bounds) => Ok(Some(bounds)),
        ScaleArg::Absent => Ok(None),
        ScaleArg::Kind(name) => Err(ChartError::InvalidArgument(format!(
            "scale {axis} must be a list of values, got `{name}`"
        ))),
    }
}

/// Which side of a scale `apply_bounds` rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAxis {
    Domain,
    Range,
}

impl fmt::Display for ScaleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Domain => "domain",
            Self::Range => "range",
        })
    }
}

/// Loosely-typed `setDomain`/`setRange` argument.
#[derive(Debug)]
pub enum BoundArg<'a> {
    Value(AttrValue),
    Values(Vec<AttrValue>),
    Scale(&'a mut Scale),
    Absent,
}

impl From<f64> for BoundArg<'_> {
    fn from(value: f64) -> Self {
        Self::Value(AttrValue::Number(value))
    }
}

impl From<&str> for BoundArg<'_> {
    fn from(value: &str) -> Self {
        Self::Value(AttrValue::from(value))
    }
}

impl From<AttrValue> for BoundArg<'_> {
    fn from(value: AttrValue) -> Self {
        Self::Value(value)
    }
}

impl<'a> From<&'a mut Scale> for BoundArg<'a> {
    fn from(scale: &'a mut Scale) -> Self {
        Self::Scale(scale)
    }
}

impl From<()> for BoundArg<'_> {
    fn from((): ()) -> Self {
        Self::Absent
    }
}

impl_list_conversions!(BoundArg<'_>, Values);

/// Rewrites one side of a scale in place.
///
/// Accepted forms, checked in this order:
/// - `(bounds, scale, absent)`: `bounds` replaces the side wholesale;
/// - `(min, max, scale)`: the side becomes `[min, max]`.
///
/// Anything else is rejected.
pub fn apply_bounds(
    axis: ScaleAxis,
    min: BoundArg<'_>,
    max: BoundArg<'_>,
    scale: BoundArg<'_>,
) -> ChartResult<()> {
    let (target, bounds) = match (min, max, scale) {
        (BoundArg::Values(bounds), BoundArg::Scale(target), BoundArg::Absent) => (target, bounds),
        (BoundArg::Value(min), BoundArg::Value(max), BoundArg::Scale(target)) => {
            (target, vec![min, max])
        }
        (_, _, BoundArg::Scale(_)) => {
            return Err(ChartError::InvalidArgument(format!(
                "{axis} min and max must be single values when a scale is passed third"
            )));
        }
        _ => {
            return Err(ChartError::InvalidArgument(format!(
                "{axis} update needs `(min, max, scale)` or `(bounds, scale)`"
            )));
        }
    };
    match axis {
        ScaleAxis::Domain => target.set_domain(bounds),
        ScaleAxis::Range => target.set_range(bounds),
    }
    Ok(())
}
